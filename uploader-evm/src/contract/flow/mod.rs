// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

pub mod handler;
pub mod interface;
pub mod template;

use crate::common::{Calldata, Root, TxHash};
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportErrorKind};
use interface::IFlow;
use template::{TemplateError, SUBMIT_TEMPLATE_V1};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    #[error(transparent)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("Transaction {tx_hash} reverted (block {block_number:?})")]
    Reverted {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
}

/// How the record call for an upload is encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallEncoding {
    /// `store(bytes32 root, uint64 dataSize)` through the ABI encoder.
    #[default]
    Store,
    /// The fixed `submit` template with the root substituted. The data size is not recorded.
    SubmitTemplate,
}

impl CallEncoding {
    pub fn encode(&self, root: Root, data_size: u64) -> Result<Calldata, TemplateError> {
        match self {
            CallEncoding::Store => Ok(IFlow::storeCall {
                root,
                dataSize: data_size,
            }
            .abi_encode()
            .into()),
            CallEncoding::SubmitTemplate => SUBMIT_TEMPLATE_V1.encode(root),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallEncoding::Store => "store",
            CallEncoding::SubmitTemplate => "submit-template",
        }
    }
}

impl std::fmt::Display for CallEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CallEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "store" => Ok(CallEncoding::Store),
            "submit-template" | "template" => Ok(CallEncoding::SubmitTemplate),
            other => Err(format!(
                "Invalid call encoding {other:?}, expected \"store\" or \"submit-template\""
            )),
        }
    }
}
