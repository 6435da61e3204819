// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::Address;
use alloy::transports::http::reqwest;
use std::str::FromStr;

#[macro_use]
extern crate tracing;

pub mod common;
pub mod contract;
pub mod retry;
pub mod transaction_config;
pub mod utils;
pub mod wallet;

pub use contract::flow::CallEncoding;
pub use retry::RetryPolicy;
pub use transaction_config::{GasLimit, GasPrice, TransactionConfig};
pub use wallet::Wallet;

/// Default upper bound on how long we wait for a receipt.
pub const DEFAULT_CONFIRMATION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("Invalid RPC URL {0:?}: {1}")]
    InvalidRpcUrl(String, String),
    #[error("Invalid flow contract address {0:?}")]
    InvalidFlowAddress(String),
}

/// The chain we record uploads on: an RPC endpoint and the flow contract living there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    rpc_url_http: reqwest::Url,
    flow_address: Address,
}

impl Network {
    pub fn new(rpc_url_http: reqwest::Url, flow_address: Address) -> Self {
        Self {
            rpc_url_http,
            flow_address,
        }
    }

    /// Parse a network from its string representation, as found in the environment.
    pub fn parse(rpc_url: &str, flow_address: &str) -> Result<Self, NetworkError> {
        let rpc_url_http = reqwest::Url::parse(rpc_url)
            .map_err(|err| NetworkError::InvalidRpcUrl(rpc_url.to_string(), err.to_string()))?;
        let flow_address = Address::from_str(flow_address)
            .map_err(|_| NetworkError::InvalidFlowAddress(flow_address.to_string()))?;
        Ok(Self::new(rpc_url_http, flow_address))
    }

    pub fn rpc_url(&self) -> &reqwest::Url {
        &self.rpc_url_http
    }

    pub fn flow_address(&self) -> &Address {
        &self.flow_address
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (flow {})", self.rpc_url_http, self.flow_address)
    }
}
