// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use async_trait::async_trait;
use uploader_evm::common::{format_ether, Address, Amount, Root};
use uploader_evm::contract::flow::handler::RecordReceipt;
use uploader_evm::{wallet, CallEncoding, Wallet};

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Wallet(#[from] wallet::Error),
    #[error(
        "Balance of {address} is {} ETH, which does not cover the storage fee of {} ETH",
        ether(.balance),
        ether(.fee)
    )]
    InsufficientBalance {
        address: Address,
        balance: Amount,
        fee: Amount,
    },
}

fn ether(amount: &Amount) -> String {
    format_ether(*amount)
}

/// What the pre-flight check saw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreflightReport {
    pub chain_id: u64,
    pub address: Address,
    pub balance: Amount,
    pub fee: Amount,
}

/// Records stored payloads on chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSubmitter: Send + Sync {
    /// Check the chain is reachable and the signer can pay the fee.
    async fn preflight(&self) -> Result<PreflightReport, RecordError>;

    /// Send the record transaction for `root` and wait for a successful receipt.
    async fn record(&self, root: Root, data_size: u64) -> Result<RecordReceipt, RecordError>;
}

/// Records uploads on the flow contract with the configured wallet.
#[derive(Clone, Debug)]
pub struct ChainRecorder {
    wallet: Wallet,
    encoding: CallEncoding,
    fee: Amount,
}

impl ChainRecorder {
    pub fn new(wallet: Wallet, encoding: CallEncoding, fee: Amount) -> Self {
        Self {
            wallet,
            encoding,
            fee,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }
}

#[async_trait]
impl RecordSubmitter for ChainRecorder {
    async fn preflight(&self) -> Result<PreflightReport, RecordError> {
        let chain_id = self.wallet.chain_id().await?;
        let address = self.wallet.address();
        let balance = self.wallet.balance_of_gas_tokens().await?;
        info!(
            "Pre-flight on chain {chain_id}: {address} holds {} ETH, fee is {} ETH",
            format_ether(balance),
            format_ether(self.fee)
        );

        check_balance(address, balance, self.fee)?;

        Ok(PreflightReport {
            chain_id,
            address,
            balance,
            fee: self.fee,
        })
    }

    async fn record(&self, root: Root, data_size: u64) -> Result<RecordReceipt, RecordError> {
        let receipt = self
            .wallet
            .record_upload(self.encoding, root, data_size, self.fee)
            .await?;
        info!(
            "Record of {root} confirmed in block {:?} with tx {}",
            receipt.block_number, receipt.tx_hash
        );
        Ok(receipt)
    }
}

/// A balance equal to the fee is enough.
pub fn check_balance(address: Address, balance: Amount, fee: Amount) -> Result<(), RecordError> {
    if balance < fee {
        return Err(RecordError::InsufficientBalance {
            address,
            balance,
            fee,
        });
    }
    Ok(())
}
