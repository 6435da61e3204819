// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Amount, Root, U256};
use crate::contract::flow::handler::{FlowHandler, RecordReceipt};
use crate::contract::flow::{self, CallEncoding};
use crate::retry::RetryPolicy;
use crate::transaction_config::TransactionConfig;
use crate::utils::{http_provider, http_provider_with_wallet};
use crate::Network;
use alloy::network::{Ethereum, EthereumWallet, NetworkWallet};
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError, TransportErrorKind};
use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Private key is invalid")]
    PrivateKeyInvalid,
    #[error(transparent)]
    RpcError(#[from] RpcError<TransportErrorKind>),
    #[error(transparent)]
    Flow(#[from] flow::Error),
}

/// Signs and sends upload records for one account on one network.
#[derive(Clone)]
pub struct Wallet {
    wallet: EthereumWallet,
    network: Network,
    transaction_config: TransactionConfig,
    retry_policy: RetryPolicy,
}

impl Wallet {
    /// Creates a new Wallet object with the specific Network and EthereumWallet.
    pub fn new(network: Network, wallet: EthereumWallet) -> Self {
        Self {
            wallet,
            network,
            transaction_config: TransactionConfig::default(),
            retry_policy: RetryPolicy::none(),
        }
    }

    /// Creates a new Wallet based on the given private_key.
    ///
    /// Fails with Error::PrivateKeyInvalid if the private_key is invalid.
    pub fn new_from_private_key(network: Network, private_key: &str) -> Result<Self, Error> {
        let wallet = from_private_key(private_key)?;
        Ok(Self::new(network, wallet))
    }

    pub fn with_transaction_config(mut self, transaction_config: TransactionConfig) -> Self {
        self.transaction_config = transaction_config;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Returns the address of this wallet.
    pub fn address(&self) -> Address {
        wallet_address(&self.wallet)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn transaction_config(&self) -> &TransactionConfig {
        &self.transaction_config
    }

    /// Chain id reported by the RPC endpoint. Doubles as a reachability check.
    pub async fn chain_id(&self) -> Result<u64, Error> {
        let provider = http_provider(self.network.rpc_url().clone());
        Ok(provider.get_chain_id().await?)
    }

    /// Returns the raw balance of gas tokens for this wallet.
    pub async fn balance_of_gas_tokens(&self) -> Result<U256, Error> {
        let provider = http_provider(self.network.rpc_url().clone());
        Ok(provider.get_balance(self.address()).await?)
    }

    /// Record an upload of `data_size` bytes identified by `root` on the flow contract,
    /// attaching `value` as the storage fee.
    pub async fn record_upload(
        &self,
        encoding: CallEncoding,
        root: Root,
        data_size: u64,
        value: Amount,
    ) -> Result<RecordReceipt, Error> {
        let calldata = encoding
            .encode(root, data_size)
            .map_err(flow::Error::from)?;

        let provider =
            http_provider_with_wallet(self.network.rpc_url().clone(), self.wallet.clone());
        let flow = FlowHandler::new(*self.network.flow_address(), provider);

        debug!(
            "Recording root {root} ({data_size} bytes) with {encoding} encoding on {}",
            flow.address()
        );

        let receipt = flow
            .submit_record(
                self.address(),
                calldata,
                value,
                &self.transaction_config,
                &self.retry_policy,
            )
            .await?;

        Ok(receipt)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("network", &self.network)
            .field("transaction_config", &self.transaction_config)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

/// Creates a wallet from a private key in HEX format.
pub fn from_private_key(private_key: &str) -> Result<EthereumWallet, Error> {
    let signer: PrivateKeySigner = PrivateKeySigner::from_str(private_key.trim()).map_err(|err| {
        error!("Error parsing private key: {err}");
        Error::PrivateKeyInvalid
    })?;
    Ok(EthereumWallet::from(signer))
}

/// Returns the address of a wallet.
pub fn wallet_address(wallet: &EthereumWallet) -> Address {
    <EthereumWallet as NetworkWallet<Ethereum>>::default_signer_address(wallet)
}
