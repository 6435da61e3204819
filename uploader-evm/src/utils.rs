// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::Hash;
use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest;

/// Generate a random Hash.
pub fn dummy_hash() -> Hash {
    use rand::Rng;
    Hash::new(rand::rngs::OsRng.r#gen())
}

/// Read-only provider, used for balance and chain queries.
pub fn http_provider(rpc_url: reqwest::Url) -> DynProvider {
    ProviderBuilder::new().connect_http(rpc_url).erased()
}

/// Provider that fills nonce, chain id and gas and signs with `wallet`.
pub fn http_provider_with_wallet(rpc_url: reqwest::Url, wallet: EthereumWallet) -> DynProvider {
    ProviderBuilder::new()
        .with_simple_nonce_management()
        .wallet(wallet)
        .connect_http(rpc_url)
        .erased()
}
