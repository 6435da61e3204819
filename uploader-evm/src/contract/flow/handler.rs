// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Amount, Calldata, TxHash};
use crate::contract::flow::Error;
use crate::retry::{retry, RetryPolicy};
use crate::transaction_config::{GasLimit, GasPrice, TransactionConfig};
use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;

/// What we keep from a confirmed record transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

pub struct FlowHandler<P: Provider> {
    address: Address,
    provider: P,
}

impl<P> FlowHandler<P>
where
    P: Provider,
{
    /// Create a new FlowHandler for the flow contract at `address`.
    pub fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Resolve the gas price policy. `None` leaves it to the provider's fillers.
    pub async fn resolve_gas_price(&self, policy: &GasPrice) -> Result<Option<u128>, Error> {
        match policy {
            GasPrice::Auto => Ok(None),
            GasPrice::Custom(price) => Ok(Some(*price)),
            GasPrice::Scaled { percent } => {
                let market = self
                    .provider
                    .get_gas_price()
                    .await
                    .inspect_err(|err| error!("Error fetching gas price: {err:?}"))?;
                let price = GasPrice::scale(market, *percent);
                debug!("Market gas price {market} wei, using {price} wei ({percent}%)");
                Ok(Some(price))
            }
        }
    }

    /// Resolve the gas limit policy for `request`. Estimation failures fall back, they never fail.
    pub async fn resolve_gas_limit(
        &self,
        policy: &GasLimit,
        request: &TransactionRequest,
    ) -> Option<u64> {
        match policy {
            GasLimit::Auto => None,
            GasLimit::Fixed(limit) => Some(*limit),
            GasLimit::Estimated {
                multiplier_percent,
                fallback,
            } => match self.provider.estimate_gas(request.clone()).await {
                Ok(estimate) => {
                    let limit = GasLimit::with_margin(estimate, *multiplier_percent);
                    debug!("Estimated gas {estimate}, using limit {limit}");
                    Some(limit)
                }
                Err(err) => {
                    warn!("Gas estimation failed, using fallback limit {fallback}: {err}");
                    Some(*fallback)
                }
            },
        }
    }

    /// Build the record transaction with gas and nonce resolved up front.
    ///
    /// The nonce is pinned so a re-sent broadcast replaces the first one instead of paying twice.
    pub async fn record_request(
        &self,
        from: Address,
        calldata: Calldata,
        value: Amount,
        transaction_config: &TransactionConfig,
    ) -> Result<TransactionRequest, Error> {
        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(calldata)
            .with_value(value);

        if let Some(gas_price) = self
            .resolve_gas_price(&transaction_config.gas_price)
            .await?
        {
            request = request.with_gas_price(gas_price);
        }

        if let Some(gas_limit) = self
            .resolve_gas_limit(&transaction_config.gas_limit, &request)
            .await
        {
            request = request.with_gas_limit(gas_limit);
        }

        let nonce = self
            .provider
            .get_transaction_count(from)
            .pending()
            .await
            .inspect_err(|err| error!("Error fetching the nonce of {from}: {err:?}"))?;
        debug!("Record transaction from {from} uses nonce {nonce}");

        Ok(request.with_nonce(nonce))
    }

    /// Send a record transaction with `calldata` and `value` attached, then wait for its receipt.
    ///
    /// Only the broadcast is retried. Once a transaction hash exists the transaction is on its
    /// way, so a failed or timed out confirmation is reported as is.
    pub async fn submit_record(
        &self,
        from: Address,
        calldata: Calldata,
        value: Amount,
        transaction_config: &TransactionConfig,
        retry_policy: &RetryPolicy,
    ) -> Result<RecordReceipt, Error> {
        let request = self
            .record_request(from, calldata, value, transaction_config)
            .await?;

        let provider = &self.provider;
        let pending_tx_builder = retry(retry_policy, "sending record transaction", || {
            provider.send_transaction(request.clone())
        })
        .await
        .inspect_err(|err| error!("Error to send_transaction during submit_record: {err:?}"))?;

        let tx_hash = *pending_tx_builder.tx_hash();
        debug!("submit_record is pending with tx hash: {tx_hash}");

        let receipt = pending_tx_builder
            .with_timeout(transaction_config.confirmation_timeout)
            .get_receipt()
            .await
            .inspect_err(|err| {
                error!("Error waiting for receipt of {tx_hash} during submit_record: {err:?}")
            })?;

        record_receipt(&receipt)
    }
}

/// Turn a mined receipt into a [`RecordReceipt`], failing on any non-success status.
pub fn record_receipt<R: ReceiptResponse>(receipt: &R) -> Result<RecordReceipt, Error> {
    let tx_hash = receipt.transaction_hash();
    ensure_success(receipt.status(), tx_hash, receipt.block_number())?;

    Ok(RecordReceipt {
        tx_hash,
        block_number: receipt.block_number(),
        gas_used: receipt.gas_used(),
    })
}

/// Anything but the canonical success status is a failed record.
pub fn ensure_success(
    status: bool,
    tx_hash: TxHash,
    block_number: Option<u64>,
) -> Result<(), Error> {
    if status {
        Ok(())
    } else {
        warn!("Transaction {tx_hash} reverted in block {block_number:?}");
        Err(Error::Reverted {
            tx_hash,
            block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction_config::{
        DEFAULT_FALLBACK_GAS_LIMIT, DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT,
    };
    use alloy::primitives::{Bytes, U128, U64};
    use alloy::providers::ProviderBuilder;
    use alloy::rpc::types::TransactionReceipt;
    use alloy::transports::mock::Asserter;

    fn flow() -> Address {
        Address::repeat_byte(0xf1)
    }

    fn from() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn mocked_handler() -> (FlowHandler<impl Provider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
        (FlowHandler::new(flow(), provider), asserter)
    }

    fn estimated() -> GasLimit {
        GasLimit::Estimated {
            multiplier_percent: DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT,
            fallback: DEFAULT_FALLBACK_GAS_LIMIT,
        }
    }

    fn receipt_json(status: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "0x0",
            "status": status,
            "cumulativeGasUsed": "0xea60",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": TxHash::repeat_byte(0xbb),
            "transactionIndex": "0x0",
            "blockHash": TxHash::repeat_byte(0xcc),
            "blockNumber": "0x2a",
            "gasUsed": "0xea60",
            "effectiveGasPrice": "0x3b9aca00",
            "from": from(),
            "to": flow(),
            "contractAddress": null
        })
    }

    #[test]
    fn successful_status_passes() {
        assert!(ensure_success(true, TxHash::repeat_byte(1), Some(10)).is_ok());
    }

    #[test]
    fn failed_status_is_reverted() {
        let tx_hash = TxHash::repeat_byte(2);
        let result = ensure_success(false, tx_hash, Some(42));
        assert!(matches!(
            result,
            Err(Error::Reverted {
                tx_hash: hash,
                block_number: Some(42)
            }) if hash == tx_hash
        ));
    }

    #[tokio::test]
    async fn estimation_failure_falls_back() {
        let (handler, asserter) = mocked_handler();
        asserter.push_failure_msg("execution reverted");

        let limit = handler
            .resolve_gas_limit(&estimated(), &TransactionRequest::default())
            .await;
        assert_eq!(limit, Some(300_000));
    }

    #[tokio::test]
    async fn estimate_gets_the_margin() {
        let (handler, asserter) = mocked_handler();
        asserter.push_success(&U64::from(100_000u64));

        let limit = handler
            .resolve_gas_limit(&estimated(), &TransactionRequest::default())
            .await;
        assert_eq!(limit, Some(150_000));
    }

    #[tokio::test]
    async fn market_gas_price_is_scaled() {
        let (handler, asserter) = mocked_handler();
        asserter.push_success(&U128::from(1_000_000_000u64));

        let price = handler
            .resolve_gas_price(&GasPrice::Scaled { percent: 110 })
            .await
            .expect("gas price");
        assert_eq!(price, Some(1_100_000_000));
    }

    #[tokio::test]
    async fn fixed_policies_do_not_touch_the_node() {
        let (handler, _asserter) = mocked_handler();

        assert_eq!(
            handler
                .resolve_gas_limit(&GasLimit::Fixed(90_000), &TransactionRequest::default())
                .await,
            Some(90_000)
        );
        assert_eq!(
            handler
                .resolve_gas_price(&GasPrice::Custom(7))
                .await
                .expect("gas price"),
            Some(7)
        );
    }

    #[tokio::test]
    async fn record_request_pins_the_pending_nonce() {
        let (handler, asserter) = mocked_handler();
        asserter.push_success(&U128::from(2_000_000_000u64));
        asserter.push_success(&U64::from(40_000u64));
        asserter.push_success(&U64::from(7u64));

        let config = TransactionConfig {
            gas_limit: estimated(),
            gas_price: GasPrice::Scaled { percent: 100 },
            ..Default::default()
        };
        let request = handler
            .record_request(
                from(),
                Bytes::from_static(&[0x61, 0x25]),
                Amount::from(5u64),
                &config,
            )
            .await
            .expect("request");

        assert_eq!(request.nonce, Some(7));
        assert_eq!(request.gas_price, Some(2_000_000_000));
        assert_eq!(request.gas, Some(60_000));
        assert_eq!(request.value, Some(Amount::from(5u64)));
        assert_eq!(request.from, Some(from()));
    }

    #[tokio::test]
    async fn nonce_lookup_failure_is_an_error() {
        let (handler, asserter) = mocked_handler();
        asserter.push_failure_msg("nonce unavailable");

        let config = TransactionConfig {
            gas_limit: GasLimit::Fixed(60_000),
            gas_price: GasPrice::Custom(1),
            ..Default::default()
        };
        let result = handler
            .record_request(from(), Bytes::new(), Amount::ZERO, &config)
            .await;
        assert!(matches!(result, Err(Error::Rpc(_))));
    }

    #[test]
    fn reverted_receipt_is_a_failed_record() {
        let receipt: TransactionReceipt =
            serde_json::from_value(receipt_json("0x0")).expect("receipt");

        let result = record_receipt(&receipt);
        assert!(matches!(
            result,
            Err(Error::Reverted {
                tx_hash,
                block_number: Some(42)
            }) if tx_hash == TxHash::repeat_byte(0xbb)
        ));
    }

    #[test]
    fn successful_receipt_is_recorded() {
        let receipt: TransactionReceipt =
            serde_json::from_value(receipt_json("0x1")).expect("receipt");

        let record = record_receipt(&receipt).expect("success");
        assert_eq!(
            record,
            RecordReceipt {
                tx_hash: TxHash::repeat_byte(0xbb),
                block_number: Some(42),
                gas_used: 60_000,
            }
        );
    }
}
