// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::DEFAULT_CONFIRMATION_TIMEOUT;
use std::time::Duration;

/// Gas limit used when estimation fails.
pub const DEFAULT_FALLBACK_GAS_LIMIT: u64 = 300_000;
/// Safety margin applied on top of an estimate, in percent.
pub const DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT: u64 = 150;

#[derive(Clone, Debug)]
pub struct TransactionConfig {
    pub gas_limit: GasLimit,
    pub gas_price: GasPrice,
    /// How long to wait for a receipt. `None` waits for as long as the node keeps answering.
    pub confirmation_timeout: Option<Duration>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_limit: GasLimit::default(),
            gas_price: GasPrice::default(),
            confirmation_timeout: Some(DEFAULT_CONFIRMATION_TIMEOUT),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasLimit {
    /// Leave it to the provider's gas filler.
    Auto,
    /// Estimate, multiply by `multiplier_percent` / 100, and use `fallback` if estimation fails.
    Estimated {
        multiplier_percent: u64,
        fallback: u64,
    },
    /// A fixed gas limit.
    Fixed(u64),
}

impl Default for GasLimit {
    fn default() -> Self {
        GasLimit::Estimated {
            multiplier_percent: DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT,
            fallback: DEFAULT_FALLBACK_GAS_LIMIT,
        }
    }
}

impl GasLimit {
    /// Apply the safety margin to a network estimate.
    pub fn with_margin(estimate: u64, multiplier_percent: u64) -> u64 {
        let scaled = u128::from(estimate) * u128::from(multiplier_percent) / 100;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GasPrice {
    /// Use the current market price. WARNING: This can result in unexpected high gas fees!
    #[default]
    Auto,
    /// The current market price scaled by `percent` / 100.
    Scaled { percent: u64 },
    /// A custom gas price in WEI.
    Custom(u128),
}

impl GasPrice {
    pub fn scale(market: u128, percent: u64) -> u128 {
        market.saturating_mul(u128::from(percent)) / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_is_estimate_with_fallback() {
        assert_eq!(
            GasLimit::default(),
            GasLimit::Estimated {
                multiplier_percent: 150,
                fallback: 300_000
            }
        );
    }

    #[test]
    fn margin_is_one_and_a_half_times_the_estimate() {
        assert_eq!(GasLimit::with_margin(100_000, 150), 150_000);
        assert_eq!(GasLimit::with_margin(21_001, 150), 31_501);
        assert_eq!(GasLimit::with_margin(u64::MAX, 150), u64::MAX);
    }

    #[test]
    fn scaled_gas_price() {
        assert_eq!(GasPrice::scale(1_000_000_000, 110), 1_100_000_000);
        assert_eq!(GasPrice::scale(u128::MAX, 200), u128::MAX / 100);
    }
}
