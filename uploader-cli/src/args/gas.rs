// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use uploader_evm::transaction_config::{
    DEFAULT_FALLBACK_GAS_LIMIT, DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT,
};
use uploader_evm::{GasLimit, GasPrice};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GasLimitParam {
    Auto,
    Estimate(u64),
    Fixed(u64),
}

impl std::str::FromStr for GasLimitParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();

        match s.as_str() {
            "auto" => Ok(GasLimitParam::Auto),
            "estimate" => Ok(GasLimitParam::Estimate(
                DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT,
            )),
            _ => {
                if let Some(rest) = s.strip_prefix("estimate:") {
                    parse_percent(rest).map(GasLimitParam::Estimate)
                } else {
                    match s.parse::<u64>() {
                        Ok(0) | Err(_) => Err(format!("Invalid gas limit: {s}")),
                        Ok(units) => Ok(GasLimitParam::Fixed(units)),
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for GasLimitParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Estimate(percent) => write!(f, "estimate:{percent}"),
            Self::Fixed(units) => write!(f, "{units}"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GasPriceParam {
    Auto,
    Market(u64),
    Custom(u128),
}

impl std::str::FromStr for GasPriceParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();

        match s.as_str() {
            "auto" => Ok(GasPriceParam::Auto),
            _ => {
                if let Some(rest) = s.strip_prefix("market:") {
                    parse_percent(rest).map(GasPriceParam::Market)
                } else {
                    s.parse::<u128>()
                        .map(GasPriceParam::Custom)
                        .map_err(|_| format!("Invalid gas price: {s}"))
                }
            }
        }
    }
}

impl std::fmt::Display for GasPriceParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Market(percent) => write!(f, "market:{percent}"),
            Self::Custom(wei) => write!(f, "{wei}"),
        }
    }
}

fn parse_percent(value: &str) -> Result<u64, String> {
    match value.trim_end_matches('%').parse::<u64>() {
        Ok(0) | Err(_) => Err(format!("Invalid percentage: {value}")),
        Ok(percent) => Ok(percent),
    }
}

/// Gas limit policy. Without a param the estimate is used with its default margin.
pub fn get_gas_limit_from_opt_param(
    param: Option<GasLimitParam>,
    fallback_limit: Option<u64>,
) -> GasLimit {
    let fallback = fallback_limit.unwrap_or(DEFAULT_FALLBACK_GAS_LIMIT);

    match param.unwrap_or(GasLimitParam::Estimate(DEFAULT_GAS_ESTIMATE_MULTIPLIER_PERCENT)) {
        GasLimitParam::Auto => GasLimit::Auto,
        GasLimitParam::Estimate(multiplier_percent) => GasLimit::Estimated {
            multiplier_percent,
            fallback,
        },
        GasLimitParam::Fixed(units) => GasLimit::Fixed(units),
    }
}

pub fn get_gas_price_from_opt_param(param: Option<GasPriceParam>) -> GasPrice {
    match param.unwrap_or(GasPriceParam::Auto) {
        GasPriceParam::Auto => GasPrice::Auto,
        GasPriceParam::Market(percent) => GasPrice::Scaled { percent },
        GasPriceParam::Custom(wei) => GasPrice::Custom(wei),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_gas_limit() {
        assert_eq!("auto".parse(), Ok(GasLimitParam::Auto));
        assert_eq!("Estimate".parse(), Ok(GasLimitParam::Estimate(150)));
        assert_eq!("estimate:120".parse(), Ok(GasLimitParam::Estimate(120)));
        assert_eq!("estimate:200%".parse(), Ok(GasLimitParam::Estimate(200)));
        assert_eq!("500000".parse(), Ok(GasLimitParam::Fixed(500_000)));

        assert!("0".parse::<GasLimitParam>().is_err());
        assert!("estimate:".parse::<GasLimitParam>().is_err());
        assert!("lots".parse::<GasLimitParam>().is_err());
    }

    #[test]
    fn parse_gas_price() {
        assert_eq!("auto".parse(), Ok(GasPriceParam::Auto));
        assert_eq!("market:110".parse(), Ok(GasPriceParam::Market(110)));
        assert_eq!(
            "2000000000".parse(),
            Ok(GasPriceParam::Custom(2_000_000_000))
        );

        assert!("market:0".parse::<GasPriceParam>().is_err());
        assert!("cheap".parse::<GasPriceParam>().is_err());
    }

    #[test]
    fn gas_limit_defaults_to_estimate_with_fallback() {
        assert_eq!(get_gas_limit_from_opt_param(None, None), GasLimit::default());
        assert_eq!(
            get_gas_limit_from_opt_param(Some(GasLimitParam::Estimate(120)), Some(250_000)),
            GasLimit::Estimated {
                multiplier_percent: 120,
                fallback: 250_000
            }
        );
        assert_eq!(
            get_gas_limit_from_opt_param(Some(GasLimitParam::Fixed(90_000)), Some(250_000)),
            GasLimit::Fixed(90_000)
        );
    }

    #[test]
    fn gas_price_defaults_to_auto() {
        assert_eq!(get_gas_price_from_opt_param(None), GasPrice::Auto);
        assert_eq!(
            get_gas_price_from_opt_param(Some(GasPriceParam::Market(110))),
            GasPrice::Scaled { percent: 110 }
        );
    }

    #[test]
    fn params_display_as_they_parse() {
        for input in ["auto", "estimate:150", "42000"] {
            let param: GasLimitParam = input.parse().expect("valid gas limit");
            assert_eq!(param.to_string(), input);
        }
        for input in ["auto", "market:110", "1000"] {
            let param: GasPriceParam = input.parse().expect("valid gas price");
            assert_eq!(param.to_string(), input);
        }
    }
}
