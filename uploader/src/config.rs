// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use clap::{Args, ValueEnum};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use uploader_evm::common::{format_ether, parse_ether, Amount, EthereumWallet};
use uploader_evm::wallet::{from_private_key, wallet_address};

pub use uploader_evm::retry::DEFAULT_RETRY_BACKOFF_MS;
use uploader_evm::{
    CallEncoding, GasLimit, GasPrice, Network, NetworkError, RetryPolicy, TransactionConfig, Wallet,
};

pub const DEFAULT_UPLOAD_COUNT: u32 = 10;
pub const DEFAULT_UPLOAD_DELAY_MS: u64 = 5000;
pub const DEFAULT_STORAGE_FEE: &str = "0.000839233398436224";
pub const DEFAULT_IMAGE_URL: &str = "https://picsum.photos/800/600";
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid {name} {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("Invalid PRIVATE_KEY: {0}")]
    PrivateKey(#[from] uploader_evm::wallet::Error),
}

/// Which root goes into the on-chain record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RootSource {
    /// The Keccak root of the uploaded payload.
    #[default]
    Content,
    /// A fresh random 32 byte value per upload.
    Random,
}

/// How payloads reach the storage network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SubmissionMode {
    /// POST the payload as a single segment to the indexer.
    #[default]
    Segment,
    /// Write the payload to a temporary file and hand it to the file uploader.
    File,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PreflightPolicy {
    /// Abort before the first upload if the chain is unreachable or the fee is not covered.
    #[default]
    Enforce,
    Skip,
}

/// Upload settings as given on the command line, in the environment or in a `.env` file.
///
/// Convert it into an [`UploaderConfig`] with `TryFrom` to validate it.
#[derive(Args, Clone, Debug)]
pub struct UploadArgs {
    /// Private key of the account paying for the records.
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
    /// HTTP RPC endpoint of the chain.
    #[clap(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,
    /// Base URL of the storage indexer.
    #[clap(long, env = "INDEXER_URL")]
    pub indexer_url: Option<String>,
    /// Address of the flow contract the uploads are recorded on.
    #[clap(long, env = "FLOW_CONTRACT_ADDRESS")]
    pub flow_contract_address: Option<String>,
    /// Number of uploads in the batch.
    #[clap(long, env = "UPLOAD_COUNT", default_value_t = DEFAULT_UPLOAD_COUNT)]
    pub upload_count: u32,
    /// Pause between two uploads, in milliseconds.
    #[clap(long, env = "UPLOAD_DELAY_MS", default_value_t = DEFAULT_UPLOAD_DELAY_MS)]
    pub upload_delay_ms: u64,
    /// Block explorer base URL, used to print transaction links.
    #[clap(long, env = "EXPLORER_URL")]
    pub explorer_url: Option<String>,
    /// Storage fee attached to every record, in ETH.
    #[clap(long, env = "STORAGE_FEE", default_value = DEFAULT_STORAGE_FEE)]
    pub storage_fee: String,
    /// Endpoint returning a random image.
    #[clap(long, env = "IMAGE_URL", default_value = DEFAULT_IMAGE_URL)]
    pub image_url: String,
    #[clap(long, env = "ROOT_SOURCE", value_enum, default_value_t = RootSource::Content)]
    pub root_source: RootSource,
    #[clap(long, env = "SUBMISSION_MODE", value_enum, default_value_t = SubmissionMode::Segment)]
    pub submission_mode: SubmissionMode,
    /// Encoding of the record call: `store` or `submit-template`.
    #[clap(long, env = "CALL_ENCODING", default_value_t = CallEncoding::Store)]
    pub call_encoding: CallEncoding,
    #[clap(long, env = "PREFLIGHT", value_enum, default_value_t = PreflightPolicy::Enforce)]
    pub preflight: PreflightPolicy,
    /// How long to wait for a receipt, in seconds. 0 waits without a bound.
    #[clap(
        long,
        env = "CONFIRMATION_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS
    )]
    pub confirmation_timeout_secs: u64,
    /// Retries on top of the first attempt, for both the storage and the transaction step.
    #[clap(long, env = "MAX_RETRIES", default_value_t = 0)]
    pub max_retries: u32,
    #[clap(long, env = "RETRY_BACKOFF_MS", default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,
    /// Directory for temporary payload files in file mode. Defaults to the system temp dir.
    #[clap(long, env = "SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,
    /// Timeout of the image and indexer HTTP requests, in seconds.
    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,
}

/// Validated, immutable configuration of a batch.
#[derive(Clone)]
pub struct UploaderConfig {
    signer: EthereumWallet,
    pub network: Network,
    pub indexer_url: Url,
    pub image_url: Url,
    pub explorer_url: Option<String>,
    pub upload_count: u32,
    pub upload_delay: Duration,
    pub storage_fee: Amount,
    pub root_source: RootSource,
    pub submission_mode: SubmissionMode,
    pub call_encoding: CallEncoding,
    pub preflight: PreflightPolicy,
    pub transaction_config: TransactionConfig,
    pub retry_policy: RetryPolicy,
    pub scratch_dir: PathBuf,
    pub http_timeout: Duration,
}

impl UploaderConfig {
    pub fn with_gas(mut self, gas_limit: GasLimit, gas_price: GasPrice) -> Self {
        self.transaction_config.gas_limit = gas_limit;
        self.transaction_config.gas_price = gas_price;
        self
    }

    /// The signing wallet, set up with this configuration's gas and retry policies.
    pub fn wallet(&self) -> Wallet {
        Wallet::new(self.network.clone(), self.signer.clone())
            .with_transaction_config(self.transaction_config.clone())
            .with_retry_policy(self.retry_policy)
    }

    /// `{EXPLORER_URL}/tx/{hash}` when an explorer is configured.
    pub fn explorer_tx_url(&self, tx_hash: impl std::fmt::Display) -> Option<String> {
        self.explorer_url
            .as_deref()
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }
}

impl std::fmt::Debug for UploaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploaderConfig")
            .field("signer", &wallet_address(&self.signer))
            .field("network", &self.network)
            .field("indexer_url", &self.indexer_url.as_str())
            .field("image_url", &self.image_url.as_str())
            .field("explorer_url", &self.explorer_url)
            .field("upload_count", &self.upload_count)
            .field("upload_delay", &self.upload_delay)
            .field("storage_fee", &format_ether(self.storage_fee))
            .field("root_source", &self.root_source)
            .field("submission_mode", &self.submission_mode)
            .field("call_encoding", &self.call_encoding)
            .field("preflight", &self.preflight)
            .field("transaction_config", &self.transaction_config)
            .field("retry_policy", &self.retry_policy)
            .field("scratch_dir", &self.scratch_dir)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl TryFrom<UploadArgs> for UploaderConfig {
    type Error = ConfigError;

    fn try_from(args: UploadArgs) -> Result<Self, Self::Error> {
        let required = [
            ("PRIVATE_KEY", &args.private_key),
            ("RPC_URL", &args.rpc_url),
            ("INDEXER_URL", &args.indexer_url),
            ("FLOW_CONTRACT_ADDRESS", &args.flow_contract_address),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let private_key = args.private_key.unwrap_or_default();
        let rpc_url = args.rpc_url.unwrap_or_default();
        let indexer_url = args.indexer_url.unwrap_or_default();
        let flow_contract_address = args.flow_contract_address.unwrap_or_default();

        let network = Network::parse(rpc_url.trim(), flow_contract_address.trim())?;
        let signer = from_private_key(&private_key)?;
        let indexer_url = parse_url("INDEXER_URL", &indexer_url)?;
        let image_url = parse_url("IMAGE_URL", &args.image_url)?;
        let explorer_url = args.explorer_url.filter(|url| !url.trim().is_empty());
        if let Some(explorer_url) = &explorer_url {
            let _ = parse_url("EXPLORER_URL", explorer_url)?;
        }

        if args.upload_count == 0 {
            return Err(ConfigError::Invalid {
                name: "UPLOAD_COUNT",
                value: "0".to_string(),
                reason: "at least one upload is needed".to_string(),
            });
        }

        let storage_fee =
            parse_ether(args.storage_fee.trim()).map_err(|err| ConfigError::Invalid {
                name: "STORAGE_FEE",
                value: args.storage_fee.clone(),
                reason: err.to_string(),
            })?;

        let confirmation_timeout = (args.confirmation_timeout_secs > 0)
            .then(|| Duration::from_secs(args.confirmation_timeout_secs));
        let transaction_config = TransactionConfig {
            confirmation_timeout,
            ..TransactionConfig::default()
        };

        Ok(Self {
            signer,
            network,
            indexer_url,
            image_url,
            explorer_url,
            upload_count: args.upload_count,
            upload_delay: Duration::from_millis(args.upload_delay_ms),
            storage_fee,
            root_source: args.root_source,
            submission_mode: args.submission_mode,
            call_encoding: args.call_encoding,
            preflight: args.preflight,
            transaction_config,
            retry_policy: RetryPolicy::with_retries(
                args.max_retries,
                Duration::from_millis(args.retry_backoff_ms),
            ),
            scratch_dir: args.scratch_dir.unwrap_or_else(std::env::temp_dir),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
        })
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::str::FromStr;
    use uploader_evm::common::{Address, U256};

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const FLOW: &str = "0xbd2c3f0e65edf5582141c35969d66e34629cc768";

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        upload: UploadArgs,
    }

    fn complete_args() -> UploadArgs {
        UploadArgs {
            private_key: Some(ANVIL_KEY.to_string()),
            rpc_url: Some("http://localhost:8545".to_string()),
            indexer_url: Some("http://localhost:12345".to_string()),
            flow_contract_address: Some(FLOW.to_string()),
            upload_count: DEFAULT_UPLOAD_COUNT,
            upload_delay_ms: DEFAULT_UPLOAD_DELAY_MS,
            explorer_url: None,
            storage_fee: DEFAULT_STORAGE_FEE.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            root_source: RootSource::Content,
            submission_mode: SubmissionMode::Segment,
            call_encoding: CallEncoding::Store,
            preflight: PreflightPolicy::Enforce,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            max_retries: 0,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            scratch_dir: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    #[test]
    fn complete_args_produce_defaults() -> color_eyre::Result<()> {
        let config = UploaderConfig::try_from(complete_args())?;

        assert_eq!(config.upload_count, 10);
        assert_eq!(config.upload_delay, Duration::from_millis(5000));
        assert_eq!(config.storage_fee, U256::from(839_233_398_436_224u64));
        assert_eq!(config.image_url.as_str(), "https://picsum.photos/800/600");
        assert_eq!(*config.network.flow_address(), Address::from_str(FLOW)?);
        assert_eq!(config.retry_policy.max_attempts, 1);
        assert_eq!(
            config.transaction_config.confirmation_timeout,
            Some(Duration::from_secs(120))
        );
        assert_eq!(config.root_source, RootSource::Content);
        assert_eq!(config.preflight, PreflightPolicy::Enforce);
        assert_eq!(
            config.wallet().address(),
            Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")?
        );
        Ok(())
    }

    #[test]
    fn all_missing_required_values_are_reported() {
        let args = UploadArgs {
            private_key: None,
            rpc_url: Some("  ".to_string()),
            flow_contract_address: None,
            ..complete_args()
        };

        match UploaderConfig::try_from(args) {
            Err(ConfigError::Missing(missing)) => {
                assert_eq!(missing, vec!["PRIVATE_KEY", "RPC_URL", "FLOW_CONTRACT_ADDRESS"]);
            }
            other => panic!("expected missing configuration, got {other:?}"),
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_fee = UploadArgs {
            storage_fee: "a lot".to_string(),
            ..complete_args()
        };
        assert!(matches!(
            UploaderConfig::try_from(bad_fee),
            Err(ConfigError::Invalid {
                name: "STORAGE_FEE",
                ..
            })
        ));

        let bad_key = UploadArgs {
            private_key: Some("0x1234".to_string()),
            ..complete_args()
        };
        assert!(matches!(
            UploaderConfig::try_from(bad_key),
            Err(ConfigError::PrivateKey(_))
        ));

        let bad_address = UploadArgs {
            flow_contract_address: Some("0xnope".to_string()),
            ..complete_args()
        };
        assert!(matches!(
            UploaderConfig::try_from(bad_address),
            Err(ConfigError::Network(NetworkError::InvalidFlowAddress(_)))
        ));

        let no_uploads = UploadArgs {
            upload_count: 0,
            ..complete_args()
        };
        assert!(UploaderConfig::try_from(no_uploads).is_err());
    }

    #[test]
    fn zero_confirmation_timeout_is_unbounded() -> color_eyre::Result<()> {
        let args = UploadArgs {
            confirmation_timeout_secs: 0,
            max_retries: 2,
            ..complete_args()
        };
        let config = UploaderConfig::try_from(args)?;
        assert_eq!(config.transaction_config.confirmation_timeout, None);
        assert_eq!(config.retry_policy.max_attempts, 3);
        Ok(())
    }

    #[test]
    fn explorer_links() -> color_eyre::Result<()> {
        let args = UploadArgs {
            explorer_url: Some("https://chainscan.example/".to_string()),
            ..complete_args()
        };
        let config = UploaderConfig::try_from(args)?;
        assert_eq!(
            config.explorer_tx_url("0xabc").as_deref(),
            Some("https://chainscan.example/tx/0xabc")
        );

        let config = UploaderConfig::try_from(complete_args())?;
        assert_eq!(config.explorer_tx_url("0xabc"), None);
        Ok(())
    }

    #[test]
    fn empty_explorer_url_means_no_explorer() -> color_eyre::Result<()> {
        for empty in ["", "   "] {
            let args = UploadArgs {
                explorer_url: Some(empty.to_string()),
                ..complete_args()
            };
            let config = UploaderConfig::try_from(args)?;
            assert_eq!(config.explorer_url, None);
            assert_eq!(config.explorer_tx_url("0xabc"), None);
        }

        let args = UploadArgs {
            explorer_url: Some("not a url".to_string()),
            ..complete_args()
        };
        assert!(matches!(
            UploaderConfig::try_from(args),
            Err(ConfigError::Invalid {
                name: "EXPLORER_URL",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn flags_override_everything() -> color_eyre::Result<()> {
        let cli = TestCli::try_parse_from([
            "uploader",
            "--private-key",
            ANVIL_KEY,
            "--rpc-url",
            "http://localhost:8545",
            "--indexer-url",
            "http://localhost:12345",
            "--flow-contract-address",
            FLOW,
            "--upload-count",
            "3",
            "--root-source",
            "random",
            "--submission-mode",
            "file",
            "--call-encoding",
            "submit-template",
            "--preflight",
            "skip",
        ])?;

        let config = UploaderConfig::try_from(cli.upload)?;
        assert_eq!(config.upload_count, 3);
        assert_eq!(config.root_source, RootSource::Random);
        assert_eq!(config.submission_mode, SubmissionMode::File);
        assert_eq!(config.call_encoding, CallEncoding::SubmitTemplate);
        assert_eq!(config.preflight, PreflightPolicy::Skip);
        Ok(())
    }
}
