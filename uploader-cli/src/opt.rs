// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::args::gas::{GasLimitParam, GasPriceParam};
use clap::Parser;
use uploader::UploadArgs;
use uploader_logging::{LogFormat, LogOutputDest};

// Please do not remove the blank lines in these doc comments.
// They are used for inserting line breaks when the help menu is rendered in the UI.

/// Upload a batch of random images to the storage network and record each upload on chain.
///
/// Every setting can also come from the environment or from a `.env` file in the working
/// directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Opt {
    #[command(flatten)]
    pub upload: UploadArgs,

    /// Gas limit of the record transactions.
    ///
    /// Valid values are:
    ///  - auto: let the node fill it in
    ///  - estimate: the node's estimate plus 50% (default)
    ///  - estimate:<PERCENT>: the node's estimate scaled by PERCENT
    ///  - <UNITS>: a fixed limit
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, env = "GAS_LIMIT", verbatim_doc_comment)]
    pub gas_limit: Option<GasLimitParam>,

    /// Gas limit used when the estimate fails. Defaults to 300000.
    #[clap(long, env = "GAS_FALLBACK_LIMIT")]
    pub gas_fallback_limit: Option<u64>,

    /// Gas price of the record transactions.
    ///
    /// Valid values are:
    ///  - auto: the market price (default)
    ///  - market:<PERCENT>: the market price scaled by PERCENT
    ///  - <WEI>: a custom price in wei
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, env = "GAS_PRICE", verbatim_doc_comment)]
    pub gas_price: Option<GasPriceParam>,

    /// Specify the logging format.
    ///
    /// Valid values are "default" or "json".
    ///
    /// If the argument is not used, the default format will be applied.
    #[clap(long, value_parser = LogFormat::parse_from_str, verbatim_doc_comment)]
    pub log_format: Option<LogFormat>,

    /// Specify the logging output destination.
    ///
    /// Valid values are "stderr", "stdout", "data-dir", or a custom path.
    ///
    /// `stderr` is the default value.
    ///
    /// The data directory location is platform specific:
    ///  - Linux: $HOME/.local/share/batch-uploader/logs
    ///  - macOS: $HOME/Library/Application Support/batch-uploader/logs
    ///  - Windows: C:\Users\<username>\AppData\Roaming\batch-uploader\logs
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(
        long,
        value_parser = LogOutputDest::parse_from_str,
        verbatim_doc_comment,
        default_value = "stderr"
    )]
    pub log_output_dest: LogOutputDest,

    /// Number of rotated log files to keep when logging to a directory.
    ///
    /// Older files are deleted. Keeps every file when not set.
    #[clap(long, verbatim_doc_comment)]
    pub max_log_files: Option<usize>,

    /// Do not print the per-upload progress lines, only the final summary.
    #[clap(long, short = 'q')]
    pub quiet: bool,
}
