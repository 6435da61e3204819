// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::error::Result;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const LOG_FILE_PREFIX: &str = "batch_uploader";
const LOG_FILE_SUFFIX: &str = "log";

/// Daily rolling appender in `dir`, keeping at most `max_log_files` files when set.
pub(crate) fn file_rotater(
    dir: &Path,
    max_log_files: Option<usize>,
) -> Result<RollingFileAppender> {
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX);

    if let Some(max_log_files) = max_log_files {
        builder = builder.max_log_files(max_log_files);
    }

    Ok(builder.build(dir)?)
}
