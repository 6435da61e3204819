// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod appender;
mod error;
pub mod layers;

use crate::error::Result;
use layers::TracingLayers;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use tracing_core::dispatcher::DefaultGuard;
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

pub use error::Error;
pub use layers::{get_logging_targets, LOG_ENV_VAR};
pub use tracing_appender::non_blocking::WorkerGuard;

// re-exporting the tracing crate's Level as it is used in our public API
pub use tracing_core::Level;

/// Directory under the platform data dir that holds everything the uploader writes.
const DATA_DIR_NAME: &str = "batch-uploader";

/// `<parent>/log_<local timestamp>[_<label>]`, so that every run gets its own directory.
fn timestamped_log_dir(parent: &Path, label: Option<&str>) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    match label {
        Some(label) => parent.join(format!("log_{timestamp}_{label}")),
        None => parent.join(format!("log_{timestamp}")),
    }
}

/// Where log lines end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutputDest {
    Stderr,
    Stdout,
    /// A directory of daily rolling log files. Created on initialisation if missing.
    Path(PathBuf),
}

impl LogOutputDest {
    /// `stderr`, `stdout`, `data-dir`, or any other value as a directory path.
    pub fn parse_from_str(val: &str) -> Result<Self> {
        val.parse()
    }

    fn data_dir() -> Result<Self> {
        let data_dir = dirs_next::data_dir().ok_or_else(|| {
            Error::LoggingConfiguration("could not obtain data directory path".to_string())
        })?;
        let logs = data_dir.join(DATA_DIR_NAME).join("logs");
        Ok(LogOutputDest::Path(timestamped_log_dir(&logs, None)))
    }
}

impl FromStr for LogOutputDest {
    type Err = Error;

    fn from_str(val: &str) -> Result<Self> {
        match val {
            "stderr" => Ok(LogOutputDest::Stderr),
            "stdout" => Ok(LogOutputDest::Stdout),
            "data-dir" => Self::data_dir(),
            path => Ok(LogOutputDest::Path(PathBuf::from(path))),
        }
    }
}

impl std::fmt::Display for LogOutputDest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LogOutputDest::Stderr => f.write_str("stderr"),
            LogOutputDest::Stdout => f.write_str("stdout"),
            LogOutputDest::Path(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    /// One human readable line per event.
    #[default]
    Default,
    /// One flattened JSON object per event.
    Json,
}

impl LogFormat {
    pub fn parse_from_str(val: &str) -> Result<Self> {
        val.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Default => "default",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(val: &str) -> Result<Self> {
        [LogFormat::Default, LogFormat::Json]
            .into_iter()
            .find(|format| format.as_str() == val)
            .ok_or_else(|| {
                Error::LoggingConfiguration(format!(
                    "Unknown log format {val:?}, expected \"default\" or \"json\""
                ))
            })
    }
}

/// Sets up the global `tracing` subscriber of the uploader binaries.
///
/// ```no_run
/// use uploader_logging::{Level, LogBuilder, LogOutputDest};
///
/// let mut log_builder = LogBuilder::new(vec![("uploader".to_string(), Level::INFO)]);
/// log_builder.output_dest(LogOutputDest::Stderr);
/// // Keep the guard alive, dropping it stops the background writer.
/// let _guard = log_builder.initialize();
/// ```
pub struct LogBuilder {
    default_logging_targets: Vec<(String, Level)>,
    output_dest: LogOutputDest,
    format: LogFormat,
    max_log_files: Option<usize>,
    print_updates_to_stdout: bool,
}

impl LogBuilder {
    /// `default_logging_targets` apply unless `UPLOADER_LOG` is set. Output goes to stderr in
    /// the default format until told otherwise.
    pub fn new(default_logging_targets: Vec<(String, Level)>) -> Self {
        Self {
            default_logging_targets,
            output_dest: LogOutputDest::Stderr,
            format: LogFormat::Default,
            max_log_files: None,
            print_updates_to_stdout: true,
        }
    }

    pub fn output_dest(&mut self, output_dest: LogOutputDest) {
        self.output_dest = output_dest;
    }

    pub fn format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Rolled files beyond this count are deleted. Only applies to a directory destination.
    pub fn max_log_files(&mut self, files: usize) {
        self.max_log_files = Some(files);
    }

    /// Whether to announce the chosen destination on stdout.
    pub fn print_updates_to_stdout(&mut self, print: bool) {
        self.print_updates_to_stdout = print;
    }

    /// Install the global subscriber. Hold on to the returned guard until the program exits,
    /// buffered lines are flushed when it drops.
    pub fn initialize(self) -> Result<Option<WorkerGuard>> {
        let targets = layers::resolve_logging_targets(self.default_logging_targets)?;

        let mut layers = TracingLayers::default();
        layers.fmt_layer(
            targets,
            &self.output_dest,
            self.format,
            self.max_log_files,
            self.print_updates_to_stdout,
        )?;

        if let Err(err) = tracing_subscriber::registry().with(layers.layers).try_init() {
            eprintln!("A global tracing subscriber is already set, keeping it: {err}");
        }

        Ok(layers.log_appender_guard)
    }

    /// Per-test logging at TRACE into `<data dir>/batch-uploader/tests/logs`, or stdout when
    /// there is no data dir.
    ///
    /// The subscriber is only the default of the calling thread and lives as long as the
    /// returned `DefaultGuard`, so call it from a current-thread runtime.
    pub fn init_single_threaded_tokio_test() -> (Option<WorkerGuard>, DefaultGuard) {
        let test_name = std::thread::current()
            .name()
            .unwrap_or("unknown_test")
            .to_string();

        let layers = Self::test_layers(&test_name);
        let log_guard = tracing_subscriber::registry()
            .with(layers.layers)
            .set_default();

        info!("Running test: {test_name}");
        (layers.log_appender_guard, log_guard)
    }

    /// Module path of the test, e.g. `uploader::runner::tests::some_test` gives `uploader`.
    fn extract_test_crate_name(test_name: &str) -> Option<String> {
        let mut parts = test_name.split("::");
        let first = parts.next()?;
        parts.next().map(|_| first.to_string())
    }

    fn test_layers(test_name: &str) -> TracingLayers {
        let mut targets: Vec<(String, Level)> = layers::ALL_UPLOADER_CRATES
            .iter()
            .map(|krate| (krate.to_string(), Level::TRACE))
            .collect();
        if let Some(test_crate) = Self::extract_test_crate_name(test_name) {
            targets.push((test_crate, Level::TRACE));
        }

        let output_dest = dirs_next::data_dir()
            .map(|dir| {
                let label = test_name.replace("::", "_").replace(' ', "_");
                let logs = dir.join(DATA_DIR_NAME).join("tests").join("logs");
                LogOutputDest::Path(timestamped_log_dir(&logs, Some(&label)))
            })
            .unwrap_or(LogOutputDest::Stdout);

        let mut layers = TracingLayers::default();
        if let Err(err) = layers.fmt_layer(targets, &output_dest, LogFormat::Default, None, false) {
            eprintln!("Test logging to {output_dest} is unavailable: {err}");
        }
        layers
    }
}
