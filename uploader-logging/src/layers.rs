// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::appender;
use crate::error::{Error, Result};
use crate::{LogFormat, LogOutputDest};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::{Event, Level, Subscriber};
use tracing_subscriber::{
    filter::Targets,
    fmt::{
        self as tracing_fmt,
        format::Writer,
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
    Layer, Registry,
};

/// Environment variable overriding the default logging targets.
pub const LOG_ENV_VAR: &str = "UPLOADER_LOG";

/// Crates a bare level in `UPLOADER_LOG` applies to.
pub(crate) const ALL_UPLOADER_CRATES: &[&str] = &[
    "uploader",
    "uploader_cli",
    "uploader_evm",
    "uploader_logging",
];

pub(crate) type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Default)]
pub(crate) struct TracingLayers {
    pub(crate) layers: Vec<BoxedLayer>,
    pub(crate) log_appender_guard: Option<WorkerGuard>,
}

impl TracingLayers {
    pub(crate) fn fmt_layer(
        &mut self,
        targets: Vec<(String, Level)>,
        output_dest: &LogOutputDest,
        format: LogFormat,
        max_log_files: Option<usize>,
        print_updates_to_stdout: bool,
    ) -> Result<()> {
        let (writer, guard) = match output_dest {
            LogOutputDest::Stdout => {
                if print_updates_to_stdout {
                    println!("Logging to stdout");
                }
                tracing_appender::non_blocking(std::io::stdout())
            }
            LogOutputDest::Stderr => tracing_appender::non_blocking(std::io::stderr()),
            LogOutputDest::Path(path) => {
                std::fs::create_dir_all(path)?;
                if print_updates_to_stdout {
                    println!("Logging to directory: {path:?}");
                }
                let file_appender = appender::file_rotater(path, max_log_files)?;
                tracing_appender::non_blocking(file_appender)
            }
        };

        let layer: BoxedLayer = match format {
            LogFormat::Json => tracing_fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(writer)
                .boxed(),
            LogFormat::Default => tracing_fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .event_format(LogFormatter)
                .with_writer(writer)
                .boxed(),
        };

        let target_filters = Targets::new().with_targets(targets);
        self.layers.push(layer.with_filter(target_filters).boxed());
        self.log_appender_guard = Some(guard);
        Ok(())
    }
}

/// `[timestamp LEVEL module line/span/span] message`
#[derive(Default)]
pub struct LogFormatter;

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();
        let module = event.metadata().module_path().unwrap_or("<unknown module>");
        let lno = event.metadata().line().unwrap_or(0);

        write!(writer, "[")?;
        SystemTime.format_time(&mut writer)?;
        write!(writer, " {level} {module} {lno}")?;
        ctx.visit_spans(|span| write!(writer, "/{}", span.name()))?;
        write!(writer, "] ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Targets from the `UPLOADER_LOG` variable if set, otherwise the provided defaults.
pub(crate) fn resolve_logging_targets(
    default_logging_targets: Vec<(String, Level)>,
) -> Result<Vec<(String, Level)>> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(value) => get_logging_targets(&value),
        Err(_) => Ok(default_logging_targets),
    }
}

/// Parse `target=LEVEL` pairs separated by commas. A bare level applies to every uploader
/// crate and `all` is shorthand for `TRACE`. Later entries win.
pub fn get_logging_targets(logging_env_value: &str) -> Result<Vec<(String, Level)>> {
    let mut targets = BTreeMap::new();

    for entry in logging_env_value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
    {
        match entry.split_once('=') {
            Some((target, level)) => {
                let _ = targets.insert(target.trim().to_string(), parse_level(level)?);
            }
            None => {
                let level = if entry.eq_ignore_ascii_case("all") {
                    Level::TRACE
                } else {
                    parse_level(entry)?
                };
                for krate in ALL_UPLOADER_CRATES {
                    let _ = targets.insert((*krate).to_string(), level);
                }
            }
        }
    }

    if targets.is_empty() {
        return Err(Error::LoggingConfiguration(format!(
            "{LOG_ENV_VAR} is set but contains no targets"
        )));
    }

    Ok(targets.into_iter().collect())
}

fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| Error::InvalidLogLevel(level.to_string()))
}
