// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use colored::Colorize;
use indicatif::ProgressBar;
use std::time::Duration;
use tokio::sync::mpsc;
use uploader::{BatchEvent, BatchSummary, UploaderConfig};
use uploader_evm::common::format_ether;

/// Prints batch events as they come in, until the runner drops its end of the channel.
pub(crate) async fn render_events(
    mut event_receiver: mpsc::Receiver<BatchEvent>,
    config: UploaderConfig,
    quiet: bool,
) {
    let mut printer = ProgressPrinter::new(config, quiet);
    while let Some(event) = event_receiver.recv().await {
        printer.handle(&event);
    }
    printer.clear_spinner();
}

pub(crate) fn print_summary(summary: &BatchSummary) {
    let line = summary_line(summary);
    if summary.failed == 0 {
        println!("{}", line.green().bold());
    } else if summary.succeeded == 0 {
        println!("{}", line.red().bold());
    } else {
        println!("{}", line.yellow().bold());
    }
}

fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "Batch complete: {} attempted, {} succeeded, {} failed",
        summary.attempted, summary.succeeded, summary.failed
    )
}

struct ProgressPrinter {
    config: UploaderConfig,
    quiet: bool,
    spinner: Option<ProgressBar>,
}

impl ProgressPrinter {
    fn new(config: UploaderConfig, quiet: bool) -> Self {
        Self {
            config,
            quiet,
            spinner: None,
        }
    }

    fn handle(&mut self, event: &BatchEvent) {
        self.clear_spinner();

        let failure = matches!(event, BatchEvent::IterationFailed { .. });
        if self.quiet && !failure {
            return;
        }

        for line in self.lines(event) {
            println!("{line}");
        }

        if let BatchEvent::SubmittingRecord { iteration, .. } = event {
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message(format!(
                "Waiting for the record of upload {iteration} to confirm..."
            ));
            self.spinner = Some(spinner);
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn lines(&self, event: &BatchEvent) -> Vec<String> {
        match event {
            BatchEvent::Preflight(report) => vec![format!(
                "{} Chain {} reachable, {} holds {} ETH, storage fee is {} ETH",
                "✓".green(),
                report.chain_id,
                report.address,
                format_ether(report.balance),
                format_ether(report.fee)
            )],
            BatchEvent::IterationStarted { iteration, total } => {
                vec![format!("[{iteration}/{total}] Fetching image").bold().to_string()]
            }
            BatchEvent::PayloadFetched { size, .. } => vec![format!("  Fetched {size} bytes")],
            BatchEvent::Stored { stored, .. } => {
                let mut line = format!("  Stored {} ({} bytes)", stored.root, stored.data_size);
                if let Some(handle) = &stored.handle {
                    line.push_str(&format!(", handle {handle}"));
                }
                vec![line]
            }
            BatchEvent::SurrogateRoot {
                content, surrogate, ..
            } => vec![format!("  Recording random root {surrogate} instead of {content}")
                .yellow()
                .to_string()],
            BatchEvent::SubmittingRecord { root, .. } => {
                vec![format!("  Submitting record for {root}")]
            }
            BatchEvent::RecordConfirmed { receipt, .. } => {
                let block = receipt.block_number.map_or_else(
                    || "an unknown block".to_string(),
                    |block| format!("block {block}"),
                );
                let mut lines = vec![format!(
                    "{} Confirmed in {block}, tx {}",
                    "✓".green(),
                    receipt.tx_hash
                )];
                if let Some(url) = self.config.explorer_tx_url(receipt.tx_hash) {
                    lines.push(format!("  {}", url.underline()));
                }
                lines
            }
            BatchEvent::IterationFailed {
                iteration,
                stage,
                error,
            } => vec![format!(
                "{} Upload {iteration} failed at {stage}: {error}",
                "✕".red()
            )],
            BatchEvent::Waiting { delay, .. } => {
                vec![format!("  Waiting {} ms", delay.as_millis())
                    .dimmed()
                    .to_string()]
            }
            BatchEvent::Finished(_) => vec![],
        }
    }
}
