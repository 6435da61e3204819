// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

mod args;
mod exit_code;
mod opt;
mod progress;

use crate::args::gas::{get_gas_limit_from_opt_param, get_gas_price_from_opt_param};
use crate::exit_code::ExitCodeError;
use crate::opt::Opt;
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::Level;
use uploader::{BatchRunner, BatchSummary, UploaderConfig};
use uploader_logging::{LogBuilder, LogFormat, WorkerGuard};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Must happen before parsing, so the `env` fallbacks of the options see the file.
    let dotenv = dotenvy::dotenv();

    let opt = Opt::parse();
    let log_guard = init_logging(&opt)?;

    match dotenv {
        Ok(path) => info!("Loaded environment from {path:?}"),
        Err(err) if err.not_found() => debug!("No .env file found"),
        Err(err) => warn!("Failed to load the .env file: {err}"),
    }

    let result = run(opt).await;
    if let Err((err, _)) = &result {
        error!("Batch upload aborted: {err}");
    }

    // `process::exit` skips destructors, so flush the non-blocking writer first.
    drop(log_guard);

    if let Err((err, exit_code)) = result {
        eprintln!("{err:?}");
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(opt: Opt) -> Result<BatchSummary, ExitCodeError> {
    let gas_limit = get_gas_limit_from_opt_param(opt.gas_limit, opt.gas_fallback_limit);
    let gas_price = get_gas_price_from_opt_param(opt.gas_price);

    let config = UploaderConfig::try_from(opt.upload)
        .map_err(exit_code::config_error)?
        .with_gas(gas_limit, gas_price);
    info!("Starting batch upload with {config:?}");

    let mut runner = BatchRunner::from_config(&config).map_err(exit_code::runner_error)?;
    let event_receiver = runner.enable_events();
    let printer = tokio::spawn(progress::render_events(
        event_receiver,
        config.clone(),
        opt.quiet,
    ));

    println!(
        "Uploading {} images to {} and recording them on {}",
        config.upload_count,
        config.indexer_url,
        config.network
    );
    let result = runner.run().await;

    // Closes the event channel, so the printer can drain it and stop.
    drop(runner);
    if let Err(err) = printer.await {
        warn!("Progress printer stopped unexpectedly: {err}");
    }

    let summary = result.map_err(exit_code::runner_error)?;
    progress::print_summary(&summary);
    Ok(summary)
}

fn init_logging(opt: &Opt) -> Result<Option<WorkerGuard>> {
    let logging_targets = vec![
        ("uploader".to_string(), Level::INFO),
        ("uploader_cli".to_string(), Level::INFO),
        ("uploader_evm".to_string(), Level::INFO),
        ("uploader_logging".to_string(), Level::INFO),
    ];
    let mut log_builder = LogBuilder::new(logging_targets);
    log_builder.output_dest(opt.log_output_dest.clone());
    log_builder.format(opt.log_format.unwrap_or(LogFormat::Default));
    if let Some(files) = opt.max_log_files {
        log_builder.max_log_files(files);
    }
    log_builder.print_updates_to_stdout(!opt.quiet);
    let guard = log_builder.initialize()?;
    Ok(guard)
}
