// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Upload a batch of random images to a storage network and record each one on chain.
//!
//! Every upload goes through the same three steps, strictly one upload after the other:
//! 1. fetch a payload from an [`image::ImageSource`];
//! 2. hand it to a [`storage::StorageSubmitter`], which roots it and stores it through the
//!    indexer, either as a single segment or through a temporary file;
//! 3. record the root with a [`record::RecordSubmitter`] and wait for the receipt.
//!
//! ```no_run
//! # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! use clap::Parser;
//! use uploader::{BatchRunner, UploadArgs, UploaderConfig};
//!
//! #[derive(Parser)]
//! struct Opt {
//!     #[command(flatten)]
//!     upload: UploadArgs,
//! }
//!
//! let config = UploaderConfig::try_from(Opt::parse().upload)?;
//! let summary = BatchRunner::from_config(&config)?.run().await?;
//! println!("{} of {} uploads succeeded", summary.succeeded, summary.attempted);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod config;
pub mod image;
pub mod payload;
pub mod record;
pub mod runner;
pub mod storage;

pub use config::{
    ConfigError, PreflightPolicy, RootSource, SubmissionMode, UploadArgs, UploaderConfig,
};
pub use payload::{ContentIdentifier, Payload};
pub use runner::{
    AttemptOutcome, BatchConfig, BatchEvent, BatchRunner, BatchSummary, RunnerError, Stage,
};

// Re-export the chain side so callers need a single dependency.
pub use uploader_evm;
