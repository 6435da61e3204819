// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::config::{PreflightPolicy, RootSource, SubmissionMode, UploaderConfig};
use crate::image::{FetchError, HttpImageSource, ImageSource};
use crate::payload::ContentIdentifier;
use crate::record::{ChainRecorder, PreflightReport, RecordError, RecordSubmitter};
use crate::storage::{
    FileSubmitter, IndexerClient, IndexerFileUploader, SegmentSubmitter, StorageError,
    StorageSubmitter, StoredPayload,
};
use std::time::Duration;
use tokio::sync::mpsc;
use uploader_evm::common::{Root, TxHash};
use uploader_evm::contract::flow::handler::RecordReceipt;
use uploader_evm::utils::dummy_hash;

/// Number of batch events buffered before new ones are dropped.
const BATCH_EVENT_CHANNEL_SIZE: usize = 100;

/// The part of the configuration that drives the loop itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    pub upload_count: u32,
    pub upload_delay: Duration,
    pub root_source: RootSource,
    pub preflight: PreflightPolicy,
}

impl From<&UploaderConfig> for BatchConfig {
    fn from(config: &UploaderConfig) -> Self {
        Self {
            upload_count: config.upload_count,
            upload_delay: config.upload_delay,
            root_source: config.root_source,
            preflight: config.preflight,
        }
    }
}

/// The step of an iteration that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Store,
    Record,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Stage::Fetch => "fetch",
            Stage::Store => "store",
            Stage::Record => "record",
        };
        write!(f, "{stage}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success {
        iteration: u32,
        root: ContentIdentifier,
        /// The root written on chain. Differs from `root` only with a random root source.
        recorded_root: Root,
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
    Failure {
        iteration: u32,
        stage: Stage,
        error: String,
    },
}

impl AttemptOutcome {
    pub fn iteration(&self) -> u32 {
        match self {
            AttemptOutcome::Success { iteration, .. }
            | AttemptOutcome::Failure { iteration, .. } => *iteration,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub outcomes: Vec<AttemptOutcome>,
}

impl BatchSummary {
    fn push(&mut self, outcome: AttemptOutcome) {
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Progress of a batch, as streamed to an observer.
#[derive(Clone, Debug)]
pub enum BatchEvent {
    Preflight(PreflightReport),
    IterationStarted { iteration: u32, total: u32 },
    PayloadFetched { iteration: u32, size: usize },
    Stored { iteration: u32, stored: StoredPayload },
    SurrogateRoot {
        iteration: u32,
        content: ContentIdentifier,
        surrogate: Root,
    },
    SubmittingRecord { iteration: u32, root: Root },
    RecordConfirmed { iteration: u32, receipt: RecordReceipt },
    IterationFailed {
        iteration: u32,
        stage: Stage,
        error: String,
    },
    Waiting { iteration: u32, delay: Duration },
    Finished(BatchSummary),
}

#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    #[error("Failed to set up the image source: {0}")]
    ImageSourceSetup(#[from] FetchError),
    #[error("Failed to set up the indexer client: {0}")]
    IndexerSetup(#[from] StorageError),
    #[error("Pre-flight check failed: {0}")]
    Preflight(#[source] RecordError),
}

/// Runs the fetch, store and record steps for every upload of a batch, one after the other.
pub struct BatchRunner {
    config: BatchConfig,
    image_source: Box<dyn ImageSource>,
    storage: Box<dyn StorageSubmitter>,
    recorder: Box<dyn RecordSubmitter>,
    event_sender: Option<mpsc::Sender<BatchEvent>>,
}

impl BatchRunner {
    pub fn new(
        config: BatchConfig,
        image_source: Box<dyn ImageSource>,
        storage: Box<dyn StorageSubmitter>,
        recorder: Box<dyn RecordSubmitter>,
    ) -> Self {
        Self {
            config,
            image_source,
            storage,
            recorder,
            event_sender: None,
        }
    }

    /// Wire up the HTTP image source, the configured storage path and the chain recorder.
    pub fn from_config(config: &UploaderConfig) -> Result<Self, RunnerError> {
        let image_source = HttpImageSource::new(config.image_url.clone(), config.http_timeout)?;
        let indexer = IndexerClient::new(&config.indexer_url, config.http_timeout)?;

        let storage: Box<dyn StorageSubmitter> = match config.submission_mode {
            SubmissionMode::Segment => {
                Box::new(SegmentSubmitter::new(indexer, config.retry_policy))
            }
            SubmissionMode::File => Box::new(FileSubmitter::new(
                IndexerFileUploader::new(indexer),
                config.scratch_dir.clone(),
                config.retry_policy,
            )),
        };
        let recorder =
            ChainRecorder::new(config.wallet(), config.call_encoding, config.storage_fee);
        debug!("Batch runner set up with {config:?}");

        Ok(Self::new(
            BatchConfig::from(config),
            Box::new(image_source),
            storage,
            Box::new(recorder),
        ))
    }

    /// Receive progress events from the runner.
    pub fn enable_events(&mut self) -> mpsc::Receiver<BatchEvent> {
        let (event_sender, event_receiver) = mpsc::channel(BATCH_EVENT_CHANNEL_SIZE);
        self.event_sender = Some(event_sender);
        debug!("Batch events are enabled");

        event_receiver
    }

    /// Run the whole batch. Failed uploads are counted, only a failed pre-flight check is an
    /// error.
    pub async fn run(&self) -> Result<BatchSummary, RunnerError> {
        match self.config.preflight {
            PreflightPolicy::Enforce => {
                let report = self
                    .recorder
                    .preflight()
                    .await
                    .inspect_err(|err| error!("Pre-flight check failed: {err}"))
                    .map_err(RunnerError::Preflight)?;
                self.emit(BatchEvent::Preflight(report));
            }
            PreflightPolicy::Skip => info!("Pre-flight check skipped"),
        }

        let total = self.config.upload_count;
        let mut summary = BatchSummary::default();

        for iteration in 1..=total {
            info!("Starting upload {iteration}/{total}");
            self.emit(BatchEvent::IterationStarted { iteration, total });

            let outcome = self.run_iteration(iteration).await;
            if let AttemptOutcome::Failure { stage, error, .. } = &outcome {
                warn!("Upload {iteration}/{total} failed at {stage}: {error}");
                self.emit(BatchEvent::IterationFailed {
                    iteration,
                    stage: *stage,
                    error: error.clone(),
                });
            }
            summary.push(outcome);

            let delay = self.config.upload_delay;
            if iteration < total && !delay.is_zero() {
                debug!("Waiting {delay:?} before the next upload");
                self.emit(BatchEvent::Waiting { iteration, delay });
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            "Batch finished: {} attempted, {} succeeded, {} failed",
            summary.attempted, summary.succeeded, summary.failed
        );
        self.emit(BatchEvent::Finished(summary.clone()));
        Ok(summary)
    }

    async fn run_iteration(&self, iteration: u32) -> AttemptOutcome {
        match self.try_iteration(iteration).await {
            Ok(outcome) => outcome,
            Err((stage, error)) => AttemptOutcome::Failure {
                iteration,
                stage,
                error,
            },
        }
    }

    async fn try_iteration(&self, iteration: u32) -> Result<AttemptOutcome, (Stage, String)> {
        let payload = self
            .image_source
            .fetch()
            .await
            .map_err(|err| (Stage::Fetch, err.to_string()))?;
        self.emit(BatchEvent::PayloadFetched {
            iteration,
            size: payload.len(),
        });

        let stored = self
            .storage
            .submit(&payload)
            .await
            .map_err(|err| (Stage::Store, err.to_string()))?;
        drop(payload);
        self.emit(BatchEvent::Stored {
            iteration,
            stored: stored.clone(),
        });

        let recorded_root = match self.config.root_source {
            RootSource::Content => stored.root.root(),
            RootSource::Random => {
                let surrogate = dummy_hash();
                warn!(
                    "Recording random root {surrogate} instead of content root {}",
                    stored.root
                );
                self.emit(BatchEvent::SurrogateRoot {
                    iteration,
                    content: stored.root,
                    surrogate,
                });
                surrogate
            }
        };

        self.emit(BatchEvent::SubmittingRecord {
            iteration,
            root: recorded_root,
        });
        let receipt = self
            .recorder
            .record(recorded_root, stored.data_size)
            .await
            .map_err(|err| (Stage::Record, err.to_string()))?;
        self.emit(BatchEvent::RecordConfirmed {
            iteration,
            receipt: receipt.clone(),
        });

        Ok(AttemptOutcome::Success {
            iteration,
            root: stored.root,
            recorded_root,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
        })
    }

    /// The observer never slows the batch down: a full or closed channel drops the event.
    fn emit(&self, event: BatchEvent) {
        if let Some(sender) = self.event_sender.as_ref() {
            if let Err(err) = sender.try_send(event) {
                warn!("Failed to send batch event: {err}");
            }
        }
    }
}
