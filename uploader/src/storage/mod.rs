// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Getting a payload onto the storage network, either as a single indexer segment or through a
//! file uploader working on a temporary copy of the payload.

pub mod file;
pub mod indexer;
pub mod segment;

use crate::payload::{ContentIdentifier, Payload};
use async_trait::async_trait;

pub use file::{FileSubmitter, FileUploadReply, FileUploader, IndexerFileUploader, TempPayloadFile};
pub use indexer::{IndexerClient, SegmentProof, SegmentRequest};
pub use segment::SegmentSubmitter;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Indexer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Indexer answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid indexer URL {0:?}")]
    InvalidUrl(String),
    #[error("Temporary payload file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File upload failed: {0}")]
    Uploader(String),
    #[error("File upload reply carries no root")]
    MissingRoot,
}

/// A payload the storage layer has accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPayload {
    pub root: ContentIdentifier,
    pub data_size: u64,
    /// Submission handle reported by the file uploader, if any.
    pub handle: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageSubmitter: Send + Sync {
    async fn submit(&self, payload: &Payload) -> Result<StoredPayload, StorageError>;
}
