// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::{IndexerClient, SegmentRequest, StorageError, StorageSubmitter, StoredPayload};
use crate::payload::{ContentIdentifier, Payload};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uploader_evm::retry::{retry, RetryPolicy};

/// What a file uploader hands back: a root and a submission handle, or an error value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileUploadReply {
    pub root: Option<ContentIdentifier>,
    pub handle: Option<String>,
    pub error: Option<String>,
}

impl FileUploadReply {
    pub fn uploaded(root: ContentIdentifier, handle: Option<String>) -> Self {
        Self {
            root: Some(root),
            handle,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// The error value wins over anything else in the reply.
    pub fn into_result(self) -> Result<(ContentIdentifier, Option<String>), StorageError> {
        if let Some(error) = self.error {
            return Err(StorageError::Uploader(error));
        }
        let root = self.root.ok_or(StorageError::MissingRoot)?;
        Ok((root, self.handle))
    }
}

/// Uploads a file from disk and reports the outcome in its reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload_file(&self, path: &Path) -> FileUploadReply;
}

/// A payload written to the scratch directory. Removed on `cleanup` or drop, whichever
/// comes first.
#[derive(Debug)]
pub struct TempPayloadFile {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl TempPayloadFile {
    pub fn create(scratch_dir: &Path, payload: &Payload) -> Result<Self, StorageError> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".bin")
            .tempfile_in(scratch_dir)?;
        file.write_all(payload.as_ref())?;
        file.flush()?;

        let path = file.path().to_path_buf();
        trace!("Wrote {} bytes to {path:?}", payload.len());
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cleanup(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => trace!("Removed temporary payload file {:?}", self.path),
                Err(err) => warn!(
                    "Failed to remove temporary payload file {:?}: {err}",
                    self.path
                ),
            }
        }
    }
}

impl Drop for TempPayloadFile {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Hands a temporary copy of the payload to a [`FileUploader`].
pub struct FileSubmitter<U> {
    uploader: U,
    scratch_dir: PathBuf,
    retry_policy: RetryPolicy,
}

impl<U: FileUploader> FileSubmitter<U> {
    pub fn new(uploader: U, scratch_dir: PathBuf, retry_policy: RetryPolicy) -> Self {
        Self {
            uploader,
            scratch_dir,
            retry_policy,
        }
    }
}

#[async_trait]
impl<U: FileUploader> StorageSubmitter for FileSubmitter<U> {
    async fn submit(&self, payload: &Payload) -> Result<StoredPayload, StorageError> {
        let temp_file = TempPayloadFile::create(&self.scratch_dir, payload)?;

        let uploader = &self.uploader;
        let path = temp_file.path();
        let result = retry(&self.retry_policy, "file upload", || async move {
            uploader.upload_file(path).await.into_result()
        })
        .await;

        temp_file.cleanup();

        let (root, handle) = result?;
        info!("File upload of {root} ({} bytes) submitted, handle {handle:?}", payload.len());
        Ok(StoredPayload {
            root,
            data_size: payload.data_size(),
            handle,
        })
    }
}

/// File uploader backed by the indexer: reads the file back, roots it and posts it as a
/// single segment. Failures are reported in the reply, never raised.
#[derive(Clone, Debug)]
pub struct IndexerFileUploader {
    indexer: IndexerClient,
}

impl IndexerFileUploader {
    pub fn new(indexer: IndexerClient) -> Self {
        Self { indexer }
    }

    async fn try_upload(&self, path: &Path) -> Result<(ContentIdentifier, String), StorageError> {
        let bytes = tokio::fs::read(path).await?;
        let payload = Payload::new(bytes).map_err(|err| StorageError::Uploader(err.to_string()))?;
        let root = ContentIdentifier::from_payload(&payload);
        let body = self
            .indexer
            .upload_segment(&SegmentRequest::single(&payload, &root))
            .await?;
        Ok((root, body))
    }
}

#[async_trait]
impl FileUploader for IndexerFileUploader {
    async fn upload_file(&self, path: &Path) -> FileUploadReply {
        match self.try_upload(path).await {
            Ok((root, body)) => {
                let body = body.trim();
                let handle = (!body.is_empty()).then(|| body.to_string());
                FileUploadReply::uploaded(root, handle)
            }
            Err(err) => FileUploadReply::failed(err.to_string()),
        }
    }
}
