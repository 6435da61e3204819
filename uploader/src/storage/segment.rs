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
use uploader_evm::retry::{retry, RetryPolicy};

/// Uploads the whole payload as segment 0 straight to the indexer.
#[derive(Clone, Debug)]
pub struct SegmentSubmitter {
    indexer: IndexerClient,
    retry_policy: RetryPolicy,
}

impl SegmentSubmitter {
    pub fn new(indexer: IndexerClient, retry_policy: RetryPolicy) -> Self {
        Self {
            indexer,
            retry_policy,
        }
    }
}

#[async_trait]
impl StorageSubmitter for SegmentSubmitter {
    async fn submit(&self, payload: &Payload) -> Result<StoredPayload, StorageError> {
        let root = ContentIdentifier::from_payload(payload);
        let request = SegmentRequest::single(payload, &root);

        let indexer = &self.indexer;
        let request = &request;
        retry(&self.retry_policy, "indexer segment upload", || {
            indexer.upload_segment(request)
        })
        .await?;

        info!("Segment of {root} ({} bytes) accepted by the indexer", payload.len());
        Ok(StoredPayload {
            root,
            data_size: payload.data_size(),
            handle: None,
        })
    }
}
