// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::StorageError;
use crate::payload::{ContentIdentifier, Payload};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SEGMENT_ENDPOINT: &str = "file/segment";

/// Inclusion proof for a segment. A payload uploaded as one segment has the root as its only
/// sibling and an empty path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentProof {
    pub siblings: Vec<String>,
    pub path: Vec<bool>,
}

/// Body of `POST {indexer}/file/segment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub root: String,
    pub index: u64,
    /// Base64 of the segment bytes.
    pub data: String,
    pub proof: SegmentProof,
}

impl SegmentRequest {
    /// The whole payload as segment 0.
    pub fn single(payload: &Payload, root: &ContentIdentifier) -> Self {
        let root = root.to_hex();
        Self {
            root: root.clone(),
            index: 0,
            data: STANDARD.encode(payload.as_ref()),
            proof: SegmentProof {
                siblings: vec![root],
                path: vec![],
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct IndexerClient {
    client: Client,
    segment_url: Url,
}

impl IndexerClient {
    pub fn new(indexer_url: &Url, timeout: Duration) -> Result<Self, StorageError> {
        let segment_url = segment_url(indexer_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            segment_url,
        })
    }

    pub fn segment_url(&self) -> &Url {
        &self.segment_url
    }

    /// Submit one segment. Any 2xx is accepted and its body returned.
    pub async fn upload_segment(&self, request: &SegmentRequest) -> Result<String, StorageError> {
        debug!(
            "Posting segment {} of {} to {}",
            request.index, request.root, self.segment_url
        );
        let response = self
            .client
            .post(self.segment_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) if status.is_success() => {
                warn!("Failed to read the indexer reply for {}: {err}", request.root);
                return Err(err.into());
            }
            Err(err) => {
                warn!("Failed to read the {status} reply body for {}: {err}", request.root);
                String::new()
            }
        };
        if !status.is_success() {
            warn!("Indexer rejected segment of {}: {status} {body}", request.root);
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// `{indexer}/file/segment`, keeping any path prefix of the indexer URL.
fn segment_url(indexer_url: &Url) -> Result<Url, StorageError> {
    let base = indexer_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{SEGMENT_ENDPOINT}"))
        .map_err(|_| StorageError::InvalidUrl(indexer_url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn segment_url_keeps_prefix() -> Result<()> {
        assert_eq!(
            segment_url(&Url::parse("http://indexer:12345")?)?.as_str(),
            "http://indexer:12345/file/segment"
        );
        assert_eq!(
            segment_url(&Url::parse("https://example.com/api/")?)?.as_str(),
            "https://example.com/api/file/segment"
        );
        Ok(())
    }

    #[test]
    fn single_segment_request_shape() -> Result<()> {
        let payload = Payload::new(&b"hello"[..])?;
        let root = ContentIdentifier::from_payload(&payload);
        let request = SegmentRequest::single(&payload, &root);

        assert_eq!(
            serde_json::to_value(&request)?,
            json!({
                "root": "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8",
                "index": 0,
                "data": "aGVsbG8=",
                "proof": {
                    "siblings": ["0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"],
                    "path": []
                }
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn posts_json_segment() -> Result<()> {
        let server = MockServer::start().await;
        let payload = Payload::new(vec![0xde, 0xad, 0xbe, 0xef])?;
        let root = ContentIdentifier::from_payload(&payload);
        let request = SegmentRequest::single(&payload, &root);

        Mock::given(method("POST"))
            .and(path("/file/segment"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "root": root.to_hex(),
                "index": 0,
                "data": "3q2+7w==",
                "proof": { "siblings": [root.to_hex()], "path": [] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = IndexerClient::new(&Url::parse(&server.uri())?, Duration::from_secs(10))?;
        assert_eq!(client.upload_segment(&request).await?, "ok");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/file/segment"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad root"))
            .mount(&server)
            .await;

        let payload = Payload::new(vec![1u8])?;
        let request = SegmentRequest::single(&payload, &ContentIdentifier::from_payload(&payload));
        let client = IndexerClient::new(&Url::parse(&server.uri())?, Duration::from_secs(10))?;

        match client.upload_segment(&request).await {
            Err(StorageError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad root");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn truncated_success_body_is_an_error() -> Result<()> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await?;
            let mut request = vec![0u8; 4096];
            let _ = stream.read(&mut request).await?;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 64\r\n\r\nhandle-")
                .await?;
            stream.shutdown().await
        });

        let payload = Payload::new(vec![1u8])?;
        let request = SegmentRequest::single(&payload, &ContentIdentifier::from_payload(&payload));
        let client = IndexerClient::new(
            &Url::parse(&format!("http://{address}"))?,
            Duration::from_secs(10),
        )?;

        let result = client.upload_segment(&request).await;
        assert!(matches!(result, Err(StorageError::Http(_))), "{result:?}");
        server.await??;
        Ok(())
    }
}
