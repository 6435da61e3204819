// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::payload::Payload;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Url};
use std::time::Duration;

/// Redirects followed before a fetch is given up on.
pub const MAX_REDIRECTS: usize = 5;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Image request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Image source {url} answered with status {status}")]
    Status { url: Url, status: u16 },
    #[error("Image source {0} returned an empty body")]
    EmptyBody(Url),
}

/// Where payloads come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self) -> Result<Payload, FetchError>;
}

/// Fetches a fresh random image with a plain GET on every call.
#[derive(Clone, Debug)]
pub struct HttpImageSource {
    client: Client,
    url: Url,
}

impl HttpImageSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self) -> Result<Payload, FetchError> {
        debug!("Fetching image from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.bytes().await?;
        let payload = Payload::new(body).map_err(|_| FetchError::EmptyBody(final_url.clone()))?;
        trace!("Fetched {} bytes from {final_url}", payload.len());
        Ok(payload)
    }
}
