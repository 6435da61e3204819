// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use std::time::Duration;

pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 4000;

/// Bounded retry with a fixed backoff, shared by the storage and transaction steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Never zero.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }

    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Policy from a number of retries on top of the first attempt.
    pub fn with_retries(retries: u32, backoff: Duration) -> Self {
        Self::new(retries.saturating_add(1), backoff)
    }
}

/// Execute an async closure that returns a result. Retry on failure, as far as `policy` allows.
pub async fn retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_id: &str,
    mut action: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let mut attempt = 1;

    loop {
        match action().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if attempt >= policy.max_attempts {
                    if policy.max_attempts > 1 {
                        error!("{operation_id} failed after {attempt} attempts: {err:?}");
                    }
                    return Err(err);
                }

                warn!(
                    "Error trying {operation_id}: {err:?}. Attempt #{} in {:?}.",
                    attempt + 1,
                    policy.backoff
                );
                attempt += 1;

                tokio::time::sleep(policy.backoff).await;
            }
        }
    }
}
