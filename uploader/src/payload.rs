// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bytes::Bytes;
use uploader_evm::common::{keccak256, Root};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Payload is empty")]
pub struct EmptyPayload;

/// A fetched image. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload(Bytes);

impl Payload {
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self, EmptyPayload> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EmptyPayload);
        }
        Ok(Self(bytes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size as recorded on chain.
    pub fn data_size(&self) -> u64 {
        u64::try_from(self.0.len()).unwrap_or(u64::MAX)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.0
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Keccak-256 digest of a payload, a.k.a. its root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentIdentifier(Root);

impl ContentIdentifier {
    pub fn from_payload(payload: &Payload) -> Self {
        Self::from_bytes(payload.as_ref())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(keccak256(bytes))
    }

    pub fn root(&self) -> Root {
        self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<Root> for ContentIdentifier {
    fn from(root: Root) -> Self {
        Self(root)
    }
}

impl std::fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
