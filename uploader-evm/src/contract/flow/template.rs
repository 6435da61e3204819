// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Fixed call-data templates for the flow contract's `submit` entrypoint.
//!
//! A template is a pre-encoded `submit((uint256,bytes,(bytes32,uint256)[]))` call in which only
//! the 32-byte root of the single submission node gets replaced. Everything else (the recorded
//! length, the empty tags, the node height) is frozen into the bytes, so a template is only
//! valid for the contract version it was captured from.

use super::interface::IFlow;
use crate::common::{Calldata, Root};
use alloy::sol_types::SolCall;

const WORD: usize = 32;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template v{version} is not valid hex: {reason}")]
    InvalidHex { version: u16, reason: String },
    #[error("Template v{version} has selector 0x{found}, expected 0x{expected}")]
    SelectorMismatch {
        version: u16,
        found: String,
        expected: String,
    },
    #[error("Template v{version} is {found} bytes long, expected {expected}")]
    LengthMismatch {
        version: u16,
        found: usize,
        expected: usize,
    },
    #[error("Template v{version} root slot at offset {offset} is not a zeroed placeholder")]
    RootSlotNotEmpty { version: u16, offset: usize },
}

/// A versioned, pre-encoded `submit` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitTemplate {
    pub version: u16,
    /// Length recorded on-chain by this template, in bytes.
    pub recorded_length: u64,
    hex: &'static str,
    root_offset: usize,
    words: usize,
}

/// `submit` with `length = 256`, no tags and a single node of height 0.
pub const SUBMIT_TEMPLATE_V1: SubmitTemplate = SubmitTemplate {
    version: 1,
    recorded_length: 256,
    hex: concat!(
        "ef3e12dc",
        // offset of the submission tuple
        "0000000000000000000000000000000000000000000000000000000000000020",
        // length
        "0000000000000000000000000000000000000000000000000000000000000100",
        // offset of tags
        "0000000000000000000000000000000000000000000000000000000000000060",
        // offset of nodes
        "0000000000000000000000000000000000000000000000000000000000000080",
        // tags.length
        "0000000000000000000000000000000000000000000000000000000000000000",
        // nodes.length
        "0000000000000000000000000000000000000000000000000000000000000001",
        // nodes[0].root
        "0000000000000000000000000000000000000000000000000000000000000000",
        // nodes[0].height
        "0000000000000000000000000000000000000000000000000000000000000000",
    ),
    root_offset: 4 + 6 * WORD,
    words: 8,
};

impl SubmitTemplate {
    /// Decode the template and check it against the typed `IFlow::submit` definition.
    pub fn validate(&self) -> Result<Vec<u8>, TemplateError> {
        let bytes = alloy::hex::decode(self.hex).map_err(|err| TemplateError::InvalidHex {
            version: self.version,
            reason: err.to_string(),
        })?;

        let expected_len = 4 + self.words * WORD;
        if bytes.len() != expected_len {
            return Err(TemplateError::LengthMismatch {
                version: self.version,
                found: bytes.len(),
                expected: expected_len,
            });
        }

        let selector = &bytes[..4];
        if selector != IFlow::submitCall::SELECTOR {
            return Err(TemplateError::SelectorMismatch {
                version: self.version,
                found: alloy::hex::encode(selector),
                expected: alloy::hex::encode(IFlow::submitCall::SELECTOR),
            });
        }

        let root_slot = bytes
            .get(self.root_offset..self.root_offset + WORD)
            .ok_or(TemplateError::LengthMismatch {
                version: self.version,
                found: bytes.len(),
                expected: self.root_offset + WORD,
            })?;
        if root_slot.iter().any(|b| *b != 0) {
            return Err(TemplateError::RootSlotNotEmpty {
                version: self.version,
                offset: self.root_offset,
            });
        }

        Ok(bytes)
    }

    /// Produce the call data for `root`.
    pub fn encode(&self, root: Root) -> Result<Calldata, TemplateError> {
        let mut bytes = self.validate()?;
        bytes[self.root_offset..self.root_offset + WORD].copy_from_slice(root.as_slice());
        Ok(Calldata::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::U256;
    use alloy::primitives::Bytes;

    #[test]
    fn v1_template_is_valid() {
        let bytes = SUBMIT_TEMPLATE_V1.validate().expect("template should validate");
        assert_eq!(bytes.len(), 260);
        assert_eq!(&bytes[..4], &[0xef, 0x3e, 0x12, 0xdc]);
    }

    #[test]
    fn v1_template_matches_typed_encoding() {
        let root = Root::repeat_byte(0xab);

        let typed = IFlow::submitCall {
            submission: IFlow::Submission {
                length: U256::from(SUBMIT_TEMPLATE_V1.recorded_length),
                tags: Bytes::new(),
                nodes: vec![IFlow::SubmissionNode {
                    root,
                    height: U256::ZERO,
                }],
            },
        }
        .abi_encode();

        let templated = SUBMIT_TEMPLATE_V1.encode(root).expect("encode");
        assert_eq!(templated.as_ref(), typed.as_slice());
    }

    #[test]
    fn only_the_root_slot_changes() {
        let a = SUBMIT_TEMPLATE_V1.encode(Root::repeat_byte(1)).expect("encode");
        let b = SUBMIT_TEMPLATE_V1.encode(Root::repeat_byte(2)).expect("encode");

        let differing: Vec<usize> = a
            .iter()
            .zip(b.iter())
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .map(|(i, _)| i)
            .collect();

        assert_eq!(differing, (196..228).collect::<Vec<_>>());
    }

    #[test]
    fn wrong_selector_is_rejected() {
        let broken = SubmitTemplate {
            hex: concat!(
                "deadbeef",
                "0000000000000000000000000000000000000000000000000000000000000000"
            ),
            words: 1,
            root_offset: 4,
            ..SUBMIT_TEMPLATE_V1
        };
        assert!(matches!(
            broken.validate(),
            Err(TemplateError::SelectorMismatch { .. })
        ));
    }

    #[test]
    fn truncated_template_is_rejected() {
        let broken = SubmitTemplate {
            words: 9,
            ..SUBMIT_TEMPLATE_V1
        };
        assert_eq!(
            broken.validate(),
            Err(TemplateError::LengthMismatch {
                version: 1,
                found: 260,
                expected: 292,
            })
        );
    }
}
