// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::eyre::{eyre, Report};
use color_eyre::Section;
use uploader::record::RecordError;
use uploader::{ConfigError, RunnerError};

/// Failed uploads inside a batch never change the exit code. Everything that stops the batch
/// from running does.
pub(crate) const INVALID_CONFIG_EXIT_CODE: i32 = 1;
pub(crate) const SETUP_ERROR_EXIT_CODE: i32 = 1;
pub(crate) const PREFLIGHT_ERROR_EXIT_CODE: i32 = 1;

pub type ExitCodeError = (Report, i32);

pub(crate) fn config_error(err: ConfigError) -> ExitCodeError {
    let suggestion = match &err {
        ConfigError::Missing(_) => Some(
            "Set the missing values in the environment, in a .env file or with the matching flags",
        ),
        ConfigError::PrivateKey(_) => {
            Some("PRIVATE_KEY must be a 32 byte hex string, with or without 0x")
        }
        _ => None,
    };

    let mut report = eyre!(err);
    if let Some(suggestion) = suggestion {
        report = report.with_suggestion(|| suggestion);
    }
    (
        report.wrap_err("Invalid configuration"),
        INVALID_CONFIG_EXIT_CODE,
    )
}

pub(crate) fn runner_error(err: RunnerError) -> ExitCodeError {
    match err {
        RunnerError::Preflight(RecordError::InsufficientBalance { .. }) => (
            eyre!(err).with_suggestion(|| "Fund the account or lower STORAGE_FEE"),
            PREFLIGHT_ERROR_EXIT_CODE,
        ),
        RunnerError::Preflight(_) => (
            eyre!(err).with_suggestion(|| {
                "Check that RPC_URL points at a reachable node, or pass --preflight skip"
            }),
            PREFLIGHT_ERROR_EXIT_CODE,
        ),
        RunnerError::ImageSourceSetup(_) | RunnerError::IndexerSetup(_) => (
            eyre!(err).wrap_err("Failed to set up the uploader"),
            SETUP_ERROR_EXIT_CODE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fatal_error_exits_with_one() {
        let (report, code) = config_error(ConfigError::Missing(vec!["PRIVATE_KEY", "RPC_URL"]));
        assert_eq!(code, 1);
        assert!(format!("{report:?}").contains("PRIVATE_KEY, RPC_URL"));

        let (_, code) = runner_error(RunnerError::Preflight(RecordError::InsufficientBalance {
            address: Default::default(),
            balance: Default::default(),
            fee: Default::default(),
        }));
        assert_eq!(code, 1);
    }
}
