// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::Result;
use tracing::{debug, info};
use uploader_logging::{Level, LogBuilder, LogOutputDest};

#[test]
fn logs_are_written_to_a_rolling_file_in_the_output_dir() -> Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let mut log_builder = LogBuilder::new(vec![("file_output".to_string(), Level::INFO)]);
    log_builder.output_dest(LogOutputDest::Path(log_dir.clone()));
    log_builder.print_updates_to_stdout(false);
    let guard = log_builder.initialize()?;

    info!("upload 1/1 confirmed");
    debug!("below the configured level");

    // Dropping the guard flushes the non-blocking writer.
    drop(guard);

    let mut contents = String::new();
    for entry in std::fs::read_dir(&log_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        assert!(name.starts_with("batch_uploader"), "unexpected file {name}");
        assert!(name.ends_with(".log"), "unexpected file {name}");
        contents.push_str(&std::fs::read_to_string(&path)?);
    }

    assert!(contents.contains("upload 1/1 confirmed"));
    assert!(!contents.contains("below the configured level"));
    Ok(())
}
