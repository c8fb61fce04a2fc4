use std::fs::{OpenOptions, create_dir_all};
use std::path::Path;

use salesgen_publish::RunSummary;

use super::{RegistryError, RegistryResult};

/// Write the run summary as pretty JSON, creating parent directories.
pub fn write_summary(path: &Path, summary: &RunSummary) -> RegistryResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, summary).map_err(RegistryError::from)
}
