use std::path::Path;

use tracing::info;

use crate::error::SinkError;
use crate::summary::RunSummary;

/// Write the summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub fn export_json(summary: &RunSummary, path: &Path) -> Result<(), SinkError> {
    let content =
        serde_json::to_string_pretty(summary).map_err(|source| SinkError::Serialize { source })?;
    std::fs::write(path, content).map_err(|source| SinkError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Summary exported to {}", path.display());
    Ok(())
}
