//! Input: load the Markdown source from disk.
//!
//! Failures are classified up front (missing file, no read permission, not
//! UTF-8) so the CLI can print an actionable message instead of a bare
//! `io::Error`.

use crate::error::ReportError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read a UTF-8 Markdown file.
pub async fn read_markdown(path: &Path) -> Result<String, ReportError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReportError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ReportError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ReportError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let text = String::from_utf8(bytes).map_err(|_| ReportError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;

    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Fallback cover title: the file stem with separators turned into spaces.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['-', '_'], " "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Document".to_string())
}
