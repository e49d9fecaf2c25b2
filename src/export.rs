//! Download artifact: the converted payload saved as a `.json` file.
//!
//! The artifact is the payload pretty-printed with two-space indentation,
//! named after the original file with its final extension replaced by
//! `_converted.json` (`report.pdf` → `report_converted.json`).
//!
//! Writing goes through a [`tempfile::NamedTempFile`] in the target
//! directory that is persisted with a rename. If anything fails before the
//! rename, dropping the temp file removes it, so no half-written artifact or
//! stray temp file is left behind.

use crate::error::File2JsonError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Suffix appended to the original file stem.
pub const ARTIFACT_SUFFIX: &str = "_converted.json";

/// MIME type of the artifact.
pub const ARTIFACT_MIME: &str = "application/json";

static RE_FINAL_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());

/// Derive the artifact file name from the original file name.
pub fn artifact_file_name(original_name: &str) -> String {
    let stem = RE_FINAL_EXTENSION.replace(original_name, "");
    format!("{stem}{ARTIFACT_SUFFIX}")
}

/// Serialise the payload as indented JSON text.
pub fn render_artifact(payload: &Value) -> Result<String, File2JsonError> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Save `payload` into `dir` under the derived artifact name.
///
/// Returns the path of the written file. An existing artifact with the same
/// name is replaced.
pub fn export_as_download(
    original_name: &str,
    payload: &Value,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, File2JsonError> {
    let dir = dir.as_ref();
    let text = render_artifact(payload)?;
    let path = dir.join(artifact_file_name(original_name));

    let write_err = |source: std::io::Error| File2JsonError::ArtifactWriteFailed {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".file2json-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    debug!("Staging artifact at {}", tmp.path().display());

    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    info!("Saved {} ({} bytes, {})", path.display(), text.len(), ARTIFACT_MIME);
    Ok(path)
}
