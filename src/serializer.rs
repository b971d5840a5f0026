//! Serialization of run reports and writing of generated files.
//!
//! The manifest itself is plain text; this module turns the outcome of a run into a JSON or
//! YAML report that names every file which was skipped or failed.

use crate::error::{Diagnostic, Result};
use crate::pipeline::Generation;
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Machine-readable summary of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: String,
    pub prefix: String,
    /// Route files found by the scan
    pub discovered: usize,
    /// Routes written to the manifest
    pub routes: usize,
    /// `false` when at least one fatal diagnostic was recorded
    pub complete: bool,
    pub elapsed_ms: u128,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(root: &Path, prefix: &str, generation: &Generation) -> Self {
        Self {
            root: root.display().to_string(),
            prefix: prefix.to_string(),
            discovered: generation.discovered,
            routes: generation.routes,
            complete: generation.is_complete(),
            elapsed_ms: generation.elapsed.as_millis(),
            diagnostics: generation.diagnostics.clone(),
            warnings: generation.warnings.clone(),
        }
    }
}

/// Serializes a run report to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(report: &RunReport) -> Result<String> {
    debug!("Serializing run report to YAML");
    Ok(serde_yaml::to_string(report)?)
}

/// Serializes a run report to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(report: &RunReport) -> Result<String> {
    debug!("Serializing run report to JSON");
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
