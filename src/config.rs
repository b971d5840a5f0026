//! Generator configuration.
//!
//! Every knob has a default matching the conventional project layout (TypeScript handlers,
//! `createRoute(...)` calls, an `api/v1/` key prefix), so only the scan root and the logical
//! prefix have to be supplied.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Extension of route handler files, without the dot.
pub const DEFAULT_EXTENSION: &str = "ts";
/// Segment removed once from the front of every manifest key.
pub const DEFAULT_API_PREFIX: &str = "api/v1/";
/// Name of the exported route-construction function.
pub const DEFAULT_ROUTE_FUNCTION: &str = "createRoute";
/// Deadline for a whole run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for one manifest generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory that is walked for route files
    pub root: PathBuf,
    /// Logical prefix that replaces `root` in every route path
    pub prefix: String,
    /// Source file extension, without the dot
    pub extension: String,
    /// Segment stripped once from the front of manifest keys
    pub api_prefix: String,
    /// Exported function whose object argument configures a route
    pub route_function: String,
    /// Deadline for the whole run, measured from its start
    pub timeout: Duration,
    /// Upper bound on concurrent read and parse workers per stage
    pub concurrency: usize,
    /// Directory names pruned from the walk
    pub ignore_dirs: Vec<String>,
    /// Keep the order in which routes arrive instead of sorting by key
    pub preserve_order: bool,
}

impl GeneratorConfig {
    pub fn new(root: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            root,
            prefix: prefix.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            route_function: DEFAULT_ROUTE_FUNCTION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: default_concurrency(),
            ignore_dirs: Vec::new(),
            preserve_order: false,
        }
    }

    /// Checks the settings that would otherwise fail deep inside the pipeline.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            anyhow::bail!("Root path does not exist: {}", self.root.display());
        }
        if !self.root.is_dir() {
            anyhow::bail!("Root path is not a directory: {}", self.root.display());
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            anyhow::bail!(
                "Extension must be non-empty and given without a leading dot: {:?}",
                self.extension
            );
        }
        if self.concurrency == 0 {
            anyhow::bail!("Concurrency must be at least 1");
        }
        if self.route_function.is_empty()
            || !self
                .route_function
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            anyhow::bail!("Invalid route function name: {:?}", self.route_function);
        }
        Ok(())
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::new(PathBuf::from("routes"), ".");
        assert_eq!(config.extension, "ts");
        assert_eq!(config.api_prefix, "api/v1/");
        assert_eq!(config.route_function, "createRoute");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.concurrency >= 1);
        assert!(!config.preserve_order);
    }

    #[test]
    fn test_validate_accepts_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = GeneratorConfig::new(temp_dir.path().to_path_buf(), ".");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let config = GeneratorConfig::new(PathBuf::from("/nonexistent/routes"), ".");
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency_and_bad_extension() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = GeneratorConfig::new(temp_dir.path().to_path_buf(), ".");
        config.concurrency = 0;
        assert!(config.validate().is_err());

        config.concurrency = 2;
        config.extension = ".ts".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_route_function_that_breaks_the_query() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = GeneratorConfig::new(temp_dir.path().to_path_buf(), ".");
        config.route_function = "create\"Route".to_string();
        assert!(config.validate().is_err());
    }
}
