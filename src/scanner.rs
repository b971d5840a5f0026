use crate::error::{Diagnostic, DiagnosticKind};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use walkdir::WalkDir;

/// File scanner for traversing a routes directory.
///
/// The `FileScanner` recursively walks the root directory to find every route handler source
/// file, i.e. every regular file whose name ends in `.<extension>`. Directories listed in
/// `ignore_dirs` are pruned from the walk.
///
/// # Example
///
/// ```no_run
/// use route_manifest::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./routes"), "ts");
/// let result = scanner.scan();
/// println!("Found {} route files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extension: String,
    ignore_dirs: Vec<String>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered source files and any warnings encountered during scanning.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Filesystem paths of all discovered source files
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

/// A discovered route file, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Logical path: the prefix followed by the path relative to the scanned root
    pub path: String,
    /// Where the file was read from
    pub fs_path: PathBuf,
    pub content: Vec<u8>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan
    /// * `extension` - File extension to keep, without the dot
    pub fn new(root_path: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            root_path,
            extension: extension.into(),
            ignore_dirs: Vec::new(),
        }
    }

    /// Prunes directories with any of these names from the walk.
    pub fn with_ignore_dirs(mut self, ignore_dirs: Vec<String>) -> Self {
        self.ignore_dirs = ignore_dirs;
        self
    }

    /// Scans the directory tree and collects all matching files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        let suffix = format!(".{}", self.extension);

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path || !e.file_type().is_dir() {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !self.ignore_dirs.iter().any(|d| *d == file_name)
            })
        {
            match entry {
                Ok(entry) => {
                    let is_match = entry.file_type().is_file()
                        && entry.file_name().to_string_lossy().ends_with(&suffix);
                    if is_match {
                        result.files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} files, {} warnings",
            self.root_path.display(),
            result.files.len(),
            result.warnings.len()
        );
        result
    }
}

/// Logical path of `file`: `prefix` followed by the path relative to `root`.
///
/// Separators are normalised to `/`. A trailing `/` on the prefix is not doubled, and an empty
/// prefix yields the relative path alone.
pub fn logical_path(prefix: &str, root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let relative: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let relative = relative.join("/");

    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        relative
    } else {
        format!("{}/{}", prefix, relative)
    }
}

/// Reads `files` concurrently and hands each one to `tx`.
///
/// At most `limit` reads run at once. A failed read is sent as a `ReadFailure` diagnostic.
/// Once `deadline` passes no new reads start and pending hand-offs are abandoned. The
/// channel closes when this function returns, after every reader has finished.
pub async fn read_files(
    files: Vec<PathBuf>,
    root: PathBuf,
    prefix: String,
    limit: usize,
    deadline: Instant,
    tx: mpsc::Sender<Result<SourceFile, Diagnostic>>,
) {
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut readers = JoinSet::new();

    for fs_path in files {
        let permit = tokio::select! {
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
            _ = sleep_until(deadline) => {
                debug!("Deadline reached, no further reads scheduled");
                break;
            }
        };

        let path = logical_path(&prefix, &root, &fs_path);
        let tx = tx.clone();
        readers.spawn(async move {
            let item = match tokio::fs::read(&fs_path).await {
                Ok(content) => Ok(SourceFile {
                    path,
                    fs_path,
                    content,
                }),
                Err(e) => {
                    warn!("Failed to read {}: {}", fs_path.display(), e);
                    Err(Diagnostic::new(path, DiagnosticKind::ReadFailure, e.to_string()))
                }
            };
            tokio::select! {
                _ = tx.send(item) => {}
                _ = sleep_until(deadline) => {}
            }
            drop(permit);
        });

        while let Some(joined) = readers.try_join_next() {
            if let Err(e) = joined {
                warn!("Read worker failed: {}", e);
            }
        }
    }

    while let Some(joined) = readers.join_next().await {
        if let Err(e) = joined {
            warn!("Read worker failed: {}", e);
        }
    }
}
