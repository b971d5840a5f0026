//! Route extraction from parsed handler files.
//!
//! An extractor turns one discovered [`SourceFile`] into a [`Route`]: the HTTP method comes
//! from the file name, everything else from structural queries over the file's syntax tree.
//!
//! # Example
//!
//! ```no_run
//! use route_manifest::extractor::{RouteExtractor, typescript::TypeScriptExtractor};
//! use route_manifest::scanner::SourceFile;
//! use std::path::PathBuf;
//!
//! let extractor = TypeScriptExtractor::new("createRoute", "ts").unwrap();
//! let file = SourceFile {
//!     path: "./api/v1/product/get.ts".to_string(),
//!     fs_path: PathBuf::from("routes/api/v1/product/get.ts"),
//!     content: b"export default createRoute({ auth: true })".to_vec(),
//! };
//! let route = extractor.extract(&file).unwrap();
//! assert!(route.auth);
//! ```

pub mod config_object;
pub mod typescript;

use crate::error::Result;
use crate::route::Route;
use crate::scanner::SourceFile;

/// Trait for turning a route handler file into a [`Route`].
///
/// Implementations must be shareable across the parse stage's worker pool.
pub trait RouteExtractor: Send + Sync {
    /// Extracts the route declared by `file`.
    ///
    /// # Errors
    ///
    /// * `Error::UnrecognizedMethod` - the file name carries no method suffix
    /// * `Error::ParseError` - the content could not be parsed
    fn extract(&self, file: &SourceFile) -> Result<Route>;
}
