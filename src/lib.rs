//! Route manifest generator - one generated module instead of runtime route discovery.
//!
//! This library walks a directory of convention-based TypeScript route handlers
//! (`.../product/get.ts`, `.../product/post.ts`, ...) and produces a single manifest module
//! mapping every route key to a descriptor with its method, URL, auth/role flags and
//! validation schema expressions.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Walks the routes directory and reads matching files concurrently
//! 2. [`parser`] - Parses sources with tree-sitter and runs structural queries
//! 3. [`extractor`] - Recovers route metadata and import bindings from each tree
//! 4. [`resolver`] - Rewrites import specifiers for the manifest's location
//! 5. [`manifest`] - Derives keys/URLs, renders descriptors and hoists imports
//! 6. [`pipeline`] - Wires the stages together under one deadline
//! 7. [`serializer`] - Writes the manifest and JSON/YAML run reports
//!
//! # Example Usage
//!
//! ```no_run
//! use route_manifest::{config::GeneratorConfig, pipeline};
//! use std::path::PathBuf;
//!
//! # async fn generate() -> anyhow::Result<()> {
//! let config = GeneratorConfig::new(PathBuf::from("./src/routes"), ".");
//! let generation = pipeline::run(&config).await?;
//! if generation.is_complete() {
//!     println!("{}", generation.document);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod route;
pub mod scanner;
pub mod serializer;
