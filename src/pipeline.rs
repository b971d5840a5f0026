//! The three-stage generation run.
//!
//! ```text
//! scan ──> read_files ──(SourceFile)──> parse_files ──(Route)──> collect_routes ──> document
//! ```
//!
//! Stages are connected by single-slot channels and each fan-out stage runs a worker pool
//! bounded by [`GeneratorConfig::concurrency`]. Per-file failures travel down the channels as
//! [`Diagnostic`]s, so one bad file never aborts the run. A single deadline bounds everything:
//! once it passes, workers drop their results and every file that never reached the builder is
//! reported as [`DiagnosticKind::DeadlineExceeded`].

use crate::config::GeneratorConfig;
use crate::error::{Diagnostic, DiagnosticKind, Error};
use crate::extractor::typescript::TypeScriptExtractor;
use crate::extractor::RouteExtractor;
use crate::manifest::ManifestBuilder;
use crate::route::Route;
use crate::scanner::{logical_path, read_files, FileScanner, SourceFile};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};

/// Outcome of a generation run.
#[derive(Debug)]
pub struct Generation {
    /// The rendered manifest module
    pub document: String,
    /// Number of routes in the manifest
    pub routes: usize,
    /// Number of files discovered by the scan
    pub discovered: usize,
    /// Per-file diagnostics, sorted by path
    pub diagnostics: Vec<Diagnostic>,
    /// Directory walk warnings
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl Generation {
    /// `true` when every discovered route file made it into the manifest.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn fatal_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_fatal())
    }

    /// Files dropped because their name has no method suffix.
    pub fn skipped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_fatal())
    }
}

/// Runs the pipeline with the TypeScript route extractor.
pub async fn run(config: &GeneratorConfig) -> Result<Generation> {
    let extractor = TypeScriptExtractor::new(&config.route_function, &config.extension)
        .context("Failed to prepare the route extractor")?;
    run_with_extractor(config, Arc::new(extractor)).await
}

/// Runs the pipeline with a caller-supplied extractor.
///
/// # Errors
///
/// Only run-level failures are errors: the directory walk not finishing before the deadline,
/// or a stage task panicking. Everything that concerns a single file is a diagnostic in the
/// returned [`Generation`].
pub async fn run_with_extractor(
    config: &GeneratorConfig,
    extractor: Arc<dyn RouteExtractor>,
) -> Result<Generation> {
    let started = Instant::now();
    let deadline = started + config.timeout;

    let scanner = FileScanner::new(config.root.clone(), config.extension.clone())
        .with_ignore_dirs(config.ignore_dirs.clone());
    let scan = tokio::time::timeout_at(deadline, tokio::task::spawn_blocking(move || scanner.scan()))
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "Deadline exceeded while scanning {}",
                config.root.display()
            )
        })?
        .context("Directory scan task failed")?;

    info!("Found {} route files", scan.files.len());
    let expected: Vec<String> = scan
        .files
        .iter()
        .map(|f| logical_path(&config.prefix, &config.root, f))
        .collect();
    let discovered = expected.len();

    let (file_tx, file_rx) = mpsc::channel(1);
    let (route_tx, route_rx) = mpsc::channel(1);

    let discovery = tokio::spawn(read_files(
        scan.files,
        config.root.clone(),
        config.prefix.clone(),
        config.concurrency,
        deadline,
        file_tx,
    ));
    let parsing = tokio::spawn(parse_files(
        file_rx,
        extractor,
        config.concurrency,
        deadline,
        route_tx,
    ));

    let builder = ManifestBuilder::new(config.extension.clone(), config.api_prefix.clone())
        .preserve_order(config.preserve_order);
    let (builder, mut diagnostics, seen) = collect_routes(route_rx, builder).await;

    discovery.await.context("Discovery stage failed")?;
    parsing.await.context("Parse stage failed")?;

    for path in expected {
        if !seen.contains(&path) {
            diagnostics.push(Diagnostic::new(
                path,
                DiagnosticKind::DeadlineExceeded,
                format!("not processed within {:?}", config.timeout),
            ));
        }
    }
    diagnostics.sort_by(|a, b| a.path.cmp(&b.path).then(a.message.cmp(&b.message)));

    let routes = builder.len();
    let document = builder.build();

    Ok(Generation {
        document,
        routes,
        discovered,
        diagnostics,
        warnings: scan.warnings,
        elapsed: started.elapsed(),
    })
}

/// Parses every file received on `rx` and hands the outcome to `tx`.
///
/// Read diagnostics are forwarded unchanged. At most `limit` files are parsed at once; parsing
/// itself runs on the blocking pool. After `deadline` no new files are accepted and pending
/// results are dropped. The output channel closes once every worker has finished.
pub async fn parse_files(
    mut rx: mpsc::Receiver<Result<SourceFile, Diagnostic>>,
    extractor: Arc<dyn RouteExtractor>,
    limit: usize,
    deadline: Instant,
    tx: mpsc::Sender<Result<Route, Diagnostic>>,
) {
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut workers = JoinSet::new();

    loop {
        let item = tokio::select! {
            item = rx.recv() => match item {
                Some(item) => item,
                None => break,
            },
            _ = sleep_until(deadline) => {
                debug!("Deadline reached, no further files accepted");
                break;
            }
        };

        let file = match item {
            Ok(file) => file,
            Err(diagnostic) => {
                tokio::select! {
                    _ = tx.send(Err(diagnostic)) => {}
                    _ = sleep_until(deadline) => break,
                }
                continue;
            }
        };

        let permit = tokio::select! {
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
            _ = sleep_until(deadline) => break,
        };

        let tx = tx.clone();
        let extractor = Arc::clone(&extractor);
        workers.spawn(async move {
            let path = file.path.clone();
            let task = tokio::task::spawn_blocking(move || extractor.extract(&file));
            let outcome = tokio::select! {
                joined = task => joined,
                _ = sleep_until(deadline) => return,
            };
            drop(permit);

            let outcome = match outcome {
                Ok(Ok(route)) => Ok(route),
                Ok(Err(e)) => Err(diagnose(&path, &e)),
                Err(e) => Err(Diagnostic::new(
                    path,
                    DiagnosticKind::ParseFailure,
                    format!("parse task failed: {}", e),
                )),
            };
            tokio::select! {
                _ = tx.send(outcome) => {}
                _ = sleep_until(deadline) => {}
            }
        });

        while let Some(joined) = workers.try_join_next() {
            if let Err(e) = joined {
                warn!("Parse worker failed: {}", e);
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            warn!("Parse worker failed: {}", e);
        }
    }
}

fn diagnose(path: &str, err: &Error) -> Diagnostic {
    let diagnostic = Diagnostic::from_error(path, err);
    if diagnostic.is_fatal() {
        warn!("{}", diagnostic);
    } else {
        debug!("Skipping {}: {}", path, err);
    }
    diagnostic
}

/// Drains `rx` into `builder` until every upstream worker is done.
///
/// Returns the builder, the diagnostics received and the logical path of every file that
/// reached this stage in either form.
async fn collect_routes(
    mut rx: mpsc::Receiver<Result<Route, Diagnostic>>,
    mut builder: ManifestBuilder,
) -> (ManifestBuilder, Vec<Diagnostic>, HashSet<String>) {
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();

    while let Some(item) = rx.recv().await {
        match item {
            Ok(route) => {
                seen.insert(route.path.clone());
                builder.add_route(&route);
            }
            Err(diagnostic) => {
                seen.insert(diagnostic.path.clone());
                diagnostics.push(diagnostic);
            }
        }
    }

    (builder, diagnostics, seen)
}
