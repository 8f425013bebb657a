//! Thumbnail sync: mirror a source tree of images as a tree of thumbnails.
//!
//! For every supported file under the source root the walker computes the
//! mirrored destination path and then does exactly one of three things:
//!
//! | Destination | Action | Outcome |
//! |---|---|---|
//! | exists (any kind of entry, even a 0-byte stub) | nothing | [`SyncOutcome::Skipped`] |
//! | missing | create parent dirs, decode → fit → encode | [`SyncOutcome::Created`] |
//! | missing, but any step fails | nothing visible is left behind | [`SyncOutcome::Failed`] |
//!
//! Existence is the only freshness check: content, size and modification
//! time are never compared, so changing a source image does not refresh its
//! thumbnail. Delete the thumbnail to have it rebuilt.
//!
//! ## Guarantees
//!
//! - Nothing under the source root is modified.
//! - Nothing under the destination root is deleted or rewritten.
//! - A failing file never stops the run; only a missing source root (or an
//!   invalid config) is fatal.
//! - Running twice over an unchanged tree performs no writes the second time.
//!
//! ## Testability
//!
//! The walk ([`walk::candidates`]) and the per-file action ([`sync_entry`])
//! are decoupled. [`sync_entries`] accepts any iterator of candidates, so
//! tests can feed synthetic entries and a mock backend without a source
//! tree on disk.

use crate::config::{ConfigError, SyncConfig};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, RustBackend, ThumbnailConfig, create_thumbnail,
    get_dimensions,
};
use crate::walk::{self, CandidateEntry, ExtensionSet, WalkError, WalkOptions};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Source root not found or not a directory: {0}")]
    SourceNotFound(PathBuf),
    #[error("Destination root resolves to the source root: {0}")]
    DestinationIsSource(PathBuf),
}

/// Why a single file could not be synced. Never aborts the run.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Imaging(#[from] BackendError),
}

/// Result of syncing one candidate.
#[derive(Debug)]
pub enum SyncOutcome {
    Created {
        entry: CandidateEntry,
        destination: PathBuf,
        dimensions: Dimensions,
    },
    Skipped {
        entry: CandidateEntry,
        destination: PathBuf,
    },
    Failed {
        /// Source path, or the path the walker choked on.
        path: PathBuf,
        error: FileError,
    },
}

/// Per-outcome counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Created { .. } => self.created += 1,
            SyncOutcome::Skipped { .. } => self.skipped += 1,
            SyncOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.skipped + self.failed
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} failed ({} total)",
            self.created,
            self.skipped,
            self.failed,
            self.total()
        )
    }
}

/// Sync thumbnails for `config` using the pure Rust image backend.
///
/// One [`SyncOutcome`] per candidate is sent to `events` as soon as it is
/// known; the channel closes when this returns.
pub fn sync(
    config: &SyncConfig,
    events: Option<Sender<SyncOutcome>>,
) -> Result<SyncSummary, SyncError> {
    sync_with_backend(&RustBackend::new(), config, events)
}

/// Sync thumbnails using a specific backend (allows testing with mock).
pub fn sync_with_backend(
    backend: &impl ImageBackend,
    config: &SyncConfig,
    events: Option<Sender<SyncOutcome>>,
) -> Result<SyncSummary, SyncError> {
    let (extensions, options) = prepare_walk(config)?;
    let entries = walk::candidates(&config.source_root, &extensions, &options);
    Ok(sync_entries(
        backend,
        entries,
        &config.dest_root,
        &config.thumbnail_config(),
        events.as_ref(),
    ))
}

/// Sync a sequence of candidates into `dest_root`.
///
/// Walk errors in the sequence are recorded as failures; every other item
/// goes through [`sync_entry`].
pub fn sync_entries<I>(
    backend: &impl ImageBackend,
    entries: I,
    dest_root: &Path,
    thumbnail: &ThumbnailConfig,
    events: Option<&Sender<SyncOutcome>>,
) -> SyncSummary
where
    I: IntoIterator<Item = Result<CandidateEntry, WalkError>>,
{
    let mut summary = SyncSummary::default();

    for item in entries {
        let outcome = match item {
            Ok(entry) => sync_entry(backend, entry, dest_root, thumbnail),
            Err(error) => SyncOutcome::Failed {
                path: error.path().to_path_buf(),
                error: error.into(),
            },
        };
        summary.record(&outcome);
        if let Some(tx) = events {
            // A closed receiver only means nobody is printing
            tx.send(outcome).ok();
        }
    }

    summary
}

/// Sync a single candidate: skip, create, or fail.
pub fn sync_entry(
    backend: &impl ImageBackend,
    entry: CandidateEntry,
    dest_root: &Path,
    thumbnail: &ThumbnailConfig,
) -> SyncOutcome {
    let destination = entry.destination(dest_root);

    if destination_exists(&destination) {
        return SyncOutcome::Skipped { entry, destination };
    }

    if let Err(error) = ensure_parent_dir(&destination) {
        return SyncOutcome::Failed {
            path: entry.source_path,
            error,
        };
    }

    match create_thumbnail(backend, &entry.source_path, &destination, thumbnail) {
        Ok(dimensions) => SyncOutcome::Created {
            entry,
            destination,
            dimensions,
        },
        Err(e) => SyncOutcome::Failed {
            path: entry.source_path,
            error: e.into(),
        },
    }
}

/// What a sync run would do with one candidate.
#[derive(Debug)]
pub enum PlanStep {
    Create {
        entry: CandidateEntry,
        destination: PathBuf,
        /// Source and thumbnail size, when the header could be read.
        dimensions: Option<(Dimensions, Dimensions)>,
    },
    Skip {
        entry: CandidateEntry,
        destination: PathBuf,
    },
    Unreadable {
        path: PathBuf,
        error: FileError,
    },
}

/// Dry run: list what [`sync`] would do, without writing anything.
pub fn plan(config: &SyncConfig) -> Result<Vec<PlanStep>, SyncError> {
    plan_with_backend(&RustBackend::new(), config)
}

/// Dry run using a specific backend (allows testing with mock).
pub fn plan_with_backend(
    backend: &impl ImageBackend,
    config: &SyncConfig,
) -> Result<Vec<PlanStep>, SyncError> {
    let (extensions, options) = prepare_walk(config)?;
    let thumbnail = config.thumbnail_config();

    let steps = walk::candidates(&config.source_root, &extensions, &options)
        .map(|item| match item {
            Err(error) => PlanStep::Unreadable {
                path: error.path().to_path_buf(),
                error: error.into(),
            },
            Ok(entry) => {
                let destination = entry.destination(&config.dest_root);
                if destination_exists(&destination) {
                    PlanStep::Skip { entry, destination }
                } else {
                    let dimensions = get_dimensions(backend, &entry.source_path)
                        .ok()
                        .map(|source| (source, thumbnail.target_for(source)));
                    PlanStep::Create {
                        entry,
                        destination,
                        dimensions,
                    }
                }
            }
        })
        .collect();

    Ok(steps)
}

/// Validate the config and the source root, and derive the walk settings.
fn prepare_walk(config: &SyncConfig) -> Result<(ExtensionSet, WalkOptions), SyncError> {
    config.validate()?;

    if !config.source_root.is_dir() {
        return Err(SyncError::SourceNotFound(config.source_root.clone()));
    }

    let exclude = nested_destination(&config.source_root, &config.dest_root);
    if exclude.is_some() && exclude == walk::resolve_path(&config.source_root) {
        return Err(SyncError::DestinationIsSource(config.dest_root.clone()));
    }

    Ok((
        config.extension_set(),
        WalkOptions {
            follow_links: config.follow_links,
            exclude,
        },
    ))
}

/// If `dest_root` lies inside `source_root` (or is it), return its resolved
/// form so the walker can prune it. Both sides are resolved first, so `..`
/// and symlinks in either spelling do not hide the nesting. Thumbnails are
/// never fed back in as sources.
fn nested_destination(source_root: &Path, dest_root: &Path) -> Option<PathBuf> {
    let source = walk::resolve_path(source_root)?;
    let dest = walk::resolve_path(dest_root)?;
    dest.starts_with(&source).then_some(dest)
}

/// Path presence only: a file, directory or dangling symlink all count.
fn destination_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

fn ensure_parent_dir(path: &Path) -> Result<(), FileError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    match fs::create_dir_all(parent) {
        Ok(()) => Ok(()),
        // Someone else created it between our attempt and now
        Err(_) if parent.is_dir() => Ok(()),
        Err(source) => Err(FileError::CreateDir {
            path: parent.to_path_buf(),
            source,
        }),
    }
}
