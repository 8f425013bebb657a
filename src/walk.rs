//! Source tree traversal and candidate selection.
//!
//! Walks the source root recursively and yields one [`CandidateEntry`] per
//! regular file whose name ends with a supported extension. The walk is
//! lazy: directories are read as the iterator is advanced, and the sync
//! walker consumes entries one by one.
//!
//! ```text
//! images/                      thumbnails/
//! ├── 2023/                    ├── 2023/
//! │   ├── beach.JPG      →     │   ├── beach.JPG
//! │   └── notes.txt            │
//! └── cover.png          →     └── cover.png
//! ```
//!
//! ## Symlinks
//!
//! By default symlinked *files* are included and symlinked *directories*
//! are not descended into. With `follow_links` enabled, `walkdir` follows
//! directory links and reports a cycle as an error entry instead of
//! recursing forever; the caller records it as a failure and moves on.
//!
//! Entries come out sorted by file name within each directory so runs
//! produce stable output.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extensions recognized when no explicit set is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".gif", ".tiff", ".webp"];

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Traversal error: {source}")]
    Walk {
        /// Where the walk failed; the root when walkdir names no path.
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{path} is not under source root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl WalkError {
    fn from_walkdir(source: walkdir::Error, root: &Path) -> Self {
        let path = source.path().unwrap_or(root).to_path_buf();
        WalkError::Walk { path, source }
    }

    /// The path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            WalkError::Walk { path, .. } | WalkError::OutsideRoot { path, .. } => path,
        }
    }

    /// True when the error is a symlink cycle detected by the walker.
    pub fn is_loop(&self) -> bool {
        matches!(self, WalkError::Walk { source, .. } if source.loop_ancestor().is_some())
    }
}

/// A case-insensitive set of file-name suffixes such as `.jpg`.
///
/// Entries are normalized on construction: trimmed, lowercased, and given a
/// leading dot when missing, so `"JPG"`, `"jpg"` and `".jpg"` are the same
/// suffix. Empty entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    suffixes: Vec<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut suffixes: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().to_lowercase();
            if ext.is_empty() || ext == "." {
                continue;
            }
            let suffix = if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            };
            if !suffixes.contains(&suffix) {
                suffixes.push(suffix);
            }
        }
        Self { suffixes }
    }

    /// Whether the file name of `path` ends with one of the suffixes.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// A source file selected for thumbnailing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Path as produced by the walk (root-joined, not canonicalized).
    pub source_path: PathBuf,
    /// Path relative to the source root, file name included.
    pub relative_path: PathBuf,
}

impl CandidateEntry {
    /// Build an entry for `source_path`, which must lie under `source_root`.
    pub fn new(source_root: &Path, source_path: &Path) -> Result<Self, WalkError> {
        let relative = source_path
            .strip_prefix(source_root)
            .map_err(|_| WalkError::OutsideRoot {
                path: source_path.to_path_buf(),
                root: source_root.to_path_buf(),
            })?;
        Ok(Self {
            source_path: source_path.to_path_buf(),
            relative_path: relative.to_path_buf(),
        })
    }

    /// The mirrored location of this entry under `dest_root`.
    pub fn destination(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(&self.relative_path)
    }
}

/// Traversal options.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Descend into symlinked directories (cycles are reported, not followed).
    pub follow_links: bool,
    /// Directory to prune from the walk, in resolved form (see
    /// [`resolve_path`]). Directories are compared after resolving, so any
    /// spelling of it under the root is pruned, symlinked ones included.
    pub exclude: Option<PathBuf>,
}

/// Make `path` absolute with `..` and symlinks resolved, even when its
/// trailing components do not exist yet.
///
/// The longest existing prefix is canonicalized and the rest is appended
/// lexically, so a destination root that has not been created yet still
/// compares equal to the directory that will appear later.
pub fn resolve_path(path: &Path) -> Option<PathBuf> {
    let absolute = std::path::absolute(path).ok()?;
    let components: Vec<Component> = absolute.components().collect();

    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = prefix.canonicalize() else {
            continue;
        };
        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => resolved.push(name),
                _ => {}
            }
        }
        return Some(resolved);
    }
    None
}

fn is_same_dir(path: &Path, resolved: &Path) -> bool {
    path.canonicalize().is_ok_and(|p| p.as_path() == resolved)
}

fn is_regular_file(entry: &DirEntry) -> bool {
    let ft = entry.file_type();
    // Without follow_links a symlink reports its own type; resolve file links
    ft.is_file() || (ft.is_symlink() && entry.path().is_file())
}

/// Lazily walk `root`, yielding every supported file as a candidate.
///
/// Errors below the root (unreadable directory, symlink cycle) come out as
/// `Err` items and the walk continues with the next entry.
pub fn candidates<'a>(
    root: &'a Path,
    extensions: &'a ExtensionSet,
    options: &'a WalkOptions,
) -> impl Iterator<Item = Result<CandidateEntry, WalkError>> + 'a {
    WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| match &options.exclude {
            Some(excluded) => {
                !(entry.file_type().is_dir() && is_same_dir(entry.path(), excluded))
            }
            None => true,
        })
        .filter_map(move |entry| match entry {
            Err(e) => Some(Err(WalkError::from_walkdir(e, root))),
            Ok(entry) => {
                if !is_regular_file(&entry) || !extensions.matches(entry.path()) {
                    return None;
                }
                Some(CandidateEntry::new(root, entry.path()))
            }
        })
}
