//! # thumb-sync
//!
//! Mirror a directory tree of images as a tree of downsized thumbnails.
//! The destination keeps the source layout, file names and formats; files
//! whose thumbnail already exists are skipped, so re-running after adding
//! photos only does the new work.
//!
//! ```text
//! images/                          thumbnails/
//! ├── cover.png          ──▶       ├── cover.png          (fits 300x300)
//! ├── 2023/                        ├── 2023/
//! │   ├── beach.JPG      ──▶       │   ├── beach.JPG
//! │   ├── notes.txt                │
//! │   └── summer/                  │   └── summer/
//! │       └── dune.webp  ──▶       │       └── dune.webp
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sync`] | The walker: skip / create / fail per file, summary counts, dry-run plan |
//! | [`walk`] | Lazy recursive traversal, extension filtering, source → destination mapping |
//! | [`imaging`] | Pure-Rust decode, fit-inside resize and encode behind the [`imaging::ImageBackend`] trait |
//! | [`config`] | [`config::SyncConfig`]: defaults, TOML loading, validation |
//! | [`output`] | CLI output formatting: one line per file plus a summary |
//!
//! # Design Decisions
//!
//! ## Existence Is the Only Freshness Check
//!
//! A thumbnail that exists is never touched again: no hashing, no mtime
//! comparison. The destination only ever grows, and a second run over an
//! unchanged tree performs no writes. To rebuild a thumbnail, delete it.
//!
//! ## Per-File Outcomes, Not Per-File Exceptions
//!
//! Every candidate produces a [`sync::SyncOutcome`]: created, skipped, or
//! failed with the error that stopped it. A corrupt image is one `Failed`
//! line in the output; the run continues and only a missing source root or
//! an invalid config aborts it.
//!
//! ## No Half-Written Thumbnails
//!
//! Encoders write into a hidden temp file beside the target and rename it
//! into place on success. Because existence gates re-creation, a truncated
//! file at the final path would otherwise be skipped forever.
//!
//! ## Same Format In, Same Format Out
//!
//! A `.png` produces a `.png`, a `.JPG` a `.JPG`. There is no format
//! conversion; the output path is the source's relative path under the
//! destination root, verbatim.

pub mod config;
pub mod imaging;
pub mod output;
pub mod sync;
pub mod walk;
