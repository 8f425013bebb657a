//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the target size and output path) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock)
//! without changing the sync logic.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ThumbnailParams`]: full specification for a thumbnail: source, output, bounding box, quality.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
///
/// Only formats with a lossy encoder (JPEG) use it; lossless formats ignore it.
/// The only way in is [`Quality::new`], which clamps:
///
/// ```compile_fail
/// let quality = thumb_sync::imaging::Quality(250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a thumbnail operation (decode, fit inside a box, encode).
///
/// The output container format follows the output path's extension, which
/// the sync walker always copies from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box; the result fits inside it with the source aspect ratio.
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}
