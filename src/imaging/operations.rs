//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{Quality, ThumbnailParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailConfig {
    /// Bounding box as (width, height).
    pub max_dimensions: (u32, u32),
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimensions: (300, 300),
            quality: Quality::default(),
        }
    }
}

impl ThumbnailConfig {
    /// Dimensions a source of the given size will have as a thumbnail.
    pub fn target_for(&self, source: Dimensions) -> Dimensions {
        calculate_fit_dimensions((source.width, source.height), self.max_dimensions).into()
    }
}

/// Plan a thumbnail operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    let (max_width, max_height) = config.max_dimensions;
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        max_width,
        max_height,
        quality: config.quality,
    }
}

/// Create a thumbnail of `source` at `output`.
///
/// The caller is responsible for the output directory existing.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
) -> Result<Dimensions> {
    backend.thumbnail(&plan_thumbnail(source, output, config))
}
