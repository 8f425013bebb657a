//! Sync configuration.
//!
//! Everything the walker needs is carried in one [`SyncConfig`] value that
//! is passed to [`sync`](crate::sync::sync) explicitly. The binary builds it
//! from stock defaults, an optional TOML file, and command-line flags, in
//! that order of precedence (flags win).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_root = "images"          # Tree to read images from (never modified)
//! dest_root = "thumbnails"        # Tree to mirror thumbnails into (only grows)
//! max_dimensions = [300, 300]     # Bounding box [width, height] in pixels
//! supported_extensions = [".jpg", ".jpeg", ".png", ".bmp", ".gif", ".tiff", ".webp"]
//! quality = 90                    # JPEG quality (1-100)
//! follow_links = false            # Descend into symlinked directories
//! ```
//!
//! Config files are sparse; override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Quality, ThumbnailConfig, supported_input_extensions};
use crate::walk::{DEFAULT_EXTENSIONS, ExtensionSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration for one sync run.
///
/// All fields have defaults matching a plain `images/` → `thumbnails/`
/// layout with a 300x300 bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Root of the tree to read images from.
    pub source_root: PathBuf,
    /// Root of the mirrored thumbnail tree.
    pub dest_root: PathBuf,
    /// Bounding box as `[width, height]`; thumbnails keep their aspect ratio.
    pub max_dimensions: [u32; 2],
    /// Case-insensitive file-name suffixes to process. A missing leading dot is added.
    pub supported_extensions: Vec<String>,
    /// Lossy encoding quality for JPEG outputs.
    pub quality: u32,
    /// Follow symlinked directories while walking the source tree.
    pub follow_links: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("images"),
            dest_root: PathBuf::from("thumbnails"),
            max_dimensions: [300, 300],
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            quality: 90,
            follow_links: false,
        }
    }
}

impl SyncConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimensions[0] == 0 || self.max_dimensions[1] == 0 {
            return Err(ConfigError::Validation(
                "max_dimensions values must be non-zero".into(),
            ));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }

        let extensions = self.extension_set();
        if extensions.is_empty() {
            return Err(ConfigError::Validation(
                "supported_extensions must not be empty".into(),
            ));
        }
        let codecs = supported_input_extensions();
        if let Some(unknown) = extensions
            .iter()
            .find(|suffix| !codecs.iter().any(|c| suffix.ends_with(&format!(".{c}"))))
        {
            return Err(ConfigError::Validation(format!(
                "supported_extensions: no image codec for '{unknown}'"
            )));
        }

        if self.source_root == self.dest_root {
            return Err(ConfigError::Validation(
                "dest_root must differ from source_root".into(),
            ));
        }
        Ok(())
    }

    /// The normalized extension set used for filtering.
    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::new(&self.supported_extensions)
    }

    /// Bounding box and encoding settings for the imaging layer.
    pub fn thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            max_dimensions: (self.max_dimensions[0], self.max_dimensions[1]),
            quality: Quality::new(self.quality),
        }
    }
}

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SyncConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a TOML config file, merged over stock defaults and validated.
///
/// The file must exist; a missing path is an IO error.
pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse config text, merged over stock defaults and validated.
pub fn parse_config(content: &str) -> Result<SyncConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let config: SyncConfig = merge_toml(stock_defaults_value(), overlay).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumb-sync configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
# Command-line flags override values from this file.

# Tree to read images from. Nothing under it is ever modified.
source_root = "images"

# Tree to write thumbnails into. Mirrors the source layout; files are only
# ever added. A thumbnail that already exists is skipped, never rewritten.
dest_root = "thumbnails"

# Bounding box [width, height]. Thumbnails keep the source aspect ratio and
# images already inside the box are not enlarged.
max_dimensions = [300, 300]

# File-name suffixes to process, matched case-insensitively.
# Thumbnails keep the source format and file name.
supported_extensions = [".jpg", ".jpeg", ".png", ".bmp", ".gif", ".tiff", ".webp"]

# JPEG encoding quality (1-100). Other formats ignore it.
quality = 90

# Descend into symlinked directories. Symlink cycles are detected and
# reported as failures.
follow_links = false
"##
}
