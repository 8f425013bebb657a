//! Pure Rust image processing backend.
//!
//! All codecs are statically linked into the binary; no system image
//! libraries are needed.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, BMP, GIF, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (configurable quality) |
//! | Encode → others | `image::DynamicImage::write_to` (lossless encoders) |
//! | Atomic write | `tempfile::NamedTempFile` in the target directory, then `persist_noclobber` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{Quality, ThumbnailParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions the backend maps to a container format, in both directions.
///
/// The output format is always taken from the output path, and the sync
/// walker copies the source file name verbatim, so a `.png` in yields a
/// `.png` out.
const FORMAT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    FORMAT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled() && fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the extensions (lowercase, no dot) that can be both decoded and
/// re-encoded with the codecs compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the container format for a path from its extension.
fn format_for(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    FORMAT_CANDIDATES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| BackendError::UnsupportedFormat(path.to_path_buf()))
}

/// Load and decode an image from disk.
///
/// The decoder is picked from the file content, falling back to the
/// extension, so a mislabeled file still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode `img` into `writer` as `format`.
fn encode_image<W: Write + std::io::Seek>(
    img: &DynamicImage,
    writer: &mut W,
    format: ImageFormat,
    quality: Quality,
) -> image::ImageResult<()> {
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
            // JPEG has no alpha channel and no 16-bit mode
            match img {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                    img.write_with_encoder(encoder)
                }
                other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder),
            }
        }
        other => img.write_to(writer, other),
    }
}

/// Encode and save `img` at `path` without ever exposing a partial file.
///
/// The image is written to a hidden temp file in the destination directory
/// and renamed over `path` only after the encoder finished successfully.
/// On any error the temp file is removed when it goes out of scope.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = format_for(path)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".thumb-sync-")
        .suffix(".part")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode_image(img, &mut writer, format, quality).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to encode {} as {:?}: {}",
                path.display(),
                format,
                e
            ))
        })?;
        writer.flush()?;
    }

    // Temp files are created owner-only; thumbnails should read like any other file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    // Never replace a thumbnail that appeared while we were encoding
    tmp.persist_noclobber(path)
        .map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        // Fail before decoding if the result could not be written anyway
        format_for(&params.output)?;

        let img = load_image(&params.source)?;
        let (src_w, src_h) = (img.width(), img.height());
        let (w, h) = calculate_fit_dimensions((src_w, src_h), (params.max_width, params.max_height));

        let thumb = if (w, h) == (src_w, src_h) {
            img
        } else {
            img.resize_exact(w, h, FilterType::Lanczos3)
        };

        save_image(&thumb, &params.output, params.quality)?;
        Ok(Dimensions {
            width: w,
            height: h,
        })
    }
}
