//! End-to-end sync runs over real image files.
//!
//! Every test builds a small source tree in a temp dir, runs the real
//! `RustBackend` through `thumb_sync::sync::sync`, and inspects the
//! resulting thumbnail tree on disk.

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thumb_sync::config::SyncConfig;
use thumb_sync::sync::{self, SyncOutcome, SyncSummary};

struct Tree {
    _tmp: TempDir,
    source: PathBuf,
    dest: PathBuf,
}

impl Tree {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("images");
        let dest = tmp.path().join("thumbnails");
        fs::create_dir_all(&source).unwrap();
        Self {
            _tmp: tmp,
            source,
            dest,
        }
    }

    fn config(&self) -> SyncConfig {
        SyncConfig {
            source_root: self.source.clone(),
            dest_root: self.dest.clone(),
            ..Default::default()
        }
    }

    /// Write a gradient image at `rel` under the source root. The format
    /// follows the file extension.
    fn image(&self, rel: &str, width: u32, height: u32) -> PathBuf {
        let path = self.source.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        img.save(&path).unwrap();
        path
    }

    /// Same as [`Tree::image`] but with a varying alpha channel.
    fn rgba_image(&self, rel: &str, width: u32, height: u32) -> PathBuf {
        let path = self.source.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 64, ((x * y) % 256) as u8])
        });
        img.save(&path).unwrap();
        path
    }

    fn file(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.source.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn thumb(&self, rel: &str) -> PathBuf {
        self.dest.join(rel)
    }

    fn run(&self) -> SyncSummary {
        sync::sync(&self.config(), None).unwrap()
    }
}

fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

#[test]
fn wide_image_fits_bounding_box() {
    let tree = Tree::new();
    tree.image("wide.png", 2000, 1000);

    let summary = tree.run();

    assert_eq!(summary.created, 1);
    assert_eq!(dimensions(&tree.thumb("wide.png")), (300, 150));
}

#[test]
fn aspect_ratio_is_preserved_within_a_pixel() {
    let tree = Tree::new();
    tree.image("odd.png", 1234, 567);

    tree.run();

    let (w, h) = dimensions(&tree.thumb("odd.png"));
    assert_eq!(w, 300);
    let expected_h = 567.0 * 300.0 / 1234.0;
    assert!((h as f64 - expected_h).abs() <= 1.0, "got height {h}");
}

#[test]
fn small_image_is_not_enlarged() {
    let tree = Tree::new();
    tree.image("small.png", 100, 50);

    tree.run();

    assert_eq!(dimensions(&tree.thumb("small.png")), (100, 50));
}

#[test]
fn tree_structure_and_formats_are_mirrored() {
    let tree = Tree::new();
    tree.image("cover.png", 400, 400);
    tree.image("2023/beach.JPG", 600, 400);
    tree.image("2023/summer/dune.bmp", 500, 500);
    tree.image("2024/spin.gif", 450, 300);
    tree.image("2024/scan.tiff", 450, 300);
    tree.image("2024/web.webp", 450, 300);
    tree.file("2023/notes.txt", b"not an image");

    let summary = tree.run();

    assert_eq!(summary.created, 6);
    assert_eq!(summary.failed, 0);
    assert!(!tree.thumb("2023/notes.txt").exists());

    let format = |rel: &str| {
        image::ImageReader::open(tree.thumb(rel))
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format()
    };
    assert_eq!(format("cover.png"), Some(ImageFormat::Png));
    assert_eq!(format("2023/beach.JPG"), Some(ImageFormat::Jpeg));
    assert_eq!(format("2023/summer/dune.bmp"), Some(ImageFormat::Bmp));
    assert_eq!(format("2024/spin.gif"), Some(ImageFormat::Gif));
    assert_eq!(format("2024/scan.tiff"), Some(ImageFormat::Tiff));
    assert_eq!(format("2024/web.webp"), Some(ImageFormat::WebP));

    assert_eq!(dimensions(&tree.thumb("cover.png")), (300, 300));
    assert_eq!(dimensions(&tree.thumb("2023/beach.JPG")), (300, 200));
    assert_eq!(dimensions(&tree.thumb("2023/summer/dune.bmp")), (300, 300));
    for rel in ["2024/spin.gif", "2024/scan.tiff", "2024/web.webp"] {
        assert_eq!(dimensions(&tree.thumb(rel)), (300, 200), "{rel}");
    }
}

#[test]
fn alpha_and_deep_sources_keep_their_format() {
    let tree = Tree::new();
    tree.rgba_image("alpha.gif", 450, 300);
    tree.rgba_image("alpha.webp", 450, 300);
    tree.rgba_image("alpha.png", 450, 300);
    let deep: ImageBuffer<Rgb<u16>, Vec<u16>> =
        ImageBuffer::from_fn(450, 300, |x, y| Rgb([(x * 100) as u16, (y * 200) as u16, 4096]));
    deep.save(tree.source.join("deep.tiff")).unwrap();
    deep.save(tree.source.join("deep.png")).unwrap();

    let summary = tree.run();

    assert_eq!(
        summary,
        SyncSummary {
            created: 5,
            skipped: 0,
            failed: 0,
        }
    );
    let cases = [
        ("alpha.gif", ImageFormat::Gif),
        ("alpha.webp", ImageFormat::WebP),
        ("alpha.png", ImageFormat::Png),
        ("deep.tiff", ImageFormat::Tiff),
        ("deep.png", ImageFormat::Png),
    ];
    for (rel, expected) in cases {
        let reader = image::ImageReader::open(tree.thumb(rel))
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(expected), "{rel}");
        let decoded = reader.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200), "{rel}");
    }
}

#[test]
fn corrupt_file_fails_alone() {
    let tree = Tree::new();
    for i in 0..9 {
        tree.image(&format!("ok_{i}.png"), 64, 48);
    }
    tree.file("broken.jpg", b"\xFF\xD8 definitely not a jpeg");

    let (tx, rx) = std::sync::mpsc::channel();
    let summary = sync::sync(&tree.config(), Some(tx)).unwrap();
    let outcomes: Vec<SyncOutcome> = rx.iter().collect();

    assert_eq!(
        summary,
        SyncSummary {
            created: 9,
            skipped: 0,
            failed: 1,
        }
    );
    assert_eq!(outcomes.len(), 10);
    let failed: Vec<&Path> = outcomes
        .iter()
        .filter_map(|o| match o {
            SyncOutcome::Failed { path, .. } => Some(path.as_path()),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![tree.source.join("broken.jpg").as_path()]);
    assert!(!tree.thumb("broken.jpg").exists());

    let leftovers: Vec<_> = fs::read_dir(&tree.dest)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
}

#[test]
fn second_run_skips_everything_and_writes_nothing() {
    let tree = Tree::new();
    tree.image("a.png", 800, 600);
    tree.image("nested/b.jpg", 640, 480);

    let first = tree.run();
    assert_eq!(first.created, 2);

    let before_a = fs::read(tree.thumb("a.png")).unwrap();
    let before_b = fs::read(tree.thumb("nested/b.jpg")).unwrap();
    let mtime = fs::metadata(tree.thumb("a.png")).unwrap().modified().unwrap();

    let second = tree.run();

    assert_eq!(
        second,
        SyncSummary {
            created: 0,
            skipped: 2,
            failed: 0,
        }
    );
    assert_eq!(fs::read(tree.thumb("a.png")).unwrap(), before_a);
    assert_eq!(fs::read(tree.thumb("nested/b.jpg")).unwrap(), before_b);
    assert_eq!(
        fs::metadata(tree.thumb("a.png")).unwrap().modified().unwrap(),
        mtime
    );
}

#[test]
fn new_source_image_is_picked_up_on_rerun() {
    let tree = Tree::new();
    tree.image("a.png", 400, 400);
    tree.run();

    tree.image("b.png", 400, 400);
    let summary = tree.run();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
    assert!(tree.thumb("b.png").is_file());
}

#[test]
fn existing_stub_is_never_overwritten() {
    let tree = Tree::new();
    tree.image("x.jpg", 800, 800);
    fs::create_dir_all(&tree.dest).unwrap();
    fs::write(tree.thumb("x.jpg"), b"").unwrap();

    let summary = tree.run();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(fs::metadata(tree.thumb("x.jpg")).unwrap().len(), 0);
}

#[test]
fn source_tree_is_untouched() {
    let tree = Tree::new();
    let src = tree.image("photo.png", 900, 300);
    let before = fs::read(&src).unwrap();

    tree.run();

    assert_eq!(fs::read(&src).unwrap(), before);
    let names: Vec<_> = fs::read_dir(&tree.source)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1);
}

#[test]
fn missing_source_root_is_fatal() {
    let tree = Tree::new();
    let config = SyncConfig {
        source_root: tree.source.join("does-not-exist"),
        ..tree.config()
    };

    let result = sync::sync(&config, None);

    assert!(matches!(result, Err(sync::SyncError::SourceNotFound(_))));
    assert!(!tree.dest.exists());
}

#[test]
fn custom_bounds_apply() {
    let tree = Tree::new();
    tree.image("tall.png", 500, 1000);
    let config = SyncConfig {
        max_dimensions: [100, 100],
        ..tree.config()
    };

    sync::sync(&config, None).unwrap();

    assert_eq!(dimensions(&tree.thumb("tall.png")), (50, 100));
}

#[test]
fn plan_reports_without_writing() {
    let tree = Tree::new();
    tree.image("a.png", 600, 300);

    let steps = sync::plan(&tree.config()).unwrap();

    assert_eq!(steps.len(), 1);
    match &steps[0] {
        sync::PlanStep::Create {
            dimensions: Some((source, thumb)),
            ..
        } => {
            assert_eq!((source.width, source.height), (600, 300));
            assert_eq!((thumb.width, thumb.height), (300, 150));
        }
        other => panic!("expected create step, got {other:?}"),
    }
    assert!(!tree.dest.exists());
}
