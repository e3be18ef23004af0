use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};

/// Decoded RGBA8 image. Cloning shares the pixel data.
#[derive(Clone)]
pub struct Image {
    inner: Arc<ImageData>,
}

struct ImageData {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Image {
    /// Wraps raw RGBA8 pixels; `None` when the buffer does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if rgba.len() != expected {
            return None;
        }
        Some(Self {
            inner: Arc::new(ImageData {
                width,
                height,
                rgba,
            }),
        })
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            rgba.extend_from_slice(&color);
        }
        Self {
            inner: Arc::new(ImageData {
                width,
                height,
                rgba,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.inner.rgba
    }

    pub fn ptr_eq(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .finish()
    }
}

/// One named image to load, relative to the asset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetSpec {
    pub name: &'static str,
    pub path: &'static str,
}

impl AssetSpec {
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self { name, path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLoadFailure {
    pub name: String,
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for AssetLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.name,
            self.path.display(),
            self.reason
        )
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{} of {total} assets failed to load", .failures.len())]
    LoadFailed {
        total: usize,
        failures: Vec<AssetLoadFailure>,
    },
    #[error("asset '{0}' is not part of the loaded batch")]
    UnknownAsset(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetPathError {
    #[error("asset path must not be empty")]
    Empty,
    #[error("asset path must be relative")]
    Absolute,
    #[error("asset path must not contain '\\\\'")]
    Backslash,
    #[error("asset path must not contain '..'")]
    ParentTraversal,
    #[error("asset path must end in .png")]
    UnsupportedExtension,
}

/// A fully loaded batch of images. Only obtainable through [`AssetManager::load_all`],
/// so every lookup happens after the whole batch has been joined.
#[derive(Debug, Default)]
pub struct AssetManager {
    images: HashMap<&'static str, Image>,
}

impl AssetManager {
    /// Decodes every asset on its own scoped thread and joins the batch. Fails as a
    /// whole if any single asset fails, reporting every failure.
    pub fn load_all(asset_root: &Path, specs: &[AssetSpec]) -> Result<Self, AssetError> {
        let outcomes: Vec<(AssetSpec, PathBuf, Result<Image, String>)> = thread::scope(|scope| {
            let pending: Vec<_> = specs
                .iter()
                .map(|spec| {
                    let path = asset_root.join(spec.path);
                    let handle = validate_asset_path(spec.path)
                        .map_err(|error| format!("invalid_path:{error}"))
                        .map(|()| {
                            let path = path.clone();
                            scope.spawn(move || load_image_rgba(&path))
                        });
                    (*spec, path, handle)
                })
                .collect();

            pending
                .into_iter()
                .map(|(spec, path, handle)| {
                    let outcome = handle.and_then(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|_| Err("decode_thread_panicked".to_string()))
                    });
                    (spec, path, outcome)
                })
                .collect()
        });

        let mut images = HashMap::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (spec, path, outcome) in outcomes {
            match outcome {
                Ok(_) if images.contains_key(spec.name) => failures.push(AssetLoadFailure {
                    name: spec.name.to_string(),
                    path,
                    reason: "duplicate_name".to_string(),
                }),
                Ok(image) => {
                    images.insert(spec.name, image);
                }
                Err(reason) => {
                    warn!(
                        asset = spec.name,
                        path = %path.display(),
                        reason = reason.as_str(),
                        "asset_load_failed"
                    );
                    failures.push(AssetLoadFailure {
                        name: spec.name.to_string(),
                        path,
                        reason,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(AssetError::LoadFailed {
                total: specs.len(),
                failures,
            });
        }

        info!(
            asset_count = images.len(),
            asset_root = %asset_root.display(),
            "assets_loaded"
        );
        Ok(Self { images })
    }

    pub fn get(&self, name: &str) -> Result<&Image, AssetError> {
        self.images
            .get(name)
            .ok_or_else(|| AssetError::UnknownAsset(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub(crate) fn validate_asset_path(path: &str) -> Result<(), AssetPathError> {
    if path.is_empty() {
        return Err(AssetPathError::Empty);
    }
    if path.starts_with('/') || Path::new(path).is_absolute() {
        return Err(AssetPathError::Absolute);
    }
    if path.contains('\\') {
        return Err(AssetPathError::Backslash);
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(AssetPathError::ParentTraversal);
    }
    if !path.ends_with(".png") {
        return Err(AssetPathError::UnsupportedExtension);
    }
    Ok(())
}

fn load_image_rgba(path: &Path) -> Result<Image, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    Image::from_rgba(width, height, image.into_raw())
        .ok_or_else(|| "decode_failed:pixel buffer size mismatch".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path, relative: &str, width: u32, height: u32) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dirs");
        }
        RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
            .save(&path)
            .expect("write png");
    }

    #[test]
    fn loads_whole_batch_and_reports_dimensions() {
        let dir = TempDir::new().expect("tempdir");
        write_png(dir.path(), "player_run_1.png", 12, 20);
        write_png(dir.path(), "tiles/background.png", 64, 8);

        let assets = AssetManager::load_all(
            dir.path(),
            &[
                AssetSpec::new("playerRun1", "player_run_1.png"),
                AssetSpec::new("background", "tiles/background.png"),
            ],
        )
        .expect("batch loads");

        assert_eq!(assets.len(), 2);
        let run = assets.get("playerRun1").expect("run frame");
        assert_eq!((run.width(), run.height()), (12, 20));
        assert_eq!(run.rgba()[..4], [200, 40, 40, 255]);
        let background = assets.get("background").expect("background");
        assert_eq!((background.width(), background.height()), (64, 8));
    }

    #[test]
    fn single_missing_file_fails_the_batch() {
        let dir = TempDir::new().expect("tempdir");
        write_png(dir.path(), "present.png", 4, 4);

        let error = AssetManager::load_all(
            dir.path(),
            &[
                AssetSpec::new("present", "present.png"),
                AssetSpec::new("missing", "missing.png"),
            ],
        )
        .expect_err("batch must fail");

        match error {
            AssetError::LoadFailed { total, failures } => {
                assert_eq!(total, 2);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].name, "missing");
                assert!(failures[0].reason.starts_with("file_open_failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undecodable_file_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("broken.png"), b"not a png").expect("write");

        let error = AssetManager::load_all(dir.path(), &[AssetSpec::new("broken", "broken.png")])
            .expect_err("batch must fail");
        let AssetError::LoadFailed { failures, .. } = error else {
            panic!("expected aggregate failure");
        };
        assert!(failures[0].reason.starts_with("decode_failed"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        write_png(dir.path(), "a.png", 2, 2);
        write_png(dir.path(), "b.png", 2, 2);

        let error = AssetManager::load_all(
            dir.path(),
            &[AssetSpec::new("rock", "a.png"), AssetSpec::new("rock", "b.png")],
        )
        .expect_err("duplicate names");
        let AssetError::LoadFailed { failures, .. } = error else {
            panic!("expected aggregate failure");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reason, "duplicate_name");
    }

    #[test]
    fn unknown_name_lookup_is_an_error() {
        let assets = AssetManager::default();
        assert!(matches!(
            assets.get("nope"),
            Err(AssetError::UnknownAsset(name)) if name == "nope"
        ));
    }

    #[test]
    fn asset_path_validation() {
        for path in ["player.png", "obstacles/rock_1.png"] {
            assert!(validate_asset_path(path).is_ok(), "path={path}");
        }
        assert_eq!(validate_asset_path(""), Err(AssetPathError::Empty));
        assert_eq!(validate_asset_path("/etc/x.png"), Err(AssetPathError::Absolute));
        assert_eq!(validate_asset_path(r"a\b.png"), Err(AssetPathError::Backslash));
        assert_eq!(
            validate_asset_path("../x.png"),
            Err(AssetPathError::ParentTraversal)
        );
        assert_eq!(
            validate_asset_path("x.jpg"),
            Err(AssetPathError::UnsupportedExtension)
        );
    }

    #[test]
    fn from_rgba_rejects_mismatched_buffer() {
        assert!(Image::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Image::from_rgba(2, 2, vec![0; 16]).is_some());
    }
}
