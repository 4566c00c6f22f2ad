//! Shared fixtures for integration tests.
//!
//! Builds real JPEG bytes (optionally carrying an EXIF orientation tag) and
//! image managers over temporary directories.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use moneytracker::config::ImageSettings;
use moneytracker::images::{FsFileStore, ImageManager, ImageRsCodec};
use tempfile::TempDir;

/// A manager over a fresh temporary directory.
pub struct TestStorage {
    pub dir: TempDir,
    pub manager: ImageManager,
}

impl TestStorage {
    pub fn new() -> Self {
        Self::with_settings(ImageSettings::default())
    }

    pub fn with_settings(settings: ImageSettings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = FsFileStore::open(dir.path().join("files")).unwrap();
        let manager = ImageManager::new(Arc::new(ImageRsCodec::new()), Arc::new(files), settings);
        Self { dir, manager }
    }

    pub fn root(&self) -> &Path {
        self.manager.storage_dir()
    }

    /// Names of every file currently in the storage directory.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// A raster with a left-to-right gradient so orientation changes are visible.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, _| {
        let v = (x * 255 / width.max(1)) as u8;
        Rgb([v, 64, 255 - v])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encode a raster in the given format.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// JPEG bytes of `width` x `height` carrying EXIF orientation `orientation`.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = encode(&gradient(width, height), ImageFormat::Jpeg);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    // Little-endian TIFF header with a single IFD entry: Orientation (0x0112), SHORT.
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2A\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
