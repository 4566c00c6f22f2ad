//! Lifecycle of expense photos in private storage.
//!
//! Every public operation absorbs its own failures: errors are logged and
//! surfaced as `None`, `false` or `0`, leaving user-facing messaging to the
//! caller.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use moneytracker_common::paths::{image_file_name, image_timestamp, is_managed_image};
use moneytracker_common::Result;
use serde::Serialize;

use super::codec::{fit_within, ImageCodec};
use super::orientation::Orientation;
use super::source::ImageSource;
use super::store::FileStore;
use crate::config::ImageSettings;

/// An image written by [`ImageManager::store`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    /// Absolute path of the JPEG file.
    pub path: PathBuf,
    /// Width after downscaling.
    pub width: u32,
    /// Height after downscaling.
    pub height: u32,
}

/// How many fresh names [`ImageManager::store`] tries before giving up.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Temp files from interrupted writes older than this are swept by cleanup.
const STALE_TEMP_AGE: Duration = Duration::from_secs(60 * 60);

/// One managed image on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Capture time encoded in the file name.
    pub created_at: Option<DateTime<Utc>>,
}

/// Snapshot of the managed images currently on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// Managed images, sorted by path.
    pub images: Vec<InventoryEntry>,
    /// Combined size of all listed images in bytes.
    pub total_bytes: u64,
}

impl Inventory {
    pub fn count(&self) -> usize {
        self.images.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.images.iter().map(|entry| entry.path.as_path())
    }
}

/// Owns the `IMG_<millis>.jpg` files in one private directory.
///
/// The directory must not be shared: any file in it matching the naming
/// convention is treated as managed, and orphan cleanup may delete it.
pub struct ImageManager {
    codec: Arc<dyn ImageCodec>,
    files: Arc<dyn FileStore>,
    settings: ImageSettings,
    last_millis: AtomicI64,
}

impl ImageManager {
    /// Create a manager over `files` using `codec` for raster work.
    pub fn new(
        codec: Arc<dyn ImageCodec>,
        files: Arc<dyn FileStore>,
        settings: ImageSettings,
    ) -> Self {
        Self {
            codec,
            files,
            settings,
            last_millis: AtomicI64::new(0),
        }
    }

    /// Directory holding the managed images.
    pub fn storage_dir(&self) -> &Path {
        self.files.root()
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Downscale, encode and persist `image`.
    ///
    /// Images larger than the configured bound on either axis are scaled down
    /// preserving aspect ratio; smaller ones keep their size. Returns `None`
    /// if encoding or writing fails, in which case no file is left behind.
    pub fn store(&self, image: &DynamicImage) -> Option<StoredImage> {
        match self.try_store(image) {
            Ok(stored) => {
                tracing::debug!(
                    "Stored image {} ({}x{})",
                    stored.path.display(),
                    stored.width,
                    stored.height
                );
                Some(stored)
            }
            Err(e) => {
                tracing::warn!("Failed to store image: {}", e);
                None
            }
        }
    }

    fn try_store(&self, image: &DynamicImage) -> Result<StoredImage> {
        let bound = self.settings.max_dimension;
        let (width, height) = fit_within(image.width(), image.height(), bound);

        // Encode fully in memory before anything touches the disk
        let bytes = if (width, height) == (image.width(), image.height()) {
            self.codec.encode_jpeg(image, self.settings.jpeg_quality)?
        } else {
            tracing::debug!(
                "Downscaling {}x{} to {}x{}",
                image.width(),
                image.height(),
                width,
                height
            );
            let resized = self.codec.resize(image, width, height);
            self.codec.encode_jpeg(&resized, self.settings.jpeg_quality)?
        };

        // Another writer may take the name between picking and writing it
        let mut attempt = 1;
        let path = loop {
            let path = self.next_path();
            match self.files.write(&path, &bytes) {
                Ok(()) => break path,
                Err(e) if e.is_already_exists() && attempt < MAX_NAME_ATTEMPTS => {
                    tracing::debug!("{} was taken, picking another name", path.display());
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        Ok(StoredImage {
            path,
            width,
            height,
        })
    }

    /// Decode content from an external source, rotate it upright and store it.
    ///
    /// An unreadable orientation tag is treated as upright. Returns `None` if
    /// the source cannot be read or decoded, or if storing fails.
    pub fn import_from_source<S>(&self, source: &S) -> Option<StoredImage>
    where
        S: ImageSource + ?Sized,
    {
        let bytes = match source.read_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read image source {}: {}", source.describe(), e);
                return None;
            }
        };

        let decoded = match self.codec.decode(&bytes) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!("Failed to decode image source {}: {}", source.describe(), e);
                return None;
            }
        };

        let orientation = self.codec.orientation(&bytes).unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to read orientation of {}, keeping as is: {}",
                source.describe(),
                e
            );
            Orientation::Normal
        });
        if orientation != Orientation::Normal {
            tracing::debug!("Correcting orientation of {}: {}", source.describe(), orientation);
        }

        self.store(&orientation.apply(decoded))
    }

    /// Import a camera capture and remove the temporary capture file.
    ///
    /// The temporary file is removed whether or not the import succeeded.
    pub fn import_capture(&self, temp_file: &Path) -> Option<StoredImage> {
        let stored = self.import_from_source(temp_file);

        match std::fs::remove_file(temp_file) {
            Ok(()) => tracing::debug!("Removed capture file {}", temp_file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove capture file {}: {}",
                temp_file.display(),
                e
            ),
        }

        stored
    }

    /// Load and decode the image at `path`.
    ///
    /// Returns `None` when the file is missing or cannot be decoded.
    pub fn retrieve(&self, path: &Path) -> Option<DynamicImage> {
        if !self.files.exists(path) {
            tracing::debug!("Image not found: {}", path.display());
            return None;
        }

        match self
            .files
            .read(path)
            .and_then(|bytes| self.codec.decode(&bytes))
        {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!("Failed to load image {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Remove the file at `path`. Returns whether a file was actually removed.
    pub fn delete(&self, path: &Path) -> bool {
        match self.files.remove(path) {
            Ok(removed) => {
                if removed {
                    tracing::debug!("Deleted image {}", path.display());
                }
                removed
            }
            Err(e) => {
                tracing::warn!("Failed to delete image {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Drop the unsaved image of an edit in progress.
    ///
    /// `current` is deleted only when it differs from `original`, the image the
    /// record had before editing started. Returns whether a file was removed.
    pub fn discard_draft(&self, current: Option<&Path>, original: Option<&Path>) -> bool {
        match current {
            Some(current) if Some(current) != original => self.delete(current),
            _ => false,
        }
    }

    /// Drop the image an edited record no longer references.
    ///
    /// Call once the edit is saved. `original` is deleted when the record had
    /// an image and it was removed or replaced by `current`. Returns whether a
    /// file was removed.
    pub fn commit_edit(&self, current: Option<&Path>, original: Option<&Path>) -> bool {
        match original {
            Some(original) if Some(original) != current => self.delete(original),
            _ => false,
        }
    }

    /// Delete every managed image whose path is not in `valid_paths`.
    ///
    /// `valid_paths` must be a complete snapshot of every referenced image;
    /// anything missing from it is deleted. Returns the number of files removed.
    pub fn cleanup_orphans<I, P>(&self, valid_paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let valid: HashSet<PathBuf> = valid_paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        let files = match self.files.list() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    "Failed to list image directory {}: {}",
                    self.storage_dir().display(),
                    e
                );
                return 0;
            }
        };

        let mut deleted = 0;
        for path in files {
            if !is_managed_image(&path) || valid.contains(&path) {
                continue;
            }
            if self.delete(&path) {
                tracing::debug!("Deleted orphan image {}", path.display());
                deleted += 1;
            }
        }

        tracing::info!("Deleted {} orphan images", deleted);

        match self.files.sweep_stale_temp(STALE_TEMP_AGE) {
            Ok(0) => {}
            Ok(swept) => tracing::info!("Removed {} stale temp files", swept),
            Err(e) => tracing::warn!("Failed to sweep stale temp files: {}", e),
        }

        deleted
    }

    /// List managed images and their combined size.
    pub fn inventory(&self) -> Inventory {
        let files = match self.files.list() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    "Failed to list image directory {}: {}",
                    self.storage_dir().display(),
                    e
                );
                return Inventory::default();
            }
        };

        let mut inventory = Inventory::default();
        for path in files.into_iter().filter(|p| is_managed_image(p)) {
            let size_bytes = match self.files.size(&path) {
                Ok(size) => size,
                Err(e) => {
                    tracing::warn!("Failed to stat {}: {}", path.display(), e);
                    0
                }
            };
            inventory.total_bytes += size_bytes;
            inventory.images.push(InventoryEntry {
                created_at: image_timestamp(&path).and_then(DateTime::from_timestamp_millis),
                path,
                size_bytes,
            });
        }
        inventory.images.sort_by(|a, b| a.path.cmp(&b.path));
        inventory
    }

    /// Pick a fresh `IMG_<millis>.jpg` path.
    ///
    /// Timestamps never repeat within this manager, and names already on
    /// disk are skipped.
    fn next_path(&self) -> PathBuf {
        let now = Utc::now().timestamp_millis();
        let mut millis = loop {
            let last = self.last_millis.load(Ordering::SeqCst);
            let candidate = now.max(last + 1);
            if self
                .last_millis
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break candidate;
            }
        };

        loop {
            let path = self.storage_dir().join(image_file_name(millis));
            if !self.files.exists(&path) {
                return path;
            }
            millis += 1;
            self.last_millis.fetch_max(millis, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::codec::ImageRsCodec;
    use crate::images::source::BytesSource;
    use crate::images::store::MemoryFileStore;
    use moneytracker_common::Error;

    /// Codec that records nothing on disk: encodes `WxH` as text.
    struct FakeCodec {
        orientation: Result<Orientation>,
    }

    impl FakeCodec {
        fn upright() -> Self {
            Self {
                orientation: Ok(Orientation::Normal),
            }
        }

        fn tagged(orientation: Orientation) -> Self {
            Self {
                orientation: Ok(orientation),
            }
        }

        fn broken_metadata() -> Self {
            Self {
                orientation: Err(Error::decode("corrupt exif")),
            }
        }
    }

    impl ImageCodec for FakeCodec {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
            let text = std::str::from_utf8(bytes).map_err(|e| Error::decode(e.to_string()))?;
            let (w, h) = text
                .split_once('x')
                .ok_or_else(|| Error::decode("not an image"))?;
            let w = w.parse().map_err(|_| Error::decode("bad width"))?;
            let h = h.parse().map_err(|_| Error::decode("bad height"))?;
            Ok(DynamicImage::new_luma8(w, h))
        }

        fn orientation(&self, _bytes: &[u8]) -> Result<Orientation> {
            match &self.orientation {
                Ok(o) => Ok(*o),
                Err(e) => Err(Error::decode(e.to_string())),
            }
        }

        fn resize(&self, _image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
            DynamicImage::new_luma8(width, height)
        }

        fn encode_jpeg(&self, image: &DynamicImage, _quality: u8) -> Result<Vec<u8>> {
            Ok(format!("{}x{}", image.width(), image.height()).into_bytes())
        }
    }

    /// Codec whose encoder always fails.
    struct FailingEncoder;

    impl ImageCodec for FailingEncoder {
        fn decode(&self, _bytes: &[u8]) -> Result<DynamicImage> {
            Err(Error::decode("unsupported"))
        }

        fn orientation(&self, _bytes: &[u8]) -> Result<Orientation> {
            Ok(Orientation::Normal)
        }

        fn resize(&self, image: &DynamicImage, _width: u32, _height: u32) -> DynamicImage {
            image.clone()
        }

        fn encode_jpeg(&self, _image: &DynamicImage, _quality: u8) -> Result<Vec<u8>> {
            Err(Error::encode("no space for encoder"))
        }
    }

    /// Store whose next `collisions` writes lose a race for the name.
    struct RacingStore {
        inner: MemoryFileStore,
        collisions: std::sync::atomic::AtomicUsize,
    }

    impl RacingStore {
        fn new(collisions: usize) -> Self {
            Self {
                inner: MemoryFileStore::new("/data/files"),
                collisions: collisions.into(),
            }
        }
    }

    impl FileStore for RacingStore {
        fn root(&self) -> &Path {
            self.inner.root()
        }

        fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.inner.read(path)
        }

        fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
            let lost = self
                .collisions
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if lost {
                // Someone else created the file first
                self.inner.insert(path, b"theirs".to_vec());
            }
            self.inner.write(path, bytes)
        }

        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }

        fn remove(&self, path: &Path) -> Result<bool> {
            self.inner.remove(path)
        }

        fn list(&self) -> Result<Vec<PathBuf>> {
            self.inner.list()
        }

        fn size(&self, path: &Path) -> Result<u64> {
            self.inner.size(path)
        }

        fn sweep_stale_temp(&self, older_than: Duration) -> Result<usize> {
            self.inner.sweep_stale_temp(older_than)
        }
    }

    fn racing_manager(collisions: usize) -> (ImageManager, Arc<RacingStore>) {
        let files = Arc::new(RacingStore::new(collisions));
        let manager = ImageManager::new(
            Arc::new(FakeCodec::upright()),
            files.clone(),
            ImageSettings::default(),
        );
        (manager, files)
    }

    fn manager_with(codec: impl ImageCodec + 'static) -> (ImageManager, Arc<MemoryFileStore>) {
        let files = Arc::new(MemoryFileStore::new("/data/files"));
        let manager = ImageManager::new(Arc::new(codec), files.clone(), ImageSettings::default());
        (manager, files)
    }

    #[test]
    fn test_store_small_image_keeps_size() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let stored = manager.store(&DynamicImage::new_luma8(1920, 1080)).unwrap();
        assert_eq!((stored.width, stored.height), (1920, 1080));
        assert_eq!(files.read(&stored.path).unwrap(), b"1920x1080");
    }

    #[test]
    fn test_store_large_image_is_bounded() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let stored = manager.store(&DynamicImage::new_luma8(4000, 3000)).unwrap();
        assert_eq!((stored.width, stored.height), (1920, 1440));
        assert_eq!(files.read(&stored.path).unwrap(), b"1920x1440");
    }

    #[test]
    fn test_store_uses_naming_convention() {
        let (manager, _files) = manager_with(FakeCodec::upright());
        let stored = manager.store(&DynamicImage::new_luma8(10, 10)).unwrap();
        assert_eq!(stored.path.parent(), Some(Path::new("/data/files")));
        assert!(is_managed_image(&stored.path));
    }

    #[test]
    fn test_store_back_to_back_names_are_unique() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let img = DynamicImage::new_luma8(5, 5);
        let paths: HashSet<PathBuf> = (0..20).map(|_| manager.store(&img).unwrap().path).collect();
        assert_eq!(paths.len(), 20);
        assert_eq!(files.len(), 20);
    }

    #[test]
    fn test_store_skips_existing_name() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let first = manager.store(&DynamicImage::new_luma8(5, 5)).unwrap();

        // Occupy the next few timestamps as if another process wrote them.
        let ts = image_timestamp(&first.path).unwrap();
        for offset in 1..=3 {
            files.insert(
                Path::new("/data/files").join(image_file_name(ts + offset)),
                b"1x1".to_vec(),
            );
        }

        let second = manager.store(&DynamicImage::new_luma8(5, 5)).unwrap();
        assert_ne!(second.path, first.path);
        assert_eq!(files.read(&second.path).unwrap(), b"5x5");
    }

    #[test]
    fn test_store_retries_when_name_is_taken() {
        let (manager, files) = racing_manager(2);
        let stored = manager.store(&DynamicImage::new_luma8(5, 5)).unwrap();
        assert_eq!(files.read(&stored.path).unwrap(), b"5x5");

        // Both lost names keep the other writer's bytes
        let theirs = files
            .list()
            .unwrap()
            .into_iter()
            .filter(|p| files.read(p).unwrap() == b"theirs")
            .count();
        assert_eq!(theirs, 2);
    }

    #[test]
    fn test_store_gives_up_after_repeated_collisions() {
        let (manager, files) = racing_manager(MAX_NAME_ATTEMPTS);
        assert!(manager.store(&DynamicImage::new_luma8(5, 5)).is_none());
        assert_eq!(files.list().unwrap().len(), MAX_NAME_ATTEMPTS);

        // The race is over, so the next store goes through
        assert!(manager.store(&DynamicImage::new_luma8(5, 5)).is_some());
    }

    #[test]
    fn test_store_encode_failure_leaves_nothing() {
        let (manager, files) = manager_with(FailingEncoder);
        assert!(manager.store(&DynamicImage::new_luma8(10, 10)).is_none());
        assert!(files.is_empty());
    }

    #[test]
    fn test_import_rotates_tagged_source() {
        let (manager, files) = manager_with(FakeCodec::tagged(Orientation::Rotate90));
        let stored = manager
            .import_from_source(&BytesSource::new("gallery", b"400x300".to_vec()))
            .unwrap();
        assert_eq!((stored.width, stored.height), (300, 400));
        assert_eq!(files.read(&stored.path).unwrap(), b"300x400");
    }

    #[test]
    fn test_import_180_keeps_axes() {
        let (manager, _files) = manager_with(FakeCodec::tagged(Orientation::Rotate180));
        let stored = manager
            .import_from_source(&BytesSource::new("gallery", b"400x300".to_vec()))
            .unwrap();
        assert_eq!((stored.width, stored.height), (400, 300));
    }

    #[test]
    fn test_import_rotates_before_bounding() {
        let (manager, _files) = manager_with(FakeCodec::tagged(Orientation::Rotate270));
        let stored = manager
            .import_from_source(&BytesSource::new("camera", b"4000x3000".to_vec()))
            .unwrap();
        assert_eq!((stored.width, stored.height), (1440, 1920));
    }

    #[test]
    fn test_import_ignores_broken_metadata() {
        let (manager, _files) = manager_with(FakeCodec::broken_metadata());
        let stored = manager
            .import_from_source(&BytesSource::new("gallery", b"400x300".to_vec()))
            .unwrap();
        assert_eq!((stored.width, stored.height), (400, 300));
    }

    #[test]
    fn test_import_undecodable_source() {
        let (manager, files) = manager_with(FakeCodec::upright());
        assert!(manager
            .import_from_source(&BytesSource::new("gallery", b"garbage".to_vec()))
            .is_none());
        assert!(files.is_empty());
    }

    #[test]
    fn test_import_unreadable_source() {
        let (manager, _files) = manager_with(FakeCodec::upright());
        let dir = tempfile::tempdir().unwrap();
        assert!(manager
            .import_from_source(dir.path().join("missing.jpg").as_path())
            .is_none());
    }

    #[test]
    fn test_import_capture_removes_temp_file() {
        let (manager, _files) = manager_with(FakeCodec::upright());
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.tmp");
        std::fs::write(&capture, b"640x480").unwrap();

        let stored = manager.import_capture(&capture).unwrap();
        assert_eq!((stored.width, stored.height), (640, 480));
        assert!(!capture.exists());
    }

    #[test]
    fn test_import_capture_removes_temp_file_on_failure() {
        let (manager, _files) = manager_with(FakeCodec::upright());
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.tmp");
        std::fs::write(&capture, b"not an image").unwrap();

        assert!(manager.import_capture(&capture).is_none());
        assert!(!capture.exists());
    }

    #[test]
    fn test_retrieve() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let stored = manager.store(&DynamicImage::new_luma8(30, 20)).unwrap();
        let img = manager.retrieve(&stored.path).unwrap();
        assert_eq!((img.width(), img.height()), (30, 20));

        assert!(manager.retrieve(Path::new("/data/files/IMG_0.jpg")).is_none());

        files.insert("/data/files/IMG_1.jpg", b"corrupt".to_vec());
        assert!(manager.retrieve(Path::new("/data/files/IMG_1.jpg")).is_none());
    }

    #[test]
    fn test_delete() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let stored = manager.store(&DynamicImage::new_luma8(3, 3)).unwrap();
        assert!(manager.delete(&stored.path));
        assert!(!manager.delete(&stored.path));
        assert!(!manager.delete(Path::new("/nowhere/IMG_5.jpg")));
        assert!(files.is_empty());
    }

    #[test]
    fn test_discard_draft() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let original = manager.store(&DynamicImage::new_luma8(3, 3)).unwrap().path;
        let draft = manager.store(&DynamicImage::new_luma8(4, 4)).unwrap().path;

        // The record's own image is never discarded.
        assert!(!manager.discard_draft(Some(original.as_path()), Some(original.as_path())));
        assert!(!manager.discard_draft(None, Some(original.as_path())));
        assert!(files.exists(&original));

        assert!(manager.discard_draft(Some(draft.as_path()), Some(original.as_path())));
        assert!(!files.exists(&draft));

        let fresh = manager.store(&DynamicImage::new_luma8(4, 4)).unwrap().path;
        assert!(manager.discard_draft(Some(fresh.as_path()), None));
    }

    #[test]
    fn test_commit_edit() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let original = manager.store(&DynamicImage::new_luma8(3, 3)).unwrap().path;
        let replacement = manager.store(&DynamicImage::new_luma8(4, 4)).unwrap().path;

        // Unchanged
        assert!(!manager.commit_edit(Some(original.as_path()), Some(original.as_path())));
        assert!(files.exists(&original));

        // Replaced
        assert!(manager.commit_edit(Some(replacement.as_path()), Some(original.as_path())));
        assert!(!files.exists(&original));
        assert!(files.exists(&replacement));

        // Removed
        assert!(manager.commit_edit(None, Some(replacement.as_path())));
        assert!(files.is_empty());

        // No image before or after
        assert!(!manager.commit_edit(None, None));
    }

    #[test]
    fn test_cleanup_orphans() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let img = DynamicImage::new_luma8(2, 2);
        let keep = manager.store(&img).unwrap().path;
        let orphan_a = manager.store(&img).unwrap().path;
        let orphan_b = manager.store(&img).unwrap().path;
        files.insert("/data/files/notes.txt", b"x".to_vec());
        files.insert("/data/files/IMG_1.png", b"x".to_vec());

        assert_eq!(manager.cleanup_orphans([&keep]), 2);
        assert!(files.exists(&keep));
        assert!(!files.exists(&orphan_a));
        assert!(!files.exists(&orphan_b));
        assert!(files.exists(Path::new("/data/files/notes.txt")));
        assert!(files.exists(Path::new("/data/files/IMG_1.png")));

        assert_eq!(manager.cleanup_orphans([&keep]), 0);
    }

    #[test]
    fn test_cleanup_orphans_empty_snapshot_deletes_all() {
        let (manager, _files) = manager_with(FakeCodec::upright());
        let img = DynamicImage::new_luma8(2, 2);
        for _ in 0..4 {
            manager.store(&img).unwrap();
        }
        assert_eq!(manager.cleanup_orphans(Vec::<PathBuf>::new()), 4);
        assert_eq!(manager.cleanup_orphans(Vec::<PathBuf>::new()), 0);
    }

    #[test]
    fn test_inventory() {
        let (manager, files) = manager_with(FakeCodec::upright());
        let a = manager.store(&DynamicImage::new_luma8(10, 10)).unwrap().path;
        let b = manager.store(&DynamicImage::new_luma8(100, 10)).unwrap().path;
        files.insert("/data/files/readme.md", b"ignored".to_vec());

        let inventory = manager.inventory();
        assert_eq!(inventory.count(), 2);
        assert_eq!(inventory.paths().collect::<Vec<_>>(), vec![a.as_path(), b.as_path()]);
        assert_eq!(inventory.images[1].size_bytes, "100x10".len() as u64);
        assert_eq!(inventory.total_bytes, ("10x10".len() + "100x10".len()) as u64);

        let created = inventory.images[0].created_at.unwrap();
        assert_eq!(Some(created.timestamp_millis()), image_timestamp(&a));
    }

    #[test]
    fn test_inventory_created_at_from_name() {
        let (manager, files) = manager_with(FakeCodec::upright());
        files.insert("/data/files/IMG_1700000000000.jpg", b"x".to_vec());

        let inventory = manager.inventory();
        let created = inventory.images[0].created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_real_codec_roundtrip() {
        let files = Arc::new(MemoryFileStore::new("/data/files"));
        let manager = ImageManager::new(
            Arc::new(ImageRsCodec::new()),
            files.clone(),
            ImageSettings::default(),
        );
        let stored = manager.store(&DynamicImage::new_rgb8(64, 48)).unwrap();
        let bytes = files.read(&stored.path).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));

        let img = manager.retrieve(&stored.path).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }
}
