//! Expense photo storage.
//!
//! [`ImageManager`] turns captured or imported photos into upright,
//! size-bounded JPEG files named `IMG_<millis>.jpg` in a private directory,
//! and retrieves, deletes and garbage-collects them. Raster work and file
//! access go through the [`ImageCodec`] and [`FileStore`] capabilities so the
//! manager can run against in-memory fakes.

mod codec;
mod manager;
mod orientation;
mod source;
mod store;

pub use codec::{fit_within, ImageCodec, ImageRsCodec};
pub use manager::{ImageManager, Inventory, InventoryEntry, StoredImage};
pub use orientation::Orientation;
pub use source::{BytesSource, ImageSource};
pub use store::{FileStore, FsFileStore, MemoryFileStore};

use std::sync::Arc;

use crate::config::Config;

/// Build a manager over the configured storage directory.
pub fn open_manager(config: &Config) -> moneytracker_common::Result<ImageManager> {
    let files = FsFileStore::open(config.storage.expanded_dir())?;
    Ok(ImageManager::new(
        Arc::new(ImageRsCodec::new()),
        Arc::new(files),
        config.images.clone(),
    ))
}
