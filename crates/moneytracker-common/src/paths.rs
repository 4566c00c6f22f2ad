//! Naming convention for images owned by the image manager.
//!
//! The storage directory has no manifest: every regular file directly inside it
//! named `IMG_<epoch-millis>.jpg` belongs to the manager, and nothing else does.

use std::path::Path;

/// Filename prefix of managed images.
pub const IMAGE_PREFIX: &str = "IMG_";

/// Filename extension of managed images (without the dot).
pub const IMAGE_EXTENSION: &str = "jpg";

/// Build the filename for an image created at `millis` since the Unix epoch.
///
/// # Examples
///
/// ```
/// use moneytracker_common::paths::image_file_name;
///
/// assert_eq!(image_file_name(1_700_000_000_123), "IMG_1700000000123.jpg");
/// ```
#[must_use]
pub fn image_file_name(millis: i64) -> String {
    format!("{}{}.{}", IMAGE_PREFIX, millis, IMAGE_EXTENSION)
}

/// Check whether a path's filename follows the managed image convention.
///
/// Only the prefix and extension are checked, so files written by older
/// installs with other timestamp widths are still recognised.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use moneytracker_common::paths::is_managed_image;
///
/// assert!(is_managed_image(Path::new("/data/IMG_1700000000123.jpg")));
/// assert!(!is_managed_image(Path::new("/data/receipt.jpg")));
/// assert!(!is_managed_image(Path::new("/data/IMG_1700000000123.png")));
/// ```
pub fn is_managed_image(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(IMAGE_PREFIX) && name.ends_with(&format!(".{}", IMAGE_EXTENSION))
}

/// Extract the creation timestamp encoded in a managed image filename.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use moneytracker_common::paths::image_timestamp;
///
/// assert_eq!(image_timestamp(Path::new("IMG_42.jpg")), Some(42));
/// assert_eq!(image_timestamp(Path::new("IMG_x.jpg")), None);
/// ```
pub fn image_timestamp(path: &Path) -> Option<i64> {
    if !is_managed_image(path) {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(IMAGE_PREFIX)?
        .parse()
        .ok()
}
