//! Raster codec capability and its `image`-crate implementation.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use moneytracker_common::{Error, Result};

use super::orientation::Orientation;

/// Decode, inspect, resize and encode rasters.
///
/// Injected into [`ImageManager`](super::ImageManager) so tests can swap in a
/// fake without touching real image data.
pub trait ImageCodec: Send + Sync {
    /// Decode encoded image bytes into a raster.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Read the EXIF orientation of encoded image bytes.
    ///
    /// Returns [`Orientation::Normal`] when the image carries no tag.
    fn orientation(&self, bytes: &[u8]) -> Result<Orientation>;

    /// Scale `image` to exactly `width` x `height`.
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Encode `image` as JPEG at `quality` (1-100).
    fn encode_jpeg(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct ImageRsCodec {
    filter: FilterType,
}

impl ImageRsCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl Default for ImageRsCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| Error::decode(e.to_string()))
    }

    fn orientation(&self, bytes: &[u8]) -> Result<Orientation> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let mut decoder = reader
            .into_decoder()
            .map_err(|e| Error::decode(e.to_string()))?;
        let orientation = decoder
            .orientation()
            .map_err(|e| Error::decode(format!("Failed to read orientation: {}", e)))?;
        Ok(orientation.into())
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, self.filter)
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        if !(1..=100).contains(&quality) {
            return Err(Error::invalid_input(format!(
                "JPEG quality must be between 1 and 100, got {}",
                quality
            )));
        }

        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode_image(&rgb)
            .map_err(|e| Error::encode(e.to_string()))?;
        Ok(buf)
    }
}

/// Compute the size of `width` x `height` once fitted inside a square bound.
///
/// Images already within the bound keep their size. Larger ones are scaled by
/// `min(bound / width, bound / height)`: the longer side becomes `bound` and
/// the shorter one is truncated, never going below one pixel.
pub fn fit_within(width: u32, height: u32, bound: u32) -> (u32, u32) {
    if width <= bound && height <= bound {
        return (width, height);
    }

    // Integer math so the long side lands exactly on the bound.
    let shrink = |short: u32, long: u32| {
        let scaled = u64::from(short) * u64::from(bound) / u64::from(long);
        (scaled as u32).max(1)
    };
    if width >= height {
        (bound, shrink(height, width))
    } else {
        (shrink(width, height), bound)
    }
}
