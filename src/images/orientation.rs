//! EXIF orientation handling.

use image::DynamicImage;

/// Rotation needed to display a decoded image upright.
///
/// Only the pure rotations are corrected. Mirrored EXIF orientations are
/// treated as [`Orientation::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Upright, or no orientation tag.
    #[default]
    Normal,
    /// Rotate 90 degrees clockwise (EXIF value 6).
    Rotate90,
    /// Rotate 180 degrees (EXIF value 3).
    Rotate180,
    /// Rotate 270 degrees clockwise (EXIF value 8).
    Rotate270,
}

impl Orientation {
    /// Clockwise rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Normal => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    /// Rotate `image` upright.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::Rotate90 => image.rotate90(),
            Self::Rotate180 => image.rotate180(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

impl From<image::metadata::Orientation> for Orientation {
    fn from(value: image::metadata::Orientation) -> Self {
        use image::metadata::Orientation as Exif;
        match value {
            Exif::Rotate90 => Self::Rotate90,
            Exif::Rotate180 => Self::Rotate180,
            Exif::Rotate270 => Self::Rotate270,
            _ => Self::Normal,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            other => write!(f, "rotate {}", other.degrees()),
        }
    }
}
