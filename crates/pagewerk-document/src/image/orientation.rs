// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation normalisation — turn a decoded photo upright according to the
// EXIF orientation recorded by the camera.

use image::DynamicImage;
use image::metadata::Orientation;
use tracing::debug;

/// Clockwise rotation needed to display an image upright.
///
/// Mirrored EXIF orientations are folded into the nearest rotation; the
/// mirror itself is not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrientationTag {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl OrientationTag {
    /// Map an EXIF `Orientation` (tag 0x0112) value. Unknown values are
    /// treated as upright.
    pub fn from_exif(value: u16) -> Self {
        match value {
            3 | 4 => Self::Rotate180,
            5 | 6 => Self::Rotate90,
            7 | 8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Clockwise rotation in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Normal => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    /// Whether normalising swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }
}

impl From<Orientation> for OrientationTag {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::NoTransforms | Orientation::FlipHorizontal => Self::Normal,
            Orientation::Rotate90 | Orientation::Rotate90FlipH => Self::Rotate90,
            Orientation::Rotate180 | Orientation::FlipVertical => Self::Rotate180,
            Orientation::Rotate270 | Orientation::Rotate270FlipH => Self::Rotate270,
        }
    }
}

/// Rotate `image` upright.
///
/// `Normal` hands the same buffer straight back. Any other tag consumes the
/// input and returns a freshly allocated, rotated buffer; the original is
/// dropped before this function returns.
pub fn normalize(image: DynamicImage, tag: OrientationTag) -> DynamicImage {
    if tag == OrientationTag::Normal {
        return image;
    }

    debug!(
        degrees = tag.degrees(),
        width = image.width(),
        height = image.height(),
        "Normalising orientation"
    );

    match tag {
        OrientationTag::Rotate90 => image.rotate90(),
        OrientationTag::Rotate180 => image.rotate180(),
        OrientationTag::Rotate270 => image.rotate270(),
        OrientationTag::Normal => image,
    }
}
