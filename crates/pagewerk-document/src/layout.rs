// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout — fit an image into a fixed page: scale down only, keep the
// aspect ratio, centre the result.

use pagewerk_core::PageSize;

/// Placement of one image on a page.
///
/// Offsets are measured from the page's top-left corner in page pixels. The
/// scaled dimensions are truncated to whole pixels, so the placed rectangle is
/// always pixel aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    /// Uniform scale factor applied to both axes. Never greater than 1.0.
    pub scale: f32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub tx: u32,
    pub ty: u32,
}

impl TransformMatrix {
    /// Whether the image is drawn at its native size.
    pub fn is_identity_scale(&self) -> bool {
        self.scale >= 1.0
    }

    /// Vertical offset of the image's bottom edge for a bottom-left origin
    /// (PDF user space) on a page `page_height` tall.
    pub fn pdf_y(&self, page_height: u32) -> u32 {
        page_height - self.ty - self.scaled_height
    }
}

/// Compute the transform that fits an `image_width` x `image_height` image on
/// an `page_width` x `page_height` page.
///
/// All four dimensions must be non-zero; callers validate this. The image is
/// never enlarged. When it does not fit, the largest factor that makes both
/// dimensions fit is used.
pub fn compute_transform(
    image_width: u32,
    image_height: u32,
    page_width: u32,
    page_height: u32,
) -> TransformMatrix {
    let (scale, scaled_width, scaled_height) =
        if image_width <= page_width && image_height <= page_height {
            (1.0f32, image_width, image_height)
        } else {
            let ratio_w = page_width as f32 / image_width as f32;
            let ratio_h = page_height as f32 / image_height as f32;
            let ratio = ratio_w.min(ratio_h);
            // f32 rounding can push a product a hair over the page edge.
            let fit = |dim: u32, bound: u32| ((dim as f32 * ratio) as u32).clamp(1, bound);
            (
                ratio,
                fit(image_width, page_width),
                fit(image_height, page_height),
            )
        };

    TransformMatrix {
        scale,
        scaled_width,
        scaled_height,
        tx: (page_width - scaled_width) / 2,
        ty: (page_height - scaled_height) / 2,
    }
}

/// [`compute_transform`] against a [`PageSize`].
pub fn fit_to_page(image_width: u32, image_height: u32, page: PageSize) -> TransformMatrix {
    compute_transform(image_width, image_height, page.width, page.height)
}
