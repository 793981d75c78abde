// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-document — Photo documents for Pagewerk.
//
// Encodes an ordered list of photos into a PDF with one fixed-size page per
// photo (orientation fixed, scaled down to fit, centred), and decodes PDF
// pages back into raster images.

pub mod decoder;
pub mod encoder;
pub mod image;
pub mod layout;
pub mod pdf;
pub mod progress;

// Re-export the primary types so callers can use `pagewerk_document::DocumentEncoder` etc.
pub use decoder::DocumentDecoder;
pub use encoder::{DocumentEncoder, EncoderOptions};
pub use self::image::{BitmapSource, FileBitmapSource, MemoryBitmapSource, OrientationTag, SourceImage};
pub use layout::{TransformMatrix, compute_transform, fit_to_page};
pub use pdf::{PageDocument, PdfReader};
pub use progress::{NoProgress, ProgressReporter, RecordedEvent, RecordingReporter};
