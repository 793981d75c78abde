// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — photo loading and orientation normalisation.

pub mod orientation;
pub mod source;

pub use orientation::{OrientationTag, normalize};
pub use source::{BitmapSource, FileBitmapSource, MemoryBitmapSource, SourceImage};
