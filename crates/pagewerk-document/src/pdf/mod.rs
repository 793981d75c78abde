// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — writing paginated photo documents and rendering them back.

pub mod reader;
pub mod writer;
mod xobject;

pub use reader::{MAX_PAGE_PIXELS, PAGE_BACKGROUND, PdfPage, PdfReader};
pub use writer::{PageCanvas, PageDocument};
