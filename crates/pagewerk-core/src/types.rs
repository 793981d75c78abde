// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the encoder, the decoder and the app.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PagewerkError;

/// PDF user-space units per inch. One page pixel is one point.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Target dimensions of every page in a document, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// The same page turned so that width is the longer side.
    pub fn landscape(self) -> Self {
        Self {
            width: self.width.max(self.height),
            height: self.width.min(self.height),
        }
    }
}

impl Default for PageSize {
    /// A 1080x1920 portrait phone display.
    fn default() -> Self {
        Self::new(1080, 1920)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for PageSize {
    type Err = PagewerkError;

    /// Parse `WIDTHxHEIGHT`, e.g. `1000x1500`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| PagewerkError::InvalidArgument(format!("page size '{s}' is not WxH")))?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|err| {
                PagewerkError::InvalidArgument(format!("page size '{s}': {err}"))
            })
        };
        let size = Self::new(parse(w)?, parse(h)?);
        if !size.is_valid() {
            return Err(PagewerkError::InvalidArgument(format!(
                "page size '{s}' must have non-zero dimensions"
            )));
        }
        Ok(size)
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Portrait page size in points, rounded to the nearest point.
    pub fn page_size(&self) -> PageSize {
        let (w_mm, h_mm) = self.dimensions_mm();
        let to_pt = |mm: u32| (mm as f64 / 25.4 * POINTS_PER_INCH).round() as u32;
        PageSize::new(to_pt(w_mm), to_pt(h_mm))
    }
}

impl FromStr for PaperSize {
    type Err = PagewerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "tabloid" => Ok(Self::Tabloid),
            other => Err(PagewerkError::InvalidArgument(format!(
                "unknown paper size '{other}'"
            ))),
        }
    }
}

/// One step of a pipeline: item `index` (1-based) of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub index: usize,
    pub total: usize,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}

/// Resampling quality used when a page image has to be scaled while rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Bilinear filtering, suitable for on-screen viewing.
    #[default]
    Display,
    /// Lanczos3 filtering.
    Print,
}

impl FromStr for RenderMode {
    type Err = PagewerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "display" => Ok(Self::Display),
            "print" => Ok(Self::Print),
            other => Err(PagewerkError::InvalidArgument(format!(
                "unknown render mode '{other}'"
            ))),
        }
    }
}
