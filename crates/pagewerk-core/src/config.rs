// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{PageSize, RenderMode};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page size used when `encode` is not given one explicitly.
    pub default_page_size: PageSize,
    /// Directory for generated documents. `None` means `<data_dir>/documents`.
    pub output_dir: Option<PathBuf>,
    /// Upper bound on photos accepted by a single `encode`.
    pub max_photos: usize,
    /// Resampling quality used when rendering pages back to images.
    pub render_mode: RenderMode,
    /// Title embedded in generated documents.
    pub document_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: PageSize::default(),
            output_dir: None,
            max_photos: 10,
            render_mode: RenderMode::Display,
            document_title: "Pagewerk Photos".into(),
        }
    }
}
