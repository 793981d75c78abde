// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page export — decode a PDF and save each page as a PNG.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_document::{DocumentDecoder, ProgressReporter};
use tracing::{info, instrument};

/// File name for page `index` (0-based).
pub fn page_file_name(index: usize) -> String {
    format!("page-{:03}.png", index + 1)
}

/// Default export directory: `<input stem>-pages` beside the input.
pub fn default_export_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("document"));
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{stem}-pages"))
}

/// Decode `input` and write its pages into `dir` as `page-001.png`, ...
///
/// The reporter sees the decode itself; the files are written after it has
/// reported success, and a failure there is only returned.
#[instrument(skip(decoder, reporter))]
pub fn decode_to_dir<R>(
    decoder: &DocumentDecoder,
    input: &Path,
    dir: &Path,
    reporter: &mut R,
) -> Result<Vec<PathBuf>>
where
    R: ProgressReporter<[RgbaImage]> + ?Sized,
{
    let pages = decoder.decode(input, reporter)?;

    std::fs::create_dir_all(dir).map_err(|err| {
        PagewerkError::Write(format!("cannot create {}: {}", dir.display(), err))
    })?;

    let mut written = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let path = dir.join(page_file_name(index));
        page.save_with_format(&path, ImageFormat::Png).map_err(|err| {
            PagewerkError::Write(format!("cannot write {}: {}", path.display(), err))
        })?;
        written.push(path);
    }

    info!(pages = written.len(), dir = %dir.display(), "Pages exported");
    Ok(written)
}
