// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bitmap sources — where the encoder gets its photos from.
//
// A source never fails loudly: anything that cannot be opened or decoded is
// logged and reported as `None`, which the encoder treats as a skippable item.

use std::io::{BufRead, Cursor, Seek};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageDecoder, ImageReader};
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, warn};

use super::orientation::OrientationTag;

/// A decoded photo plus the rotation needed to show it upright.
#[derive(Debug)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub orientation: OrientationTag,
}

/// Loads photos for the encoder.
pub trait BitmapSource {
    /// How an individual photo is identified (a path, a byte buffer, ...).
    type Reference;

    /// Decode the photo behind `reference`, or `None` if it cannot be read.
    fn load(&self, reference: &Self::Reference) -> Option<SourceImage>;

    /// Short description of `reference` for log messages.
    fn describe(&self, _reference: &Self::Reference) -> String {
        String::from("<image>")
    }
}

/// Reads photos from the filesystem. The format is guessed from the content,
/// not the extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBitmapSource;

impl BitmapSource for FileBitmapSource {
    type Reference = PathBuf;

    fn load(&self, reference: &PathBuf) -> Option<SourceImage> {
        match decode_file(reference) {
            Ok(loaded) => Some(loaded),
            Err(err) => {
                warn!(path = %reference.display(), %err, "Skipping unreadable image");
                None
            }
        }
    }

    fn describe(&self, reference: &PathBuf) -> String {
        reference.display().to_string()
    }
}

/// Decodes photos already held in memory as encoded bytes (JPEG, PNG, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBitmapSource;

impl BitmapSource for MemoryBitmapSource {
    type Reference = Vec<u8>;

    fn load(&self, reference: &Vec<u8>) -> Option<SourceImage> {
        let reader = ImageReader::new(Cursor::new(reference.as_slice()));
        match decode_with_orientation(reader) {
            Ok(loaded) => Some(loaded),
            Err(err) => {
                warn!(bytes_len = reference.len(), %err, "Skipping undecodable image bytes");
                None
            }
        }
    }

    fn describe(&self, reference: &Vec<u8>) -> String {
        format!("<{} bytes>", reference.len())
    }
}

/// Open and decode a photo file, reading its EXIF orientation on the way.
pub fn decode_file(path: &Path) -> Result<SourceImage> {
    let reader = ImageReader::open(path).map_err(|err| {
        PagewerkError::ImageDecode(format!("failed to open {}: {}", path.display(), err))
    })?;
    decode_with_orientation(reader)
}

fn decode_with_orientation<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<SourceImage> {
    let reader = reader
        .with_guessed_format()
        .map_err(|err| PagewerkError::ImageDecode(format!("cannot sniff format: {}", err)))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|err| PagewerkError::ImageDecode(err.to_string()))?;

    // Missing or unreadable metadata is not an error; the photo is shown as stored.
    let orientation = decoder
        .orientation()
        .map(OrientationTag::from)
        .unwrap_or_else(|err| {
            debug!(%err, "No usable orientation metadata");
            OrientationTag::Normal
        });

    let image = DynamicImage::from_decoder(decoder)
        .map_err(|err| PagewerkError::ImageDecode(err.to_string()))?;

    debug!(
        width = image.width(),
        height = image.height(),
        ?orientation,
        "Image decoded"
    );

    Ok(SourceImage { image, orientation })
}
