// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image XObject decoding. Supports 8-bit Gray, RGB and CMYK samples (plain
// device spaces or ICCBased with a matching /N), stored raw, Flate-compressed
// or as embedded JPEG.

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::{Document, Object, Stream};

use super::reader::{number, resolve};

type DecodeResult<T> = std::result::Result<T, String>;

/// Decode an image XObject into RGBA pixels, row 0 at the top.
pub(crate) fn decode_image(document: &Document, stream: &Stream) -> DecodeResult<RgbaImage> {
    let dict = &stream.dict;
    let width = dimension(document, dict.get(b"Width").ok(), "Width")?;
    let height = dimension(document, dict.get(b"Height").ok(), "Height")?;

    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Err("image masks are not supported".into());
    }

    let filters = filter_names(document, stream)?;
    match filters.as_slice() {
        [] => samples_to_rgba(document, stream, width, height, &stream.content),
        [f] if f == b"FlateDecode" => {
            let data = stream
                .decompressed_content()
                .map_err(|err| format!("cannot inflate image data: {err}"))?;
            samples_to_rgba(document, stream, width, height, &data)
        }
        [f] if f == b"DCTDecode" => {
            let decoded = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| format!("cannot decode JPEG data: {err}"))?;
            Ok(decoded.to_rgba8())
        }
        other => Err(format!(
            "unsupported filter chain [{}]",
            other
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn dimension(document: &Document, object: Option<&Object>, key: &str) -> DecodeResult<u32> {
    object
        .and_then(|o| resolve(document, o).ok())
        .and_then(number)
        .filter(|v| *v >= 1.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32)
        .ok_or_else(|| format!("missing or invalid /{key}"))
}

fn filter_names(document: &Document, stream: &Stream) -> DecodeResult<Vec<Vec<u8>>> {
    let Ok(filter) = stream.dict.get(b"Filter") else {
        return Ok(Vec::new());
    };
    let filter = resolve(document, filter).map_err(|err| err.to_string())?;
    match filter {
        Object::Name(name) => Ok(vec![name.clone()]),
        Object::Array(items) => items
            .iter()
            .map(|item| {
                resolve(document, item)
                    .and_then(|o| o.as_name())
                    .map(<[u8]>::to_vec)
                    .map_err(|err| err.to_string())
            })
            .collect(),
        _ => Err("malformed /Filter".into()),
    }
}

/// Number of colour components per sample.
fn components(document: &Document, stream: &Stream) -> DecodeResult<usize> {
    let space = stream
        .dict
        .get(b"ColorSpace")
        .map_err(|_| "missing /ColorSpace".to_string())?;
    let space = resolve(document, space).map_err(|err| err.to_string())?;

    match space {
        Object::Name(name) => device_components(name),
        Object::Array(items) => {
            let family = items
                .first()
                .and_then(|o| resolve(document, o).ok())
                .and_then(|o| o.as_name().ok())
                .ok_or_else(|| "malformed /ColorSpace array".to_string())?;
            if family != b"ICCBased" {
                return Err(format!(
                    "unsupported colour space /{}",
                    String::from_utf8_lossy(family)
                ));
            }
            let profile = items
                .get(1)
                .and_then(|o| resolve(document, o).ok())
                .and_then(|o| o.as_stream().ok())
                .ok_or_else(|| "ICCBased colour space without a profile".to_string())?;
            let n = profile
                .dict
                .get(b"N")
                .ok()
                .and_then(|o| resolve(document, o).ok())
                .and_then(number)
                .ok_or_else(|| "ICC profile without /N".to_string())?;
            match n as usize {
                n @ (1 | 3 | 4) => Ok(n),
                n => Err(format!("unsupported ICC component count {n}")),
            }
        }
        _ => Err("malformed /ColorSpace".into()),
    }
}

fn device_components(name: &[u8]) -> DecodeResult<usize> {
    match name {
        b"DeviceGray" | b"G" => Ok(1),
        b"DeviceRGB" | b"RGB" => Ok(3),
        b"DeviceCMYK" | b"CMYK" => Ok(4),
        other => Err(format!(
            "unsupported colour space /{}",
            String::from_utf8_lossy(other)
        )),
    }
}

fn samples_to_rgba(
    document: &Document,
    stream: &Stream,
    width: u32,
    height: u32,
    data: &[u8],
) -> DecodeResult<RgbaImage> {
    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| resolve(document, o).ok())
        .and_then(number)
        .unwrap_or(8.0);
    if bits != 8.0 {
        return Err(format!("{bits} bits per component is not supported"));
    }

    let n = components(document, stream)?;
    let needed = (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(n))
        .ok_or_else(|| format!("image {width}x{height} is too large"))?;
    if data.len() < needed {
        return Err(format!(
            "image data truncated: {} of {} bytes",
            data.len(),
            needed
        ));
    }

    let mut out = RgbaImage::new(width, height);
    for (pixel, sample) in out.pixels_mut().zip(data.chunks_exact(n)) {
        *pixel = match *sample {
            [g] => Rgba([g, g, g, 255]),
            [r, g, b] => Rgba([r, g, b, 255]),
            [c, m, y, k] => {
                let channel = |v: u8| ((255 - v as u16) * (255 - k as u16) / 255) as u8;
                Rgba([channel(c), channel(m), channel(y), 255])
            }
            _ => unreachable!("component count is 1, 3 or 4"),
        };
    }
    Ok(out)
}
