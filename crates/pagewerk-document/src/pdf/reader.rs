// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open existing PDF documents with `lopdf` and render their
// raster content back into pixel buffers.
//
// Rendering understands what a photo document contains: image XObjects placed
// through the current transformation matrix (`q`, `Q`, `cm`, `Do`). Text,
// vector paths and form XObjects are ignored.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use pagewerk_core::RenderMode;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, info, instrument, warn};

use super::xobject::decode_image;

/// Background every page is rendered onto.
pub const PAGE_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Largest raster, in pixels, the renderer will allocate in one piece.
pub const MAX_PAGE_PIXELS: u64 = 1 << 28;

/// Reads existing PDF files.
///
/// Wraps `lopdf::Document`; dropping the reader closes the document.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Page object ids in page order.
    pages: Vec<ObjectId>,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PagewerkError::SourceUnavailable(format!(
                "failed to open {}: {}",
                path_ref.display(),
                err
            ))
        })?;

        let mut reader = Self::from_document(document);
        reader.source_path = Some(path_ref.display().to_string());
        debug!(pages = reader.page_count(), "PDF loaded");
        Ok(reader)
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            PagewerkError::SourceUnavailable(format!("failed to load PDF from memory: {}", err))
        })?;

        let reader = Self::from_document(document);
        debug!(pages = reader.page_count(), "PDF loaded from bytes");
        Ok(reader)
    }

    fn from_document(document: Document) -> Self {
        // lopdf keys pages by 1-indexed page number in a BTreeMap, so values
        // come out in page order.
        let pages = document.get_pages().into_values().collect();
        Self {
            document,
            pages,
            source_path: None,
        }
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Open page `index` (0-based).
    pub fn open_page(&self, index: usize) -> Result<PdfPage<'_>> {
        let page_id = *self.pages.get(index).ok_or_else(|| {
            PagewerkError::Render(format!(
                "page {} out of range (document has {} pages)",
                index + 1,
                self.pages.len()
            ))
        })?;

        let media_box = inherited(&self.document, page_id, b"MediaBox")
            .and_then(|obj| MediaBox::parse(&self.document, obj))
            .ok_or_else(|| {
                PagewerkError::Render(format!("page {} has no usable MediaBox", index + 1))
            })?;

        Ok(PdfPage {
            document: &self.document,
            page_id,
            index,
            media_box,
        })
    }
}

/// Page bounds in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MediaBox {
    llx: f64,
    lly: f64,
    urx: f64,
    ury: f64,
}

impl MediaBox {
    fn parse(document: &Document, object: &Object) -> Option<Self> {
        let arr = resolve(document, object).ok()?.as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        let num = |i: usize| resolve(document, &arr[i]).ok().and_then(number);
        let (x0, y0, x1, y1) = (num(0)?, num(1)?, num(2)?, num(3)?);
        let media_box = Self {
            llx: x0.min(x1),
            lly: y0.min(y1),
            urx: x0.max(x1),
            ury: y0.max(y1),
        };
        (media_box.width() > 0 && media_box.height() > 0).then_some(media_box)
    }

    fn width(&self) -> u32 {
        (self.urx - self.llx).round().max(0.0) as u32
    }

    fn height(&self) -> u32 {
        (self.ury - self.lly).round().max(0.0) as u32
    }
}

/// One open page. Dropping it closes the page.
pub struct PdfPage<'a> {
    document: &'a Document,
    page_id: ObjectId,
    index: usize,
    media_box: MediaBox,
}

impl PdfPage<'_> {
    /// Native width in page pixels (points).
    pub fn width(&self) -> u32 {
        self.media_box.width()
    }

    /// Native height in page pixels (points).
    pub fn height(&self) -> u32 {
        self.media_box.height()
    }

    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Render this page's images into `target`, which must be exactly
    /// [`width`](Self::width) x [`height`](Self::height).
    #[instrument(skip_all, fields(page = self.index + 1))]
    pub fn render(&self, target: &mut RgbaImage, mode: RenderMode) -> Result<()> {
        if target.dimensions() != (self.width(), self.height()) {
            return Err(PagewerkError::Render(format!(
                "target is {}x{} but page {} is {}x{}",
                target.width(),
                target.height(),
                self.index + 1,
                self.width(),
                self.height()
            )));
        }

        let raw = self.document.get_page_content(self.page_id).map_err(|err| {
            PagewerkError::Render(format!(
                "cannot read content of page {}: {}",
                self.index + 1,
                err
            ))
        })?;
        let content = Content::decode(&raw).map_err(|err| {
            PagewerkError::Render(format!(
                "cannot parse content of page {}: {}",
                self.index + 1,
                err
            ))
        })?;

        let xobjects = self.xobjects();
        let mut ctm = Matrix::IDENTITY;
        let mut stack: Vec<Matrix> = Vec::new();
        let mut drawn = 0usize;

        for operation in &content.operations {
            match operation.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => ctm = stack.pop().unwrap_or(Matrix::IDENTITY),
                "cm" => {
                    let m = Matrix::from_operands(self.document, &operation.operands)
                        .ok_or_else(|| {
                            PagewerkError::Render(format!(
                                "malformed cm operator on page {}",
                                self.index + 1
                            ))
                        })?;
                    ctm = m.concat(&ctm);
                }
                "Do" => {
                    let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok())
                    else {
                        return Err(PagewerkError::Render(format!(
                            "Do operator without a name on page {}",
                            self.index + 1
                        )));
                    };
                    let Some(dict) = xobjects else {
                        return Err(PagewerkError::Render(format!(
                            "page {} draws /{} but has no XObject resources",
                            self.index + 1,
                            String::from_utf8_lossy(name)
                        )));
                    };
                    if self.draw_xobject(dict, name, &ctm, target, mode)? {
                        drawn += 1;
                    }
                }
                _ => {}
            }
        }

        debug!(images = drawn, "Page rendered");
        Ok(())
    }

    /// The page's /Resources /XObject dictionary, following inheritance.
    fn xobjects(&self) -> Option<&Dictionary> {
        let resources = inherited(self.document, self.page_id, b"Resources")?;
        let resources = resolve(self.document, resources).ok()?.as_dict().ok()?;
        let xobjects = resources.get(b"XObject").ok()?;
        resolve(self.document, xobjects).ok()?.as_dict().ok()
    }

    /// Draw the named XObject. Returns whether anything was drawn.
    fn draw_xobject(
        &self,
        xobjects: &Dictionary,
        name: &[u8],
        ctm: &Matrix,
        target: &mut RgbaImage,
        mode: RenderMode,
    ) -> Result<bool> {
        let label = String::from_utf8_lossy(name);
        let object = xobjects
            .get(name)
            .map_err(|_| PagewerkError::Render(format!("XObject /{label} is not defined")))?;
        let stream = resolve(self.document, object)
            .and_then(|o| o.as_stream())
            .map_err(|err| PagewerkError::Render(format!("XObject /{label}: {err}")))?;

        let subtype = stream.dict.get(b"Subtype").and_then(|s| s.as_name()).ok();
        if subtype != Some(b"Image".as_slice()) {
            debug!(xobject = %label, "Skipping non-image XObject");
            return Ok(false);
        }

        let image = decode_image(self.document, stream)
            .map_err(|err| PagewerkError::Render(format!("XObject /{label}: {err}")))?;
        composite(target, image, ctm, &self.media_box, mode);
        Ok(true)
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(document: &Document, operands: &[Object]) -> Option<Self> {
        if operands.len() != 6 {
            return None;
        }
        let mut v = [0.0f64; 6];
        for (slot, operand) in v.iter_mut().zip(operands) {
            *slot = resolve(document, operand).ok().and_then(number)?;
        }
        Some(Self {
            a: v[0],
            b: v[1],
            c: v[2],
            d: v[3],
            e: v[4],
            f: v[5],
        })
    }

    /// `self × other`: apply `self` first, then `other`.
    fn concat(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn is_axis_aligned(&self) -> bool {
        self.b.abs() < 1e-9 && self.c.abs() < 1e-9
    }
}

/// Draw `image` (which fills the unit square in image space) through `ctm`.
fn composite(
    target: &mut RgbaImage,
    image: RgbaImage,
    ctm: &Matrix,
    media_box: &MediaBox,
    mode: RenderMode,
) {
    if ctm.is_axis_aligned() {
        composite_axis_aligned(target, image, ctm, media_box, mode);
    } else {
        composite_warped(target, &image, ctm, media_box);
    }
}

fn composite_axis_aligned(
    target: &mut RgbaImage,
    image: RgbaImage,
    ctm: &Matrix,
    media_box: &MediaBox,
    mode: RenderMode,
) {
    // Device space: origin at the top-left of the MediaBox, y pointing down.
    let x0 = ctm.e - media_box.llx;
    let x1 = ctm.e + ctm.a - media_box.llx;
    let y0 = media_box.ury - ctm.f;
    let y1 = media_box.ury - (ctm.f + ctm.d);

    let placement = Placement {
        left: x0.min(x1).round(),
        top: y0.min(y1).round(),
        width: (x0.max(x1).round() - x0.min(x1).round()),
        height: (y0.max(y1).round() - y0.min(y1).round()),
        flip_h: ctm.a < 0.0,
        flip_v: ctm.d < 0.0,
    };
    // Negated comparison so NaN and infinite extents are skipped too.
    if !(placement.width >= 1.0 && placement.height >= 1.0)
        || !placement.width.is_finite()
        || !placement.height.is_finite()
    {
        warn!(?ctm, "Skipping degenerate image placement");
        return;
    }
    let Some(visible) = placement.clip(target.width(), target.height()) else {
        debug!(?ctm, "Image placed entirely off the page");
        return;
    };

    if placement.width * placement.height > MAX_PAGE_PIXELS as f64 {
        debug!(?ctm, "Sampling only the visible part of an oversized placement");
        sample_visible(target, &image, &placement, visible);
        return;
    }

    // Both extents are at least 1 and their product is bounded, so each fits.
    let (width, height) = (placement.width as u32, placement.height as u32);
    let mut placed = if image.dimensions() == (width, height) {
        image
    } else {
        imageops::resize(&image, width, height, filter_for(mode))
    };
    if placement.flip_h {
        imageops::flip_horizontal_in_place(&mut placed);
    }
    if placement.flip_v {
        imageops::flip_vertical_in_place(&mut placed);
    }

    imageops::replace(target, &placed, placement.left as i64, placement.top as i64);
}

/// Device rectangle covered by an axis-aligned image, before clipping.
#[derive(Debug, Clone, Copy)]
struct Placement {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    flip_h: bool,
    flip_v: bool,
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)` inside the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Placement {
    /// Intersect with a `width` x `height` target; `None` if nothing shows.
    fn clip(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x0 = self.left.max(0.0);
        let y0 = self.top.max(0.0);
        let x1 = (self.left + self.width).min(f64::from(width));
        let y1 = (self.top + self.height).min(f64::from(height));
        (x0 < x1 && y0 < y1).then(|| PixelRect {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

/// Nearest-neighbour fill of the visible rectangle, without materialising the
/// full placement.
fn sample_visible(
    target: &mut RgbaImage,
    image: &RgbaImage,
    placement: &Placement,
    rect: PixelRect,
) {
    let (iw, ih) = image.dimensions();
    let source_index = |device: u32, origin: f64, extent: f64, size: u32, flip: bool| {
        let offset = (f64::from(device) + 0.5 - origin) / extent * f64::from(size);
        let index = (offset.floor().max(0.0) as u32).min(size - 1);
        if flip { size - 1 - index } else { index }
    };

    for y in rect.y0..rect.y1 {
        let sy = source_index(y, placement.top, placement.height, ih, placement.flip_v);
        for x in rect.x0..rect.x1 {
            let sx = source_index(x, placement.left, placement.width, iw, placement.flip_h);
            target.put_pixel(x, y, *image.get_pixel(sx, sy));
        }
    }
}

fn composite_warped(
    target: &mut RgbaImage,
    image: &RgbaImage,
    ctm: &Matrix,
    media_box: &MediaBox,
) {
    let (iw, ih) = (image.width() as f64, image.height() as f64);
    // Image pixel (i, j) -> device pixel, with image row 0 at the top of the
    // unit square.
    let (m0, m1, m2) = (ctm.a / iw, -ctm.c / ih, ctm.c + ctm.e - media_box.llx);
    let (m3, m4, m5) = (-ctm.b / iw, ctm.d / ih, media_box.ury - ctm.d - ctm.f);
    // Re-centre so integer coordinates address pixel centres on both sides.
    let matrix = [
        m0 as f32,
        m1 as f32,
        (m2 + 0.5 * (m0 + m1) - 0.5) as f32,
        m3 as f32,
        m4 as f32,
        (m5 + 0.5 * (m3 + m4) - 0.5) as f32,
        0.0,
        0.0,
        1.0,
    ];
    let Some(projection) = Projection::from_matrix(matrix) else {
        warn!(?ctm, "Skipping non-invertible image placement");
        return;
    };

    let mut layer = RgbaImage::from_pixel(target.width(), target.height(), Rgba([0, 0, 0, 0]));
    warp_into(
        image,
        &projection,
        Interpolation::Nearest,
        Rgba([0, 0, 0, 0]),
        &mut layer,
    );
    imageops::overlay(target, &layer, 0, 0);
}

fn filter_for(mode: RenderMode) -> FilterType {
    match mode {
        RenderMode::Display => FilterType::Triangle,
        RenderMode::Print => FilterType::Lanczos3,
    }
}

// -- lopdf helpers --------------------------------------------------------

/// Follow a single indirect reference.
pub(crate) fn resolve<'a>(
    document: &'a Document,
    object: &'a Object,
) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id),
        other => Ok(other),
    }
}

pub(crate) fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Look up an inheritable page attribute, walking /Parent links.
fn inherited<'a>(document: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    // Bounded walk in case of a cyclic page tree.
    for _ in 0..64 {
        let id = current?;
        let dict = document.get_object(id).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}
