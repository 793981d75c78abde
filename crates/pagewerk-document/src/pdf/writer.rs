// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — assemble a fixed-length document of raster pages with `lopdf`.
//
// Page geometry uses one PDF point per page pixel, so a page of W x H pixels
// has MediaBox [0 0 W H]. Each page carries at most one image XObject stored
// as 8-bit DeviceRGB, Flate-compressed, drawn with a single `cm` matrix.

use std::io::Write;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use pagewerk_core::PageSize;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, info, instrument};

use crate::layout::TransformMatrix;

/// Resource name of the single image placed on a page.
const PAGE_IMAGE_NAME: &[u8] = b"Im0";

/// An in-progress PDF with a page count fixed at creation.
///
/// Pages are produced strictly one at a time: [`PageDocument::start_page`]
/// hands out a [`PageCanvas`], which must be returned through
/// [`PageDocument::finish_page`] before the next page can start. Writing
/// consumes the document, so it can be serialised only once; dropping it
/// releases everything.
pub struct PageDocument {
    document: Document,
    /// Reserved id of the /Pages node, filled in on write.
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_size: PageSize,
    page_count: usize,
    page_open: bool,
    title: String,
    filter: FilterType,
}

impl PageDocument {
    /// Create an empty document of `page_count` pages, each `page_size`.
    pub fn create(page_size: PageSize, page_count: usize) -> Result<Self> {
        if !page_size.is_valid() {
            return Err(PagewerkError::InvalidArgument(format!(
                "page size {page_size} must have non-zero dimensions"
            )));
        }
        if page_count == 0 {
            return Err(PagewerkError::InvalidArgument(
                "a document needs at least one page".into(),
            ));
        }

        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        debug!(%page_size, page_count, "PDF document created");

        Ok(Self {
            document,
            pages_id,
            page_ids: Vec::with_capacity(page_count),
            page_size,
            page_count,
            page_open: false,
            title: String::from("Pagewerk Photos"),
            filter: FilterType::Lanczos3,
        })
    }

    /// Title written to the document information dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Resampling filter used when an image is drawn smaller than its native
    /// size.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Number of pages already finished.
    pub fn pages_finished(&self) -> usize {
        self.page_ids.len()
    }

    // -- Page lifecycle -------------------------------------------------------

    /// Begin the next page.
    pub fn start_page(&mut self) -> Result<PageCanvas> {
        if self.page_open {
            return Err(PagewerkError::PdfError(
                "previous page has not been finished".into(),
            ));
        }
        if self.page_ids.len() >= self.page_count {
            return Err(PagewerkError::PdfError(format!(
                "document is limited to {} pages",
                self.page_count
            )));
        }
        self.page_open = true;
        Ok(PageCanvas {
            index: self.page_ids.len(),
            page_size: self.page_size,
            filter: self.filter,
            placed: None,
        })
    }

    /// Close `canvas` and append it to the document.
    pub fn finish_page(&mut self, canvas: PageCanvas) -> Result<()> {
        if !self.page_open || canvas.index != self.page_ids.len() {
            return Err(PagewerkError::PdfError(format!(
                "page {} does not belong to the open page slot",
                canvas.index
            )));
        }

        let page_height = self.page_size.height;
        let mut xobjects = Dictionary::new();
        let mut operations = Vec::new();

        if let Some(placed) = canvas.placed {
            let (width, height) = placed.pixels.dimensions();
            let mut image_stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => Object::Integer(width as i64),
                    "Height" => Object::Integer(height as i64),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => Object::Integer(8),
                },
                placed.pixels.into_raw(),
            );
            if let Err(err) = image_stream.compress() {
                debug!(page = canvas.index + 1, %err, "Flate failed, storing image uncompressed");
            }
            let image_id = self.document.add_object(image_stream);
            xobjects.set(PAGE_IMAGE_NAME.to_vec(), Object::Reference(image_id));

            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    Object::Integer(width as i64),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height as i64),
                    Object::Integer(placed.transform.tx as i64),
                    Object::Integer(placed.transform.pdf_y(page_height) as i64),
                ],
            ));
            operations.push(Operation::new(
                "Do",
                vec![Object::Name(PAGE_IMAGE_NAME.to_vec())],
            ));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations }.encode().map_err(|err| {
            PagewerkError::PdfError(format!("failed to encode page content: {}", err))
        })?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(self.page_size.width as i64),
                Object::Integer(page_height as i64),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! { "XObject" => xobjects },
        });

        self.page_ids.push(page_id);
        self.page_open = false;

        debug!(
            page = canvas.index + 1,
            total = self.page_count,
            "Page finished"
        );
        Ok(())
    }

    // -- Serialisation --------------------------------------------------------

    /// Serialise the finished document into `sink` in a single pass.
    ///
    /// Every page must have been finished. Consumes the document.
    #[instrument(skip_all, fields(pages = self.page_ids.len()))]
    pub fn write_to<W: Write>(mut self, sink: &mut W) -> Result<()> {
        if self.page_open || self.page_ids.len() != self.page_count {
            return Err(PagewerkError::PdfError(format!(
                "only {} of {} pages are finished",
                self.page_ids.len(),
                self.page_count
            )));
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(self.page_count as i64),
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::String(self.title.clone().into_bytes(), StringFormat::Literal),
            "Producer" => Object::String(b"Pagewerk".to_vec(), StringFormat::Literal),
        });
        self.document.trailer.set("Root", Object::Reference(catalog_id));
        self.document.trailer.set("Info", Object::Reference(info_id));

        self.document
            .save_to(sink)
            .map_err(|err| PagewerkError::Write(err.to_string()))?;
        sink.flush()
            .map_err(|err| PagewerkError::Write(err.to_string()))?;

        info!(pages = self.page_count, title = %self.title, "PDF written");
        Ok(())
    }
}

/// Drawing surface for one page.
pub struct PageCanvas {
    index: usize,
    page_size: PageSize,
    filter: FilterType,
    placed: Option<PlacedImage>,
}

struct PlacedImage {
    pixels: RgbImage,
    transform: TransformMatrix,
}

impl PageCanvas {
    /// 0-based index of this page in its document.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Draw `image` at `transform`, taking ownership of the buffer.
    ///
    /// The image is resampled to the transform's scaled size when needed and
    /// flattened onto white. A page holds at most one image.
    pub fn draw_image(&mut self, image: DynamicImage, transform: &TransformMatrix) -> Result<()> {
        if self.placed.is_some() {
            return Err(PagewerkError::PdfError(format!(
                "page {} already holds an image",
                self.index + 1
            )));
        }
        if transform.tx + transform.scaled_width > self.page_size.width
            || transform.ty + transform.scaled_height > self.page_size.height
        {
            return Err(PagewerkError::PdfError(format!(
                "placement {}x{}+{}+{} exceeds page {}",
                transform.scaled_width,
                transform.scaled_height,
                transform.tx,
                transform.ty,
                self.page_size
            )));
        }

        let image = if image.width() == transform.scaled_width
            && image.height() == transform.scaled_height
        {
            image
        } else {
            debug!(
                from_w = image.width(),
                from_h = image.height(),
                to_w = transform.scaled_width,
                to_h = transform.scaled_height,
                "Resampling image for page"
            );
            image.resize_exact(transform.scaled_width, transform.scaled_height, self.filter)
        };

        self.placed = Some(PlacedImage {
            pixels: flatten_onto_white(image),
            transform: *transform,
        });
        Ok(())
    }

    /// Whether nothing has been drawn on this page.
    pub fn is_blank(&self) -> bool {
        self.placed.is_none()
    }
}

/// Convert to 8-bit RGB, compositing any alpha channel over white.
fn flatten_onto_white(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let a = a as u32;
        let blend =
            |channel: u8| -> u8 { ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8 };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
