// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document decoder — render every page of a PDF into an RGBA buffer.

use std::path::Path;

use image::RgbaImage;
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{ProgressEvent, RenderMode};
use tracing::{debug, error, info, instrument};

use crate::pdf::{PAGE_BACKGROUND, PdfReader};
use crate::progress::ProgressReporter;

pub use crate::pdf::MAX_PAGE_PIXELS;

/// Renders PDF pages back into raster images.
///
/// All pages are kept in memory until the call returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentDecoder {
    render_mode: RenderMode,
}

impl DocumentDecoder {
    pub fn new(render_mode: RenderMode) -> Self {
        Self { render_mode }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Render every page of the PDF at `path`, in page order.
    #[instrument(skip_all, fields(path = %path.display(), mode = ?self.render_mode))]
    pub fn decode<R>(&self, path: &Path, reporter: &mut R) -> Result<Vec<RgbaImage>>
    where
        R: ProgressReporter<[RgbaImage]> + ?Sized,
    {
        match PdfReader::open(path) {
            Ok(reader) => self.decode_document(&reader, reporter),
            Err(err) => {
                error!(%err, "Cannot open document");
                reporter.on_fail(&err);
                Err(err)
            }
        }
    }

    /// Same as [`decode`](Self::decode) for a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len(), mode = ?self.render_mode))]
    pub fn decode_bytes<R>(&self, data: &[u8], reporter: &mut R) -> Result<Vec<RgbaImage>>
    where
        R: ProgressReporter<[RgbaImage]> + ?Sized,
    {
        match PdfReader::from_bytes(data) {
            Ok(reader) => self.decode_document(&reader, reporter),
            Err(err) => {
                error!(%err, "Cannot load document");
                reporter.on_fail(&err);
                Err(err)
            }
        }
    }

    fn decode_document<R>(&self, reader: &PdfReader, reporter: &mut R) -> Result<Vec<RgbaImage>>
    where
        R: ProgressReporter<[RgbaImage]> + ?Sized,
    {
        reporter.on_start();
        match self.render_pages(reader, reporter) {
            Ok(pages) => {
                info!(pages = pages.len(), "Document decoded");
                reporter.on_success(&pages);
                Ok(pages)
            }
            Err(err) => {
                error!(%err, "Decode failed");
                reporter.on_fail(&err);
                Err(err)
            }
        }
    }

    fn render_pages<R>(&self, reader: &PdfReader, reporter: &mut R) -> Result<Vec<RgbaImage>>
    where
        R: ProgressReporter<[RgbaImage]> + ?Sized,
    {
        let total = reader.page_count();
        let mut pages = Vec::with_capacity(total);

        for index in 0..total {
            reporter.on_progress(ProgressEvent {
                index: index + 1,
                total,
            });

            let page = reader.open_page(index)?;
            let (width, height) = (page.width(), page.height());
            if u64::from(width) * u64::from(height) > MAX_PAGE_PIXELS {
                return Err(PagewerkError::Render(format!(
                    "page {} is {}x{}, too large to render",
                    index + 1,
                    width,
                    height
                )));
            }

            let mut raster = RgbaImage::from_pixel(width, height, PAGE_BACKGROUND);
            page.render(&mut raster, self.render_mode)?;
            debug!(page = index + 1, width, height, "Page decoded");
            pages.push(raster);
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{RecordedEvent, RecordingReporter};
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};
    use pagewerk_core::ErrorKind;

    /// Two 1x1 pages, each drawing an RGB image. The second image carries
    /// one byte where three are needed.
    fn second_page_broken_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for data in [vec![10, 20, 30], vec![10]] {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => Object::Integer(1),
                    "Height" => Object::Integer(1),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => Object::Integer(8),
                },
                data,
            ));
            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        [1, 0, 0, 1, 0, 0].into_iter().map(Object::Integer).collect(),
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => [0, 0, 1, 1].into_iter().map(Object::Integer).collect::<Vec<_>>(),
                "Contents" => content_id,
                "Resources" => dictionary! { "XObject" => dictionary! { "Im0" => image_id } },
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(2),
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn missing_file_fails_before_start() {
        let mut reporter = RecordingReporter::new();
        let err = DocumentDecoder::default()
            .decode(Path::new("/nonexistent/pagewerk/in.pdf"), &mut reporter)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
        assert_eq!(
            reporter.events,
            vec![RecordedEvent::Fail(ErrorKind::ResourceUnavailable)]
        );
    }

    #[test]
    fn blank_pages_decode_white() {
        let mut document = crate::pdf::PageDocument::create(pagewerk_core::PageSize::new(6, 4), 2)
            .expect("create");
        for _ in 0..2 {
            let canvas = document.start_page().expect("start");
            document.finish_page(canvas).expect("finish");
        }
        let mut bytes = Vec::new();
        document.write_to(&mut bytes).expect("write");

        let mut reporter = RecordingReporter::new();
        let pages = DocumentDecoder::new(RenderMode::Print)
            .decode_bytes(&bytes, &mut reporter)
            .expect("decode");

        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.dimensions() == (6, 4)));
        assert!(pages.iter().flat_map(|p| p.pixels()).all(|px| *px == PAGE_BACKGROUND));
        assert_eq!(reporter.progress_indices(), vec![1, 2]);
        assert_eq!(reporter.events.first(), Some(&RecordedEvent::Start));
        assert_eq!(reporter.events.last(), Some(&RecordedEvent::Success));
    }

    #[test]
    fn broken_page_stops_the_decode() {
        let mut reporter = RecordingReporter::new();
        let result =
            DocumentDecoder::default().decode_bytes(&second_page_broken_pdf(), &mut reporter);

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_eq!(
            reporter.events,
            vec![
                RecordedEvent::Start,
                RecordedEvent::Progress(ProgressEvent { index: 1, total: 2 }),
                RecordedEvent::Progress(ProgressEvent { index: 2, total: 2 }),
                RecordedEvent::Fail(ErrorKind::IoFailure),
            ]
        );
        assert_eq!(reporter.terminal_count(), 1);
    }

    #[test]
    fn decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentDecoder>();
    }
}
