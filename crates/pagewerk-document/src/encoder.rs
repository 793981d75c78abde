// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document encoder — photos in, one PDF page per photo out.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{PageSize, ProgressEvent};
use tracing::{debug, error, info, instrument, warn};

use crate::image::{BitmapSource, normalize};
use crate::layout::fit_to_page;
use crate::pdf::PageDocument;
use crate::progress::ProgressReporter;

/// Settings that stay fixed across encoder invocations.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Written to the PDF information dictionary.
    pub title: String,
    /// Used when a photo is larger than the page and must be scaled down.
    pub filter: FilterType,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            title: String::from("Pagewerk Photos"),
            filter: FilterType::Lanczos3,
        }
    }
}

/// Turns an ordered list of photos into a paginated PDF.
///
/// The encoder holds only its options; every call to [`encode`](Self::encode)
/// builds its own document, so one encoder can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct DocumentEncoder {
    options: EncoderOptions,
}

impl DocumentEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encode `inputs` into a PDF at `output`, one `page`-sized page per input.
    ///
    /// Inputs that `source` cannot load become blank pages, so the page count
    /// always equals `inputs.len()`. Returns the output path on success.
    #[instrument(skip_all, fields(inputs = inputs.len(), %page, output = %output.display()))]
    pub fn encode<S, R>(
        &self,
        source: &S,
        inputs: &[S::Reference],
        page: PageSize,
        output: &Path,
        reporter: &mut R,
    ) -> Result<PathBuf>
    where
        S: BitmapSource + ?Sized,
        R: ProgressReporter<Path> + ?Sized,
    {
        if let Err(err) = validate(inputs.len(), page, output) {
            warn!(%err, "Encode rejected");
            reporter.on_fail(&err);
            return Err(err);
        }

        if let Some(parent) = output.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                debug!(dir = %parent.display(), %err, "Could not create output directory");
            }
        }

        reporter.on_start();
        match self.assemble(source, inputs, page, output, reporter) {
            Ok(()) => {
                info!("Photo document encoded");
                reporter.on_success(output);
                Ok(output.to_path_buf())
            }
            Err(err) => {
                error!(%err, "Encode failed");
                reporter.on_fail(&err);
                Err(err)
            }
        }
    }

    fn assemble<S, R>(
        &self,
        source: &S,
        inputs: &[S::Reference],
        page: PageSize,
        output: &Path,
        reporter: &mut R,
    ) -> Result<()>
    where
        S: BitmapSource + ?Sized,
        R: ProgressReporter<Path> + ?Sized,
    {
        let total = inputs.len();
        let mut document = PageDocument::create(page, total)?
            .with_title(self.options.title.clone())
            .with_filter(self.options.filter);

        for (i, reference) in inputs.iter().enumerate() {
            reporter.on_progress(ProgressEvent {
                index: i + 1,
                total,
            });

            let mut canvas = document.start_page()?;
            match source.load(reference) {
                Some(loaded) if loaded.image.width() > 0 && loaded.image.height() > 0 => {
                    let upright = normalize(loaded.image, loaded.orientation);
                    let transform = fit_to_page(upright.width(), upright.height(), page);
                    debug!(index = i + 1, ?transform, "Placing photo");
                    canvas.draw_image(upright, &transform)?;
                }
                _ => {
                    warn!(
                        index = i + 1,
                        item = %source.describe(reference),
                        "Leaving page blank for unreadable photo"
                    );
                }
            }
            document.finish_page(canvas)?;
        }

        reporter.on_save_file();

        let file = File::create(output).map_err(|err| {
            PagewerkError::Write(format!("cannot create {}: {}", output.display(), err))
        })?;
        let mut sink = BufWriter::new(file);
        document.write_to(&mut sink)
    }
}

fn validate(input_count: usize, page: PageSize, output: &Path) -> Result<()> {
    if output.as_os_str().is_empty() {
        return Err(PagewerkError::InvalidArgument("output path is empty".into()));
    }
    if output.file_name().is_none()
        || output.parent().is_none_or(|parent| parent.as_os_str().is_empty())
    {
        return Err(PagewerkError::InvalidArgument(format!(
            "output path {} has no parent directory",
            output.display()
        )));
    }
    if input_count == 0 {
        return Err(PagewerkError::InvalidArgument("no photos to encode".into()));
    }
    if !page.is_valid() {
        return Err(PagewerkError::InvalidArgument(format!(
            "page size {page} must have non-zero dimensions"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{MemoryBitmapSource, OrientationTag, SourceImage};
    use crate::progress::{RecordedEvent, RecordingReporter};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use pagewerk_core::ErrorKind;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        solid_png(width, height, Rgb([90, 60, 30]))
    }

    fn solid_png(width: u32, height: u32, colour: Rgb<u8>) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, colour));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .expect("encode png");
        out
    }

    /// Hands out images that are already decoded, with a fixed orientation.
    struct Rotated(OrientationTag);

    impl BitmapSource for Rotated {
        type Reference = (u32, u32);

        fn load(&self, &(w, h): &(u32, u32)) -> Option<SourceImage> {
            Some(SourceImage {
                image: DynamicImage::new_rgb8(w, h),
                orientation: self.0,
            })
        }
    }

    #[test]
    fn events_arrive_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("photos.pdf");
        let mut reporter = RecordingReporter::new();

        let path = DocumentEncoder::new()
            .encode(
                &MemoryBitmapSource,
                &[png(10, 10), png(20, 5)],
                PageSize::new(50, 50),
                &output,
                &mut reporter,
            )
            .expect("encode");

        assert_eq!(path, output);
        assert_eq!(
            reporter.events,
            vec![
                RecordedEvent::Start,
                RecordedEvent::Progress(ProgressEvent { index: 1, total: 2 }),
                RecordedEvent::Progress(ProgressEvent { index: 2, total: 2 }),
                RecordedEvent::SaveFile,
                RecordedEvent::Success,
            ]
        );
        let bytes = std::fs::read(&output).expect("read");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn empty_inputs_fail_without_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("none.pdf");
        let mut reporter = RecordingReporter::new();

        let err = DocumentEncoder::new()
            .encode(
                &MemoryBitmapSource,
                &[],
                PageSize::default(),
                &output,
                &mut reporter,
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(reporter.events, vec![RecordedEvent::Fail(ErrorKind::InvalidArgument)]);
        assert!(!output.exists());
    }

    #[test]
    fn bad_arguments_are_rejected() {
        let encoder = DocumentEncoder::new();
        let inputs = [png(2, 2)];
        let mut reporter = RecordingReporter::new();

        for (page, output) in [
            (PageSize::new(0, 10), Path::new("/tmp/pagewerk-zero.pdf")),
            (PageSize::default(), Path::new("")),
            (PageSize::default(), Path::new("bare.pdf")),
            (PageSize::default(), Path::new("/")),
        ] {
            let err = encoder
                .encode(&MemoryBitmapSource, &inputs, page, output, &mut reporter)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{}", output.display());
        }
        assert!(!reporter.events.contains(&RecordedEvent::Start));
        assert_eq!(reporter.terminal_count(), 4);
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("nested/deeper/out.pdf");
        DocumentEncoder::new()
            .encode(
                &MemoryBitmapSource,
                &[png(3, 3)],
                PageSize::new(10, 10),
                &output,
                &mut crate::progress::NoProgress,
            )
            .expect("encode");
        assert!(output.is_file());
    }

    #[test]
    fn unwritable_output_reports_io_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should go cannot be created as a file.
        let output = dir.path().join("taken");
        std::fs::create_dir(&output).expect("mkdir");
        let mut reporter = RecordingReporter::new();

        let err = DocumentEncoder::new()
            .encode(
                &MemoryBitmapSource,
                &[png(3, 3)],
                PageSize::new(10, 10),
                &output,
                &mut reporter,
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_eq!(reporter.events.first(), Some(&RecordedEvent::Start));
        assert!(reporter.events.contains(&RecordedEvent::SaveFile));
        assert_eq!(reporter.events.last(), Some(&RecordedEvent::Fail(ErrorKind::IoFailure)));
        assert_eq!(reporter.terminal_count(), 1);
    }

    #[test]
    fn rotated_photo_is_laid_out_upright() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("rotated.pdf");
        // 30x10 stored sideways; upright it is 10x30 and fits a 20x40 page.
        DocumentEncoder::new()
            .encode(
                &Rotated(OrientationTag::Rotate90),
                &[(30, 10)],
                PageSize::new(20, 40),
                &output,
                &mut crate::progress::NoProgress,
            )
            .expect("encode");

        let reader = crate::pdf::PdfReader::open(&output).expect("open");
        let page = reader.open_page(0).expect("page");
        let mut target =
            image::RgbaImage::from_pixel(20, 40, crate::pdf::PAGE_BACKGROUND);
        page.render(&mut target, pagewerk_core::RenderMode::Display)
            .expect("render");
        // Black photo occupies x 5..15, y 5..35.
        assert_eq!(target.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(target.get_pixel(14, 34).0, [0, 0, 0, 255]);
        assert_eq!(target.get_pixel(4, 5).0, [255, 255, 255, 255]);
        assert_eq!(target.get_pixel(15, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn one_encoder_serves_concurrent_calls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let encoder = DocumentEncoder::new();
        let jobs = [
            (Rgb([200, 30, 30]), dir.path().join("red.pdf")),
            (Rgb([30, 30, 200]), dir.path().join("blue.pdf")),
        ];

        std::thread::scope(|scope| {
            for (colour, output) in &jobs {
                let encoder = &encoder;
                scope.spawn(move || {
                    let photos = vec![solid_png(40, 30, *colour); 3];
                    encoder
                        .encode(
                            &MemoryBitmapSource,
                            &photos,
                            PageSize::new(60, 60),
                            output,
                            &mut crate::NoProgress,
                        )
                        .expect("encode");
                });
            }
        });

        for (colour, output) in &jobs {
            let pages = crate::DocumentDecoder::default()
                .decode(output, &mut crate::NoProgress)
                .expect("decode");
            assert_eq!(pages.len(), 3);
            let expected = image::Rgba([colour[0], colour[1], colour[2], 255]);
            for page in &pages {
                assert_eq!(page.get_pixel(30, 30), &expected);
            }
        }
    }

    #[test]
    fn encoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentEncoder>();
    }
}
