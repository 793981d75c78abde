// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pagewerk-document crate: layout arithmetic,
// orientation normalisation, and a full in-memory encode/decode cycle.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use pagewerk_core::{PageSize, PaperSize, RenderMode};
use pagewerk_document::image::normalize;
use pagewerk_document::pdf::PageDocument;
use pagewerk_document::{DocumentDecoder, NoProgress, OrientationTag, fit_to_page};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_layout(c: &mut Criterion) {
    let page = PaperSize::A4.page_size();
    c.bench_function("fit_to_page (4032x3024 on A4)", |b| {
        b.iter(|| fit_to_page(black_box(4032), black_box(3024), black_box(page)));
    });
}

fn bench_normalize(c: &mut Criterion) {
    let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([120, 80, 40])));
    c.bench_function("normalize Rotate90 (640x480)", |b| {
        b.iter(|| black_box(normalize(photo.clone(), OrientationTag::Rotate90)));
    });
}

/// Build a three-page document in memory and render it back. Pages are small
/// so the benchmark measures codec overhead rather than Flate throughput.
fn bench_round_trip(c: &mut Criterion) {
    let page = PageSize::new(320, 240);
    let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(400, 300, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));

    c.bench_function("encode + decode 3 pages (320x240)", |b| {
        b.iter(|| {
            let mut document = PageDocument::create(page, 3).expect("create");
            for _ in 0..3 {
                let mut canvas = document.start_page().expect("start");
                let transform = fit_to_page(photo.width(), photo.height(), page);
                canvas
                    .draw_image(photo.clone(), &transform)
                    .expect("draw");
                document.finish_page(canvas).expect("finish");
            }
            let mut bytes = Vec::new();
            document.write_to(&mut bytes).expect("write");

            let pages = DocumentDecoder::new(RenderMode::Display)
                .decode_bytes(&bytes, &mut NoProgress)
                .expect("decode");
            black_box(pages);
        });
    });
}

criterion_group!(benches, bench_layout, bench_normalize, bench_round_trip);
criterion_main!(benches);
