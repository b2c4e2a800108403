//! Dithering and presentation benchmark: one frame from picture to ANSI bytes.
//!
//! Target: < 2ms for a 320×240 picture on a 200×50 canvas

use ascii_vout::backend::{ScriptedEvents, TerminalBackend, TerminalOptions};
use ascii_vout::canvas::diff::{render_diff, render_full, DiffState};
use ascii_vout::canvas::{BlitArea, ChannelDecoder, PixelSource};
use ascii_vout::video::{stride_for, PixelMasks};
use ascii_vout::{AsciiVout, Canvas, DitherMode, Ditherer, RenderRequest, VoutConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Create an `RV32` test picture: colour gradients with a diagonal band.
fn create_test_picture(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let pitch = stride_for(width);
    let mut pixels = vec![0u8; pitch * height as usize];
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let b = if (x + y + seed) % 64 < 8 { 255 } else { 40 };
            let offset = y as usize * pitch + x as usize * 4;
            pixels[offset..offset + 4].copy_from_slice(&PixelMasks::RV32.pack(r, g, b).to_ne_bytes());
        }
    }
    pixels
}

fn source(pixels: &[u8], width: u32, height: u32) -> PixelSource<'_> {
    PixelSource {
        pixels,
        width,
        height,
        pitch: stride_for(width),
        decoder: ChannelDecoder::new(PixelMasks::RV32),
    }
}

fn dither_by_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("dither_320x240_to_200x50");
    let pixels = create_test_picture(320, 240, 0);

    for mode in DitherMode::ALL {
        let mut ditherer = Ditherer::new(mode);
        let mut canvas = Canvas::new(200, 50);
        group.bench_function(BenchmarkId::from_parameter(mode), |b| {
            b.iter(|| {
                ditherer.blit(
                    &mut canvas,
                    BlitArea::full(200, 50),
                    black_box(&source(&pixels, 320, 240)),
                );
            });
        });
    }

    group.finish();
}

fn dither_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("dither_by_canvas_size");
    let pixels = create_test_picture(640, 480, 0);

    for (width, height) in [(80, 24), (120, 40), (200, 50), (300, 80)] {
        let mut ditherer = Ditherer::new(DitherMode::Ordered);
        let mut canvas = Canvas::new(width, height);
        group.bench_with_input(
            BenchmarkId::new("ordered", format!("{width}x{height}")),
            &(width, height),
            |b, &(w, h)| {
                b.iter(|| {
                    ditherer.blit(&mut canvas, BlitArea::full(w, h), black_box(&source(&pixels, 640, 480)));
                });
            },
        );
    }

    group.finish();
}

fn encode_frames(c: &mut Criterion) {
    let mut ditherer = Ditherer::new(DitherMode::Ordered);
    let mut previous = Canvas::new(200, 50);
    let mut next = Canvas::new(200, 50);
    ditherer.blit(&mut previous, BlitArea::full(200, 50), &source(&create_test_picture(320, 240, 0), 320, 240));
    ditherer.blit(&mut next, BlitArea::full(200, 50), &source(&create_test_picture(320, 240, 16), 320, 240));

    c.bench_function("encode_full_200x50", |b| {
        b.iter(|| {
            let mut output = Vec::with_capacity(65536);
            render_full(black_box(&next), &mut output);
        });
    });

    c.bench_function("encode_diff_200x50_moving_band", |b| {
        b.iter(|| {
            let mut output = Vec::with_capacity(65536);
            let mut state = DiffState::new();
            render_diff(black_box(&previous), black_box(&next), &mut output, &mut state)
        });
    });
}

fn adapter_frame(c: &mut Criterion) {
    let backend = TerminalBackend::new(
        std::io::sink(),
        ScriptedEvents::new(),
        TerminalOptions::headless(200, 50),
    );
    let (tx, _rx) = crossbeam_channel::unbounded();
    let mut vout = AsciiVout::create(backend, &VoutConfig::default(), tx).unwrap();
    vout.init(RenderRequest::new(320, 240)).unwrap();
    let id = vout.output_pictures()[0];
    let frames = [create_test_picture(320, 240, 0), create_test_picture(320, 240, 16)];
    let mut frame = 0;

    c.bench_function("adapter_render_display_320x240", |b| {
        b.iter(|| {
            frame ^= 1;
            vout.picture_mut(id).unwrap().pixels_mut().copy_from_slice(&frames[frame]);
            vout.render(id);
            vout.display();
        });
    });
}

criterion_group!(benches, dither_by_mode, dither_by_size, encode_frames, adapter_frame);
criterion_main!(benches);
