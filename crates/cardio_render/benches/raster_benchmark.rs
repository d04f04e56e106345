//! # Rasterizer Benchmark
//!
//! REQUIREMENTS:
//! - A full-screen clear and a screen's worth of sprite blits fit well
//!   inside one 60 Hz frame
//! - Clipped blits cost no more than their visible pixels
//!
//! Run with: `cargo bench --package cardio_render`

// Benchmarks don't need docs
#![allow(missing_docs)]

use cardio_assets::pixel::{rgba, BLACK, WHITE};
use cardio_assets::Image;
use cardio_render::{Canvas, Font, GLYPH_COUNT, SCREEN_HEIGHT, SCREEN_WIDTH};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Checkerboard sprite with every other pixel transparent.
fn sprite_pixels(size: usize) -> Vec<u32> {
    (0..size * size)
        .map(|i| if (i + i / size) % 2 == 0 { rgba(255, 64, 64, 255) } else { 0 })
        .collect()
}

/// Benchmark: full-screen clear.
fn bench_clear(c: &mut Criterion) {
    let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    let mut canvas = Canvas::screen(&mut framebuffer).unwrap();
    c.bench_function("clear_320x200", |b| {
        b.iter(|| canvas.clear(black_box(BLACK)));
    });
}

/// Benchmark: alpha-tested blits of varying size, half of them clipped.
fn bench_blit(c: &mut Criterion) {
    let mut group = c.benchmark_group("blit");
    let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    let mut canvas = Canvas::screen(&mut framebuffer).unwrap();

    for size in [8usize, 32, 128] {
        let pixels = sprite_pixels(size);
        let image = Image::new(&pixels, size, size).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| {
                canvas.draw_image(black_box(image), 100, 50);
                canvas.draw_image(black_box(image), -50, 180);
            });
        });
    }

    group.finish();
}

/// Benchmark: a line of formatted HUD text.
fn bench_text(c: &mut Criterion) {
    let glyphs = vec![WHITE; GLYPH_COUNT * 8 * 8];
    let font = Font::new(Image::new(&glyphs, GLYPH_COUNT * 8, 8).unwrap(), 8, 8).unwrap();
    let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    let mut canvas = Canvas::screen(&mut framebuffer).unwrap();

    c.bench_function("draw_text_hud", |b| {
        let mut score = 0u32;
        b.iter(|| {
            score = score.wrapping_add(1);
            canvas.draw_text(&font, 4, 4, WHITE, format_args!("SCORE {score:08}  COMBO x{}", score % 64));
        });
    });
}

criterion_group!(benches, bench_clear, bench_blit, bench_text);
criterion_main!(benches);
