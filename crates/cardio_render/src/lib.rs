//! # CARDIO Render
//!
//! Software rasterizer for a fixed 320x200 screen of packed `0xRRGGBBAA`
//! pixels:
//! - [`Canvas`] - clear, pixel, Bresenham line, alpha-tested image blit
//! - [`Font`] - fixed-width bitmap text, plain or formatted
//! - [`AnimatedImage`] - sprite sheets whose frame is a function of time
//!
//! The canvas borrows its pixel buffer, normally carved from the
//! persistent pool once at startup. Drawing never allocates.
//!
//! ## Example
//!
//! ```rust
//! use cardio_assets::pixel::{rgba, BLACK};
//! use cardio_render::{Canvas, SCREEN_HEIGHT, SCREEN_WIDTH};
//!
//! let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
//! let mut canvas = Canvas::screen(&mut framebuffer).unwrap();
//! canvas.clear(BLACK);
//! canvas.set_pixel(10, 10, rgba(255, 255, 255, 255));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod raster;
pub mod sprite;
pub mod text;

pub use raster::{Canvas, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use sprite::{AnimatedImage, Hold};
pub use text::{Font, GLYPH_COUNT, MAX_TEXT_LEN};
