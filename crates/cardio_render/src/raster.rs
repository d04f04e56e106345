//! # Canvas
//!
//! Immediate-mode primitives over one packed RGBA pixel buffer.
//!
//! Every primitive clips on its own. Writes outside the canvas are dropped
//! without error.

use cardio_assets::pixel::alpha;
use cardio_assets::Image;

/// Width of the game screen in pixels.
pub const SCREEN_WIDTH: usize = 320;

/// Height of the game screen in pixels.
pub const SCREEN_HEIGHT: usize = 200;

/// A drawing surface over a borrowed `width * height` pixel buffer.
///
/// # Example
///
/// ```rust
/// use cardio_render::{Canvas, SCREEN_HEIGHT, SCREEN_WIDTH};
/// use cardio_assets::pixel::{rgba, BLACK};
///
/// let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
/// let mut canvas = Canvas::screen(&mut framebuffer).unwrap();
///
/// canvas.clear(BLACK);
/// canvas.draw_line(0, 0, 319, 199, rgba(255, 0, 0, 255));
/// assert!(!canvas.set_pixel(320, 0, BLACK));
/// ```
#[derive(Debug)]
pub struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    /// Wraps a pixel buffer.
    ///
    /// # Returns
    ///
    /// `None` unless `pixels.len() == width * height`.
    #[must_use]
    pub fn new(pixels: &'a mut [u32], width: usize, height: usize) -> Option<Self> {
        if width.checked_mul(height)? != pixels.len() {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    /// Wraps a [`SCREEN_WIDTH`] x [`SCREEN_HEIGHT`] buffer.
    #[must_use]
    pub fn screen(pixels: &'a mut [u32]) -> Option<Self> {
        Self::new(pixels, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Returns the width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel buffer.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &*self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the canvas.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(i64::from(x), i64::from(y)).map(|index| self.pixels[index])
    }

    /// Buffer index of `(x, y)`, or `None` outside the canvas.
    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }

    /// Writes one pixel if `(x, y)` is inside the canvas.
    #[inline]
    pub(crate) fn plot(&mut self, x: i64, y: i64, colour: u32) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.pixels[index] = colour;
                true
            }
            None => false,
        }
    }

    /// Fills the whole canvas with `colour`.
    #[inline]
    pub fn clear(&mut self, colour: u32) {
        self.pixels.fill(colour);
    }

    /// Writes one pixel.
    ///
    /// # Returns
    ///
    /// `true` if the pixel was inside the canvas and written.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: u32) -> bool {
        self.plot(i64::from(x), i64::from(y), colour)
    }

    /// Draws a line from `(ax, ay)` to `(bx, by)` inclusive.
    ///
    /// Integer Bresenham. The walk stops at the first point that falls off
    /// the canvas, so a line that starts off-canvas draws nothing even if it
    /// would cross the canvas later.
    pub fn draw_line(&mut self, ax: i32, ay: i32, bx: i32, by: i32, colour: u32) {
        let (mut x, mut y) = (i64::from(ax), i64::from(ay));
        let (bx, by) = (i64::from(bx), i64::from(by));
        let dx = (bx - x).abs();
        let dy = (by - y).abs();
        let step_x = if x < bx { 1 } else { -1 };
        let step_y = if y < by { 1 } else { -1 };
        let mut error = (if dx > dy { dx } else { -dy }) / 2;

        while self.plot(x, y, colour) && !(x == bx && y == by) {
            let previous = error;
            if previous > -dx {
                error -= dy;
                x += step_x;
            }
            if previous < dy {
                error += dx;
                y += step_y;
            }
        }
    }

    /// Blits `image` with its top-left corner at `(x, y)`.
    ///
    /// Binary alpha test: pixels with zero alpha are skipped, every other
    /// pixel overwrites the canvas. No blending.
    pub fn draw_image(&mut self, image: &Image<'_>, x: i32, y: i32) {
        let Some((left, right, target_x)) = clip_span(x, image.width(), self.width) else {
            return;
        };
        let Some((top, bottom, target_y)) = clip_span(y, image.height(), self.height) else {
            return;
        };

        for (source_y, row_y) in (top..bottom).zip(target_y..) {
            let Some(source) = image.row(source_y) else {
                return;
            };
            let start = row_y * self.width + target_x;
            let target = &mut self.pixels[start..start + (right - left)];
            for (destination, &pixel) in target.iter_mut().zip(&source[left..right]) {
                if alpha(pixel) != 0 {
                    *destination = pixel;
                }
            }
        }
    }
}

/// Clips `length` source pixels placed at `offset` against `0..limit`.
///
/// Returns the visible source range and where it lands, or `None` if
/// nothing is visible.
fn clip_span(offset: i32, length: usize, limit: usize) -> Option<(usize, usize, usize)> {
    let (skip, target) = match usize::try_from(offset) {
        Ok(target) => (0, target),
        Err(_) => (usize::try_from(offset.unsigned_abs()).ok()?, 0),
    };
    if target >= limit || skip >= length {
        return None;
    }
    let visible = (length - skip).min(limit - target);
    Some((skip, skip + visible, target))
}
