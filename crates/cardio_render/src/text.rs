//! # Bitmap Text
//!
//! A font is an image holding the 95 printable ASCII glyphs, space through
//! tilde, side by side in one row. Glyph pixels act as a stencil: every
//! non-zero font pixel is drawn in the caller's colour.

use std::fmt::{self, Write as _};

use cardio_assets::Image;

use crate::raster::Canvas;

/// First printable character.
const FIRST_GLYPH: u8 = b' ';

/// Last printable character.
const LAST_GLYPH: u8 = b'~';

/// Number of glyphs in a font image.
pub const GLYPH_COUNT: usize = (LAST_GLYPH - FIRST_GLYPH + 1) as usize;

/// Formatted text longer than this many bytes is truncated.
pub const MAX_TEXT_LEN: usize = 256;

/// A fixed-width bitmap font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font<'a> {
    image: Image<'a>,
    char_width: usize,
    char_height: usize,
}

impl<'a> Font<'a> {
    /// Wraps a glyph strip.
    ///
    /// # Returns
    ///
    /// `None` if a glyph dimension is zero or the image is too small to
    /// hold [`GLYPH_COUNT`] glyphs of `char_width x char_height`.
    #[must_use]
    pub fn new(image: Image<'a>, char_width: usize, char_height: usize) -> Option<Self> {
        let strip_width = char_width.checked_mul(GLYPH_COUNT)?;
        let fits = char_width > 0
            && char_height > 0
            && image.width() >= strip_width
            && image.height() >= char_height;
        fits.then_some(Self {
            image,
            char_width,
            char_height,
        })
    }

    /// Width of one glyph in pixels.
    #[inline]
    #[must_use]
    pub const fn char_width(&self) -> usize {
        self.char_width
    }

    /// Height of one glyph in pixels.
    #[inline]
    #[must_use]
    pub const fn char_height(&self) -> usize {
        self.char_height
    }

    /// Left column of the glyph for `byte`, or `None` if it is not printable.
    #[inline]
    fn glyph_column(&self, byte: u8) -> Option<usize> {
        (FIRST_GLYPH..=LAST_GLYPH)
            .contains(&byte)
            .then(|| usize::from(byte - FIRST_GLYPH) * self.char_width)
    }

    /// Width in pixels that `text` advances the cursor by.
    #[must_use]
    pub fn text_width(&self, text: &str) -> usize {
        text.bytes()
            .filter(|byte| (FIRST_GLYPH..=LAST_GLYPH).contains(byte))
            .count()
            * self.char_width
    }
}

/// Fixed-capacity formatting target that drops whatever does not fit.
struct TextBuffer {
    bytes: [u8; MAX_TEXT_LEN],
    len: usize,
}

impl TextBuffer {
    const fn new() -> Self {
        Self {
            bytes: [0; MAX_TEXT_LEN],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl fmt::Write for TextBuffer {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        let take = text.len().min(MAX_TEXT_LEN - self.len);
        self.bytes[self.len..self.len + take].copy_from_slice(&text.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

impl Canvas<'_> {
    /// Draws `text` with its top-left corner at `(x, y)`.
    ///
    /// Bytes outside printable ASCII are skipped without advancing.
    pub fn draw_str(&mut self, font: &Font<'_>, x: i32, y: i32, colour: u32, text: &str) {
        self.draw_bytes(font, x, y, colour, text.as_bytes());
    }

    /// Formats `args` into a bounded buffer and draws the result.
    ///
    /// Output beyond [`MAX_TEXT_LEN`] bytes is silently dropped.
    ///
    /// ```rust,ignore
    /// canvas.draw_text(&font, 20, 10, WHITE, format_args!("Pumps: {}", pumps));
    /// ```
    pub fn draw_text(&mut self, font: &Font<'_>, x: i32, y: i32, colour: u32, args: fmt::Arguments<'_>) {
        let mut buffer = TextBuffer::new();
        // A failing Display impl truncates the text; nothing else can fail.
        let _ = buffer.write_fmt(args);
        self.draw_bytes(font, x, y, colour, buffer.as_bytes());
    }

    #[allow(clippy::cast_possible_wrap)]
    fn draw_bytes(&mut self, font: &Font<'_>, x: i32, y: i32, colour: u32, bytes: &[u8]) {
        let mut cursor = i64::from(x);
        let top = i64::from(y);

        for &byte in bytes {
            let Some(column) = font.glyph_column(byte) else {
                continue;
            };
            for glyph_y in 0..font.char_height {
                let Some(row) = font.image.row(glyph_y) else {
                    break;
                };
                let glyph_row = &row[column..column + font.char_width];
                for (glyph_x, &pixel) in glyph_row.iter().enumerate() {
                    if pixel != 0 {
                        self.plot(cursor + glyph_x as i64, top + glyph_y as i64, colour);
                    }
                }
            }
            cursor += font.char_width as i64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_assets::pixel::{rgba, WHITE};

    const INK: u32 = rgba(200, 200, 200, 255);

    /// 2x2 glyphs; each glyph lights one pixel whose position encodes it:
    /// '!' top-left, '"' top-right, '#' bottom-left, everything else blank.
    fn font_pixels() -> Vec<u32> {
        let width = GLYPH_COUNT * 2;
        let mut pixels = vec![0; width * 2];
        pixels[2] = WHITE;
        pixels[4 + 1] = WHITE;
        pixels[width + 6] = 1;
        pixels
    }

    fn lit(canvas: &Canvas<'_>) -> Vec<(usize, usize)> {
        canvas
            .pixels()
            .iter()
            .enumerate()
            .filter(|&(_, &pixel)| pixel == INK)
            .map(|(index, _)| (index % canvas.width(), index / canvas.width()))
            .collect()
    }

    #[test]
    fn test_font_requires_full_strip() {
        let pixels = font_pixels();
        let image = Image::new(&pixels, GLYPH_COUNT * 2, 2).unwrap();
        assert!(Font::new(image, 2, 2).is_some());
        assert!(Font::new(image, 3, 2).is_none());
        assert!(Font::new(image, 2, 3).is_none());
        assert!(Font::new(image, 0, 2).is_none());
    }

    #[test]
    fn test_draw_str_stencils_and_advances() {
        let font_pixels = font_pixels();
        let font = Font::new(Image::new(&font_pixels, GLYPH_COUNT * 2, 2).unwrap(), 2, 2).unwrap();
        let mut pixels = vec![0; 10 * 4];
        let mut canvas = Canvas::new(&mut pixels, 10, 4).unwrap();

        canvas.draw_str(&font, 1, 1, INK, "!\"#");
        assert_eq!(lit(&canvas), vec![(1, 1), (4, 1), (5, 2)]);
    }

    #[test]
    fn test_non_printable_bytes_do_not_advance() {
        let font_pixels = font_pixels();
        let font = Font::new(Image::new(&font_pixels, GLYPH_COUNT * 2, 2).unwrap(), 2, 2).unwrap();
        let mut pixels = vec![0; 10 * 2];
        let mut canvas = Canvas::new(&mut pixels, 10, 2).unwrap();

        canvas.draw_str(&font, 0, 0, INK, "\n\u{e9}!");
        assert_eq!(lit(&canvas), vec![(0, 0)]);
        assert_eq!(font.text_width("a\tb"), 4);
    }

    #[test]
    fn test_text_clips_at_edges() {
        let font_pixels = font_pixels();
        let font = Font::new(Image::new(&font_pixels, GLYPH_COUNT * 2, 2).unwrap(), 2, 2).unwrap();
        let mut pixels = vec![0; 4 * 2];
        let mut canvas = Canvas::new(&mut pixels, 4, 2).unwrap();

        canvas.draw_str(&font, -2, 0, INK, "!!!!");
        assert_eq!(lit(&canvas), vec![(0, 0), (2, 0)]);
    }

    #[test]
    fn test_draw_text_formats() {
        let font_pixels = font_pixels();
        let font = Font::new(Image::new(&font_pixels, GLYPH_COUNT * 2, 2).unwrap(), 2, 2).unwrap();
        let mut pixels = vec![0; 8 * 2];
        let mut canvas = Canvas::new(&mut pixels, 8, 2).unwrap();

        let marks = "!";
        canvas.draw_text(&font, 0, 0, INK, format_args!("{marks} {marks}"));
        assert_eq!(lit(&canvas), vec![(0, 0), (4, 0)]);
    }

    #[test]
    fn test_formatted_text_is_truncated() {
        let mut buffer = TextBuffer::new();
        let long = "x".repeat(MAX_TEXT_LEN + 10);
        fmt::Write::write_str(&mut buffer, &long).unwrap();
        assert_eq!(buffer.as_bytes().len(), MAX_TEXT_LEN);
        fmt::Write::write_str(&mut buffer, "more").unwrap();
        assert_eq!(buffer.as_bytes().len(), MAX_TEXT_LEN);
    }
}
