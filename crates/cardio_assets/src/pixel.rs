//! # Packed Pixels
//!
//! Colours are `u32` with red in the most significant byte and alpha in the
//! least significant byte: `0xRRGGBBAA`.

/// Packs four channels into a colour.
#[inline]
#[must_use]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
}

/// Red channel of a colour.
#[inline]
#[must_use]
pub const fn red(colour: u32) -> u8 {
    (colour >> 24) as u8
}

/// Green channel of a colour.
#[inline]
#[must_use]
pub const fn green(colour: u32) -> u8 {
    (colour >> 16) as u8
}

/// Blue channel of a colour.
#[inline]
#[must_use]
pub const fn blue(colour: u32) -> u8 {
    (colour >> 8) as u8
}

/// Alpha channel of a colour.
#[inline]
#[must_use]
pub const fn alpha(colour: u32) -> u8 {
    colour as u8
}

/// Reorders a colour so that its in-memory bytes are `R, G, B, A`.
///
/// The image encoder writes pixel words as raw memory, so pixels passed
/// through this first are written in the order the decoder reads back.
#[inline]
#[must_use]
pub const fn to_file_order(colour: u32) -> u32 {
    u32::from_ne_bytes(colour.to_be_bytes())
}

/// Opaque black.
pub const BLACK: u32 = rgba(0, 0, 0, 255);
/// Opaque white.
pub const WHITE: u32 = rgba(255, 255, 255, 255);
/// Fully transparent; skipped by the blitter.
pub const TRANSPARENT: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_packing() {
        assert_eq!(rgba(0x11, 0x22, 0x33, 0x44), 0x1122_3344);
        assert_eq!(WHITE, 0xFFFF_FFFF);
        assert_eq!(BLACK, 0x0000_00FF);
    }

    #[test]
    fn test_channel_accessors() {
        let colour = rgba(200, 100, 50, 25);
        assert_eq!(red(colour), 200);
        assert_eq!(green(colour), 100);
        assert_eq!(blue(colour), 50);
        assert_eq!(alpha(colour), 25);
    }

    #[test]
    fn test_file_order_bytes() {
        assert_eq!(to_file_order(rgba(1, 2, 3, 4)).to_ne_bytes(), [1, 2, 3, 4]);
    }
}
