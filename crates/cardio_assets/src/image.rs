//! # Image Codec
//!
//! Decoder and encoder for RGBA `.pam` files:
//!
//! ```text
//! P7
//! WIDTH 256              <-- image width in pixels
//! HEIGHT 256             <-- image height in pixels
//! DEPTH 4                <-- channels per pixel
//! MAXVAL 255             <-- highest channel value
//! TUPLTYPE RGB_ALPHA     <-- pixel format
//! ENDHDR
//! <WIDTH * HEIGHT pixels, bytes R G B A>
//! ```
//!
//! ## Channel Order
//!
//! Decoding reorders every pixel into `0xRRGGBBAA`. Encoding writes the
//! in-memory words as raw native bytes with no reordering, so an encoded
//! image does not decode back to the same pixels on little-endian targets.
//! Existing asset files depend on this, so it is kept as is.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use cardio_core::Pool;

use crate::error::{AssetError, AssetResult};
use crate::header::{expect_field, expect_line, read_body, read_positive_field, write_parts};

/// A decoded image: `width * height` packed `0xRRGGBBAA` pixels, row-major.
///
/// Borrows its pixels from the pool it was decoded into, so it cannot
/// outlive a flush of that pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Image<'a> {
    pixels: &'a [u32],
    width: usize,
    height: usize,
}

impl<'a> Image<'a> {
    /// Wraps a pixel buffer.
    ///
    /// # Returns
    ///
    /// `None` unless `pixels.len() == width * height`.
    #[must_use]
    pub fn new(pixels: &'a [u32], width: usize, height: usize) -> Option<Self> {
        (width.checked_mul(height)? == pixels.len()).then_some(Self {
            pixels,
            width,
            height,
        })
    }

    /// Returns the pixel buffer.
    #[inline]
    #[must_use]
    pub const fn pixels(&self) -> &'a [u32] {
        self.pixels
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

    /// Returns the pixel at `(x, y)`, or `None` outside the image.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Returns row `y`, or `None` outside the image.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&'a [u32]> {
        let start = y.checked_mul(self.width)?;
        self.pixels.get(start..start.checked_add(self.width)?)
    }
}

/// Reads the fixed `.pam` header and returns `(width, height)`.
fn read_header<R: BufRead>(reader: &mut R) -> AssetResult<(usize, usize)> {
    expect_line(reader, "magic", "P7")?;
    let width = read_positive_field(reader, "WIDTH")?;
    let height = read_positive_field(reader, "HEIGHT")?;
    expect_field(reader, "DEPTH", "4")?;
    expect_field(reader, "MAXVAL", "255")?;
    expect_field(reader, "TUPLTYPE", "RGB_ALPHA")?;
    expect_line(reader, "end of header", "ENDHDR")?;
    Ok((width, height))
}

/// Decodes a `.pam` image, allocating its pixels from `pool`.
///
/// # Errors
///
/// Any [`AssetError`] decode failure. If the body is short, the pixel
/// buffer stays allocated until the pool is flushed or popped.
pub fn decode_image<'p, R: BufRead>(reader: &mut R, pool: &'p Pool) -> AssetResult<Image<'p>> {
    let (width, height) = read_header(reader)?;

    let overflow = || AssetError::MalformedHeader(format!("{width}x{height} image is too large"));
    let pixel_count = width.checked_mul(height).ok_or_else(overflow)?;
    let byte_count = pixel_count.checked_mul(4).ok_or_else(overflow)?;

    let pixels = pool
        .allocate_slice::<u32>(pixel_count)
        .ok_or(AssetError::Allocation {
            requested: byte_count,
        })?;
    read_body(reader, bytemuck::cast_slice_mut(pixels))?;

    // File bytes R G B A land in memory as the reverse of 0xRRGGBBAA.
    for pixel in pixels.iter_mut() {
        *pixel = u32::from_be(*pixel);
    }

    Ok(Image {
        pixels,
        width,
        height,
    })
}

/// Encodes `image` as `.pam`, writing its pixel words as raw native bytes.
///
/// # Errors
///
/// [`AssetError::ShortWrite`] or [`AssetError::Io`].
pub fn encode_image<W: Write>(image: &Image<'_>, writer: &mut W) -> AssetResult<()> {
    let header = format!(
        "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
        image.width, image.height
    );
    write_parts(writer, &[header.as_bytes(), bytemuck::cast_slice(image.pixels)])
}

/// Opens and decodes a `.pam` file.
///
/// # Errors
///
/// Any [`AssetError`] decode failure, including failure to open the file.
pub fn read_image_file<'p>(path: impl AsRef<Path>, pool: &'p Pool) -> AssetResult<Image<'p>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let image = decode_image(&mut reader, pool)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        "image decoded"
    );
    Ok(image)
}

/// Creates (or truncates) a `.pam` file and encodes `image` into it.
///
/// # Errors
///
/// Any [`AssetError`] encode failure, including failure to create the file.
pub fn write_image_file(image: &Image<'_>, path: impl AsRef<Path>) -> AssetResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode_image(image, &mut writer)
}
