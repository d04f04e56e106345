//! # Sound Codec
//!
//! Mono `f32` sounds, in two layouts:
//!
//! ```text
//! SND                    <-- magic
//! SAMPLE_COUNT 48000     <-- number of samples
//! ENDHDR
//! <SAMPLE_COUNT native-endian f32 samples>
//! ```
//!
//! and headerless raw `f32` files whose sample count is the file length
//! divided by four.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use cardio_core::Pool;

use crate::error::{AssetError, AssetResult};
use crate::header::{expect_line, read_body, read_positive_field, write_parts};

/// Bytes per sample.
const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// A decoded mono sound.
///
/// Sounds are compared by buffer identity when the mixer looks for the
/// channels playing them; two sounds decoded from the same file are
/// different sounds.
#[derive(Clone, Copy, Debug)]
pub struct Sound<'a> {
    samples: &'a [f32],
}

impl<'a> Sound<'a> {
    /// Wraps a sample buffer.
    #[inline]
    #[must_use]
    pub const fn new(samples: &'a [f32]) -> Self {
        Self { samples }
    }

    /// Returns the samples.
    #[inline]
    #[must_use]
    pub const fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Returns the number of samples.
    #[inline]
    #[must_use]
    pub const fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the sound has no samples.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns `true` if `samples` is this sound's sample buffer.
    ///
    /// Both start and length must match: an empty buffer carved from a pool
    /// starts where the next allocation does.
    #[inline]
    #[must_use]
    pub fn shares_buffer(&self, samples: &[f32]) -> bool {
        std::ptr::eq(self.samples.as_ptr(), samples.as_ptr()) && self.samples.len() == samples.len()
    }

    /// Playback length in milliseconds at `sample_rate` samples per second.
    #[must_use]
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        if sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(sample_rate)
    }
}

/// Allocates `count` samples from `pool` and fills them from `reader`.
fn read_samples<'p, R: Read>(reader: &mut R, count: usize, pool: &'p Pool) -> AssetResult<&'p [f32]> {
    let samples = pool.allocate_slice::<f32>(count).ok_or(AssetError::Allocation {
        requested: count.saturating_mul(SAMPLE_BYTES),
    })?;
    read_body(reader, bytemuck::cast_slice_mut(samples))?;
    Ok(&*samples)
}

/// Decodes an `.af32` sound, allocating its samples from `pool`.
///
/// # Errors
///
/// Any [`AssetError`] decode failure. A sample count of zero is malformed.
pub fn decode_sound<'p, R: BufRead>(reader: &mut R, pool: &'p Pool) -> AssetResult<Sound<'p>> {
    expect_line(reader, "magic", "SND")?;
    let count = read_positive_field(reader, "SAMPLE_COUNT")?;
    expect_line(reader, "end of header", "ENDHDR")?;
    read_samples(reader, count, pool).map(Sound::new)
}

/// Encodes `sound` as `.af32`.
///
/// # Errors
///
/// [`AssetError::ShortWrite`] or [`AssetError::Io`].
pub fn encode_sound<W: Write>(sound: &Sound<'_>, writer: &mut W) -> AssetResult<()> {
    let header = format!("SND\nSAMPLE_COUNT {}\nENDHDR\n", sound.sample_count());
    write_parts(writer, &[header.as_bytes(), bytemuck::cast_slice(sound.samples)])
}

/// Decodes headerless `f32` samples from the first `byte_length` bytes.
///
/// Trailing bytes that do not fill a whole sample are ignored.
///
/// # Errors
///
/// [`AssetError::EmptyBody`] if not even one sample fits, otherwise any
/// [`AssetError`] decode failure.
pub fn decode_raw_sound<'p, R: Read>(
    reader: &mut R,
    byte_length: u64,
    pool: &'p Pool,
) -> AssetResult<Sound<'p>> {
    let count = usize::try_from(byte_length / SAMPLE_BYTES as u64).map_err(|_| {
        AssetError::Allocation {
            requested: usize::MAX,
        }
    })?;
    if count == 0 {
        return Err(AssetError::EmptyBody);
    }
    read_samples(reader, count, pool).map(Sound::new)
}

/// Opens and decodes an `.af32` file.
///
/// # Errors
///
/// Any [`AssetError`] decode failure, including failure to open the file.
pub fn read_sound_file<'p>(path: impl AsRef<Path>, pool: &'p Pool) -> AssetResult<Sound<'p>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let sound = decode_sound(&mut reader, pool)?;
    tracing::debug!(path = %path.display(), samples = sound.sample_count(), "sound decoded");
    Ok(sound)
}

/// Opens a headerless raw `f32` file and decodes all of it.
///
/// # Errors
///
/// Any [`AssetError`] decode failure, including failure to open the file.
pub fn read_raw_sound_file<'p>(path: impl AsRef<Path>, pool: &'p Pool) -> AssetResult<Sound<'p>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let byte_length = file.metadata()?.len();
    let sound = decode_raw_sound(&mut BufReader::new(file), byte_length, pool)?;
    tracing::debug!(path = %path.display(), samples = sound.sample_count(), "raw sound decoded");
    Ok(sound)
}

/// Creates (or truncates) an `.af32` file and encodes `sound` into it.
///
/// # Errors
///
/// Any [`AssetError`] encode failure, including failure to create the file.
pub fn write_sound_file(sound: &Sound<'_>, path: impl AsRef<Path>) -> AssetResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode_sound(sound, &mut writer)
}
