//! # CARDIO Assets
//!
//! Binary codecs for the runtime's two asset kinds:
//! - `.pam` RGBA images, decoded into packed `0xRRGGBBAA` pixels
//! - `.af32` mono `f32` sounds, plus headerless raw `f32` files
//!
//! Every decoder allocates its output from a caller-chosen [`Pool`], so an
//! asset lives exactly as long as the pool it was loaded into.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cardio_assets::{read_image_file, read_sound_file};
//! use cardio_core::MemoryPools;
//!
//! let pools = MemoryPools::initialize(64 << 20, 32 << 20, 8 << 20)?;
//! let heart = read_image_file("assets/heart.pam", &pools.scene)?;
//! let beat = read_sound_file("assets/beat.af32", &pools.scene)?;
//! ```
//!
//! [`Pool`]: cardio_core::Pool

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
mod header;
pub mod image;
pub mod pixel;
pub mod sound;

pub use error::{AssetError, AssetResult};
pub use image::{decode_image, encode_image, read_image_file, write_image_file, Image};
pub use pixel::rgba;
pub use sound::{
    decode_raw_sound, decode_sound, encode_sound, read_raw_sound_file, read_sound_file,
    write_sound_file, Sound,
};
