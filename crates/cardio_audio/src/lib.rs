//! # CARDIO Audio
//!
//! Fixed-channel mixer for a rhythm game:
//! - Mono `f32` sounds mixed to interleaved stereo with per-channel gains
//! - Play immediately, or queue silent and start exactly on a beat
//! - One lock shared by the audio thread and the main thread
//!
//! ## Example
//!
//! ```rust,ignore
//! let mixer = Mixer::new(config.audio.channels, config.audio.master_gain)?;
//! let click = mixer.queue(&beat, 1.0, 1.0, false);
//!
//! std::thread::scope(|scope| {
//!     scope.spawn(|| device.run(|out| mixer.mix(out)));
//!     // main loop: mixer.play_channel(click) on the beat
//! });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod mixer;

pub use error::{MixerError, MixerResult};
pub use mixer::{ChannelId, ChannelState, Mixer};
