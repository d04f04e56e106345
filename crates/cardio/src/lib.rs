//! # CARDIO
//!
//! Runtime substrate for a frame-locked rhythm game:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ startup   CardioConfig ─> MemoryPools ─> AssetCatalog      │
//! │                              │                │            │
//! │ frame     frame pool flush   │  Canvas <── Image/Font/     │
//! │           FrameClock ───────────────────> AnimatedImage    │
//! │                                                            │
//! │ audio     Mixer::mix on the device thread <── Sound        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The member crates are re-exported as [`memory`], [`assets`], [`render`]
//! and [`audio`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use cardio::{AssetCatalog, CardioConfig, LoadPolicy};
//! use cardio::memory::MemoryPools;
//!
//! let config = CardioConfig::from_file("cardio.toml")?;
//! let pools = MemoryPools::initialize(
//!     config.memory.persistent_bytes,
//!     config.memory.scene_bytes,
//!     config.memory.frame_bytes,
//! )?;
//! let catalog = AssetCatalog::load(&pools.scene, &config.assets, Path::new("."), LoadPolicy::Startup)?;
//! let heart = catalog.sprite("heart");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;

pub use cardio_assets as assets;
pub use cardio_audio as audio;
pub use cardio_core as memory;
pub use cardio_render as render;

pub use catalog::{AssetCatalog, LoadPolicy};
pub use clock::{FrameClock, FRAME_PERIOD};
pub use config::{
    AssetManifest, AudioConfig, CardioConfig, FontEntry, ImageEntry, MemoryConfig, SoundEntry,
    SoundFormat, SpriteEntry, VideoConfig,
};
pub use error::{
    CardioError, CardioResult, CatalogError, CatalogResult, ConfigError, ConfigResult,
};
