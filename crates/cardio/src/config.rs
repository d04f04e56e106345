//! # Runtime Configuration
//!
//! Pool sizes, screen, mixer and the asset manifest, read from TOML:
//!
//! ```toml
//! [memory]
//! persistent_bytes = 67108864
//! scene_bytes = 33554432
//! frame_bytes = 8388608
//!
//! [video]
//! width = 320
//! height = 200
//!
//! [audio]
//! channels = 16
//! master_gain = 0.5
//! sample_rate = 48000
//!
//! [assets]
//! directory = "assets"
//!
//! [[assets.sprites]]
//! name = "heart"
//! file = "heart.pam"
//! frame_count = 4
//! frame_duration_ms = 80
//!
//! [[assets.sounds]]
//! name = "beat"
//! file = "beat.af32"
//! ```
//!
//! Every section and field is optional; missing values take the defaults
//! below.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use cardio_audio::{Mixer, MixerResult};
use cardio_core::{MemoryPools, MemoryResult};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Pool capacities in bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    /// Total reservation; the scene and frame pools are carved from it.
    pub persistent_bytes: usize,
    /// Scene pool capacity.
    pub scene_bytes: usize,
    /// Frame pool capacity.
    pub frame_bytes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            persistent_bytes: 64 << 20,
            scene_bytes: 32 << 20,
            frame_bytes: 8 << 20,
        }
    }
}

impl MemoryConfig {
    /// Reserves and partitions the pools.
    ///
    /// # Errors
    ///
    /// As [`MemoryPools::initialize`].
    pub fn initialize(&self) -> MemoryResult<MemoryPools> {
        MemoryPools::initialize(self.persistent_bytes, self.scene_bytes, self.frame_bytes)
    }
}

/// Framebuffer size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: cardio_render::SCREEN_WIDTH,
            height: cardio_render::SCREEN_HEIGHT,
        }
    }
}

/// Mixer setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Number of mixer channels.
    pub channels: usize,
    /// Master gain applied to every channel.
    pub master_gain: f32,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            channels: 16,
            master_gain: 0.5,
            sample_rate: 48_000,
        }
    }
}

impl AudioConfig {
    /// Creates a mixer with the configured channels and gain.
    ///
    /// # Errors
    ///
    /// As [`Mixer::new`].
    pub fn create_mixer<'a>(&self) -> MixerResult<Mixer<'a>> {
        Mixer::new(self.channels, self.master_gain)
    }
}

/// A still image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageEntry {
    /// Lookup name.
    pub name: String,
    /// `.pam` file, relative to the asset directory.
    pub file: PathBuf,
}

/// A sprite sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteEntry {
    /// Lookup name.
    pub name: String,
    /// `.pam` file, relative to the asset directory.
    pub file: PathBuf,
    /// Number of frames in the sheet.
    pub frame_count: usize,
    /// How long each frame is shown.
    pub frame_duration_ms: u64,
    /// Frame width; defaults to the sheet width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<usize>,
    /// Frame height; defaults to the sheet height over `frame_count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<usize>,
}

/// A bitmap font.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontEntry {
    /// Lookup name.
    pub name: String,
    /// `.pam` glyph strip, relative to the asset directory.
    pub file: PathBuf,
    /// Glyph width in pixels.
    pub char_width: usize,
    /// Glyph height in pixels.
    pub char_height: usize,
}

/// On-disk layout of a sound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundFormat {
    /// `.af32` with header.
    #[default]
    Af32,
    /// Headerless native-endian `f32`.
    Raw,
}

/// A sound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundEntry {
    /// Lookup name.
    pub name: String,
    /// Sound file, relative to the asset directory.
    pub file: PathBuf,
    /// File layout.
    #[serde(default)]
    pub format: SoundFormat,
}

/// Every asset a scene loads, by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetManifest {
    /// Directory the entry files are relative to.
    pub directory: PathBuf,
    /// Still images.
    pub images: Vec<ImageEntry>,
    /// Sprite sheets.
    pub sprites: Vec<SpriteEntry>,
    /// Fonts.
    pub fonts: Vec<FontEntry>,
    /// Sounds.
    pub sounds: Vec<SoundEntry>,
}

impl AssetManifest {
    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len() + self.sprites.len() + self.fonts.len() + self.sounds.len()
    }

    /// Returns `true` if the manifest lists nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> ConfigResult<()> {
        unique_names("image", self.images.iter().map(|entry| entry.name.as_str()))?;
        unique_names("sprite", self.sprites.iter().map(|entry| entry.name.as_str()))?;
        unique_names("font", self.fonts.iter().map(|entry| entry.name.as_str()))?;
        unique_names("sound", self.sounds.iter().map(|entry| entry.name.as_str()))?;

        for sprite in &self.sprites {
            if sprite.frame_count == 0 {
                return Err(invalid(format!("sprite '{}' has no frames", sprite.name)));
            }
            if sprite.frame_width == Some(0) || sprite.frame_height == Some(0) {
                return Err(invalid(format!("sprite '{}' has an empty frame size", sprite.name)));
            }
        }
        for font in &self.fonts {
            if font.char_width == 0 || font.char_height == 0 {
                return Err(invalid(format!("font '{}' has an empty glyph size", font.name)));
            }
        }
        Ok(())
    }
}

fn unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(invalid(format!("{kind} entry with an empty name")));
        }
        if !seen.insert(name) {
            return Err(invalid(format!("duplicate {kind} name '{name}'")));
        }
    }
    Ok(())
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

/// Complete runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardioConfig {
    /// Pool sizes.
    pub memory: MemoryConfig,
    /// Screen size.
    pub video: VideoConfig,
    /// Mixer setup.
    pub audio: AudioConfig,
    /// Assets to load at startup.
    pub assets: AssetManifest,
}

impl CardioConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML or unknown fields, and
    /// [`ConfigError::Invalid`] for values [`CardioConfig::validate`]
    /// rejects.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`CardioConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), assets = config.assets.len(), "config loaded");
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that the values describe a runtime that can start.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        let memory = &self.memory;
        if memory.persistent_bytes == 0 || memory.scene_bytes == 0 || memory.frame_bytes == 0 {
            return Err(invalid("pool sizes must be non-zero".to_owned()));
        }
        let fits = memory
            .scene_bytes
            .checked_add(memory.frame_bytes)
            .is_some_and(|sum| sum <= memory.persistent_bytes);
        if !fits {
            return Err(invalid(format!(
                "scene ({}) + frame ({}) bytes exceed persistent ({}) bytes",
                memory.scene_bytes, memory.frame_bytes, memory.persistent_bytes
            )));
        }

        if self.video.width == 0 || self.video.height == 0 {
            return Err(invalid("video size must be non-zero".to_owned()));
        }

        let audio = &self.audio;
        if audio.channels == 0 {
            return Err(invalid("mixer needs at least one channel".to_owned()));
        }
        if !audio.master_gain.is_finite() || audio.master_gain < 0.0 {
            return Err(invalid(format!("master gain {} is not a finite non-negative number", audio.master_gain)));
        }
        if audio.sample_rate == 0 {
            return Err(invalid("sample rate must be non-zero".to_owned()));
        }

        self.assets.validate()
    }

    /// Bytes the framebuffer takes in the persistent pool.
    #[must_use]
    pub fn framebuffer_bytes(&self) -> Option<usize> {
        self.video.width.checked_mul(self.video.height)?.checked_mul(4)
    }
}
