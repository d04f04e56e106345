//! # Runtime Error Types
//!
//! Errors for configuration, catalog loading, and a top-level
//! [`CardioError`] that a host's startup path can return with `?`.

use std::path::PathBuf;

use cardio_assets::AssetError;
use cardio_audio::MixerError;
use cardio_core::{MemoryError, PoolId};
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values parse but cannot be used.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from loading a manifest entry into the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The asset file failed to decode.
    #[error("failed to load asset '{name}' from {path}: {source}")]
    Decode {
        /// Manifest name of the asset.
        name: String,
        /// File that failed.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: AssetError,
    },

    /// The file decoded but does not fit the layout the manifest declares.
    #[error("asset '{name}' from {path} does not fit its layout: {detail}")]
    Layout {
        /// Manifest name of the asset.
        name: String,
        /// File that was decoded.
        path: PathBuf,
        /// What did not fit.
        detail: &'static str,
    },

    /// Two manifest entries of one kind share a name.
    #[error("duplicate asset name '{0}'")]
    Duplicate(String),
}

impl CatalogError {
    /// Manifest name of the asset that failed.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Decode { name, .. } | Self::Layout { name, .. } | Self::Duplicate(name) => name,
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Any failure on a host's startup path.
#[derive(Error, Debug)]
pub enum CardioError {
    /// Memory pools could not be set up.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required asset could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An asset could not be encoded or decoded.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The mixer could not be created.
    #[error(transparent)]
    Mixer(#[from] MixerError),

    /// Filesystem failure outside the codecs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An asset the host needs is not in the catalog.
    #[error("asset '{0}' is missing from the catalog")]
    Missing(String),

    /// A buffer does not match the dimensions it was created for.
    #[error("{0} does not match its dimensions")]
    Layout(&'static str),

    /// A pool could not satisfy a startup allocation.
    #[error("{pool} pool exhausted allocating {requested} bytes")]
    Exhausted {
        /// Pool that ran out.
        pool: PoolId,
        /// Bytes requested.
        requested: usize,
    },
}

/// Result type for host startup.
pub type CardioResult<T> = Result<T, CardioError>;
