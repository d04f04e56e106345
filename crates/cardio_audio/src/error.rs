//! # Mixer Error Types

use thiserror::Error;

/// Errors that can occur while creating a mixer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MixerError {
    /// A mixer needs at least one channel.
    #[error("mixer needs at least one channel")]
    NoChannels,

    /// The channel array could not be reserved.
    #[error("failed to reserve {channels} mixer channels")]
    Allocation {
        /// Number of channels requested.
        channels: usize,
    },
}

/// Result type for mixer operations.
pub type MixerResult<T> = Result<T, MixerError>;
