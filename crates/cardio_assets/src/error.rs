//! # Asset Error Types
//!
//! All errors that can occur while decoding or encoding assets.

use std::io;

use thiserror::Error;

/// Errors that can occur in the asset codecs.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A header line is missing, too long, or not a valid field.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A header field does not hold its required value.
    #[error("header field {field}: expected {expected}, found {found:?}")]
    FieldMismatch {
        /// The field that mismatched.
        field: &'static str,
        /// The value the format requires.
        expected: &'static str,
        /// The value found in the file.
        found: String,
    },

    /// Fewer body bytes followed the header than it declared.
    #[error("body too short: expected {expected} bytes, read {read}")]
    ShortBody {
        /// Bytes the header declared.
        expected: usize,
        /// Bytes actually read.
        read: usize,
    },

    /// A headerless asset had no usable content.
    #[error("asset body is empty")]
    EmptyBody,

    /// The destination pool could not hold the decoded buffer.
    #[error("pool exhausted: {requested} bytes requested")]
    Allocation {
        /// Bytes requested from the pool.
        requested: usize,
    },

    /// The writer accepted fewer bytes than the encoding produced.
    #[error("short write: expected {expected} bytes, wrote {written}")]
    ShortWrite {
        /// Bytes the encoding produced.
        expected: usize,
        /// Bytes the writer accepted.
        written: usize,
    },
}

impl AssetError {
    /// Returns `true` for errors a decoder produces.
    ///
    /// Decoders report every failure through this one class; the variant
    /// only adds diagnostics.
    #[must_use]
    pub const fn is_decode_failure(&self) -> bool {
        !matches!(self, AssetError::ShortWrite { .. })
    }

    /// Returns `true` for errors an encoder produces.
    #[must_use]
    pub const fn is_encode_failure(&self) -> bool {
        matches!(self, AssetError::ShortWrite { .. } | AssetError::Io(_))
    }
}

/// Result type for codec operations.
pub type AssetResult<T> = Result<T, AssetError>;
