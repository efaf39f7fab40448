//! Error type shared by sketch construction, serialization and merging.

use std::fmt;

/// Convenience alias for fallible sketch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by sketch operations.
///
/// Every variant is recoverable: a failed operation leaves the sketch it
/// targeted unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Precision outside the supported `[4, 16]` range, either at
    /// construction or declared by a serialized header.
    InvalidPrecision(u8),
    /// Destination buffer cannot hold the encoded sketch.
    BufferTooSmall {
        /// Bytes the encoded sketch occupies.
        required: usize,
        /// Bytes the caller supplied.
        capacity: usize,
    },
    /// Serialized buffer carries an unknown format version.
    UnsupportedVersion(u8),
    /// Serialized buffer length does not match its declared precision.
    LengthMismatch {
        /// Length implied by the declared precision.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
    /// Serialized register value exceeds the maximum rank representable
    /// for the declared precision.
    RankOutOfRange {
        /// Bucket index of the offending register.
        bucket: usize,
        /// The out-of-range value.
        rank: u8,
    },
    /// Merge input was built with a different precision than the
    /// destination sketch.
    PrecisionMismatch {
        /// The destination sketch's precision.
        expected: u8,
        /// The input's precision.
        actual: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPrecision(precision) => {
                write!(f, "precision {} is outside the supported [4, 16] range", precision)
            }
            Error::BufferTooSmall { required, capacity } => {
                write!(f, "destination holds {} bytes but the encoded sketch needs {}", capacity, required)
            }
            Error::UnsupportedVersion(version) => {
                write!(f, "unknown serialization format version {}", version)
            }
            Error::LengthMismatch { expected, actual } => {
                write!(f, "serialized sketch is {} bytes, expected {}", actual, expected)
            }
            Error::RankOutOfRange { bucket, rank } => {
                write!(f, "register {} holds unrepresentable rank {}", bucket, rank)
            }
            Error::PrecisionMismatch { expected, actual } => {
                write!(f, "cannot merge precision {} input into precision {} sketch", actual, expected)
            }
        }
    }
}

impl std::error::Error for Error {}
