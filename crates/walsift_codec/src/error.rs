//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while verifying or decoding a WAL block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer does not start with the WAL block magic.
    #[error("invalid block magic {found:02x?}")]
    InvalidMagic {
        /// The four bytes found where the magic was expected.
        found: [u8; 4],
    },

    /// The block header declares a format version this tool does not know.
    #[error("unsupported block format version {found}")]
    UnsupportedVersion {
        /// The version found in the header.
        found: u16,
    },

    /// The header declares more bytes than the buffer holds.
    ///
    /// Raised before any checksum work: a checksum cannot be meaningfully
    /// computed over missing bytes.
    #[error("truncated block: header declares {declared} bytes but only {available} are available")]
    TruncatedBlock {
        /// Byte count declared by the header (or required for the header itself).
        declared: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// The recomputed checksum disagrees with the one recorded in the header.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum recorded in the block header.
        expected: u32,
        /// Checksum recomputed over the record region.
        actual: u32,
    },

    /// A record frame violates the format inside an otherwise-trusted block.
    #[error("malformed record at offset {offset}: {message}")]
    MalformedRecord {
        /// Byte offset into the record region where the problem was detected.
        offset: usize,
        /// Description of the violation.
        message: String,
    },

    /// A record field exceeds the range of its `u32` length prefix.
    ///
    /// Encode-side only; decoded fields are bounded by the block length.
    #[error("{field} of {len} bytes exceeds the u32 length prefix")]
    FieldTooLarge {
        /// Name of the oversized field.
        field: &'static str,
        /// Actual field length.
        len: usize,
    },
}

impl CodecError {
    /// Creates a malformed record error.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            offset,
            message: message.into(),
        }
    }

    /// Shifts a [`CodecError::MalformedRecord`] offset by `base`.
    ///
    /// Payload decoding works with payload-relative offsets; callers that
    /// know where the payload sits in the record region use this to report
    /// region-relative positions.
    #[must_use]
    pub fn with_base_offset(self, base: usize) -> Self {
        match self {
            Self::MalformedRecord { offset, message } => Self::MalformedRecord {
                offset: base + offset,
                message,
            },
            other => other,
        }
    }
}
