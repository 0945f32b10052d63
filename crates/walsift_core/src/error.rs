//! Error types for the recovery pipeline.

use thiserror::Error;
use walsift_codec::CodecError;

use crate::chunk::ChunkError;

/// Result type for pipeline operations.
pub type SiftResult<T> = Result<T, SiftError>;

/// Errors that can end the recovery of a dump region.
///
/// Every stage returns its result explicitly; a failure is terminal for the
/// region it belongs to but never corrupts process-wide state, so the caller
/// can safely move on to the next candidate region or the next input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SiftError {
    /// No candidate hex-dump region was found anywhere in the input.
    #[error("No valid byte dump found in MongoDB log")]
    NoHexDumpFound,

    /// A chunk failed a structural check.
    #[error("Hex dump is corrupt: {cause}")]
    HexDumpCorrupt {
        /// The specific violation.
        cause: ChunkError,
    },

    /// Chunk indices do not form a contiguous sequence starting at zero.
    #[error("chunk sequence error: {message}")]
    ChunkSequence {
        /// Description of the gap or duplicate.
        message: String,
    },

    /// The reassembled buffer failed block verification or record decoding.
    #[error("block verification failed: {0}")]
    Codec(#[from] CodecError),
}

impl SiftError {
    /// Wraps a chunk violation in the corrupt-dump category.
    pub fn corrupt(cause: ChunkError) -> Self {
        Self::HexDumpCorrupt { cause }
    }

    /// Creates a chunk sequence error.
    pub fn chunk_sequence(message: impl Into<String>) -> Self {
        Self::ChunkSequence {
            message: message.into(),
        }
    }
}
