//! # walsift codec
//!
//! The binary layer of walsift: WAL block framing and record decoding.
//!
//! A block is a 14-byte header (magic, format version, record region length,
//! CRC32 checksum) followed by a record region. Records are self-describing
//! frames: a type tag, a payload length, then type-specific fields.
//!
//! This crate is pure data transformation over in-memory buffers. It never
//! reads files and never panics on malformed input; every violation is
//! reported as a [`CodecError`] carrying the offset where it was detected.
//!
//! ## Usage
//!
//! ```
//! use walsift_codec::{verify_block, BlockBuilder, LogRecord, RecordReader, Timestamp, TxnId};
//!
//! let mut builder = BlockBuilder::new();
//! builder.push(LogRecord::Checkpoint {
//!     checkpoint_ts: Timestamp::new(42),
//! });
//! let block = builder.seal().unwrap();
//!
//! let (header, region) = verify_block(&block).unwrap();
//! assert_eq!(header.length as usize, region.len());
//! let records: Vec<_> = RecordReader::new(region).map(|r| r.unwrap()).collect();
//! assert_eq!(records.len(), 1);
//! # let _ = TxnId::new(0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod cursor;
mod error;
mod record;
mod types;

pub use block::{
    compute_checksum, verify_block, BlockBuilder, BlockHeader, BLOCK_HEADER_SIZE, BLOCK_MAGIC,
    BLOCK_VERSION,
};
pub use cursor::Cursor;
pub use error::{CodecError, CodecResult};
pub use record::{encode_frame, LogRecord, LogRecordType, RecordReader, FRAME_HEADER_SIZE};
pub use types::{Timestamp, TxnId};
