//! # walsift core
//!
//! Recovers a storage engine's WAL block from a hex dump embedded in a
//! server log and decodes it into structured records.
//!
//! The pipeline runs five stages in a fixed order: hex scanning, per-chunk
//! validation, buffer reassembly, checksum verification, record decoding.
//! Any stage may end a region early with a diagnostic; later stages never
//! see a buffer that failed an earlier one.
//!
//! The core is a pure function over text. It performs no file I/O; the
//! caller hands it already-read input and an output sink.
//!
//! ## Usage
//!
//! ```
//! use walsift_core::{decode_log_text, DecodeOptions};
//!
//! let report = decode_log_text("no dumps in here\n", &DecodeOptions::default());
//! assert!(!report.recovered());
//!
//! let mut rendered = Vec::new();
//! report.render_text(&mut rendered).unwrap();
//! assert!(String::from_utf8(rendered)
//!     .unwrap()
//!     .contains("No valid byte dump found in MongoDB log"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chunk;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod reassemble;
pub mod report;
pub mod scan;

pub use chunk::{validate, ChunkError, RawChunk, ValidatedChunk};
pub use error::{SiftError, SiftResult};
pub use options::DecodeOptions;
pub use pipeline::decode_log_text;
pub use reassemble::reassemble;
pub use report::{
    hex_encode, BlockHeaderInfo, DecodeReport, MalformedInfo, RecordInfo, RecoveredDump,
    RegionFailure,
};
pub use scan::{DumpRegion, HexScanner};

/// Current version of walsift core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
