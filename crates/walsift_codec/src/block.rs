//! WAL block framing: header parsing, checksum verification, block building.
//!
//! A block is a fixed-size header followed by a record region. The header
//! records the region's length and its CRC32 checksum; verification happens
//! before any record decoding so later stages only ever see trusted bytes.

use bytes::{BufMut, Bytes, BytesMut};
use crc32fast::Hasher;

use crate::error::{CodecError, CodecResult};
use crate::record::{encode_frame, LogRecord};

/// Magic bytes identifying a WAL block.
pub const BLOCK_MAGIC: [u8; 4] = *b"WSLB";

/// Current WAL block format version.
pub const BLOCK_VERSION: u16 = 1;

/// Block header size in bytes (magic + version + length + checksum).
pub const BLOCK_HEADER_SIZE: usize = 14;

/// Block header describing the record region that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block magic bytes.
    pub magic: [u8; 4],
    /// Block format version.
    pub version: u16,
    /// Record region length in bytes.
    pub length: u32,
    /// CRC32 checksum of the record region.
    pub checksum: u32,
}

impl BlockHeader {
    /// Creates a header for the given record region.
    #[must_use]
    pub fn new(region: &[u8]) -> Self {
        Self {
            magic: BLOCK_MAGIC,
            version: BLOCK_VERSION,
            length: region.len() as u32,
            checksum: compute_checksum(region),
        }
    }

    /// Encodes the header into `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.magic);
        buf.put_u16_le(self.version);
        buf.put_u32_le(self.length);
        buf.put_u32_le(self.checksum);
    }

    /// Decodes a header from the start of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TruncatedBlock`] if the buffer is too short to
    /// hold a header at all.
    pub fn decode(buf: &[u8]) -> CodecResult<Self> {
        if buf.len() < BLOCK_HEADER_SIZE {
            return Err(CodecError::TruncatedBlock {
                declared: BLOCK_HEADER_SIZE,
                available: buf.len(),
            });
        }
        Ok(Self {
            magic: [buf[0], buf[1], buf[2], buf[3]],
            version: u16::from_le_bytes([buf[4], buf[5]]),
            length: u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
            checksum: u32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]),
        })
    }

    /// Validates the magic and version fields.
    pub fn validate(&self) -> CodecResult<()> {
        if self.magic != BLOCK_MAGIC {
            return Err(CodecError::InvalidMagic { found: self.magic });
        }
        if self.version > BLOCK_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Verifies a reassembled buffer and returns its trusted record region.
///
/// Checks run in a fixed order: header shape, magic, version, declared
/// length against available bytes, then the checksum. Bytes past the
/// declared region are ignored; a dump scraped out of a log may carry
/// trailing noise.
///
/// # Errors
///
/// Returns the first failing check as a [`CodecError`]. On
/// [`CodecError::TruncatedBlock`] no checksum is computed.
pub fn verify_block(buf: &[u8]) -> CodecResult<(BlockHeader, &[u8])> {
    let header = BlockHeader::decode(buf)?;
    header.validate()?;

    let available = buf.len() - BLOCK_HEADER_SIZE;
    let declared = header.length as usize;
    if declared > available {
        return Err(CodecError::TruncatedBlock {
            declared,
            available,
        });
    }

    let region = &buf[BLOCK_HEADER_SIZE..BLOCK_HEADER_SIZE + declared];
    let actual = compute_checksum(region);
    if actual != header.checksum {
        return Err(CodecError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    Ok((header, region))
}

/// Computes the CRC32 checksum of `data`.
#[must_use]
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Builds a well-formed WAL block from a sequence of records.
///
/// This is the encoder side of the format; the tool itself only decodes, but
/// fixtures and round-trip tests need a known-good producer.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    records: Vec<LogRecord>,
}

impl BlockBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the block.
    pub fn push(&mut self, record: LogRecord) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Encodes all records and seals them behind a header.
    ///
    /// # Errors
    ///
    /// Returns an error if a record field exceeds its length-prefix range.
    pub fn seal(&self) -> CodecResult<Bytes> {
        let mut region = BytesMut::new();
        for record in &self.records {
            encode_frame(record, &mut region)?;
        }

        let header = BlockHeader::new(&region);
        let mut buf = BytesMut::with_capacity(BLOCK_HEADER_SIZE + region.len());
        header.encode(&mut buf);
        buf.put_slice(&region);
        Ok(buf.freeze())
    }
}
