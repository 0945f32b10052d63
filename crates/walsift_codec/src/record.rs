//! WAL record types, frame encoding and the lazy record reader.
//!
//! Records are self-describing frames inside a verified block: a type tag,
//! a payload length, then type-specific fields. The reader walks the record
//! region with a forward-only cursor and stops at the first framing
//! violation; records already yielded stay valid output.

use bytes::{BufMut, BytesMut};

use crate::cursor::Cursor;
use crate::error::{CodecError, CodecResult};
use crate::types::{Timestamp, TxnId};

/// Record frame header size: type tag (1) + payload length (4).
pub const FRAME_HEADER_SIZE: usize = 5;

/// Type of WAL record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// A key/value insertion or update.
    Insert = 1,
    /// A key removal.
    Remove = 2,
    /// A transaction prepare marker.
    Prepare = 3,
    /// A transaction commit marker.
    Commit = 4,
    /// A checkpoint marker.
    Checkpoint = 5,
    /// Diagnostic text the engine wrote into the log.
    Message = 6,
}

impl LogRecordType {
    /// Converts a tag byte to a record type.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Insert),
            2 => Some(Self::Remove),
            3 => Some(Self::Prepare),
            4 => Some(Self::Commit),
            5 => Some(Self::Checkpoint),
            6 => Some(Self::Message),
            _ => None,
        }
    }

    /// Converts the record type to its tag byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Upper-case name used in rendered output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Remove => "REMOVE",
            Self::Prepare => "PREPARE",
            Self::Commit => "COMMIT",
            Self::Checkpoint => "CHECKPOINT",
            Self::Message => "MESSAGE",
        }
    }
}

/// One decoded WAL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A key/value insertion or update.
    Insert {
        /// Owning transaction.
        txn_id: TxnId,
        /// Commit timestamp.
        commit_ts: Timestamp,
        /// Durable timestamp.
        durable_ts: Timestamp,
        /// Key bytes.
        key: Vec<u8>,
        /// Value bytes.
        value: Vec<u8>,
    },

    /// A key removal.
    Remove {
        /// Owning transaction.
        txn_id: TxnId,
        /// Commit timestamp.
        commit_ts: Timestamp,
        /// Durable timestamp.
        durable_ts: Timestamp,
        /// Key bytes.
        key: Vec<u8>,
    },

    /// A transaction prepare marker.
    Prepare {
        /// Owning transaction.
        txn_id: TxnId,
        /// Prepare timestamp.
        prepare_ts: Timestamp,
    },

    /// A transaction commit marker.
    Commit {
        /// Owning transaction.
        txn_id: TxnId,
        /// Commit timestamp.
        commit_ts: Timestamp,
        /// Durable timestamp.
        durable_ts: Timestamp,
    },

    /// A checkpoint marker.
    Checkpoint {
        /// Timestamp the checkpoint is stable at.
        checkpoint_ts: Timestamp,
    },

    /// Diagnostic text the engine wrote into the log.
    Message {
        /// Message text.
        text: String,
    },
}

impl LogRecord {
    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> LogRecordType {
        match self {
            Self::Insert { .. } => LogRecordType::Insert,
            Self::Remove { .. } => LogRecordType::Remove,
            Self::Prepare { .. } => LogRecordType::Prepare,
            Self::Commit { .. } => LogRecordType::Commit,
            Self::Checkpoint { .. } => LogRecordType::Checkpoint,
            Self::Message { .. } => LogRecordType::Message,
        }
    }

    /// Returns the transaction ID if this record carries one.
    #[must_use]
    pub fn txn_id(&self) -> Option<TxnId> {
        match self {
            Self::Insert { txn_id, .. }
            | Self::Remove { txn_id, .. }
            | Self::Prepare { txn_id, .. }
            | Self::Commit { txn_id, .. } => Some(*txn_id),
            Self::Checkpoint { .. } | Self::Message { .. } => None,
        }
    }

    /// Serializes the record payload (without the frame header).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable-length field exceeds the range of its
    /// `u32` length prefix.
    pub fn encode_payload(&self) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();

        match self {
            Self::Insert {
                txn_id,
                commit_ts,
                durable_ts,
                key,
                value,
            } => {
                buf.extend_from_slice(&txn_id.as_u64().to_le_bytes());
                buf.extend_from_slice(&commit_ts.as_u64().to_le_bytes());
                buf.extend_from_slice(&durable_ts.as_u64().to_le_bytes());
                put_len_prefixed(&mut buf, "key", key)?;
                put_len_prefixed(&mut buf, "value", value)?;
            }

            Self::Remove {
                txn_id,
                commit_ts,
                durable_ts,
                key,
            } => {
                buf.extend_from_slice(&txn_id.as_u64().to_le_bytes());
                buf.extend_from_slice(&commit_ts.as_u64().to_le_bytes());
                buf.extend_from_slice(&durable_ts.as_u64().to_le_bytes());
                put_len_prefixed(&mut buf, "key", key)?;
            }

            Self::Prepare { txn_id, prepare_ts } => {
                buf.extend_from_slice(&txn_id.as_u64().to_le_bytes());
                buf.extend_from_slice(&prepare_ts.as_u64().to_le_bytes());
            }

            Self::Commit {
                txn_id,
                commit_ts,
                durable_ts,
            } => {
                buf.extend_from_slice(&txn_id.as_u64().to_le_bytes());
                buf.extend_from_slice(&commit_ts.as_u64().to_le_bytes());
                buf.extend_from_slice(&durable_ts.as_u64().to_le_bytes());
            }

            Self::Checkpoint { checkpoint_ts } => {
                buf.extend_from_slice(&checkpoint_ts.as_u64().to_le_bytes());
            }

            Self::Message { text } => {
                put_len_prefixed(&mut buf, "message text", text.as_bytes())?;
            }
        }

        Ok(buf)
    }

    /// Deserializes a record from its type and payload.
    ///
    /// The payload must be consumed exactly; trailing bytes are a framing
    /// violation. Offsets in errors are payload-relative.
    pub fn decode_payload(record_type: LogRecordType, payload: &[u8]) -> CodecResult<Self> {
        let mut cursor = Cursor::new(payload);

        let record = match record_type {
            LogRecordType::Insert => {
                let txn_id = TxnId::new(cursor.read_u64()?);
                let commit_ts = Timestamp::new(cursor.read_u64()?);
                let durable_ts = Timestamp::new(cursor.read_u64()?);
                let key = cursor.read_len_prefixed()?.to_vec();
                let value = cursor.read_len_prefixed()?.to_vec();
                Self::Insert {
                    txn_id,
                    commit_ts,
                    durable_ts,
                    key,
                    value,
                }
            }

            LogRecordType::Remove => {
                let txn_id = TxnId::new(cursor.read_u64()?);
                let commit_ts = Timestamp::new(cursor.read_u64()?);
                let durable_ts = Timestamp::new(cursor.read_u64()?);
                let key = cursor.read_len_prefixed()?.to_vec();
                Self::Remove {
                    txn_id,
                    commit_ts,
                    durable_ts,
                    key,
                }
            }

            LogRecordType::Prepare => Self::Prepare {
                txn_id: TxnId::new(cursor.read_u64()?),
                prepare_ts: Timestamp::new(cursor.read_u64()?),
            },

            LogRecordType::Commit => Self::Commit {
                txn_id: TxnId::new(cursor.read_u64()?),
                commit_ts: Timestamp::new(cursor.read_u64()?),
                durable_ts: Timestamp::new(cursor.read_u64()?),
            },

            LogRecordType::Checkpoint => Self::Checkpoint {
                checkpoint_ts: Timestamp::new(cursor.read_u64()?),
            },

            LogRecordType::Message => {
                let bytes = cursor.read_len_prefixed()?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| {
                        CodecError::malformed(0, "message text is not valid UTF-8")
                    })?
                    .to_string();
                Self::Message { text }
            }
        };

        if !cursor.is_empty() {
            return Err(CodecError::malformed(
                cursor.position(),
                format!(
                    "trailing bytes in {} record: {} of {} consumed",
                    record_type.name(),
                    cursor.position(),
                    payload.len()
                ),
            ));
        }

        Ok(record)
    }
}

fn put_len_prefixed(buf: &mut Vec<u8>, field: &'static str, bytes: &[u8]) -> CodecResult<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| CodecError::FieldTooLarge {
        field,
        len: bytes.len(),
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Encodes one record as a complete frame (tag + payload length + payload).
pub fn encode_frame(record: &LogRecord, buf: &mut BytesMut) -> CodecResult<()> {
    let payload = record.encode_payload()?;
    buf.put_u8(record.record_type().as_byte());
    buf.put_u32_le(payload.len() as u32);
    buf.put_slice(&payload);
    Ok(())
}

/// A lazy iterator over the records of a verified block region.
///
/// Yields `(offset, record)` pairs, the offset being region-relative. The
/// region must be consumed exactly; the first framing violation is yielded
/// as an error and iteration stops.
#[derive(Debug)]
pub struct RecordReader<'a> {
    region: &'a [u8],
    offset: usize,
    finished: bool,
}

impl<'a> RecordReader<'a> {
    /// Creates a reader over a checksum-verified record region.
    #[must_use]
    pub fn new(region: &'a [u8]) -> Self {
        Self {
            region,
            offset: 0,
            finished: false,
        }
    }

    /// Region-relative offset of the next unread byte.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn read_next(&mut self) -> CodecResult<Option<(usize, LogRecord)>> {
        if self.offset == self.region.len() {
            return Ok(None);
        }

        let start = self.offset;
        let remaining = self.region.len() - start;
        if remaining < FRAME_HEADER_SIZE {
            return Err(CodecError::malformed(
                start,
                format!(
                    "record frame header needs {FRAME_HEADER_SIZE} bytes, {remaining} left in block"
                ),
            ));
        }

        let tag = self.region[start];
        let record_type = LogRecordType::from_byte(tag).ok_or_else(|| {
            CodecError::malformed(start, format!("unknown record type tag {tag:#04x}"))
        })?;

        let payload_len = u32::from_le_bytes([
            self.region[start + 1],
            self.region[start + 2],
            self.region[start + 3],
            self.region[start + 4],
        ]) as usize;

        let payload_start = start + FRAME_HEADER_SIZE;
        let frame_end = payload_start + payload_len;
        if frame_end > self.region.len() {
            return Err(CodecError::malformed(
                start,
                format!(
                    "{} record declares {payload_len} payload bytes, overrunning the block boundary",
                    record_type.name()
                ),
            ));
        }

        let payload = &self.region[payload_start..frame_end];
        let record = LogRecord::decode_payload(record_type, payload)
            .map_err(|e| e.with_base_offset(payload_start))?;

        self.offset = frame_end;
        Ok(Some((start, record)))
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = CodecResult<(usize, LogRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
