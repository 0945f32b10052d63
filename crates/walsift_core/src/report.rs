//! Decode results and their rendering.
//!
//! The report carries everything an operator needs from a damaged dump:
//! per-region diagnostics, the recovered block's header, the decoded
//! records, and the stop point when decoding ended early. Rendering is
//! stable-field-order text or, through serde, whatever the caller wants.

use serde::Serialize;
use std::io::{self, Write};

use walsift_codec::{BlockHeader, LogRecord};

use crate::error::SiftError;

/// Longest run of bytes shown for a key or value in text output.
const TEXT_PREVIEW_BYTES: usize = 32;

/// The outcome of one decode run over a log text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    /// Number of candidate regions the scanner found.
    pub regions_scanned: usize,
    /// Diagnostics for regions that failed structurally.
    pub failures: Vec<RegionFailure>,
    /// The first recovered dump, if any region made it through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump: Option<RecoveredDump>,
}

/// A structural failure confined to one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionFailure {
    /// First log line of the failed region.
    pub first_line: usize,
    /// Last log line of the failed region.
    pub last_line: usize,
    /// Pipeline stage that rejected the region.
    pub stage: &'static str,
    /// The diagnostic, naming both the category and the specific cause.
    pub message: String,
}

/// A dump that was recovered and decoded, fully or partially.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveredDump {
    /// First log line of the region.
    pub first_line: usize,
    /// Last log line of the region.
    pub last_line: usize,
    /// Number of chunks the dump arrived in.
    pub chunk_count: usize,
    /// Reassembled buffer length in bytes.
    pub byte_len: usize,
    /// The verified block header.
    pub header: BlockHeaderInfo,
    /// Records decoded from the block, in order.
    pub records: Vec<RecordInfo>,
    /// Present when decoding stopped at a framing violation; records above
    /// were decoded before it and remain valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub malformed: Option<MalformedInfo>,
    /// True when the record cap cut decoding short.
    pub truncated_by_limit: bool,
}

/// Block header fields surfaced in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeaderInfo {
    /// Block format version.
    pub version: u16,
    /// Record region length in bytes.
    pub length: u32,
    /// Checksum recorded in the header.
    pub checksum: u32,
}

impl From<BlockHeader> for BlockHeaderInfo {
    fn from(header: BlockHeader) -> Self {
        Self {
            version: header.version,
            length: header.length,
            checksum: header.checksum,
        }
    }
}

/// The stop point of a partially decoded block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedInfo {
    /// Offset into the record region where decoding stopped.
    pub offset: usize,
    /// Description of the violation.
    pub message: String,
}

/// One decoded record, flattened for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordInfo {
    /// Region-relative byte offset of the record frame.
    pub offset: usize,
    /// Record type name.
    pub record_type: String,
    /// Transaction ID, for records that carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<u64>,
    /// Commit timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_ts: Option<u64>,
    /// Durable timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durable_ts: Option<u64>,
    /// Prepare timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepare_ts: Option<u64>,
    /// Checkpoint timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_ts: Option<u64>,
    /// Key bytes, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value bytes, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Message text, for MESSAGE records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordInfo {
    /// Flattens a decoded record for output.
    #[must_use]
    pub fn from_record(offset: usize, record: &LogRecord) -> Self {
        let mut info = Self {
            offset,
            record_type: record.record_type().name().to_string(),
            txn_id: record.txn_id().map(|t| t.as_u64()),
            commit_ts: None,
            durable_ts: None,
            prepare_ts: None,
            checkpoint_ts: None,
            key: None,
            value: None,
            message: None,
        };

        match record {
            LogRecord::Insert {
                commit_ts,
                durable_ts,
                key,
                value,
                ..
            } => {
                info.commit_ts = Some(commit_ts.as_u64());
                info.durable_ts = Some(durable_ts.as_u64());
                info.key = Some(hex_encode(key));
                info.value = Some(hex_encode(value));
            }
            LogRecord::Remove {
                commit_ts,
                durable_ts,
                key,
                ..
            } => {
                info.commit_ts = Some(commit_ts.as_u64());
                info.durable_ts = Some(durable_ts.as_u64());
                info.key = Some(hex_encode(key));
            }
            LogRecord::Prepare { prepare_ts, .. } => {
                info.prepare_ts = Some(prepare_ts.as_u64());
            }
            LogRecord::Commit {
                commit_ts,
                durable_ts,
                ..
            } => {
                info.commit_ts = Some(commit_ts.as_u64());
                info.durable_ts = Some(durable_ts.as_u64());
            }
            LogRecord::Checkpoint { checkpoint_ts } => {
                info.checkpoint_ts = Some(checkpoint_ts.as_u64());
            }
            LogRecord::Message { text } => {
                info.message = Some(text.clone());
            }
        }

        info
    }
}

impl DecodeReport {
    /// True when a dump was recovered, even partially.
    #[must_use]
    pub fn recovered(&self) -> bool {
        self.dump.is_some()
    }

    /// Renders the report as human-readable text.
    ///
    /// Failed regions print first, each naming its category and specific
    /// cause; then either the recovered records or the terminal summary.
    ///
    /// # Errors
    ///
    /// Returns any error from the output sink.
    pub fn render_text(&self, out: &mut impl Write) -> io::Result<()> {
        for failure in &self.failures {
            writeln!(
                out,
                "{} (log lines {}-{})",
                failure.message, failure.first_line, failure.last_line
            )?;
        }

        let Some(dump) = &self.dump else {
            writeln!(out, "{}", SiftError::NoHexDumpFound)?;
            return Ok(());
        };

        writeln!(
            out,
            "Recovered WAL block from log lines {}-{} ({} {}, {} bytes)",
            dump.first_line,
            dump.last_line,
            dump.chunk_count,
            if dump.chunk_count == 1 { "chunk" } else { "chunks" },
            dump.byte_len
        )?;
        writeln!(
            out,
            "block header: version {}, length {}, checksum {:08x}",
            dump.header.version, dump.header.length, dump.header.checksum
        )?;

        for record in &dump.records {
            render_record(out, record)?;
        }

        if let Some(malformed) = &dump.malformed {
            writeln!(
                out,
                "malformed record at offset {}: {}",
                malformed.offset, malformed.message
            )?;
        }

        let decoded = dump.records.len();
        let qualifier = if dump.malformed.is_some() {
            " before the malformed frame"
        } else if dump.truncated_by_limit {
            " (record limit reached)"
        } else {
            ""
        };
        writeln!(
            out,
            "decoded {} {}{}",
            decoded,
            if decoded == 1 { "record" } else { "records" },
            qualifier
        )?;

        Ok(())
    }
}

fn render_record(out: &mut impl Write, record: &RecordInfo) -> io::Result<()> {
    write!(out, "[{:08}] {:10}", record.offset, record.record_type)?;

    if let Some(txn) = record.txn_id {
        write!(out, " txn={txn}")?;
    }
    if let Some(ts) = record.prepare_ts {
        write!(out, " prepare_ts={ts}")?;
    }
    if let Some(ts) = record.commit_ts {
        write!(out, " commit_ts={ts}")?;
    }
    if let Some(ts) = record.durable_ts {
        write!(out, " durable_ts={ts}")?;
    }
    if let Some(ts) = record.checkpoint_ts {
        write!(out, " checkpoint_ts={ts}")?;
    }
    if let Some(key) = &record.key {
        write!(out, " key={}", preview(key))?;
    }
    if let Some(value) = &record.value {
        write!(out, " value={}", preview(value))?;
    }
    if let Some(message) = &record.message {
        write!(out, " message={message:?}")?;
    }

    writeln!(out)
}

/// Truncates a hex string for text output. JSON output carries it in full.
fn preview(hex: &str) -> String {
    if hex.len() > TEXT_PREVIEW_BYTES * 2 {
        format!("{}... ({} bytes)", &hex[..TEXT_PREVIEW_BYTES * 2], hex.len() / 2)
    } else {
        hex.to_string()
    }
}

/// Encodes bytes as a lowercase hexadecimal string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
