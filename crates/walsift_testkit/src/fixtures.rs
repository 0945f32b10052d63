//! Fixture builders: canned records, sealed blocks, and log texts in the
//! marker forms the scanner understands.

use walsift_codec::{BlockBuilder, LogRecord, Timestamp, TxnId};
use walsift_core::hex_encode;

/// Log-line prefix used by the fixtures, in the host application's style.
pub const LOG_PREFIX: &str = "2026-08-07T10:00:01.000Z I STORAGE [conn42]";

/// A small committed transaction: insert, remove, commit.
#[must_use]
pub fn sample_records() -> Vec<LogRecord> {
    vec![
        LogRecord::Insert {
            txn_id: TxnId::new(7),
            commit_ts: Timestamp::new(100),
            durable_ts: Timestamp::new(101),
            key: b"table:users/7".to_vec(),
            value: b"{\"name\":\"ada\"}".to_vec(),
        },
        LogRecord::Remove {
            txn_id: TxnId::new(7),
            commit_ts: Timestamp::new(100),
            durable_ts: Timestamp::new(101),
            key: b"table:users/3".to_vec(),
        },
        LogRecord::Commit {
            txn_id: TxnId::new(7),
            commit_ts: Timestamp::new(100),
            durable_ts: Timestamp::new(101),
        },
    ]
}

/// Records exercising every type, including a prepared transaction and an
/// engine message.
#[must_use]
pub fn all_record_types() -> Vec<LogRecord> {
    let mut records = sample_records();
    records.push(LogRecord::Prepare {
        txn_id: TxnId::new(8),
        prepare_ts: Timestamp::new(110),
    });
    records.push(LogRecord::Checkpoint {
        checkpoint_ts: Timestamp::new(120),
    });
    records.push(LogRecord::Message {
        text: "eviction server unstuck".to_string(),
    });
    records
}

/// Seals records into a well-formed block.
#[must_use]
pub fn build_block(records: &[LogRecord]) -> Vec<u8> {
    let mut builder = BlockBuilder::new();
    for record in records {
        builder.push(record.clone());
    }
    builder.seal().expect("fixture records encode").to_vec()
}

/// A single inline dump line with no annotation.
#[must_use]
pub fn inline_dump_line(block: &[u8]) -> String {
    format!("{LOG_PREFIX} byte dump: {}\n", hex_encode(block))
}

/// A single inline dump line declaring its byte count.
#[must_use]
pub fn inline_dump_line_with_size(block: &[u8], declared: usize) -> String {
    format!(
        "{LOG_PREFIX} byte dump ({declared} bytes): {}\n",
        hex_encode(block)
    )
}

/// Splits a block across `chunks` inline lines with `chunk i/n` annotations.
///
/// Split points land on hex-pair boundaries so every chunk stays decodable.
#[must_use]
pub fn chunked_dump_lines(block: &[u8], chunks: usize) -> Vec<String> {
    let hex = hex_encode(block);
    let per_chunk = split_even(hex.len() / 2, chunks);

    let mut lines = Vec::with_capacity(chunks);
    let mut consumed = 0;
    for (index, byte_count) in per_chunk.into_iter().enumerate() {
        let span = &hex[consumed * 2..(consumed + byte_count) * 2];
        lines.push(format!(
            "{LOG_PREFIX} byte dump (chunk {index}/{chunks}, {byte_count} bytes): {span}\n"
        ));
        consumed += byte_count;
    }
    lines
}

/// A bounded `begin`/`end` section with the hex wrapped at `width` bytes
/// per line.
#[must_use]
pub fn bounded_dump_lines(block: &[u8], width: usize) -> String {
    let hex = hex_encode(block);
    let mut out = format!("{LOG_PREFIX} byte dump begin\n");
    for row in hex.as_bytes().chunks(width.max(1) * 2) {
        out.push_str(std::str::from_utf8(row).expect("hex is ASCII"));
        out.push('\n');
    }
    out.push_str(LOG_PREFIX);
    out.push_str(" byte dump end\n");
    out
}

/// Interleaves dump lines with ordinary log traffic.
#[must_use]
pub fn with_noise(dump_lines: &[String]) -> String {
    let mut out = String::from("2026-08-07T10:00:00.000Z I NETWORK [listener] connection accepted\n");
    for line in dump_lines {
        out.push_str(line);
        out.push_str("2026-08-07T10:00:02.000Z I COMMAND [conn42] slow query on users\n");
    }
    out
}

fn split_even(total: usize, parts: usize) -> Vec<usize> {
    let parts = parts.max(1);
    let base = total / parts;
    let extra = total % parts;
    (0..parts)
        .map(|i| base + usize::from(i < extra))
        .collect()
}
