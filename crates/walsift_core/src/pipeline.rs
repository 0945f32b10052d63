//! Stage orchestration: scan, validate, reassemble, verify, decode.
//!
//! Regions are attempted in file order. A failure is terminal for its
//! region and becomes a diagnostic; the pipeline then moves to the next
//! candidate. Later stages never run on a buffer that failed an earlier
//! stage.

use tracing::{debug, warn};

use walsift_codec::{verify_block, CodecError, RecordReader};

use crate::chunk::{self, ValidatedChunk};
use crate::error::SiftError;
use crate::options::DecodeOptions;
use crate::reassemble::reassemble;
use crate::report::{DecodeReport, MalformedInfo, RecordInfo, RecoveredDump, RegionFailure};
use crate::scan::{DumpRegion, HexScanner};

/// Decodes the first recoverable WAL dump embedded in a log text.
///
/// This is the whole core as one pure function: no file I/O, no shared
/// state, text in and a [`DecodeReport`] out. The report is never an `Err`;
/// failures are data.
#[must_use]
pub fn decode_log_text(input: &str, options: &DecodeOptions) -> DecodeReport {
    let input = cap_input(input, options.max_input_bytes);

    let mut failures = Vec::new();
    let mut dump = None;
    let mut regions_scanned = 0;

    for region in HexScanner::new(input) {
        regions_scanned += 1;
        match attempt_region(&region, options) {
            Ok(recovered) => {
                debug!(
                    first_line = region.first_line,
                    last_line = region.last_line,
                    records = recovered.records.len(),
                    "recovered dump"
                );
                if dump.is_none() {
                    dump = Some(recovered);
                }
                if options.stop_after_first {
                    break;
                }
            }
            Err(failure) => {
                warn!(stage = failure.stage, "{}", failure.message);
                failures.push(failure);
            }
        }
    }

    if regions_scanned == 0 {
        debug!("no candidate regions in input");
    }

    DecodeReport {
        regions_scanned,
        failures,
        dump,
    }
}

/// Runs one region through validate → reassemble → verify → decode.
fn attempt_region(
    region: &DumpRegion,
    options: &DecodeOptions,
) -> Result<RecoveredDump, RegionFailure> {
    let fail = |stage: &'static str, error: SiftError| RegionFailure {
        first_line: region.first_line,
        last_line: region.last_line,
        stage,
        message: error.to_string(),
    };

    let mut validated: Vec<ValidatedChunk> = Vec::with_capacity(region.chunks.len());
    for raw in &region.chunks {
        match chunk::validate(raw) {
            Ok(chunk) => validated.push(chunk),
            Err(cause) => return Err(fail("chunk-validate", SiftError::corrupt(cause))),
        }
    }
    debug!(chunks = validated.len(), "chunks validated");

    let buffer = reassemble(validated, region.declared_chunks)
        .map_err(|e| fail("reassemble", e))?;
    debug!(bytes = buffer.len(), "buffer reassembled");

    let (header, record_region) =
        verify_block(&buffer).map_err(|e| fail("block-verify", SiftError::from(e)))?;
    debug!(length = header.length, "block verified");

    let mut records = Vec::new();
    let mut malformed = None;
    let mut truncated_by_limit = false;

    for item in RecordReader::new(record_region) {
        if options.max_records != 0 && records.len() >= options.max_records {
            truncated_by_limit = true;
            break;
        }
        match item {
            Ok((offset, record)) => records.push(RecordInfo::from_record(offset, &record)),
            Err(error) => {
                // Records already collected stay valid output.
                let (offset, message) = match error {
                    CodecError::MalformedRecord { offset, message } => (offset, message),
                    other => (0, other.to_string()),
                };
                malformed = Some(MalformedInfo { offset, message });
                break;
            }
        }
    }

    Ok(RecoveredDump {
        first_line: region.first_line,
        last_line: region.last_line,
        chunk_count: region.chunks.len(),
        byte_len: buffer.len(),
        header: header.into(),
        records,
        malformed,
        truncated_by_limit,
    })
}

/// Caps the input at a byte limit, backing off to a char boundary.
fn cap_input(input: &str, max: usize) -> &str {
    if max == 0 || input.len() <= max {
        return input;
    }
    let mut end = max;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::hex_encode;
    use walsift_codec::{BlockBuilder, LogRecord, Timestamp, TxnId};

    fn sample_records() -> Vec<LogRecord> {
        vec![
            LogRecord::Insert {
                txn_id: TxnId::new(7),
                commit_ts: Timestamp::new(100),
                durable_ts: Timestamp::new(101),
                key: b"user/7".to_vec(),
                value: b"ada".to_vec(),
            },
            LogRecord::Commit {
                txn_id: TxnId::new(7),
                commit_ts: Timestamp::new(100),
                durable_ts: Timestamp::new(101),
            },
        ]
    }

    fn sample_block() -> Vec<u8> {
        let mut builder = BlockBuilder::new();
        for record in sample_records() {
            builder.push(record);
        }
        builder.seal().unwrap().to_vec()
    }

    fn log_with_dump(block: &[u8]) -> String {
        format!(
            "2026-08-07T10:00:00Z I STORAGE [conn1] diagnostic byte dump ({} bytes): {}\n",
            block.len(),
            hex_encode(block)
        )
    }

    #[test]
    fn well_formed_dump_decodes_fully() {
        let report = decode_log_text(&log_with_dump(&sample_block()), &DecodeOptions::default());
        assert!(report.recovered());
        let dump = report.dump.unwrap();
        assert_eq!(dump.records.len(), 2);
        assert_eq!(dump.records[0].record_type, "INSERT");
        assert_eq!(dump.records[1].record_type, "COMMIT");
        assert!(dump.malformed.is_none());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn no_marker_means_no_regions() {
        let report = decode_log_text("nothing to see here\n", &DecodeOptions::default());
        assert_eq!(report.regions_scanned, 0);
        assert!(!report.recovered());
    }

    #[test]
    fn corrupt_chunk_reports_and_keeps_scanning() {
        let good = log_with_dump(&sample_block());
        let input = format!("x byte dump: zz11\n{good}");
        let report = decode_log_text(&input, &DecodeOptions::default());
        assert!(report.recovered());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.starts_with("Hex dump is corrupt"));
        assert!(report.failures[0].message.contains("Non-hex characters found"));
    }

    #[test]
    fn flipped_byte_yields_checksum_mismatch_and_zero_records() {
        let mut block = sample_block();
        let last = block.len() - 1;
        block[last] ^= 0x01;
        let report = decode_log_text(&log_with_dump(&block), &DecodeOptions::default());
        assert!(!report.recovered());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, "block-verify");
        assert!(report.failures[0].message.contains("checksum mismatch"));
    }

    #[test]
    fn truncated_block_detected_before_checksum() {
        let block = sample_block();
        let cut = &block[..block.len() - 4];
        // No byte-count annotation, so the chunk passes validation and the
        // block header's own length exposes the truncation.
        let input = format!("x byte dump: {}\n", hex_encode(cut));
        let report = decode_log_text(&input, &DecodeOptions::default());
        assert!(!report.recovered());
        assert!(report.failures[0].message.contains("truncated block"));
    }

    #[test]
    fn declared_size_mismatch_caught_at_chunk_stage() {
        let block = sample_block();
        let input = format!(
            "x byte dump ({} bytes): {}\n",
            block.len() + 2,
            hex_encode(&block)
        );
        let report = decode_log_text(&input, &DecodeOptions::default());
        assert!(!report.recovered());
        assert_eq!(report.failures[0].stage, "chunk-validate");
        assert!(report.failures[0].message.contains("Block size mismatch"));
    }

    #[test]
    fn multi_chunk_dump_reassembles() {
        let block = sample_block();
        let hex = hex_encode(&block);
        let (a, b) = hex.split_at(hex.len() / 2 - (hex.len() / 2) % 2);
        let input = format!(
            "x byte dump (chunk 0/2): {a}\nx byte dump (chunk 1/2): {b}\n"
        );
        let report = decode_log_text(&input, &DecodeOptions::default());
        assert!(report.recovered());
        assert_eq!(report.dump.unwrap().chunk_count, 2);
    }

    #[test]
    fn malformed_tail_preserves_decoded_records() {
        // Rebuild the region with a bogus frame appended, then reseal so the
        // checksum is valid and only the framing is wrong.
        let mut region = Vec::new();
        for record in sample_records() {
            let payload = record.encode_payload().unwrap();
            region.push(record.record_type().as_byte());
            region.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            region.extend_from_slice(&payload);
        }
        let bad_offset = region.len();
        region.push(0x7F);
        region.extend_from_slice(&0u32.to_le_bytes());

        let mut block = Vec::new();
        block.extend_from_slice(&walsift_codec::BLOCK_MAGIC);
        block.extend_from_slice(&walsift_codec::BLOCK_VERSION.to_le_bytes());
        block.extend_from_slice(&(region.len() as u32).to_le_bytes());
        block.extend_from_slice(&walsift_codec::compute_checksum(&region).to_le_bytes());
        block.extend_from_slice(&region);

        let report = decode_log_text(&log_with_dump(&block), &DecodeOptions::default());
        assert!(report.recovered());
        let dump = report.dump.unwrap();
        assert_eq!(dump.records.len(), 2);
        let malformed = dump.malformed.unwrap();
        assert_eq!(malformed.offset, bad_offset);
        assert!(malformed.message.contains("unknown record type tag"));
    }

    #[test]
    fn record_limit_truncates() {
        let options = DecodeOptions::new().max_records(1);
        let report = decode_log_text(&log_with_dump(&sample_block()), &options);
        let dump = report.dump.unwrap();
        assert_eq!(dump.records.len(), 1);
        assert!(dump.truncated_by_limit);
    }

    #[test]
    fn input_cap_respects_char_boundaries() {
        assert_eq!(cap_input("abcdef", 3), "abc");
        assert_eq!(cap_input("abcdef", 0), "abcdef");
        // 'é' is two bytes; the cap backs off rather than splitting it.
        assert_eq!(cap_input("aé", 2), "a");
    }
}
