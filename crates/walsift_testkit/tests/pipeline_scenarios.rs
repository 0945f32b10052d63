//! End-to-end pipeline scenarios over full log texts.

use walsift_core::{decode_log_text, DecodeOptions};
use walsift_testkit::{
    all_record_types, bounded_dump_lines, build_block, chunked_dump_lines, inline_dump_line,
    inline_dump_line_with_size, sample_records, with_noise, LOG_PREFIX,
};

fn render(input: &str) -> String {
    let report = decode_log_text(input, &DecodeOptions::default());
    let mut out = Vec::new();
    report.render_text(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn non_hex_characters_are_reported_with_summary() {
    let text = render(&format!("{LOG_PREFIX} byte dump: zz11\n"));
    assert!(text.contains("Hex dump is corrupt"));
    assert!(text.contains("Non-hex characters found"));
    assert!(text.contains("No valid byte dump found in MongoDB log"));
}

#[test]
fn odd_length_is_reported_with_summary() {
    let text = render(&format!("{LOG_PREFIX} byte dump: ab cd\n"));
    assert!(text.contains("Hex dump is corrupt"));
    assert!(text.contains("Hex data chunk length is not even"));
    assert!(text.contains("No valid byte dump found in MongoDB log"));
}

#[test]
fn size_mismatch_is_reported_with_summary() {
    let block = build_block(&sample_records());
    let log = inline_dump_line_with_size(&block, block.len() + 2);
    let text = render(&log);
    assert!(text.contains("Hex dump is corrupt"));
    assert!(text.contains("Block size mismatch"));
    assert!(text.contains("No valid byte dump found in MongoDB log"));
}

#[test]
fn empty_log_reports_no_dump_found() {
    let report = decode_log_text("", &DecodeOptions::default());
    assert_eq!(report.regions_scanned, 0);
    assert!(!report.recovered());
    assert!(render("").contains("No valid byte dump found in MongoDB log"));
}

#[test]
fn valid_single_chunk_dump_decodes() {
    let records = sample_records();
    let log = inline_dump_line(&build_block(&records));
    let report = decode_log_text(&log, &DecodeOptions::default());

    let dump = report.dump.expect("recovered");
    assert_eq!(dump.records.len(), records.len());
    assert_eq!(dump.chunk_count, 1);
    assert!(dump.malformed.is_none());

    let text = render(&log);
    assert!(text.contains("INSERT"));
    assert!(text.contains("REMOVE"));
    assert!(text.contains("COMMIT"));
    assert!(!text.contains("No valid byte dump found"));
}

#[test]
fn declared_size_matching_is_accepted() {
    let block = build_block(&sample_records());
    let log = inline_dump_line_with_size(&block, block.len());
    assert!(decode_log_text(&log, &DecodeOptions::default()).recovered());
}

#[test]
fn valid_multi_chunk_dump_decodes_with_interleaved_noise() {
    let block = build_block(&sample_records());
    let lines = chunked_dump_lines(&block, 4);
    let log = with_noise(&lines);

    let report = decode_log_text(&log, &DecodeOptions::default());
    let dump = report.dump.expect("recovered");
    assert_eq!(dump.chunk_count, 4);
    assert_eq!(dump.byte_len, block.len());
}

#[test]
fn incomplete_chunk_set_is_a_sequence_error() {
    let block = build_block(&sample_records());
    let mut lines = chunked_dump_lines(&block, 3);
    lines.remove(1);

    let log = lines.concat();
    let report = decode_log_text(&log, &DecodeOptions::default());
    assert!(!report.recovered());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, "reassemble");
    assert!(report.failures[0].message.contains("missing chunk 1 of 3"));
    assert!(render(&log).contains("No valid byte dump found in MongoDB log"));
}

#[test]
fn duplicated_chunk_line_is_a_sequence_error() {
    let block = build_block(&sample_records());
    let lines = chunked_dump_lines(&block, 2);
    let log = format!("{}{}{}", lines[0], lines[0], lines[1]);

    let report = decode_log_text(&log, &DecodeOptions::default());
    assert!(!report.recovered());
    assert!(report.failures[0].message.contains("duplicate chunk index 0"));
}

#[test]
fn checksum_mismatch_yields_zero_records() {
    let mut block = build_block(&sample_records());
    let mid = block.len() - 5;
    block[mid] ^= 0x40;

    let report = decode_log_text(&inline_dump_line(&block), &DecodeOptions::default());
    assert!(!report.recovered());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("checksum mismatch"));
}

#[test]
fn bounded_form_decodes() {
    let records = sample_records();
    let log = bounded_dump_lines(&build_block(&records), 16);
    let report = decode_log_text(&log, &DecodeOptions::default());
    assert_eq!(report.dump.expect("recovered").records.len(), records.len());
}

#[test]
fn first_corrupt_region_does_not_block_a_later_good_one() {
    let good = inline_dump_line(&build_block(&sample_records()));
    let log = format!("{LOG_PREFIX} byte dump: zz11\n{good}");

    let report = decode_log_text(&log, &DecodeOptions::default());
    assert!(report.recovered());
    assert_eq!(report.regions_scanned, 2);
    assert_eq!(report.failures.len(), 1);

    let mut out = Vec::new();
    report.render_text(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    // Diagnostics for the bad region, records from the good one, no summary.
    assert!(text.contains("Hex dump is corrupt"));
    assert!(text.contains("INSERT"));
    assert!(!text.contains("No valid byte dump found"));
}

#[test]
fn every_record_type_renders() {
    let log = inline_dump_line(&build_block(&all_record_types()));
    let text = render(&log);
    for name in ["INSERT", "REMOVE", "COMMIT", "PREPARE", "CHECKPOINT", "MESSAGE"] {
        assert!(text.contains(name), "missing {name} in output:\n{text}");
    }
}

#[test]
fn report_serializes_to_json() {
    let log = inline_dump_line(&build_block(&sample_records()));
    let report = decode_log_text(&log, &DecodeOptions::default());
    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains("\"record_type\": \"INSERT\""));
    assert!(json.contains("\"regions_scanned\": 1"));
}
