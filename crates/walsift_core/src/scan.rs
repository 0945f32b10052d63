//! Scans raw log text for embedded hex-dump regions.
//!
//! Two marker forms are recognized, both keyed on the `byte dump` token:
//!
//! - Inline: `... byte dump (chunk <i>/<n>, <N> bytes): <hex>` — the
//!   parenthesized annotation is optional, as is each part inside it.
//!   Consecutive inline lines declaring the same chunk total belong to one
//!   region; an unannotated line is a single-chunk region by itself.
//! - Bounded: a line ending in `byte dump begin`, raw hex lines, then a
//!   line ending in `byte dump end`. The enclosed lines form one chunk.
//!
//! The scanner only delimits candidate spans; it never validates their
//! content. Lines that do not carry a marker are skipped, so dumps survive
//! interleaving with ordinary log traffic.

use std::collections::VecDeque;

use crate::chunk::RawChunk;

/// Token that marks a dump-carrying log line.
const MARKER: &str = "byte dump";

/// One group of chunks that together form a single logical dump attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRegion {
    /// The chunks discovered for this region, in discovery order.
    pub chunks: Vec<RawChunk>,
    /// Chunk count promised by `chunk i/n` annotations, when present.
    pub declared_chunks: Option<usize>,
    /// 1-based first log line of the region.
    pub first_line: usize,
    /// 1-based last log line of the region.
    pub last_line: usize,
}

/// A lazy iterator over the dump regions of a log text.
///
/// The scanner is finite and restartable: constructing a new scanner over
/// the same text starts again from the first line. A trailing region cut
/// off by the end of the input (a bounded section with no end marker) is
/// dropped rather than reported; truncated log files are expected input.
#[derive(Debug)]
pub struct HexScanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    queue: VecDeque<DumpRegion>,
    pending: Option<PendingDump>,
    done: bool,
}

#[derive(Debug)]
struct PendingDump {
    total: usize,
    chunks: Vec<RawChunk>,
    first_line: usize,
    last_line: usize,
}

#[derive(Debug)]
struct InlineChunk {
    seq: Option<(usize, usize)>,
    declared: Option<usize>,
    span: String,
}

enum LineEvent {
    Inline(InlineChunk),
    Begin,
    Other,
}

impl<'a> HexScanner<'a> {
    /// Creates a scanner over the given log text.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            queue: VecDeque::new(),
            pending: None,
            done: false,
        }
    }

    /// Consumes lines until at least one region is queued or input ends.
    fn advance(&mut self) {
        while let Some((idx, line)) = self.lines.next() {
            let line_no = idx + 1;
            match classify(line) {
                LineEvent::Begin => {
                    self.flush_pending();
                    self.collect_bounded(line_no);
                }
                LineEvent::Inline(chunk) => self.push_inline(line_no, chunk),
                LineEvent::Other => {}
            }
            if !self.queue.is_empty() {
                return;
            }
        }
        self.flush_pending();
        self.done = true;
    }

    fn push_inline(&mut self, line_no: usize, chunk: InlineChunk) {
        let InlineChunk {
            seq,
            declared,
            span,
        } = chunk;

        let Some((index, total)) = seq else {
            // An unannotated line is a complete single-chunk region.
            self.flush_pending();
            self.queue.push_back(DumpRegion {
                chunks: vec![RawChunk {
                    sequence_index: 0,
                    text_span: span,
                    declared_length: declared,
                    line: line_no,
                }],
                declared_chunks: None,
                first_line: line_no,
                last_line: line_no,
            });
            return;
        };

        let raw = RawChunk {
            sequence_index: index,
            text_span: span,
            declared_length: declared,
            line: line_no,
        };

        match &mut self.pending {
            Some(pending) if pending.total == total => {
                pending.chunks.push(raw);
                pending.last_line = line_no;
            }
            _ => {
                self.flush_pending();
                self.pending = Some(PendingDump {
                    total,
                    chunks: vec![raw],
                    first_line: line_no,
                    last_line: line_no,
                });
            }
        }

        let complete = self
            .pending
            .as_ref()
            .is_some_and(|p| p.chunks.len() >= p.total);
        if complete {
            self.flush_pending();
        }
    }

    /// Consumes lines of a bounded section and queues its single chunk.
    ///
    /// Reaching the end of input before the end marker drops the section.
    fn collect_bounded(&mut self, begin_line: usize) {
        let mut spans: Vec<&str> = Vec::new();
        let mut first_content = begin_line;

        for (idx, line) in self.lines.by_ref() {
            let line_no = idx + 1;
            if is_end_marker(line) {
                self.queue.push_back(DumpRegion {
                    chunks: vec![RawChunk {
                        sequence_index: 0,
                        // Lines concatenate without separators: the span's
                        // parity check counts every character.
                        text_span: spans.concat(),
                        declared_length: None,
                        line: first_content,
                    }],
                    declared_chunks: None,
                    first_line: begin_line,
                    last_line: line_no,
                });
                return;
            }
            let content = line.trim();
            if !content.is_empty() {
                if spans.is_empty() {
                    first_content = line_no;
                }
                spans.push(content);
            }
        }
    }

    fn flush_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.queue.push_back(DumpRegion {
                chunks: pending.chunks,
                declared_chunks: Some(pending.total),
                first_line: pending.first_line,
                last_line: pending.last_line,
            });
        }
    }
}

impl<'a> Iterator for HexScanner<'a> {
    type Item = DumpRegion;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(region) = self.queue.pop_front() {
                return Some(region);
            }
            if self.done {
                return None;
            }
            self.advance();
        }
    }
}

fn classify(line: &str) -> LineEvent {
    let Some(pos) = line.find(MARKER) else {
        return LineEvent::Other;
    };
    let after = &line[pos + MARKER.len()..];

    if after.trim() == "begin" {
        return LineEvent::Begin;
    }

    let mut rest = after.trim_start();
    let mut seq = None;
    let mut declared = None;

    if let Some(stripped) = rest.strip_prefix('(') {
        let Some(close) = stripped.find(')') else {
            return LineEvent::Other;
        };
        (seq, declared) = parse_annotation(&stripped[..close]);
        rest = stripped[close + 1..].trim_start();
    }

    match rest.strip_prefix(':') {
        Some(span) => LineEvent::Inline(InlineChunk {
            seq,
            declared,
            span: span.trim().to_string(),
        }),
        // A prose mention of the marker with no hex payload.
        None => LineEvent::Other,
    }
}

fn is_end_marker(line: &str) -> bool {
    line.find(MARKER)
        .is_some_and(|pos| line[pos + MARKER.len()..].trim() == "end")
}

/// Parses the parenthesized annotation: `chunk i/n` and `N bytes` parts in
/// either order, separated by commas. Unparseable parts are ignored; the
/// scanner delimits, the validator judges.
fn parse_annotation(inside: &str) -> (Option<(usize, usize)>, Option<usize>) {
    let mut seq = None;
    let mut declared = None;

    for part in inside.split(',') {
        let part = part.trim();
        if let Some(indices) = part.strip_prefix("chunk ") {
            if let Some((index, total)) = indices.split_once('/') {
                if let (Ok(index), Ok(total)) =
                    (index.trim().parse::<usize>(), total.trim().parse::<usize>())
                {
                    seq = Some((index, total));
                }
            }
        } else if let Some(count) = part.strip_suffix("bytes") {
            if let Ok(count) = count.trim().parse::<usize>() {
                declared = Some(count);
            }
        }
    }

    (seq, declared)
}
