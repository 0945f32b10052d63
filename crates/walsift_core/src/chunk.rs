//! Per-chunk structural validation and hex decoding.
//!
//! Checks run as an explicit ordered list: character set, span parity,
//! declared size. The first failure wins and later checks are skipped, so
//! the diagnostics stay mutually exclusive. Bytes are decoded only after
//! every check has passed.

use thiserror::Error;

/// One fragment of a hex dump as delimited by the scanner.
///
/// The scanner only delimits; nothing about the span has been checked yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Position of this chunk within its dump, from the `chunk i/n`
    /// annotation when present, else from discovery order.
    pub sequence_index: usize,
    /// The extracted hex text. May contain whitespace separators.
    pub text_span: String,
    /// Byte count promised by a `N bytes` annotation, when present.
    pub declared_length: Option<usize>,
    /// 1-based line of the source log the span was found on.
    pub line: usize,
}

/// A chunk that passed every structural check, with its decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChunk {
    /// Position of this chunk within its dump.
    pub sequence_index: usize,
    /// Bytes decoded from the hex pairs.
    pub bytes: Vec<u8>,
}

/// A structural defect in a single chunk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// A character outside `[0-9a-fA-F]` and whitespace appeared in the span.
    #[error("Non-hex characters found: {character:?} at position {position}")]
    NonHexCharacters {
        /// Byte position of the offending character within the span.
        position: usize,
        /// The offending character.
        character: char,
    },

    /// The span cannot split into whole byte pairs.
    #[error("Hex data chunk length is not even: {length} characters")]
    OddLength {
        /// The offending length: span characters at the parity check, hex
        /// digits when whitespace-stripped decoding leaves a dangling nibble.
        length: usize,
    },

    /// The decoded byte count disagrees with the declared length.
    #[error("Block size mismatch: {declared} bytes declared, {actual} decoded")]
    SizeMismatch {
        /// Byte count declared in the log annotation.
        declared: usize,
        /// Byte count the span actually decodes to.
        actual: usize,
    },
}

/// The checks, in their fixed order. Adding or reordering a check is a
/// one-line change here.
const VALIDATORS: &[fn(&RawChunk) -> Result<(), ChunkError>] =
    &[charset_check, parity_check, size_check];

/// Validates a chunk and decodes its bytes.
///
/// # Errors
///
/// Returns the first failing check; later checks are skipped.
pub fn validate(chunk: &RawChunk) -> Result<ValidatedChunk, ChunkError> {
    for check in VALIDATORS {
        check(chunk)?;
    }
    Ok(ValidatedChunk {
        sequence_index: chunk.sequence_index,
        bytes: decode_hex_span(&chunk.text_span)?,
    })
}

fn charset_check(chunk: &RawChunk) -> Result<(), ChunkError> {
    for (position, character) in chunk.text_span.char_indices() {
        if !character.is_ascii_hexdigit() && !character.is_whitespace() {
            return Err(ChunkError::NonHexCharacters {
                position,
                character,
            });
        }
    }
    Ok(())
}

fn parity_check(chunk: &RawChunk) -> Result<(), ChunkError> {
    // Raw span length, interior whitespace included: a chunk that lost a
    // character in transit fails here even when the surviving digits happen
    // to pair up.
    let length = chunk.text_span.chars().count();
    if length % 2 != 0 {
        return Err(ChunkError::OddLength { length });
    }
    Ok(())
}

fn size_check(chunk: &RawChunk) -> Result<(), ChunkError> {
    if let Some(declared) = chunk.declared_length {
        let actual = hex_digit_count(&chunk.text_span) / 2;
        if declared != actual {
            return Err(ChunkError::SizeMismatch { declared, actual });
        }
    }
    Ok(())
}

fn hex_digit_count(span: &str) -> usize {
    span.chars().filter(|c| !c.is_whitespace()).count()
}

/// Decodes a hex span into bytes, skipping whitespace separators.
fn decode_hex_span(span: &str) -> Result<Vec<u8>, ChunkError> {
    let mut bytes = Vec::with_capacity(span.len() / 2);
    let mut high: Option<u8> = None;

    for (position, character) in span.char_indices() {
        if character.is_whitespace() {
            continue;
        }
        let nibble = character.to_digit(16).ok_or(ChunkError::NonHexCharacters {
            position,
            character,
        })? as u8;
        match high.take() {
            None => high = Some(nibble),
            Some(h) => bytes.push((h << 4) | nibble),
        }
    }

    if high.is_some() {
        return Err(ChunkError::OddLength {
            length: hex_digit_count(span),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(span: &str, declared: Option<usize>) -> RawChunk {
        RawChunk {
            sequence_index: 0,
            text_span: span.to_string(),
            declared_length: declared,
            line: 1,
        }
    }

    #[test]
    fn valid_span_decodes() {
        let chunk = validate(&raw("cafef00d", None)).unwrap();
        assert_eq!(chunk.bytes, vec![0xCA, 0xFE, 0xF0, 0x0D]);
    }

    #[test]
    fn whitespace_separated_pairs_decode_when_length_stays_even() {
        // 10 digits plus 2 separators: 12 characters, even.
        let chunk = validate(&raw("cafe f00d 11", None)).unwrap();
        assert_eq!(chunk.bytes, vec![0xCA, 0xFE, 0xF0, 0x0D, 0x11]);
    }

    #[test]
    fn uppercase_and_mixed_case_accepted() {
        let chunk = validate(&raw("DEADbeef", None)).unwrap();
        assert_eq!(chunk.bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn empty_span_is_zero_bytes() {
        let chunk = validate(&raw("", None)).unwrap();
        assert!(chunk.bytes.is_empty());
    }

    #[test]
    fn non_hex_character_reported_with_position() {
        let err = validate(&raw("zz11", None)).unwrap_err();
        assert_eq!(
            err,
            ChunkError::NonHexCharacters {
                position: 0,
                character: 'z'
            }
        );
    }

    #[test]
    fn non_hex_character_deep_in_span() {
        let err = validate(&raw("cafe 0g", None)).unwrap_err();
        assert_eq!(
            err,
            ChunkError::NonHexCharacters {
                position: 6,
                character: 'g'
            }
        );
    }

    #[test]
    fn odd_span_length_rejected() {
        // Five characters: the separator counts, a lost digit must not hide.
        let err = validate(&raw("ab cd", None)).unwrap_err();
        assert_eq!(err, ChunkError::OddLength { length: 5 });
    }

    #[test]
    fn dangling_nibble_after_strip_rejected() {
        // Six characters pass the parity check; stripping leaves 5 digits.
        let err = validate(&raw("ab cd1", None)).unwrap_err();
        assert_eq!(err, ChunkError::OddLength { length: 5 });
    }

    #[test]
    fn declared_length_mismatch_rejected() {
        // 8 decoded bytes against a 10-byte declaration.
        let err = validate(&raw("0011223344556677", Some(10))).unwrap_err();
        assert_eq!(
            err,
            ChunkError::SizeMismatch {
                declared: 10,
                actual: 8
            }
        );
    }

    #[test]
    fn declared_length_match_accepted() {
        let chunk = validate(&raw("00112233", Some(4))).unwrap();
        assert_eq!(chunk.bytes.len(), 4);
    }

    #[test]
    fn charset_failure_wins_over_parity_and_size() {
        // Odd length, wrong size and a bad character: charset is reported.
        let err = validate(&raw("xyz", Some(9))).unwrap_err();
        assert!(matches!(err, ChunkError::NonHexCharacters { .. }));
    }

    #[test]
    fn parity_failure_wins_over_size() {
        let err = validate(&raw("abc", Some(9))).unwrap_err();
        assert!(matches!(err, ChunkError::OddLength { .. }));
    }

    #[test]
    fn diagnostic_messages_name_the_cause() {
        let err = validate(&raw("zz", None)).unwrap_err();
        assert!(err.to_string().starts_with("Non-hex characters found"));
        let err = validate(&raw("abc", None)).unwrap_err();
        assert!(err.to_string().starts_with("Hex data chunk length is not even"));
        let err = validate(&raw("aabb", Some(3))).unwrap_err();
        assert!(err.to_string().starts_with("Block size mismatch"));
    }
}
