//! Reassembles validated chunks into one contiguous buffer.
//!
//! Chunks land in an arena slot addressed by their sequence index, not by
//! append order, so out-of-order discovery is safe by construction. Any gap
//! or duplicate is fatal for the region; no partial buffer is ever handed
//! to later stages.

use bytes::{BufMut, Bytes, BytesMut};

use crate::chunk::ValidatedChunk;
use crate::error::{SiftError, SiftResult};

/// Concatenates chunks by sequence index into one owned buffer.
///
/// `declared_chunks` is the chunk count promised by the log annotations;
/// when absent, the number of discovered chunks is used.
///
/// # Errors
///
/// Returns [`SiftError::ChunkSequence`] on a duplicate index, an index
/// outside the expected range, or a missing slot.
pub fn reassemble(
    chunks: Vec<ValidatedChunk>,
    declared_chunks: Option<usize>,
) -> SiftResult<Bytes> {
    if chunks.is_empty() {
        return Err(SiftError::chunk_sequence("region contained no chunks"));
    }

    let expected = declared_chunks.unwrap_or(chunks.len());
    let mut slots: Vec<Option<ValidatedChunk>> = Vec::new();
    slots.resize_with(expected, || None);

    for chunk in chunks {
        let index = chunk.sequence_index;
        if index >= expected {
            return Err(SiftError::chunk_sequence(format!(
                "chunk index {index} outside expected range 0..{expected}"
            )));
        }
        if slots[index].is_some() {
            return Err(SiftError::chunk_sequence(format!(
                "duplicate chunk index {index}"
            )));
        }
        slots[index] = Some(chunk);
    }

    let mut buffer = BytesMut::new();
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(chunk) => buffer.put_slice(&chunk.bytes),
            None => {
                return Err(SiftError::chunk_sequence(format!(
                    "missing chunk {index} of {expected}"
                )))
            }
        }
    }

    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, bytes: &[u8]) -> ValidatedChunk {
        ValidatedChunk {
            sequence_index: index,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn single_chunk_passthrough() {
        let buffer = reassemble(vec![chunk(0, b"abc")], None).unwrap();
        assert_eq!(&buffer[..], b"abc");
    }

    #[test]
    fn chunks_concatenate_by_index_not_discovery_order() {
        let discovered = vec![chunk(2, b"c"), chunk(0, b"a"), chunk(1, b"b")];
        let buffer = reassemble(discovered, Some(3)).unwrap();
        assert_eq!(&buffer[..], b"abc");
    }

    #[test]
    fn total_length_is_sum_of_chunk_lengths() {
        let buffer = reassemble(vec![chunk(0, b"ab"), chunk(1, b"cde")], Some(2)).unwrap();
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn duplicate_index_rejected() {
        let err = reassemble(vec![chunk(0, b"a"), chunk(0, b"b")], Some(2)).unwrap_err();
        assert!(matches!(err, SiftError::ChunkSequence { .. }));
        assert!(err.to_string().contains("duplicate chunk index 0"));
    }

    #[test]
    fn missing_chunk_rejected() {
        let err = reassemble(vec![chunk(0, b"a"), chunk(2, b"c")], Some(3)).unwrap_err();
        assert!(err.to_string().contains("missing chunk 1 of 3"));
    }

    #[test]
    fn index_outside_declared_count_rejected() {
        let err = reassemble(vec![chunk(5, b"a")], Some(2)).unwrap_err();
        assert!(err.to_string().contains("outside expected range"));
    }

    #[test]
    fn incomplete_declared_set_rejected() {
        // Two of three declared chunks made it into the log.
        let err = reassemble(vec![chunk(0, b"a"), chunk(1, b"b")], Some(3)).unwrap_err();
        assert!(err.to_string().contains("missing chunk 2 of 3"));
    }

    #[test]
    fn empty_region_rejected() {
        assert!(reassemble(Vec::new(), None).is_err());
    }
}
