//! Wire message encoder
//!
//! Formats a float buffer as one ASCII datagram payload:
//! `<address> <v1> <v2> ... ` with every value clamped to [-1, 1] and
//! printed with three decimals. Chunking across datagrams is the sender's
//! job; this encoder refuses anything that will not fit in one message.

use bytes::Bytes;
use std::fmt::Write;

use crate::constants::MAX_DATAGRAM_SIZE;
use crate::error::CodecError;

/// Encode one chunk of audio samples under the given address.
///
/// The address is taken verbatim; callers sending a multi-chunk buffer
/// append the `_<index>` suffix themselves before calling.
pub fn encode_audio(address: &str, samples: &[f32]) -> Result<Bytes, CodecError> {
    if samples.is_empty() {
        return Err(CodecError::EmptySamples);
    }

    // "-0.123 " is 7 bytes per sample; reserve once, write in place
    let mut message = String::with_capacity(address.len() + 1 + samples.len() * 7);
    message.push_str(address);
    message.push(' ');

    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        // Writing to a String cannot fail
        let _ = write!(message, "{:.3} ", clamped);
    }

    if message.len() > MAX_DATAGRAM_SIZE {
        return Err(CodecError::MessageTooLarge(message.len()));
    }

    Ok(Bytes::from(message.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHUNK_SIZE;

    #[test]
    fn test_encode_format() {
        let encoded = encode_audio("/audio/stream", &[0.5, -0.25, 1.0]).unwrap();
        assert_eq!(&encoded[..], b"/audio/stream 0.500 -0.250 1.000 ");
    }

    #[test]
    fn test_encode_clamps_out_of_range() {
        let encoded = encode_audio("/audio/stream", &[2.0, -3.5]).unwrap();
        assert_eq!(&encoded[..], b"/audio/stream 1.000 -1.000 ");
    }

    #[test]
    fn test_encode_rejects_empty() {
        assert!(matches!(
            encode_audio("/audio/stream", &[]),
            Err(CodecError::EmptySamples)
        ));
    }

    #[test]
    fn test_encode_rejects_oversized() {
        // Far more than one chunk's worth must not fit in one datagram
        let samples = vec![0.5f32; 1024];
        assert!(matches!(
            encode_audio("/audio/stream", &samples),
            Err(CodecError::MessageTooLarge(_))
        ));
    }

    #[test]
    fn test_full_chunk_fits() {
        let samples = vec![-1.0f32; CHUNK_SIZE];
        let encoded = encode_audio("/audio/stream_31", &samples).unwrap();
        assert!(encoded.len() <= crate::constants::MAX_DATAGRAM_SIZE);
    }
}
