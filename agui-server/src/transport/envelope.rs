//! Connect streaming envelopes.
//!
//! ```text
//! +-------+------------------+-----------------+
//! | flags | length (u32, BE) | message bytes   |
//! +-------+------------------+-----------------+
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Envelope header size: one flag byte and a 4-byte length.
pub const HEADER_LEN: usize = 5;

/// Flag bit for a compressed message.
pub const FLAG_COMPRESSED: u8 = 0x01;

/// Flag bit for the end-of-stream message.
pub const FLAG_END_STREAM: u8 = 0x02;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("envelope truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unexpected {0} trailing bytes after envelope")]
    Trailing(usize),

    #[error("compressed messages are not supported")]
    Compressed,
}

/// Frame `payload` with `flags`.
pub fn encode(flags: u8, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(flags);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

/// Parse a request body holding exactly one uncompressed envelope.
///
/// Returns the flags and the message bytes.
pub fn decode_single(body: &[u8]) -> Result<(u8, &[u8]), EnvelopeError> {
    if body.len() < HEADER_LEN {
        return Err(EnvelopeError::Truncated {
            expected: HEADER_LEN,
            actual: body.len(),
        });
    }

    let flags = body[0];
    let len = u32::from_be_bytes([body[1], body[2], body[3], body[4]]) as usize;
    let end = HEADER_LEN + len;

    if body.len() < end {
        return Err(EnvelopeError::Truncated {
            expected: end,
            actual: body.len(),
        });
    }
    if body.len() > end {
        return Err(EnvelopeError::Trailing(body.len() - end));
    }
    if flags & FLAG_COMPRESSED != 0 {
        return Err(EnvelopeError::Compressed);
    }

    Ok((flags, &body[HEADER_LEN..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let frame = encode(FLAG_END_STREAM, b"{}");
        assert_eq!(&frame[..], &[0x02, 0, 0, 0, 2, b'{', b'}']);
    }

    #[test]
    fn test_decode_single() {
        let frame = encode(0, b"hello");
        let (flags, payload) = decode_single(&frame).unwrap();
        assert_eq!(flags, 0);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn test_decode_empty_message() {
        let (_, payload) = decode_single(&[0, 0, 0, 0, 0]).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decode_short_header() {
        assert_eq!(
            decode_single(&[0, 0]),
            Err(EnvelopeError::Truncated {
                expected: 5,
                actual: 2
            })
        );
    }

    #[test]
    fn test_decode_short_payload() {
        assert_eq!(
            decode_single(&[0, 0, 0, 0, 4, b'a']),
            Err(EnvelopeError::Truncated {
                expected: 9,
                actual: 6
            })
        );
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut body = encode(0, b"ab").to_vec();
        body.push(0xff);
        assert_eq!(decode_single(&body), Err(EnvelopeError::Trailing(1)));
    }

    #[test]
    fn test_decode_rejects_compressed() {
        let frame = encode(FLAG_COMPRESSED, b"zz");
        assert_eq!(decode_single(&frame), Err(EnvelopeError::Compressed));
    }
}
