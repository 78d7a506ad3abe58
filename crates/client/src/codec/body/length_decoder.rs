//! Decoder for response bodies framed by a `Content-Length` header, as
//! defined in [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).

use std::cmp;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Decoder for a body with a known content length.
///
/// Tracks the bytes remaining; once the declared length has been consumed it
/// yields [`PayloadItem::Eof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// Number of body bytes still to be read
    length: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Yields chunks until the declared length is exhausted.
    ///
    /// # Returns
    /// * `Ok(Some(PayloadItem::Chunk(bytes)))` for each slice of body data
    /// * `Ok(Some(PayloadItem::Eof))` once the full length has been read
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.length == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // Take the minimum of remaining length and available bytes
        let len = cmp::min(self.length, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.length -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_at_declared_length() {
        let mut buffer = BytesMut::from(&b"0123456789 trailing bytes"[..]);

        let mut decoder = LengthDecoder::new(10);

        let payload = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(payload.is_chunk());

        let bytes = payload.as_bytes().unwrap();
        assert_eq!(&bytes[..], b"0123456789");
        assert_eq!(&buffer[..], b" trailing bytes");

        let payload = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(payload.is_eof());
    }

    #[test]
    fn partial_then_complete() {
        let mut buffer = BytesMut::from(&b"abc"[..]);
        let mut decoder = LengthDecoder::new(5);

        let payload = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&payload.into_bytes().unwrap()[..], b"abc");

        // the connection stalls mid-body
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"de");
        let payload = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&payload.into_bytes().unwrap()[..], b"de");

        let payload = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(payload.is_eof());
    }
}
