//! Decoder for response bodies delimited by connection close, per
//! [RFC 7230 Section 3.3.3](https://tools.ietf.org/html/rfc7230#section-3.3.3)
//! rule 7: no `Content-Length`, no chunked encoding, the body is everything
//! until the peer closes its side.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Decoder for a close-delimited body.
///
/// `decode` passes through whatever bytes are buffered; the end of the
/// message is only known from `decode_eof`, which fires when the transport
/// reaches EOF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntilCloseDecoder {
    eof_seen: bool,
}

impl UntilCloseDecoder {
    pub fn new() -> Self {
        Self { eof_seen: false }
    }
}

impl Decoder for UntilCloseDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let bytes = src.split_to(src.len()).freeze();
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    /// Called once the transport hits EOF: drain what is buffered, then
    /// report end of message.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            let bytes = src.split_to(src.len()).freeze();
            return Ok(Some(PayloadItem::Chunk(bytes)));
        }

        if self.eof_seen {
            return Ok(None);
        }

        self.eof_seen = true;
        Ok(Some(PayloadItem::Eof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_buffered_bytes() {
        let mut buffer = BytesMut::from(&b"some body bytes"[..]);
        let mut decoder = UntilCloseDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"some body bytes");

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn eof_ends_the_message() {
        let mut buffer = BytesMut::from(&b"tail"[..]);
        let mut decoder = UntilCloseDecoder::new();

        let chunk = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"tail");

        let item = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());

        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn immediate_eof_is_an_empty_body() {
        let mut buffer = BytesMut::new();
        let mut decoder = UntilCloseDecoder::new();

        let item = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
    }
}
