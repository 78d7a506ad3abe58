//! Unified decoder for the different response body framings.
//!
//! Selects the decoding strategy from the [`PayloadSize`] determined by the
//! header decoder: fixed length, chunked transfer encoding, close-delimited,
//! or no body at all.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::codec::body::until_close_decoder::UntilCloseDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

/// Decoder for a response payload, delegating to the framing-specific
/// decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Fixed content length
    Length(LengthDecoder),

    /// Chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Body delimited by connection close
    UntilClose(UntilCloseDecoder),

    /// No body
    NoBody,
}

impl PayloadDecoder {
    /// Creates a decoder for responses with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a decoder for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    /// Creates a decoder for a fixed-length body of `size` bytes.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a decoder for a close-delimited body.
    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose(UntilCloseDecoder::new()) }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(&self.kind, Kind::Chunked(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.kind, Kind::NoBody)
    }

    pub fn is_fix_length(&self) -> bool {
        matches!(&self.kind, Kind::Length(_))
    }

    pub fn is_until_close(&self) -> bool {
        matches!(&self.kind, Kind::UntilClose(_))
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(size) => PayloadDecoder::fix_length(size),
            PayloadSize::Chunked => PayloadDecoder::chunked(),
            PayloadSize::UntilClose => PayloadDecoder::until_close(),
            PayloadSize::Empty => PayloadDecoder::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose(until_close_decoder) => until_close_decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }

    /// EOF handling is framing-specific: a close-delimited body completes on
    /// EOF, while the length and chunked framings fall back to the default
    /// behavior (which surfaces truncation through the session).
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose(until_close_decoder) => until_close_decoder.decode_eof(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_from_payload_size() {
        assert!(PayloadDecoder::from(PayloadSize::Length(10)).is_fix_length());
        assert!(PayloadDecoder::from(PayloadSize::Chunked).is_chunked());
        assert!(PayloadDecoder::from(PayloadSize::UntilClose).is_until_close());
        assert!(PayloadDecoder::from(PayloadSize::Empty).is_empty());
    }

    #[test]
    fn no_body_yields_immediate_eof() {
        let mut decoder = PayloadDecoder::empty();
        let mut buffer = BytesMut::new();

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
    }
}
