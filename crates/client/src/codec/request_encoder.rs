//! HTTP request encoder.
//!
//! Encodes the single GET request a session sends. GET requests carry no
//! body, so this is the request head only; the encoder exists as the
//! `Encoder` half of the framed write side.

use bytes::BytesMut;
use http::Request;
use tokio_util::codec::Encoder;

use crate::codec::header::HeaderEncoder;
use crate::protocol::SendError;

/// Encoder for outbound GET requests implementing the [`Encoder`] trait.
pub struct RequestEncoder {
    header_encoder: HeaderEncoder,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder }
    }
}

impl Encoder<Request<()>> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Request<()>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.header_encoder.encode(item, dst)
    }
}
