//! HTTP response decoder.
//!
//! Streaming decoder for a full response: header section first, then the
//! body under whichever framing the header selected.
//!
//! # State machine
//!
//! The decoder's state lives in the `payload_decoder` field:
//! - `None`: currently parsing the header section
//! - `Some(PayloadDecoder)`: currently decoding the body

use bytes::BytesMut;
use std::io;
use tokio_util::codec::Decoder;

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, ResponseHeader};

/// Decoder for HTTP responses handling both header and payload.
///
/// Drives [`HeaderDecoder`] until the header section is complete, then
/// switches to the [`PayloadDecoder`] chosen by the parsed framing.
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder, payload_decoder: None }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHeader, PayloadSize)>;
    type Error = ParseError;

    /// Attempts to decode the next piece of the response from `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: the header section is complete
    /// - `Ok(Some(Message::Payload(_)))`: a body chunk or the end-of-message marker
    /// - `Ok(None)`: need more data
    /// - `Err(_)`: parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // decode payload once the header phase has completed
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    // message complete, this decoder is spent
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        // decode the header section
        let message = match self.header_decoder.decode(src)? {
            Some((header, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((header, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    /// Handles transport EOF.
    ///
    /// During the body phase EOF is delegated to the payload decoder, which
    /// lets a close-delimited body complete; the other framings simply end
    /// the stream and leave truncation detection to the session. EOF in the
    /// middle of the header section is an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode_eof(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        if src.is_empty() {
            return Ok(None);
        }

        match self.decode(src)? {
            message @ Some(_) => Ok(message),
            None => {
                Err(ParseError::io(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before header completed")))
            }
        }
    }
}
