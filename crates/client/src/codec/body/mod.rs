//! Response body decoding for the three HTTP/1.x body framings.
//!
//! # Components
//!
//! - [`LengthDecoder`](length_decoder::LengthDecoder): fixed `Content-Length` payloads
//! - [`ChunkedDecoder`](chunked_decoder::ChunkedDecoder): chunked transfer encoding (RFC 7230)
//! - [`UntilCloseDecoder`](until_close_decoder::UntilCloseDecoder): close-delimited payloads
//! - [`PayloadDecoder`]: facade selecting the strategy from the parsed header

mod chunked_decoder;
mod length_decoder;
mod payload_decoder;
mod until_close_decoder;

pub use payload_decoder::PayloadDecoder;
