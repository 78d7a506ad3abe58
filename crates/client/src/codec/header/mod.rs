//! Header encoding and decoding.
//!
//! # Components
//!
//! - [`HeaderDecoder`]: parses a response status line and header fields,
//!   enforcing header count/size limits and selecting the body framing
//! - [`HeaderEncoder`]: serializes a GET request head

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
