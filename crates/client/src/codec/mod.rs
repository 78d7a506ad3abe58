//! Wire-level encoding and decoding for one HTTP/1.x exchange.
//!
//! Built on the `tokio_util::codec` traits so the session can frame the two
//! halves of its connection:
//!
//! - Outbound: [`RequestEncoder`] serializes the GET request head
//!   (via the [`header`] module)
//! - Inbound: [`ResponseDecoder`] parses the response header and then the
//!   body under the framing the header selected (via the [`header`] and
//!   [`body`] modules)
//!
//! Both sides are state machines over a persistent `BytesMut`, so partial
//! reads and writes never lose data.

mod body;
mod header;
mod request_encoder;
mod response_decoder;

pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
