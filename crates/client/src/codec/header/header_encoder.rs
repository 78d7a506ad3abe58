//! HTTP request header encoder.
//!
//! Serializes a request head (request line plus header fields) into raw
//! bytes. The GET requests this client issues carry no body, so no
//! `Content-Length` or `Transfer-Encoding` handling is needed here.

use std::io;
use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use http::{Method, Request, Version};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::SendError;

/// Initial buffer size reserved for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP request heads implementing the [`Encoder`] trait.
pub struct HeaderEncoder;

impl Encoder<Request<()>> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the request line and header fields into `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is not GET or the version is neither
    /// HTTP/1.0 nor HTTP/1.1.
    fn encode(&mut self, item: Request<()>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);

        if item.method() != Method::GET {
            error!(method = %item.method(), "unsupported http method");
            return Err(io::Error::from(ErrorKind::Unsupported).into());
        }

        let version = match item.version() {
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        };

        let target = item.uri().path_and_query().map_or("/", |pq| pq.as_str());
        write!(FastWrite(dst), "GET {target} {version}\r\n")?;

        for (header_name, header_value) in item.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Writer over `BytesMut` that skips the io::Write error paths; space is
/// already reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::GetRequest;

    #[test]
    fn encodes_request_line_and_fields() {
        let head = GetRequest::new("example.com", 80, "/index.html?q=1", Version::HTTP_11).to_head().unwrap();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode(head, &mut dst).unwrap();

        let text = std::str::from_utf8(&dst[..]).unwrap();
        assert!(text.starts_with("GET /index.html?q=1 HTTP/1.1\r\n"));
        assert!(text.contains("host: example.com\r\n"));
        assert!(text.contains(concat!("user-agent: trickle-http/", env!("CARGO_PKG_VERSION"), "\r\n")));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn encodes_http_10() {
        let head = GetRequest::new("example.com", 8080, "/", Version::HTTP_10).to_head().unwrap();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode(head, &mut dst).unwrap();

        let text = std::str::from_utf8(&dst[..]).unwrap();
        assert!(text.starts_with("GET / HTTP/1.0\r\n"));
        assert!(text.contains("host: example.com:8080\r\n"));
    }

    #[test]
    fn rejects_non_get() {
        let request = Request::builder().method(Method::POST).uri("/").body(()).unwrap();

        let mut dst = BytesMut::new();
        assert!(HeaderEncoder.encode(request, &mut dst).is_err());
    }
}
