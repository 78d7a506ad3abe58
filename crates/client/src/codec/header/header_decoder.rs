//! HTTP response header decoder.
//!
//! Parses the status line and header fields of an HTTP/1.x response from raw
//! bytes into a [`ResponseHeader`], and determines the body framing from the
//! parsed fields.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header section size: 8KB
//! - HTTP/1.0 and HTTP/1.1 only
//!
//! # Implementation
//!
//! Parsing runs in stages: `httparse` scans the raw bytes, the byte ranges of
//! each header name/value are recorded, the header section is split off the
//! read buffer, and the typed `http::Response` is assembled from the recorded
//! ranges without copying the header data. A partial parse consumes nothing,
//! so a short first read keeps its bytes in the buffer for the next attempt.

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Response, StatusCode, header};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadSize, ResponseHeader};

/// Maximum number of headers allowed in a response
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP response headers implementing the [`Decoder`] trait.
///
/// Yields the parsed [`ResponseHeader`] together with the [`PayloadSize`]
/// describing how the body that follows is framed.
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (ResponseHeader, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a response header section from `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((header, payload_size)))` if the header section is complete
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed or a limit was exceeded
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Fast path: the shortest valid status line is "HTTP/1.1 200\r\n\r\n"
        if src.len() < 16 {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut resp = httparse::Response::new(&mut headers);

        let parsed_result = resp.parse(src).map_err(|e| match e {
            httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(header_size = body_offset, "parsed response header");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let header_count = resp.headers.len();
                ensure!(header_count <= MAX_HEADER_NUM, ParseError::too_many_headers(header_count));

                // Record byte range indices for each header before the
                // borrow of `src` ends
                let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
                HeaderIndex::record(src, resp.headers, &mut header_index);

                let version = match resp.version {
                    Some(0) => http::Version::HTTP_10,
                    Some(1) => http::Version::HTTP_11,
                    // HTTP/2 and HTTP/3 don't use this wire format
                    _ => return Err(ParseError::InvalidVersion(resp.version)),
                };

                let status = StatusCode::from_u16(resp.code.ok_or(ParseError::InvalidStatus)?)
                    .map_err(|_| ParseError::InvalidStatus)?;

                let mut header_builder = Response::builder().status(status).version(version);

                // A builder constructed from a valid status and version always
                // carries a header map
                let headers = header_builder.headers_mut().ok_or(ParseError::InvalidStatus)?;
                headers.reserve(header_count);

                // Split the header section off the read buffer; body bytes stay
                let header_bytes = src.split_to(body_offset).freeze();
                for index in &header_index[..header_count] {
                    // httparse verified the header name is valid ASCII
                    let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1])
                        .map_err(|e| ParseError::invalid_header(e.to_string()))?;

                    // SAFETY: httparse verified the header value contains only
                    // visible ASCII chars
                    let value = unsafe { HeaderValue::from_maybe_shared_unchecked(header_bytes.slice(index.value.0..index.value.1)) };

                    headers.append(name, value);
                }

                let header = ResponseHeader::from(
                    header_builder.body(()).map_err(|e| ParseError::invalid_header(e.to_string()))?,
                );
                let payload_size = parse_payload(&header)?;

                Ok(Some((header, payload_size)))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Byte range positions of a header's name and value within the original
/// buffer, recorded to avoid copying the header data.
#[derive(Clone, Copy)]
struct HeaderIndex {
    /// Start and end byte positions of the header name
    pub(crate) name: (usize, usize),
    /// Start and end byte positions of the header value
    pub(crate) value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    /// Records the positions of header names and values relative to `bytes`.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Determines the body framing from the response header, per
/// [RFC 7230 Section 3.3.3](https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length).
///
/// - 1xx, 204 and 304 responses never carry a body
/// - `Transfer-Encoding` ending in `chunked` selects chunked framing
/// - Otherwise `Content-Length` gives a fixed length (zero means no body)
/// - With neither field present the body runs until the connection closes
///
/// # Errors
///
/// Returns `ParseError` if both `Transfer-Encoding` and `Content-Length`
/// are present, or if the `Content-Length` value is not a valid `u64`.
fn parse_payload(header: &ResponseHeader) -> Result<PayloadSize, ParseError> {
    if header.bodiless() {
        return Ok(PayloadSize::Empty);
    }

    let te_header = header.headers().get(header::TRANSFER_ENCODING);
    let cl_header = header.headers().get(header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::UntilClose),

        (te_value @ Some(_), None) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::Chunked)
            } else {
                Ok(PayloadSize::UntilClose)
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;

            let length =
                cl_str.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            if length == 0 { Ok(PayloadSize::Empty) } else { Ok(PayloadSize::Length(length)) }
        }

        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")),
    }
}

/// Returns true if `chunked` is the final encoding in the
/// `Transfer-Encoding` header; per RFC 7230 it must come last.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value {
        if let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next() {
            return bytes.trim_ascii() == CHUNKED;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Version};
    use indoc::indoc;

    fn crlf(s: &str) -> BytesMut {
        BytesMut::from(s.replace('\n', "\r\n").as_str())
    }

    #[test]
    fn check_is_chunked() {
        {
            let headers = HeaderMap::new();
            assert!(!is_chunked(headers.get(header::TRANSFER_ENCODING)))
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip, chunked".parse().unwrap());
            assert!(is_chunked(headers.get(header::TRANSFER_ENCODING)));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "chunked, gzip".parse().unwrap());
            assert!(!is_chunked(headers.get(header::TRANSFER_ENCODING)));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip".parse().unwrap());
            assert!(!is_chunked(headers.get(header::TRANSFER_ENCODING)));
        }
    }

    #[test]
    fn body_bytes_stay_in_buffer() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 200 OK
            Content-Length: 3
            Content-Type: text/plain

            123"});

        let result = HeaderDecoder.decode(&mut buf).unwrap();
        assert!(result.is_some());

        assert_eq!(buf.len(), 3);
        assert_eq!(&buf[..], &b"123"[..]);
    }

    #[test]
    fn fixed_length_response() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 200 OK
            Server: nginx/1.25.3
            Content-Type: text/html
            Content-Length: 1024

            "});

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Length(1024));

        assert_eq!(header.status(), StatusCode::OK);
        assert_eq!(header.version(), Version::HTTP_11);
        assert_eq!(header.headers().len(), 3);
        assert_eq!(header.headers().get(header::SERVER), Some(&HeaderValue::from_static("nginx/1.25.3")));
        assert_eq!(header.headers().get(header::CONTENT_TYPE), Some(&HeaderValue::from_static("text/html")));
    }

    #[test]
    fn chunked_response() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 200 OK
            Transfer-Encoding: chunked

            "});

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Chunked);
        assert_eq!(header.status(), StatusCode::OK);
    }

    #[test]
    fn no_framing_means_until_close() {
        let mut buf = crlf(indoc! {"
            HTTP/1.0 200 OK
            Content-Type: application/octet-stream

            "});

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::UntilClose);
        assert_eq!(header.version(), Version::HTTP_10);
    }

    #[test]
    fn no_content_has_no_body() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 204 No Content

            "});

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Empty);
        assert_eq!(header.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn content_length_zero_has_no_body() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 404 Not Found
            Content-Length: 0

            "});

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Empty);
        assert_eq!(header.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn partial_header_consumes_nothing() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n");
        let before = buf.len();

        let result = HeaderDecoder.decode(&mut buf).unwrap();

        assert!(result.is_none());
        assert_eq!(buf.len(), before);
    }

    #[test]
    fn conflicting_framing_is_rejected() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 200 OK
            Transfer-Encoding: chunked
            Content-Length: 10

            "});

        assert!(HeaderDecoder.decode(&mut buf).is_err());
    }

    #[test]
    fn too_many_headers_is_rejected() {
        let mut text = String::from("HTTP/1.1 200 OK\r\n");
        for i in 0..MAX_HEADER_NUM + 1 {
            text.push_str(&format!("x-field-{i}: value\r\n"));
        }
        text.push_str("\r\n");
        let mut buf = BytesMut::from(text.as_str());

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooManyHeaders { .. }));
    }

    #[test]
    fn oversized_header_section_is_rejected() {
        let filler = "a".repeat(MAX_HEADER_BYTES);
        let mut buf = BytesMut::from(format!("HTTP/1.1 200 OK\r\nx-filler: {filler}\r\n\r\n").as_str());

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHeader { .. }));
    }

    #[test]
    fn oversized_partial_header_is_rejected() {
        // already past the limit with no terminating blank line in sight
        let filler = "a".repeat(MAX_HEADER_BYTES);
        let mut buf = BytesMut::from(format!("HTTP/1.1 200 OK\r\nx-filler: {filler}").as_str());

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHeader { .. }));
    }

    #[test]
    fn invalid_content_length_is_rejected() {
        let mut buf = crlf(indoc! {"
            HTTP/1.1 200 OK
            Content-Length: ten

            "});

        assert!(HeaderDecoder.decode(&mut buf).is_err());
    }
}
