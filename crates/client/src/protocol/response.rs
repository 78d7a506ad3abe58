//! HTTP response header handling.
//!
//! Wraps the standard `http::Response` type to represent the header portion
//! of a response before (and independent of) its body. This is the value the
//! session hands to the header hook; the hook receives it by reference and
//! must not retain it past the call.

use http::response::Parts;
use http::{HeaderMap, Response, StatusCode, Version};

/// The status line and header fields of an HTTP response.
#[derive(Debug)]
pub struct ResponseHeader {
    inner: Response<()>,
}

impl AsRef<Response<()>> for ResponseHeader {
    fn as_ref(&self) -> &Response<()> {
        &self.inner
    }
}

impl ResponseHeader {
    /// Consumes the header and returns the inner `Response<()>`.
    pub fn into_inner(self) -> Response<()> {
        self.inner
    }

    /// Returns the response status code.
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Returns the response HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the response header fields.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns true if this status code never carries a body (1xx, 204, 304).
    pub fn bodiless(&self) -> bool {
        let status = self.status();
        status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
    }
}

impl From<Parts> for ResponseHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Response::from_parts(parts, ()) }
    }
}

impl From<Response<()>> for ResponseHeader {
    #[inline]
    fn from(inner: Response<()>) -> Self {
        Self { inner }
    }
}
