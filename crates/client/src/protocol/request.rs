//! The outbound request descriptor.
//!
//! A session issues exactly one GET request. The descriptor is built once at
//! session start and never mutated afterward; the `Host` and `User-Agent`
//! fields are filled in automatically when the wire head is produced.

use http::{HeaderValue, Method, Request, Version, header};

use crate::protocol::SendError;

/// User-Agent value sent with every request.
pub const USER_AGENT: &str = concat!("trickle-http/", env!("CARGO_PKG_VERSION"));

/// Immutable descriptor of the single GET request a session performs.
///
/// Holds the target host/port, the request target (path plus optional query)
/// and the protocol version. Conversion to an `http::Request<()>` head is
/// done once, in the write phase.
#[derive(Debug, Clone)]
pub struct GetRequest {
    host: String,
    port: u16,
    target: String,
    version: Version,
}

impl GetRequest {
    pub fn new(host: impl Into<String>, port: u16, target: impl Into<String>, version: Version) -> Self {
        Self { host: host.into(), port, target: target.into(), version }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Builds the wire-level request head.
    ///
    /// The `Host` field carries the port only when it is not the default
    /// HTTP port.
    pub fn to_head(&self) -> Result<Request<()>, SendError> {
        let host_value = if self.port == 80 { self.host.clone() } else { format!("{}:{}", self.host, self.port) };

        let mut builder = Request::builder().method(Method::GET).uri(self.target.as_str()).version(self.version);

        let headers = builder
            .headers_mut()
            .ok_or_else(|| SendError::invalid_request(format!("invalid request target: {}", self.target)))?;

        headers.insert(
            header::HOST,
            HeaderValue::from_str(&host_value)
                .map_err(|_| SendError::invalid_request(format!("invalid host: {host_value}")))?,
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        builder.body(()).map_err(|e| SendError::invalid_request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_carries_host_and_user_agent() {
        let request = GetRequest::new("example.com", 80, "/index.html", Version::HTTP_11);
        let head = request.to_head().unwrap();

        assert_eq!(head.method(), &Method::GET);
        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.uri().path(), "/index.html");
        assert_eq!(head.headers().get(header::HOST), Some(&HeaderValue::from_static("example.com")));
        assert_eq!(head.headers().get(header::USER_AGENT), Some(&HeaderValue::from_static(USER_AGENT)));
    }

    #[test]
    fn host_includes_non_default_port() {
        let request = GetRequest::new("127.0.0.1", 8080, "/", Version::HTTP_11);
        let head = request.to_head().unwrap();

        assert_eq!(head.headers().get(header::HOST), Some(&HeaderValue::from_static("127.0.0.1:8080")));
    }

    #[test]
    fn invalid_target_is_rejected() {
        let request = GetRequest::new("example.com", 80, "no spaces allowed", Version::HTTP_11);
        assert!(request.to_head().is_err());
    }
}
