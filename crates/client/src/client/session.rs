//! The session: one GET request, one streamed response.
//!
//! A [`Session`] drives a linear pipeline of phases, each phase resuming
//! when the previous asynchronous operation completes:
//!
//! ```text
//! Resolving -> Connecting -> Writing -> ReadingHeader -> ReadingBody (loop) -> ShuttingDown -> Closed
//!         \-> Failed (from any phase on unrecoverable error)
//! ```
//!
//! The pipeline is a single cooperative task with exactly one suspend point
//! per phase, so at most one I/O operation is ever in flight for a session
//! and no two of its callbacks can overlap. The response body is never
//! buffered whole: each body iteration refills one reusable fixed-capacity
//! buffer and hands the filled prefix to the chunk hook.
//!
//! No phase is retried and there is no cancellation API; retry policy
//! belongs to the caller, and dropping the future mid-flight abandons the
//! connection without a graceful close.

use std::cmp;
use std::fmt;
use std::io;
use std::time::Duration;

use bytes::{Buf, Bytes};
use futures::{SinkExt, StreamExt};
use http::Version;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, trace};

use crate::client::dial;
use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::protocol::{FetchError, GetRequest, Message, ParseError, PayloadItem, Phase, ResponseHeader};

/// Default capacity of the reusable body buffer: 128 KiB.
pub const DEFAULT_CHUNK_CAPACITY: usize = 128 * 1024;

/// Default deadline for name resolution and for connection establishment.
/// No deadline applies once the request has been written; a large body on a
/// slow link is not a failure.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Initial capacity of the persistent read buffer.
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Hook invoked exactly once with the parsed response header.
///
/// The reference is only valid for the duration of the call.
pub type HeaderHook = Box<dyn FnMut(&ResponseHeader) + Send>;

/// Hook invoked with each filled prefix of the body buffer.
///
/// The slice aliases the session's reusable buffer and is overwritten by the
/// next read; it must not be retained past the call. Its length never
/// exceeds the configured chunk capacity and is never zero.
pub type ChunkHook = Box<dyn FnMut(&[u8]) + Send>;

/// A single-connection HTTP GET session streaming the response body in
/// bounded chunks.
///
/// Build one with [`Session::builder`], then consume it with [`run`](Session::run).
/// On success the header hook has fired exactly once, before any chunk hook
/// invocation, and the chunk hooks have seen the complete body. On failure
/// exactly one [`FetchError`] is returned and no further hook fires.
///
/// # Example
///
/// ```no_run
/// use http::Version;
/// use trickle_http::Session;
///
/// # async fn run() -> Result<(), trickle_http::FetchError> {
/// Session::builder("example.com", 80, "/")
///     .version(Version::HTTP_11)
///     .on_header(|header| println!("{}", header.status()))
///     .on_body_chunk(|chunk| println!("{} bytes", chunk.len()))
///     .build()
///     .run()
///     .await
/// # }
/// ```
pub struct Session {
    request: GetRequest,
    chunk_capacity: usize,
    resolve_timeout: Duration,
    connect_timeout: Duration,
    phase: Phase,
    on_header: Option<HeaderHook>,
    on_body_chunk: Option<ChunkHook>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("request", &self.request)
            .field("chunk_capacity", &self.chunk_capacity)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Session`].
///
/// Both hooks default to no-op: an unset hook means the header or the body
/// bytes are received and discarded.
pub struct SessionBuilder {
    host: String,
    port: u16,
    target: String,
    version: Version,
    chunk_capacity: usize,
    resolve_timeout: Duration,
    connect_timeout: Duration,
    on_header: Option<HeaderHook>,
    on_body_chunk: Option<ChunkHook>,
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("target", &self.target)
            .field("version", &self.version)
            .field("chunk_capacity", &self.chunk_capacity)
            .finish_non_exhaustive()
    }
}

impl SessionBuilder {
    /// Protocol version of the request, HTTP/1.1 by default.
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Capacity of the reusable body buffer.
    ///
    /// Every chunk hook invocation carries at most this many bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn chunk_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "chunk capacity must be nonzero");
        self.chunk_capacity = capacity;
        self
    }

    /// Deadline for the name resolution phase.
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Deadline for the connection establishment phase.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Installs the header hook.
    pub fn on_header<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ResponseHeader) + Send + 'static,
    {
        self.on_header = Some(Box::new(hook));
        self
    }

    /// Installs the body chunk hook.
    pub fn on_body_chunk<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.on_body_chunk = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Session {
        Session {
            request: GetRequest::new(self.host, self.port, self.target, self.version),
            chunk_capacity: self.chunk_capacity,
            resolve_timeout: self.resolve_timeout,
            connect_timeout: self.connect_timeout,
            phase: Phase::Resolving,
            on_header: self.on_header,
            on_body_chunk: self.on_body_chunk,
        }
    }
}

type SessionReader = FramedRead<OwnedReadHalf, ResponseDecoder>;
type SessionWriter = FramedWrite<OwnedWriteHalf, RequestEncoder>;

impl Session {
    /// Starts building a session for `GET target` against `host:port`.
    pub fn builder(host: impl Into<String>, port: u16, target: impl Into<String>) -> SessionBuilder {
        SessionBuilder {
            host: host.into(),
            port,
            target: target.into(),
            version: Version::HTTP_11,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            resolve_timeout: DEFAULT_DIAL_TIMEOUT,
            connect_timeout: DEFAULT_DIAL_TIMEOUT,
            on_header: None,
            on_body_chunk: None,
        }
    }

    /// Runs the session to completion.
    ///
    /// Returns `Ok(())` once the response has been fully streamed and the
    /// connection closed. Any phase failure is reported once, as the
    /// returned [`FetchError`]; after a failure no further hook fires.
    pub async fn run(mut self) -> Result<(), FetchError> {
        info!(host = self.request.host(), port = self.request.port(), target = self.request.target(), "session start");

        match self.drive().await {
            Ok(()) => {
                self.phase = Phase::Closed;
                debug!("session closed");
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                error!(phase = %e.phase(), cause = %e, "session failed");
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), FetchError> {
        let endpoints = self.resolve().await?;
        let stream = self.connect(&endpoints).await?;

        let (reader, writer) = stream.into_split();
        let mut framed_read = FramedRead::with_capacity(reader, ResponseDecoder::new(), READ_BUFFER_SIZE);
        let mut framed_write = FramedWrite::new(writer, RequestEncoder::new());

        self.write_request(&mut framed_write).await?;

        let header = self.read_header(&mut framed_read).await?;
        if let Some(hook) = &mut self.on_header {
            hook(&header);
        }

        self.stream_body(&mut framed_read).await?;
        self.shutdown(&mut framed_write).await
    }

    async fn resolve(&mut self) -> Result<Vec<std::net::SocketAddr>, FetchError> {
        self.phase = Phase::Resolving;
        dial::resolve(self.request.host(), self.request.port(), self.resolve_timeout).await.map_err(FetchError::resolve)
    }

    async fn connect(&mut self, endpoints: &[std::net::SocketAddr]) -> Result<tokio::net::TcpStream, FetchError> {
        self.phase = Phase::Connecting;
        dial::connect(endpoints, self.connect_timeout).await.map_err(FetchError::connect)
    }

    /// Serializes and transmits the whole request in one logical operation.
    async fn write_request(&mut self, framed_write: &mut SessionWriter) -> Result<(), FetchError> {
        self.phase = Phase::Writing;

        let head = self.request.to_head().map_err(FetchError::write)?;
        framed_write.send(head).await.map_err(FetchError::write)?;

        debug!("request written");
        Ok(())
    }

    /// Reads until the status line and all header fields are parsed.
    async fn read_header(&mut self, framed_read: &mut SessionReader) -> Result<ResponseHeader, FetchError> {
        self.phase = Phase::ReadingHeader;

        match framed_read.next().await {
            Some(Ok(Message::Header((header, payload_size)))) => {
                debug!(status = %header.status(), framing = ?payload_size, "response header received");
                Ok(header)
            }

            // the decoder cannot yield payload before the header phase ends
            Some(Ok(Message::Payload(_))) => {
                Err(FetchError::read_header(ParseError::invalid_body("payload before response header")))
            }

            Some(Err(e)) => Err(FetchError::read_header(e)),

            None => Err(FetchError::read_header(ParseError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before response header",
            )))),
        }
    }

    /// The body streaming loop.
    ///
    /// Each iteration refills the reusable buffer from the start: decoded
    /// payload is copied in until the buffer is full (a benign condition,
    /// the remainder carries over to the next iteration) or the message
    /// completes. The hook then receives exactly the bytes written this
    /// iteration; a zero-length fill skips the hook.
    async fn stream_body(&mut self, framed_read: &mut SessionReader) -> Result<(), FetchError> {
        self.phase = Phase::ReadingBody;

        let capacity = self.chunk_capacity;
        let mut chunk_buf = vec![0u8; capacity].into_boxed_slice();
        let mut carry: Option<Bytes> = None;
        let mut done = false;

        while !done {
            let mut filled = 0;

            while filled < capacity {
                if let Some(bytes) = carry.as_mut() {
                    let n = cmp::min(bytes.len(), capacity - filled);
                    chunk_buf[filled..filled + n].copy_from_slice(&bytes[..n]);
                    bytes.advance(n);
                    filled += n;

                    if bytes.is_empty() {
                        carry = None;
                    }
                    continue;
                }

                match framed_read.next().await {
                    Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => carry = Some(bytes),

                    Some(Ok(Message::Payload(PayloadItem::Eof))) => {
                        done = true;
                        break;
                    }

                    Some(Ok(Message::Header(_))) => {
                        return Err(FetchError::read_body(ParseError::invalid_body("unexpected header in body phase")));
                    }

                    Some(Err(e)) => return Err(FetchError::read_body(e)),

                    // the stream ended although the framing promised more
                    None => {
                        return Err(FetchError::read_body(ParseError::io(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "connection closed before message completed",
                        ))));
                    }
                }
            }

            if filled > 0 {
                trace!(len = filled, "body chunk");
                if let Some(hook) = &mut self.on_body_chunk {
                    hook(&chunk_buf[..filled]);
                }
            }
        }

        debug!("message complete");
        Ok(())
    }

    /// Gracefully closes the connection.
    ///
    /// A peer that already closed its side is expected and counts as
    /// success; any other close error is reported even though the transfer
    /// itself already succeeded.
    async fn shutdown(&mut self, framed_write: &mut SessionWriter) -> Result<(), FetchError> {
        self.phase = Phase::ShuttingDown;

        match framed_write.get_mut().shutdown().await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {
                debug!("peer already closed the connection");
                Ok(())
            }
            Err(e) => Err(FetchError::shutdown(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let session = Session::builder("example.com", 80, "/").build();

        assert_eq!(session.phase, Phase::Resolving);
        assert_eq!(session.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        assert_eq!(session.resolve_timeout, DEFAULT_DIAL_TIMEOUT);
        assert_eq!(session.connect_timeout, DEFAULT_DIAL_TIMEOUT);
        assert_eq!(session.request.version(), Version::HTTP_11);
        assert!(session.on_header.is_none());
        assert!(session.on_body_chunk.is_none());
    }

    #[test]
    #[should_panic(expected = "chunk capacity must be nonzero")]
    fn zero_chunk_capacity_is_rejected() {
        let _ = Session::builder("example.com", 80, "/").chunk_capacity(0);
    }
}
