//! A single-connection, asynchronous, streaming HTTP GET client
//!
//! This crate performs one HTTP/1.x GET request over one TCP connection and
//! streams the response body to the caller in bounded-size chunks instead of
//! buffering the whole body in memory. It is built on tokio and the
//! `tokio_util::codec` framing layer.
//!
//! # Features
//!
//! - One session, one request, one response: no pooling, no redirects, no TLS
//! - Streaming body delivery through a reusable fixed-capacity buffer
//! - All three HTTP/1.x body framings: `Content-Length`, chunked transfer
//!   encoding, and close-delimited
//! - Bounded deadlines for resolve and connect; deliberately none for the
//!   transfer itself, so slow-but-alive downloads are never aborted
//! - Clean error handling: exactly one failure report per failed session,
//!   tagged with the phase that failed
//!
//! # Example
//!
//! ```no_run
//! use http::Version;
//! use tracing::{info, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use trickle_http::Session;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), trickle_http::FetchError> {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     Session::builder("example.com", 80, "/index.html")
//!         .version(Version::HTTP_11)
//!         .on_header(|header| info!(status = %header.status(), "header received"))
//!         .on_body_chunk(|chunk| info!(len = chunk.len(), "body chunk received"))
//!         .build()
//!         .run()
//!         .await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`client`]: the [`Session`](client::Session) pipeline — resolve,
//!   connect, write, read header, stream body, shut down — one suspend
//!   point per phase, at most one I/O operation in flight
//! - [`codec`]: request encoding and streaming response decoding on
//!   `tokio_util::codec`
//! - [`protocol`]: shared types — request descriptor, response header,
//!   payload framing, error taxonomy
//!
//! # Hooks
//!
//! The caller observes the response through two optional hooks. The header
//! hook fires exactly once with the parsed status line and fields; the chunk
//! hook fires zero or more times, each call with a transient view into the
//! reusable body buffer. Both views are only valid during the call. Unset
//! hooks default to doing nothing.
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only, method GET only, no request body
//! - No TLS
//! - Maximum response header size: 8KB, maximum number of headers: 64

pub mod client;
pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

pub use client::{Session, SessionBuilder};
pub use protocol::{FetchError, Phase, ResponseHeader};
