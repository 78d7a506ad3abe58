use std::fmt;
use std::io;

use thiserror::Error;

/// The stage of the session pipeline.
///
/// Phases advance strictly in declaration order; `ReadingBody` may repeat.
/// `Closed` and `Failed` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Resolving,
    Connecting,
    Writing,
    ReadingHeader,
    ReadingBody,
    ShuttingDown,
    Closed,
    Failed,
}

impl Phase {
    /// Short tag used when reporting a failure for this phase.
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Resolving => "resolve",
            Phase::Connecting => "connect",
            Phase::Writing => "write",
            Phase::ReadingHeader => "read-header",
            Phase::ReadingBody => "read-body",
            Phase::ShuttingDown => "shutdown",
            Phase::Closed => "closed",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Terminal session failure, one variant per pipeline phase.
///
/// Exactly one of these is reported per failed session; no phase is retried.
/// Benign conditions never surface here: a peer that already closed its side
/// at shutdown time and a chunk buffer that fills before the message ends are
/// both handled inside the session.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resolve failed: {source}")]
    Resolve {
        #[source]
        source: io::Error,
    },

    #[error("connect failed: {source}")]
    Connect {
        #[source]
        source: io::Error,
    },

    #[error("write failed: {source}")]
    Write {
        #[source]
        source: SendError,
    },

    #[error("read header failed: {source}")]
    ReadHeader {
        #[source]
        source: ParseError,
    },

    #[error("read body failed: {source}")]
    ReadBody {
        #[source]
        source: ParseError,
    },

    #[error("shutdown failed: {source}")]
    Shutdown {
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn resolve<E: Into<io::Error>>(e: E) -> Self {
        Self::Resolve { source: e.into() }
    }

    pub fn connect<E: Into<io::Error>>(e: E) -> Self {
        Self::Connect { source: e.into() }
    }

    pub fn write(source: SendError) -> Self {
        Self::Write { source }
    }

    pub fn read_header(source: ParseError) -> Self {
        Self::ReadHeader { source }
    }

    pub fn read_body(source: ParseError) -> Self {
        Self::ReadBody { source }
    }

    pub fn shutdown<E: Into<io::Error>>(e: E) -> Self {
        Self::Shutdown { source: e.into() }
    }

    /// The phase in which the session failed.
    pub fn phase(&self) -> Phase {
        match self {
            FetchError::Resolve { .. } => Phase::Resolving,
            FetchError::Connect { .. } => Phase::Connecting,
            FetchError::Write { .. } => Phase::Writing,
            FetchError::ReadHeader { .. } => Phase::ReadingHeader,
            FetchError::ReadBody { .. } => Phase::ReadingBody,
            FetchError::Shutdown { .. } => Phase::ShuttingDown,
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http status")]
    InvalidStatus,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_request<S: ToString>(str: S) -> Self {
        Self::InvalidRequest { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
