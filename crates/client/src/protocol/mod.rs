//! Core protocol types shared by the codec and the session.
//!
//! # Components
//!
//! - **Message handling** ([`message`]): [`Message`], [`PayloadItem`] and
//!   [`PayloadSize`], the items flowing out of the response decoder.
//! - **Request descriptor** ([`request`]): [`GetRequest`], the immutable
//!   description of the single GET a session performs.
//! - **Response header** ([`response`]): [`ResponseHeader`], the parsed
//!   status line and fields handed to the header hook.
//! - **Errors** ([`error`]): [`FetchError`] (one variant per pipeline
//!   phase), [`ParseError`] (decoding), [`SendError`] (encoding/writing)
//!   and [`Phase`] (the session state tags).

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::GetRequest;
pub use request::USER_AGENT;

mod response;
pub use response::ResponseHeader;

mod error;
pub use error::FetchError;
pub use error::ParseError;
pub use error::Phase;
pub use error::SendError;
