//! Session handling: the linear pipeline that performs one GET exchange.
//!
//! # Components
//!
//! - [`Session`]: owns the request descriptor, the reusable body buffer,
//!   the phase deadlines and the two notification hooks, and drives the
//!   phases Resolve, Connect, Write, ReadHeader, ReadBody (looping) and
//!   Shutdown in strict order
//! - [`SessionBuilder`]: configuration surface for a session
//! - [`dial`]: name resolution and first-reachable-endpoint connection,
//!   the only phases running under a deadline

mod dial;
mod session;

pub use session::ChunkHook;
pub use session::HeaderHook;
pub use session::Session;
pub use session::SessionBuilder;
pub use session::{DEFAULT_CHUNK_CAPACITY, DEFAULT_DIAL_TIMEOUT};
