//! Name resolution and transport connection for a session.
//!
//! Both operations run under a bounded deadline; these are the only phases
//! of a session with one. Resolution produces an ordered candidate list and
//! connecting tries candidates in order, first success wins.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{self, TcpStream};
use tokio::time::timeout;
use tracing::{debug, trace};

/// Resolves `host:port` into an ordered list of candidate endpoints.
///
/// # Errors
///
/// Fails if the lookup errors, exceeds `deadline`, or yields no addresses.
pub(crate) async fn resolve(host: &str, port: u16, deadline: Duration) -> io::Result<Vec<SocketAddr>> {
    let lookup = net::lookup_host((host, port));

    let addrs: Vec<SocketAddr> = timeout(deadline, lookup)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "name resolution timed out"))??
        .collect();

    if addrs.is_empty() {
        return Err(io::Error::new(io::ErrorKind::NotFound, format!("host {host} resolved to no addresses")));
    }

    trace!(host, candidates = addrs.len(), "resolved endpoints");
    Ok(addrs)
}

/// Connects to the first reachable candidate, in order.
///
/// The deadline bounds the whole attempt, not each candidate.
pub(crate) async fn connect(addrs: &[SocketAddr], deadline: Duration) -> io::Result<TcpStream> {
    let attempt = async {
        let mut last_error = None;

        for addr in addrs {
            match TcpStream::connect(*addr).await {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%addr, cause = %e, "endpoint unreachable");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no endpoints to try")))
    };

    timeout(deadline, attempt).await.map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const DEADLINE: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn resolve_loopback() {
        let addrs = resolve("127.0.0.1", 80, DEADLINE).await.unwrap();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|addr| addr.port() == 80));
    }

    #[tokio::test]
    async fn resolve_garbage_host_fails() {
        assert!(resolve("no such host", 80, DEADLINE).await.is_err());
    }

    #[tokio::test]
    async fn connect_first_reachable_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let stream = connect(&[addr], DEADLINE).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[tokio::test]
    async fn connect_skips_dead_candidates() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live = listener.local_addr().unwrap();

        // grab a port and release it so the first candidate refuses
        let dead = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };

        let stream = connect(&[dead, live], DEADLINE).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), live);
    }

    #[tokio::test]
    async fn connect_all_dead_fails() {
        let dead = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };

        assert!(connect(&[dead], DEADLINE).await.is_err());
    }
}
