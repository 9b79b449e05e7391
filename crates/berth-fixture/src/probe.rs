//! Bounded-time TCP reachability polling.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use berth_common::error::{BerthError, Result};

/// Polls `addr` with TCP connect attempts until one succeeds or
/// `max_wait` of wall-clock time has elapsed since entry.
///
/// The successful probe connection is closed immediately; this is a
/// point-in-time readiness signal, not a lease. Between refused attempts
/// the calling thread sleeps `interval`, and each attempt is itself
/// bounded by `connect_timeout`, so the effective poll period is
/// `interval + connect-attempt-duration`. Polling rather than events is
/// deliberate: container boot dominates the latency, and sub-second
/// granularity is enough.
///
/// # Errors
///
/// Returns [`BerthError::Unreachable`] with the total time waited once
/// the budget is exceeded.
pub fn await_reachable(
    addr: &str,
    max_wait: Duration,
    interval: Duration,
    connect_timeout: Duration,
) -> Result<()> {
    let start = Instant::now();
    loop {
        if try_connect(addr, connect_timeout) {
            tracing::debug!(addr, elapsed = ?start.elapsed(), "endpoint reachable");
            return Ok(());
        }
        if start.elapsed() >= max_wait {
            return Err(BerthError::Unreachable {
                addr: addr.to_string(),
                waited: start.elapsed(),
            });
        }
        std::thread::sleep(interval);
    }
}

/// One connect attempt. Resolution failure counts as not-yet-reachable.
fn try_connect(addr: &str, connect_timeout: Duration) -> bool {
    let Ok(mut addrs) = addr.to_socket_addrs() else {
        return false;
    };
    addrs
        .next()
        .is_some_and(|sock| TcpStream::connect_timeout(&sock, connect_timeout).is_ok())
}
