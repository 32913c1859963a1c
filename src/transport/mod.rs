//! Transport layer abstraction.
//!
//! A transport moves raw datagrams to and from one agent. Message framing,
//! request matching and retries live above it.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Client-side transport to a single agent.
pub trait Transport: Send + Sync {
    /// Send one encoded message.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive one datagram, waiting at most `timeout`.
    ///
    /// `request_id` is only used for error context; the caller checks that
    /// the datagram actually answers it. Expiry yields [`Error::Timeout`].
    ///
    /// Returns (datagram, source address).
    ///
    /// [`Error::Timeout`]: crate::Error::Timeout
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The agent address.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;
}
