//! UDP transport implementation.

use super::Transport;
use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Largest datagram we accept.
const MAX_DATAGRAM: usize = 65535;

/// UDP transport owning a socket connected to one agent.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral socket and connect it to `target`.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        Self::connect_with_buffer(target, None).await
    }

    /// Like [`connect`](Self::connect), with a receive buffer size hint.
    pub async fn connect_with_buffer(
        target: SocketAddr,
        recv_buffer_size: Option<usize>,
    ) -> Result<Self> {
        let io_err = |source| Error::Io {
            target: Some(target),
            source,
        };

        let socket = bind_ephemeral_udp_socket(target, recv_buffer_size).map_err(io_err)?;
        socket.connect(target).await.map_err(io_err)?;
        let local_addr = socket.local_addr().map_err(io_err)?;

        tracing::debug!(
            target: "netsnmp::transport",
            {
                snmp.target = %target,
                snmp.local_addr = %local_addr
            },
            "UDP transport connected"
        );

        Ok(Self {
            socket,
            target,
            local_addr,
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "netsnmp::transport",
            {
                snmp.target = %self.target,
                snmp.bytes = data.len()
            },
            "UDP send"
        );
        self.socket.send(data).await.map_err(|e| Error::Io {
            target: Some(self.target),
            source: e,
        })?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, recv_timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        match timeout(recv_timeout, self.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(
                    target: "netsnmp::transport",
                    {
                        snmp.target = %self.target,
                        snmp.bytes = len
                    },
                    "UDP recv"
                );
                Ok((Bytes::from(buf), self.target))
            }
            Ok(Err(e)) => Err(Error::Io {
                target: Some(self.target),
                source: e,
            }),
            Err(_) => {
                tracing::trace!(
                    target: "netsnmp::transport",
                    {
                        snmp.target = %self.target,
                        snmp.request_id = request_id
                    },
                    "UDP recv timeout"
                );
                Err(Error::Timeout {
                    target: Some(self.target),
                    elapsed: recv_timeout,
                    request_id,
                })
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
