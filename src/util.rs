//! Internal utilities.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Create and bind a non-blocking UDP socket through `socket2`.
///
/// `recv_buffer_size` is a hint; the kernel may cap it at `net.core.rmem_max`.
pub(crate) fn bind_udp_socket(
    addr: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if let Some(size) = recv_buffer_size {
        // Best effort, the kernel caps it anyway
        if let Err(e) = socket.set_recv_buffer_size(size) {
            tracing::debug!(
                target: "netsnmp::transport",
                { snmp.recv_buffer_size = size, error = %e },
                "could not set receive buffer size"
            );
        }
    }

    // Must be non-blocking before handing it to tokio
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}

/// Bind an ephemeral-port socket in the address family of `target`.
pub(crate) fn bind_ephemeral_udp_socket(
    target: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let bind_addr = if target.is_ipv6() {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    };
    bind_udp_socket(bind_addr, recv_buffer_size)
}
