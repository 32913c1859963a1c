//! Client builder.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use netsnmp::{Client, Version};
//! # use std::time::Duration;
//! # async fn example() -> netsnmp::Result<()> {
//! let client = Client::builder("192.168.1.1:161")
//!     .version(Version::V2c)
//!     .community("private")
//!     .timeout(Duration::from_secs(2))
//!     .retries(3)
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::session::CommunitySession;
use crate::transport::{Transport, UdpTransport};
use crate::version::Version;

use super::{Client, ClientConfig};

/// Port used when the target names no port.
pub const DEFAULT_PORT: u16 = 161;

/// Builder for community-based clients.
///
/// Starts from [`ClientConfig::default()`], so the version must be set to
/// V1 or V2c before connecting.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    target: String,
    config: ClientConfig,
    recv_buffer_size: Option<usize>,
}

impl ClientBuilder {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            config: ClientConfig::default(),
            recv_buffer_size: None,
        }
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.config.version = version;
        self
    }

    /// Set the community string (default: `public`).
    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.config.community = community.into();
        self
    }

    /// Set the per-attempt response timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the number of retries after a retryable failure.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Hint for the UDP socket receive buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    fn resolve_target(&self) -> Result<SocketAddr> {
        let resolved = match self.target.to_socket_addrs() {
            Ok(addrs) => addrs.collect::<Vec<_>>(),
            Err(_) => (self.target.as_str(), DEFAULT_PORT)
                .to_socket_addrs()
                .map_err(|e| Error::Io {
                    target: None,
                    source: e,
                })?
                .collect(),
        };

        resolved.into_iter().next().ok_or_else(|| Error::Io {
            target: None,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not resolve address",
            ),
        })
    }

    fn session<T: Transport>(&self, transport: T) -> Result<CommunitySession<T>> {
        CommunitySession::new(
            transport,
            self.config.version,
            self.config.community.clone(),
            self.config.timeout,
        )
    }

    /// Resolve the target and connect over UDP.
    pub async fn connect(self) -> Result<Client<CommunitySession<UdpTransport>>> {
        if !self.config.version.is_community() {
            return Err(Error::UnsupportedVersion {
                version: self.config.version,
            });
        }
        let addr = self.resolve_target()?;
        let transport = UdpTransport::connect_with_buffer(addr, self.recv_buffer_size).await?;
        self.build(transport)
    }

    /// Build a client over an existing transport.
    pub fn build<T: Transport>(self, transport: T) -> Result<Client<CommunitySession<T>>> {
        let session = self.session(transport)?;
        Ok(Client::new(session, &self.config))
    }
}

impl Client<CommunitySession<UdpTransport>> {
    /// Start building a UDP client for `target` (`host:port`, or a bare
    /// host for port 161).
    pub fn builder(target: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(target)
    }
}
