//! Community-based session (SNMPv1 / SNMPv2c).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use super::Session;
use crate::error::{Error, Result};
use crate::pdu::{Pdu, PduArgs};
use crate::transport::Transport;
use crate::varbind::VarBindArg;
use crate::version::Version;

/// Session for SNMPv1/v2c over any [`Transport`].
///
/// Each [`send`](Session::send) transmits the encoded PDU once and then
/// reads datagrams until one carries the same request id or the timeout
/// runs out. Responses to other requests (late answers to an earlier
/// attempt, say) are skipped.
pub struct CommunitySession<T: Transport> {
    transport: T,
    version: Version,
    community: Bytes,
    timeout: Duration,
    closed: AtomicBool,
}

impl<T: Transport + fmt::Debug> fmt::Debug for CommunitySession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The community string is a credential
        f.debug_struct("CommunitySession")
            .field("transport", &self.transport)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<T: Transport> CommunitySession<T> {
    /// Create a session. `version` must be V1 or V2c.
    pub fn new(
        transport: T,
        version: Version,
        community: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<Self> {
        if !version.is_community() {
            return Err(Error::UnsupportedVersion { version });
        }
        Ok(Self {
            transport,
            version,
            community: community.into(),
            timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn closed_error(&self) -> Error {
        Error::Io {
            target: Some(self.transport.peer_addr()),
            source: std::io::Error::new(std::io::ErrorKind::NotConnected, "session closed"),
        }
    }
}

impl<T: Transport> Session for CommunitySession<T> {
    fn build_pdu(&self, verb: &str, varbinds: Vec<VarBindArg>) -> Result<Pdu> {
        Pdu::build(
            verb,
            PduArgs {
                version: self.version,
                community: self.community.clone(),
                varbinds,
                ..Default::default()
            },
        )
    }

    async fn send(&self, pdu: &Pdu) -> Result<Pdu> {
        if self.closed.load(Ordering::Acquire) {
            return Err(self.closed_error());
        }

        let target = self.transport.peer_addr();
        let request_id = pdu.request_id;

        tracing::debug!(
            target: "netsnmp::session",
            {
                snmp.target = %target,
                snmp.request_id = request_id,
                snmp.pdu_type = %pdu.pdu_type,
                snmp.varbind_count = pdu.varbinds.len()
            },
            "sending request"
        );

        self.transport.send(&pdu.encode()).await?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout {
                    target: Some(target),
                    elapsed: self.timeout,
                    request_id,
                });
            }

            let (data, source) = self.transport.recv(request_id, remaining).await?;
            let response = Pdu::decode_unchecked(data)?;

            if response.request_id != request_id {
                tracing::debug!(
                    target: "netsnmp::session",
                    {
                        snmp.target = %source,
                        snmp.request_id = request_id,
                        snmp.response_request_id = response.request_id
                    },
                    "skipping response to another request"
                );
                continue;
            }

            tracing::debug!(
                target: "netsnmp::session",
                {
                    snmp.target = %source,
                    snmp.request_id = request_id,
                    snmp.error_status = response.error_status,
                    snmp.varbind_count = response.varbinds.len()
                },
                "received response"
            );

            response.check_status()?;
            return Ok(response);
        }
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(
                target: "netsnmp::session",
                {
                    snmp.target = %self.transport.peer_addr()
                },
                "session closed"
            );
        }
        Ok(())
    }
}
