//! Sessions: the protocol endpoint a [`Client`](crate::Client) talks through.
//!
//! A session builds PDUs for its protocol version, performs one
//! request/response exchange per [`send`](Session::send) and owns the
//! underlying transport. [`CommunitySession`] covers SNMPv1/v2c; SNMPv3
//! (USM) sessions are supplied by implementing [`Session`] elsewhere and
//! report engine discovery and time-window problems as
//! [`Error::UnknownEngineId`](crate::Error::UnknownEngineId) and
//! [`Error::NotInTimeWindow`](crate::Error::NotInTimeWindow), which the
//! client retries.

mod community;

pub use community::CommunitySession;

use crate::error::Result;
use crate::pdu::Pdu;
use crate::varbind::VarBindArg;
use std::future::Future;

/// Protocol session consumed by the client.
pub trait Session: Send + Sync {
    /// Build an outbound PDU for `verb` (`get`, `getnext`, `set`, ...).
    ///
    /// Unknown verbs fail with [`Error::UnsupportedPduType`](crate::Error::UnsupportedPduType),
    /// malformed OIDs with [`Error::InvalidOid`](crate::Error::InvalidOid).
    fn build_pdu(&self, verb: &str, varbinds: Vec<VarBindArg>) -> Result<Pdu>;

    /// Send `pdu` and wait for its response.
    ///
    /// Fails with transport, timeout or security errors, or with
    /// [`Error::Snmp`](crate::Error::Snmp) when the agent answers with a
    /// nonzero error status.
    fn send(&self, pdu: &Pdu) -> impl Future<Output = Result<Pdu>> + Send;

    /// Release the session. Calling it again is harmless.
    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}
