//! Async SNMP client.
//!
//! `netsnmp` encodes and decodes SNMPv1/v2c messages, maps agent error
//! statuses to typed errors, and drives GET, GETNEXT, SET, INFORM and
//! subtree walks over a [`Session`] with a bounded retry policy.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use netsnmp::{Client, Version};
//!
//! # async fn example() -> netsnmp::Result<()> {
//! let client = Client::builder("192.168.1.1:161")
//!     .version(Version::V2c)
//!     .community("public")
//!     .connect()
//!     .await?;
//!
//! let descr = client.get(["1.3.6.1.2.1.1.1.0"]).await?;
//! println!("sysDescr: {:?}", descr.single());
//!
//! let mut walk = client.walk("1.3.6.1.2.1.2.2.1.2")?;
//! while let Some(row) = walk.next().await {
//!     let (oid, value) = row?;
//!     println!("{oid} = {value}");
//! }
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Sessions
//!
//! The client only talks to its [`Session`]: the session builds PDUs with
//! its version and credentials and exchanges them over a [`Transport`].
//! [`CommunitySession`] covers v1 and v2c; SNMPv3 security is left to other
//! session implementations.
//!
//! [`Transport`]: transport::Transport
//!
//! # Errors
//!
//! Every fallible operation returns [`Result`]. Timeouts and the SNMPv3
//! `unknownEngineID` / `notInTimeWindow` reports are retried by the client;
//! see [`Error::is_retryable`].
//!
//! # Logging
//!
//! Events are emitted through `tracing` under the `netsnmp::*` targets
//! with `snmp.`-prefixed fields. The crate installs no subscriber.

pub mod ber;
pub mod client;
pub mod error;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod session;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

pub use client::{Client, ClientBuilder, ClientConfig, Reply, Walk};
pub use error::{DecodeErrorKind, Error, ErrorStatus, OidErrorKind, Result};
pub use oid::Oid;
pub use pdu::{Pdu, PduArgs, PduType};
pub use session::{CommunitySession, Session};
pub use value::Value;
pub use varbind::{OidArg, VarBind, VarBindArg};
pub use version::Version;
