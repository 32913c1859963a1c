//! SNMP client.
//!
//! The client turns caller varbinds into PDUs through its [`Session`], sends
//! them under the retry policy and projects the response varbinds. One
//! request is in flight at a time: every operation awaits its response (or
//! timeout) before returning.

mod builder;
mod retry;
mod walk;

pub use builder::ClientBuilder;
pub use retry::DEFAULT_RETRIES;
pub use walk::Walk;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::pdu::{DEFAULT_COMMUNITY, Pdu};
use crate::session::Session;
use crate::value::Value;
use crate::varbind::{OidArg, VarBindArg};
use crate::version::Version;

use retry::with_retries;

/// Client configuration.
///
/// [`ClientBuilder::config`] uses every field to build the built-in
/// session. [`Client::new`] and [`Client::scoped`] wrap a session that is
/// already configured, so they read `retries` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Protocol version (default: V3)
    pub version: Version,
    /// Retries after a retryable failure (default: 5)
    pub retries: u32,
    /// Community string for v1/v2c (default: "public")
    pub community: Bytes,
    /// Per-attempt response timeout (default: 5 seconds)
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: Version::default(),
            retries: DEFAULT_RETRIES,
            community: Bytes::from_static(DEFAULT_COMMUNITY),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Result of a request: a bare item when the agent returned exactly one
/// varbind, otherwise all of them in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Reply<T> {
    fn from_vec(mut items: Vec<T>) -> Self {
        if items.len() == 1 {
            if let Some(item) = items.pop() {
                return Reply::One(item);
            }
        }
        Reply::Many(items)
    }

    /// All items, in response order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Reply::One(item) => vec![item],
            Reply::Many(items) => items,
        }
    }

    /// The item of a single-varbind reply.
    pub fn single(self) -> Option<T> {
        match self {
            Reply::One(item) => Some(item),
            Reply::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Reply::One(_) => 1,
            Reply::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Reply<(Oid, Value)> {
    /// Value returned for `oid`, or [`Error::OidNotFound`].
    pub fn lookup(&self, oid: &Oid) -> Result<&Value> {
        let found = match self {
            Reply::One((o, v)) => (o == oid).then_some(v),
            Reply::Many(items) => items.iter().find(|(o, _)| o == oid).map(|(_, v)| v),
        };
        found.ok_or_else(|| Error::OidNotFound { oid: oid.clone() })
    }
}

/// SNMP client over a [`Session`].
///
/// Cloning is cheap and shares the session.
pub struct Client<S: Session> {
    inner: Arc<ClientInner<S>>,
}

struct ClientInner<S> {
    session: S,
    retries: u32,
}

impl<S: Session> Clone for Client<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Session> fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("retries", &self.inner.retries)
            .finish_non_exhaustive()
    }
}

impl<S: Session> Client<S> {
    /// Wrap a session, reading only `config.retries`.
    ///
    /// `version`, `community` and `timeout` are ignored: the session was
    /// built with its own. Use [`Client::builder`] to have them applied.
    pub fn new(session: S, config: &ClientConfig) -> Self {
        Self::with_retries(session, config.retries)
    }

    /// Wrap a session with an explicit retry budget.
    pub fn with_retries(session: S, retries: u32) -> Self {
        Self {
            inner: Arc::new(ClientInner { session, retries }),
        }
    }

    /// Run `body` with a client over `session`, closing the session
    /// afterwards whether or not `body` failed.
    ///
    /// The body's error wins over a close error.
    pub async fn scoped<R, F>(session: S, config: &ClientConfig, body: F) -> Result<R>
    where
        F: AsyncFnOnce(&Client<S>) -> Result<R>,
    {
        let client = Self::new(session, config);
        let result = body(&client).await;
        let closed = client.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    pub fn session(&self) -> &S {
        &self.inner.session
    }

    pub fn retries(&self) -> u32 {
        self.inner.retries
    }

    /// Build a PDU for `verb` and exchange it under the retry policy.
    ///
    /// The same PDU, request id included, is resent on every attempt.
    async fn request(&self, verb: &str, varbinds: Vec<VarBindArg>) -> Result<Pdu> {
        let pdu = self.inner.session.build_pdu(verb, varbinds)?;
        tracing::debug!(
            target: "netsnmp::client",
            {
                snmp.pdu_type = %pdu.pdu_type,
                snmp.request_id = pdu.request_id,
                snmp.varbind_count = pdu.varbinds.len()
            },
            "request"
        );

        let session = &self.inner.session;
        let pdu = &pdu;
        with_retries(self.inner.retries, move || session.send(pdu)).await
    }

    /// GET: values in response order.
    ///
    /// ```rust,no_run
    /// # async fn example() -> netsnmp::Result<()> {
    /// use netsnmp::{Client, Version};
    ///
    /// let client = Client::builder("192.168.1.1:161")
    ///     .version(Version::V2c)
    ///     .connect()
    ///     .await?;
    /// let name = client.get(["1.3.6.1.2.1.1.5.0"]).await?;
    /// println!("{:?}", name.single());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(level = "debug", skip_all, err, fields(snmp.pdu_type = "get"))]
    pub async fn get<I>(&self, varbinds: I) -> Result<Reply<Value>>
    where
        I: IntoIterator,
        I::Item: Into<VarBindArg>,
    {
        let response = self.request("get", collect_args(varbinds)).await?;
        Ok(values(response))
    }

    /// GETNEXT: `(oid, value)` pairs in response order.
    #[instrument(level = "debug", skip_all, err, fields(snmp.pdu_type = "getnext"))]
    pub async fn get_next<I>(&self, varbinds: I) -> Result<Reply<(Oid, Value)>>
    where
        I: IntoIterator,
        I::Item: Into<VarBindArg>,
    {
        let response = self.request("getnext", collect_args(varbinds)).await?;
        Ok(pairs(response))
    }

    /// SET: the values the agent echoed back.
    #[instrument(level = "debug", skip_all, err, fields(snmp.pdu_type = "set"))]
    pub async fn set<I>(&self, varbinds: I) -> Result<Reply<Value>>
    where
        I: IntoIterator,
        I::Item: Into<VarBindArg>,
    {
        let response = self.request("set", collect_args(varbinds)).await?;
        Ok(values(response))
    }

    /// INFORM: the values in the acknowledgement.
    #[instrument(level = "debug", skip_all, err, fields(snmp.pdu_type = "inform"))]
    pub async fn inform<I>(&self, varbinds: I) -> Result<Reply<Value>>
    where
        I: IntoIterator,
        I::Item: Into<VarBindArg>,
    {
        let response = self.request("inform", collect_args(varbinds)).await?;
        Ok(values(response))
    }

    /// Walk the subtree under `root` with successive GETNEXT requests.
    ///
    /// Fails immediately on a malformed or unencodable root; request errors
    /// come out of the stream. Nothing is sent until the stream is polled.
    pub fn walk(&self, root: impl Into<OidArg>) -> Result<Walk<S>>
    where
        S: 'static,
    {
        let root: OidArg = root.into();
        Ok(Walk::new(self.clone(), root.into_oid()?))
    }

    /// Close the session.
    pub async fn close(self) -> Result<()> {
        self.inner.session.close().await
    }

    /// One GETNEXT from `cursor`, used by the walk.
    pub(crate) async fn next_after(&self, cursor: Oid) -> Result<Pdu> {
        self.request("getnext", vec![VarBindArg::from(cursor)]).await
    }
}

fn collect_args<I>(varbinds: I) -> Vec<VarBindArg>
where
    I: IntoIterator,
    I::Item: Into<VarBindArg>,
{
    varbinds.into_iter().map(Into::into).collect()
}

fn values(response: Pdu) -> Reply<Value> {
    Reply::from_vec(response.varbinds.into_iter().map(|vb| vb.value).collect())
}

fn pairs(response: Pdu) -> Reply<(Oid, Value)> {
    Reply::from_vec(response.varbinds.into_iter().map(|vb| vb.into_pair()).collect())
}
