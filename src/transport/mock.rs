//! Mock transport for testing.
//!
//! Replays queued replies without touching the network and records every
//! datagram sent through it.

use super::Transport;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A queued reply.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Encode this response under the request id of the last request sent.
    Reply(ResponseBuilder),
    /// Return these bytes exactly.
    RawData(Bytes),
    /// Simulate a timeout
    Timeout,
    /// Simulate an IO error
    IoError(String),
}

/// A request sent through the mock transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub data: Bytes,
    /// The decoded request, when the bytes decode.
    pub pdu: Option<Pdu>,
}

#[derive(Debug)]
struct MockTransportInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    last_request_id: Option<i32>,
}

/// Programmable transport.
///
/// An empty queue behaves like a silent agent: every receive times out.
/// Available in unit tests and with the `testing` feature.
#[derive(Clone, Debug)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
                last_request_id: None,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply that answers whatever request comes next.
    pub fn queue_reply(&self, reply: ResponseBuilder) {
        self.state().responses.push_back(MockResponse::Reply(reply));
    }

    /// Queue raw bytes returned without any patching.
    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        self.state()
            .responses
            .push_back(MockResponse::RawData(data.into()));
    }

    pub fn queue_timeout(&self) {
        self.state().responses.push_back(MockResponse::Timeout);
    }

    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.state()
            .responses
            .push_back(MockResponse::IoError(msg.into()));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn queued_response_count(&self) -> usize {
        self.state().responses.len()
    }
}

impl Transport for MockTransport {
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let data = Bytes::copy_from_slice(data);
        let pdu = Pdu::decode_unchecked(data.clone()).ok();

        let mut inner = self.state();
        inner.last_request_id = pdu.as_ref().map(|p| p.request_id);
        inner.requests.push(RecordedRequest { data, pdu });

        async { Ok(()) }
    }

    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send {
        let (response, target, last_request_id) = {
            let mut inner = self.state();
            (
                inner.responses.pop_front(),
                inner.target,
                inner.last_request_id,
            )
        };

        async move {
            match response {
                Some(MockResponse::Reply(reply)) => {
                    Ok((reply.encode(last_request_id.unwrap_or(request_id)), target))
                }
                Some(MockResponse::RawData(data)) => Ok((data, target)),
                Some(MockResponse::IoError(msg)) => Err(Error::Io {
                    target: Some(target),
                    source: std::io::Error::other(msg),
                }),
                Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                    target: Some(target),
                    elapsed: timeout,
                    request_id,
                }),
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.state().target
    }

    fn local_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }
}

/// Builder for response messages used in tests.
///
/// The error status is written as given, so error responses can be built.
#[derive(Clone, Debug)]
pub struct ResponseBuilder {
    version: Version,
    community: Bytes,
    varbinds: Vec<VarBind>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    /// A v2c response with community `public`.
    pub fn new() -> Self {
        Self {
            version: Version::V2c,
            community: Bytes::from_static(crate::pdu::DEFAULT_COMMUNITY),
            varbinds: Vec::new(),
            error_status: 0,
            error_index: 0,
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.community = community.into();
        self
    }

    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    pub fn error(mut self, status: i32, index: i32) -> Self {
        self.error_status = status;
        self.error_index = index;
        self
    }

    /// The response PDU under `request_id`.
    pub fn build(&self, request_id: i32) -> Pdu {
        Pdu {
            version: self.version,
            community: self.community.clone(),
            pdu_type: PduType::Response,
            request_id,
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds.clone(),
        }
    }

    /// Encoded response under `request_id`.
    pub fn encode(&self, request_id: i32) -> Bytes {
        self.build(request_id).encode()
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
