//! Walk stream implementation.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::Result;
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::session::Session;
use crate::value::Value;
use crate::varbind::VarBind;

use super::Client;

/// Async stream walking an OID subtree with GETNEXT.
///
/// Created by [`Client::walk()`]. The walk ends when a returned OID falls
/// outside the root's subtree, when the agent reports `endOfMibView`, or
/// when the first OID of the walk comes back again.
pub struct Walk<S: Session> {
    client: Client<S>,
    root: Oid,
    cursor: Oid,
    /// First OID yielded, used to detect agents that wrap around.
    first: Option<Oid>,
    buffer: VecDeque<VarBind>,
    done: bool,
    pending: Option<Pin<Box<dyn Future<Output = Result<Pdu>> + Send>>>,
}

impl<S: Session> Walk<S> {
    pub(crate) fn new(client: Client<S>, root: Oid) -> Self {
        Self {
            client,
            cursor: root.clone(),
            root,
            first: None,
            buffer: VecDeque::new(),
            done: false,
            pending: None,
        }
    }

    /// The subtree being walked.
    pub fn root(&self) -> &Oid {
        &self.root
    }

    fn finish(&mut self) {
        self.done = true;
        self.buffer.clear();
        self.pending = None;
    }

    fn ends_walk(&self, oid: &Oid, value: &Value) -> bool {
        !self.root.is_ancestor_of(oid)
            || matches!(value, Value::EndOfMibView)
            || self.first.as_ref() == Some(oid)
    }
}

impl<S: Session + 'static> Stream for Walk<S> {
    type Item = Result<(Oid, Value)>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.done {
                return Poll::Ready(None);
            }

            if let Some(vb) = self.buffer.pop_front() {
                let (oid, value) = vb.into_pair();
                if self.ends_walk(&oid, &value) {
                    tracing::debug!(
                        target: "netsnmp::client",
                        {
                            snmp.oid = %oid,
                            snmp.root = %self.root
                        },
                        "walk finished"
                    );
                    self.finish();
                    return Poll::Ready(None);
                }

                if self.first.is_none() {
                    self.first = Some(oid.clone());
                }
                self.cursor = oid.clone();
                return Poll::Ready(Some(Ok((oid, value))));
            }

            if self.pending.is_none() {
                let client = self.client.clone();
                let cursor = self.cursor.clone();
                self.pending = Some(Box::pin(async move { client.next_after(cursor).await }));
            }

            let Some(pending) = self.pending.as_mut() else {
                continue;
            };
            match pending.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(response)) => {
                    self.pending = None;
                    if response.varbinds.is_empty() {
                        self.finish();
                        return Poll::Ready(None);
                    }
                    self.buffer.extend(response.varbinds);
                }
                Poll::Ready(Err(e)) => {
                    self.finish();
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::oid;
    use crate::session::CommunitySession;
    use crate::transport::{MockTransport, ResponseBuilder};
    use crate::version::Version;
    use std::future::poll_fn;
    use std::time::Duration;

    fn mock_client(mock: &MockTransport) -> Client<CommunitySession<MockTransport>> {
        let session = CommunitySession::new(
            mock.clone(),
            Version::V2c,
            "public",
            Duration::from_millis(50),
        )
        .unwrap();
        Client::with_retries(session, 0)
    }

    fn mock() -> MockTransport {
        MockTransport::new("127.0.0.1:161".parse().unwrap())
    }

    async fn collect_walk<S: Session + 'static>(
        mut walk: Pin<&mut Walk<S>>,
        limit: usize,
    ) -> Vec<Result<(Oid, Value)>> {
        let mut results = Vec::new();
        while results.len() < limit {
            let item = poll_fn(|cx: &mut Context<'_>| walk.as_mut().poll_next(cx)).await;
            match item {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    #[tokio::test]
    async fn test_walk_terminates_on_end_of_mib_view() {
        let mock = mock();
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("test")),
        );
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::EndOfMibView),
        );

        let client = mock_client(&mock);
        let mut walk = Box::pin(client.walk("1.3.6.1.2.1.1").unwrap());
        let results = collect_walk(walk.as_mut(), 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("test"))
        );
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_walk_terminates_when_leaving_subtree() {
        let mock = mock();
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(1)),
        );

        let client = mock_client(&mock);
        let mut walk = Box::pin(client.walk(oid!(1, 3, 6, 1, 2, 1, 1)).unwrap());
        let results = collect_walk(walk.as_mut(), 10).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_walk_advances_cursor() {
        let mock = mock();
        for (last, value) in [(1, 10), (2, 20), (3, 30)] {
            mock.queue_reply(
                ResponseBuilder::new()
                    .varbind(oid!(1, 3, 6, 1, 2, 1, 1, last, 0), Value::Integer(value)),
            );
        }
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(0)),
        );

        let client = mock_client(&mock);
        let mut walk = Box::pin(client.walk("1.3.6.1.2.1.1").unwrap());
        let results = collect_walk(walk.as_mut(), 10).await;
        let oids: Vec<_> = results.into_iter().map(|r| r.unwrap().0).collect();
        assert_eq!(
            oids,
            vec![
                oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                oid!(1, 3, 6, 1, 2, 1, 1, 2, 0),
                oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
            ]
        );

        let cursors: Vec<_> = mock
            .requests()
            .into_iter()
            .map(|r| r.pdu.unwrap().varbinds[0].oid.clone())
            .collect();
        assert_eq!(
            cursors,
            vec![
                oid!(1, 3, 6, 1, 2, 1, 1),
                oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                oid!(1, 3, 6, 1, 2, 1, 1, 2, 0),
                oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_walk_stops_when_first_oid_repeats() {
        let mock = mock();
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(1)),
        );
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::Integer(2)),
        );
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(1)),
        );

        let client = mock_client(&mock);
        let mut walk = Box::pin(client.walk("1.3.6.1.2.1.1").unwrap());
        let results = collect_walk(walk.as_mut(), 10).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_walk_propagates_errors() {
        let mock = mock();
        mock.queue_reply(
            ResponseBuilder::new().varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(1)),
        );
        mock.queue_io_error("network unreachable");

        let client = mock_client(&mock);
        let mut walk = Box::pin(client.walk("1.3.6.1.2.1.1").unwrap());
        let results = collect_walk(walk.as_mut(), 10).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn test_walk_ends_on_empty_response() {
        let mock = mock();
        mock.queue_reply(ResponseBuilder::new());

        let client = mock_client(&mock);
        let mut walk = Box::pin(client.walk("1.3.6.1.2.1.1").unwrap());
        assert!(collect_walk(walk.as_mut(), 10).await.is_empty());
    }

    #[test]
    fn test_walk_rejects_malformed_root() {
        let client = mock_client(&mock());
        assert!(matches!(
            client.walk("1.3..6"),
            Err(Error::InvalidOid { .. })
        ));
    }
}
