//! Minimal SNMP responder on the loopback interface.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::ops::Bound;

use netsnmp::{Oid, Pdu, PduType, Value, VarBind};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Agent serving GET, GETNEXT and SET from an in-memory table.
///
/// The first `drop_first` requests go unanswered so client retries can be
/// observed. The task is aborted on drop.
pub struct TestAgent {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestAgent {
    pub async fn start(mib: BTreeMap<Oid, Value>) -> Self {
        Self::start_dropping(mib, 0).await
    }

    pub async fn start_dropping(mut mib: BTreeMap<Oid, Value>, drop_first: usize) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; 65535];
            let mut seen = 0usize;
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    return;
                };
                seen += 1;
                if seen <= drop_first {
                    continue;
                }
                let Ok(request) = Pdu::decode(bytes::Bytes::copy_from_slice(&buf[..len])) else {
                    continue;
                };
                let response = answer(&mut mib, request);
                let _ = socket.send_to(&response.encode(), from).await;
            }
        });

        Self { addr, handle }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn answer(mib: &mut BTreeMap<Oid, Value>, request: Pdu) -> Pdu {
    let varbinds = request
        .varbinds
        .iter()
        .map(|vb| match request.pdu_type {
            PduType::GetNext => mib
                .range((Bound::Excluded(vb.oid.clone()), Bound::Unbounded))
                .next()
                .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
                .unwrap_or_else(|| VarBind::new(vb.oid.clone(), Value::EndOfMibView)),
            PduType::Set => {
                mib.insert(vb.oid.clone(), vb.value.clone());
                vb.clone()
            }
            _ => VarBind::new(
                vb.oid.clone(),
                mib.get(&vb.oid).cloned().unwrap_or(Value::NoSuchObject),
            ),
        })
        .collect();

    Pdu {
        pdu_type: PduType::Response,
        varbinds,
        ..request
    }
}
