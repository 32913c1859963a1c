//! Scripted session for exercising the client without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use netsnmp::{Error, Pdu, PduArgs, PduType, Result, Session, VarBind, VarBindArg, Version};

struct ScriptState {
    script: VecDeque<Result<Vec<VarBind>>>,
    sent: Vec<Pdu>,
    closes: usize,
}

/// Session answering each `send` with the next scripted step.
///
/// An exhausted script answers with timeouts. Clones share state, so a test
/// can keep a handle after moving the session into a client.
#[derive(Clone)]
pub struct ScriptedSession {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                script: VecDeque::new(),
                sent: Vec::new(),
                closes: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer the next send with these varbinds.
    pub fn respond(&self, varbinds: Vec<VarBind>) {
        self.state().script.push_back(Ok(varbinds));
    }

    /// Fail the next send with `err`.
    pub fn fail(&self, err: Error) {
        self.state().script.push_back(Err(err));
    }

    pub fn timeout(&self) {
        self.fail(timeout_error());
    }

    /// Every PDU passed to `send`, in order.
    pub fn sent(&self) -> Vec<Pdu> {
        self.state().sent.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state().sent.len()
    }

    pub fn close_count(&self) -> usize {
        self.state().closes
    }
}

pub fn timeout_error() -> Error {
    Error::Timeout {
        target: None,
        elapsed: Duration::from_millis(10),
        request_id: 0,
    }
}

impl Session for ScriptedSession {
    fn build_pdu(&self, verb: &str, varbinds: Vec<VarBindArg>) -> Result<Pdu> {
        Pdu::build(
            verb,
            PduArgs {
                version: Version::V2c,
                varbinds,
                ..Default::default()
            },
        )
    }

    async fn send(&self, pdu: &Pdu) -> Result<Pdu> {
        let step = {
            let mut state = self.state();
            state.sent.push(pdu.clone());
            state.script.pop_front()
        };
        let varbinds = step.unwrap_or_else(|| Err(timeout_error()))?;
        Ok(Pdu {
            pdu_type: PduType::Response,
            varbinds,
            ..pdu.clone()
        })
    }

    async fn close(&self) -> Result<()> {
        self.state().closes += 1;
        Ok(())
    }
}
