//! Shared test utilities for netsnmp integration tests.

// Not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

mod agent;
mod fixtures;
mod session;
mod stream;

pub use agent::TestAgent;
pub use fixtures::*;
pub use session::ScriptedSession;
pub use stream::collect_stream;

/// Install a subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
