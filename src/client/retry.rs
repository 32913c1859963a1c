//! Retry policy for client requests.
//!
//! Retryable errors ([`Error::is_retryable`](crate::Error::is_retryable)) are retried immediately, with no
//! backoff, until the budget is spent. Everything else propagates on first
//! occurrence.

use std::future::Future;

use crate::error::Result;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 5;

/// Run `op`, retrying retryable failures up to `retries` times.
///
/// An operation that always fails retryably runs `retries + 1` times and the
/// last error is returned.
pub(crate) async fn with_retries<T, F, Fut>(retries: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < retries => {
                attempt += 1;
                tracing::debug!(
                    target: "netsnmp::client",
                    {
                        snmp.attempt = attempt,
                        snmp.retries = retries,
                        error = %e
                    },
                    "retrying request"
                );
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::debug!(target: "netsnmp::client", { snmp.retries = retries, error = %e }, "retries exhausted");
                }
                return Err(e);
            }
        }
    }
}
