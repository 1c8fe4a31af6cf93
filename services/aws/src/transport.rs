use crate::codec;
use crate::protocol::ServiceProtocol;
use crate::response::AwsResponse;
use crate::retry::RetryPolicy;
use bytes::Bytes;
use log::{debug, warn};
use reqwire_core::time::DateTime;
use reqwire_core::{Context, Error, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Sends requests with a deadline and retries transient failures.
#[derive(Debug, Clone, Copy)]
pub struct Transport {
    policy: RetryPolicy,
    timeout: Duration,
}

impl Transport {
    /// Create a transport. `timeout` bounds a whole call, retries included.
    ///
    /// A deadline hit mid-attempt returns the previous attempt's error, or
    /// [`ErrorKind::Timeout`](reqwire_core::ErrorKind::Timeout) if there was none.
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Self {
        Self { policy, timeout }
    }

    /// Send the request built by `prepare` until it succeeds, fails for good
    /// or runs out of attempts or time.
    ///
    /// `prepare` is called once per attempt with a fresh clock reading and
    /// must return a request signed at that time.
    pub async fn send<F>(
        &self,
        ctx: &Context,
        protocol: &ServiceProtocol,
        mut prepare: F,
    ) -> Result<AwsResponse>
    where
        F: FnMut(DateTime) -> Result<http::Request<Bytes>>,
    {
        // A timeout too large to represent means no deadline.
        let deadline = Instant::now().checked_add(self.timeout);
        let mut last_err: Option<Error> = None;
        let mut attempt: usize = 0;

        loop {
            attempt += 1;
            let req = prepare(ctx.now())?;

            let sent = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    tokio::time::timeout(remaining, ctx.http_send(req))
                        .await
                        .ok()
                }
                None => Some(ctx.http_send(req).await),
            };

            let result = match sent {
                Some(Ok(resp)) => codec::decode(protocol, resp),
                Some(Err(err)) => Err(err),
                None => {
                    return Err(match last_err {
                        Some(last) => {
                            warn!(
                                "{} call exceeded deadline of {:?} during attempt {attempt}, returning last error: {last}",
                                protocol.service, self.timeout
                            );
                            last
                        }
                        None => Error::timeout(format!(
                            "{} call exceeded deadline of {:?} during attempt {attempt}",
                            protocol.service, self.timeout
                        )),
                    });
                }
            };

            let err = match result {
                Ok(resp) => {
                    if attempt > 1 {
                        debug!("{} call succeeded after {attempt} attempts", protocol.service);
                    }
                    return Ok(resp);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= self.policy.max_attempts {
                warn!(
                    "{} call failed after {attempt} attempts: {err}",
                    protocol.service
                );
                return Err(err);
            }

            let backoff = self.policy.backoff(attempt as u32 - 1);
            let crosses_deadline = deadline.is_some_and(|deadline| {
                Instant::now()
                    .checked_add(backoff)
                    .map_or(true, |wake| wake >= deadline)
            });
            if crosses_deadline {
                warn!(
                    "{} call gives up after {attempt} attempts, next backoff {backoff:?} crosses the deadline: {err}",
                    protocol.service
                );
                return Err(err);
            }

            debug!(
                "{} call attempt {attempt} failed, retrying in {backoff:?}: {err}",
                protocol.service
            );
            tokio::time::sleep(backoff).await;
            last_err = Some(err);
        }
    }
}
