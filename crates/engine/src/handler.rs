// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry and circuit-breaker wrapper around storage calls

use crate::circuit::{CircuitRegistry, CircuitState};
use crate::monitor::StorageMonitor;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use sv_core::{Clock, ErrorKind, RetryConfig, RetryPolicy, StorageError, SystemClock};
use tokio_util::sync::CancellationToken;

/// Runs storage calls under the retry policy.
///
/// Each named operation has its own circuit. Transient failures are
/// retried with exponential backoff, structural ones surface at once, and
/// every surfaced failure is recorded in the monitor before it is returned.
#[derive(Clone)]
pub struct StorageExceptionHandler<C: Clock = SystemClock> {
    retry: RetryConfig,
    circuits: Arc<CircuitRegistry>,
    monitor: Arc<StorageMonitor>,
    clock: C,
    cancel: CancellationToken,
}

impl<C: Clock> StorageExceptionHandler<C> {
    pub fn new(
        retry: RetryConfig,
        circuits: Arc<CircuitRegistry>,
        monitor: Arc<StorageMonitor>,
        clock: C,
    ) -> Self {
        Self {
            retry,
            circuits,
            monitor,
            clock,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to interrupt backoff sleeps
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn circuits(&self) -> &Arc<CircuitRegistry> {
        &self.circuits
    }

    pub fn monitor(&self) -> &Arc<StorageMonitor> {
        &self.monitor
    }

    /// Run `op` for `session_id`, retrying per the error kind.
    ///
    /// `op` is called once per attempt and each attempt is bounded by the
    /// configured operation timeout.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        session_id: &str,
        mut op: F,
    ) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let started = Instant::now();

        if !self.circuits.allow(operation, self.clock.now()) {
            let err = StorageError::new(
                ErrorKind::CircuitBreakerOpen,
                session_id,
                operation,
                format!(
                    "circuit open after {} consecutive failures",
                    self.circuits.failures(operation)
                ),
            );
            tracing::warn!(session_id, operation, "circuit open, not attempting");
            return Err(self.surface(err, started));
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let result = match tokio::time::timeout(self.retry.operation_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(StorageError::new(
                    ErrorKind::Timeout,
                    session_id,
                    operation,
                    format!("no response within {:?}", self.retry.operation_timeout),
                )),
            };

            let err = match result {
                Ok(value) => {
                    self.circuits.record_success(operation);
                    self.monitor
                        .record_operation(session_id, started.elapsed());
                    if attempt > 1 {
                        tracing::info!(session_id, operation, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let limit = match err.kind.retry_policy() {
                RetryPolicy::FailFast => {
                    tracing::error!(session_id, operation, error = %err, "not retryable");
                    return Err(self.surface(err, started));
                }
                RetryPolicy::RetryOnce => self.retry.max_attempts.min(2),
                RetryPolicy::Retry => self.retry.max_attempts,
            };

            if attempt >= limit {
                let state = self.circuits.record_failure(operation, self.clock.now());
                tracing::error!(
                    session_id,
                    operation,
                    attempt,
                    circuit = %state,
                    error = %err,
                    "retries exhausted"
                );
                let exhausted = StorageError::new(
                    ErrorKind::MaxRetriesExceeded,
                    session_id,
                    operation,
                    format!("gave up after {attempt} attempts; last error: {}", err),
                );
                if state == CircuitState::Open {
                    tracing::warn!(operation, "further calls will fail fast");
                }
                return Err(self.surface(exhausted, started));
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                session_id,
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying"
            );

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let interrupted = StorageError::new(
                        ErrorKind::OperationInterrupted,
                        session_id,
                        operation,
                        format!("cancelled during backoff after attempt {attempt}"),
                    );
                    return Err(self.surface(interrupted, started));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn surface(&self, err: StorageError, started: Instant) -> StorageError {
        self.monitor
            .record_operation(&err.session_id, started.elapsed());
        self.monitor.record_failure(&err, None);
        err
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
