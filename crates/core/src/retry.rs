//! Caller-side retry with exponential backoff and jitter
//!
//! The client never retries internally — a failed operation surfaces exactly
//! one classified error. Callers that want another attempt (the CLI's
//! `--retry` flag, scripts) wrap the whole operation in
//! [`retry_with_backoff`] and gate it on [`is_retryable_error`].

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Retry a fallible async operation with exponential backoff.
///
/// `is_retryable` decides whether a given failure is worth another attempt;
/// non-retryable failures and exhausted attempts return the last error as-is.
pub async fn retry_with_backoff<T, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: R,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
    R: Fn(&Error) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= config.max_attempts || !is_retryable(&err) {
                    return Err(err);
                }

                let backoff = backoff_delay(config, attempt);
                tracing::debug!(
                    attempt = attempt,
                    backoff_ms = backoff.as_millis(),
                    error = %err,
                    "retrying after transient error"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Exponential backoff capped at the configured maximum, plus jitter.
///
/// Public so callers that drive their own attempt loop (operations behind
/// `&mut` receivers cannot go through [`retry_with_backoff`]) still share
/// one backoff policy.
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base_ms = config
        .initial_backoff_ms
        .saturating_mul(1u64 << (attempt - 1).min(10));
    let capped_ms = base_ms.min(config.max_backoff_ms);
    Duration::from_millis(capped_ms + jitter(capped_ms))
}

/// Pseudo-random jitter in `0..max` without an RNG dependency.
fn jitter(max: u64) -> u64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    nanos % max.max(1)
}

/// Whether a classified error is worth retrying.
///
/// Transient transport failures and throttling/5xx statuses are; credential
/// problems, malformed input and missing profiles never are.
pub fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Connection { source, .. }
        | Error::ContainerLookup { source, .. }
        | Error::ContainerCreate { source, .. }
        | Error::Upload { source, .. } => source.is_transient(),
        Error::Io(e) => matches!(
            e.kind(),
            std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::Interrupted
        ),
        Error::MalformedUri { .. }
        | Error::Construction(_)
        | Error::Authentication { .. }
        | Error::Config(_)
        | Error::ProfileNotFound(_) => false,
    }
}

/// Builder for one-off [`RetryConfig`] values.
#[derive(Debug, Clone)]
pub struct RetryBuilder {
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryBuilder {
    pub fn new() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_backoff_ms: defaults.initial_backoff_ms,
            max_backoff_ms: defaults.max_backoff_ms,
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    pub fn max_backoff_ms(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    pub fn build(self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff_ms: self.initial_backoff_ms,
            max_backoff_ms: self.max_backoff_ms,
        }
    }
}

impl Default for RetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
