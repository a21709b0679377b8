use std::{future::Future, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    errors::{ExecError, PipelineError},
    http::{RequestExecutor, RequestParams},
    proxy::ProxyHandle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retries every failure, terminal ones included, until success.
    /// `max_attempts` exists so callers (and tests) can still bound it.
    Unbounded {
        max_attempts: Option<usize>,
        delay: Duration,
    },
    /// Fixed delay between attempts, no backoff. Stops early on a terminal failure.
    Bounded { max_attempts: usize, delay: Duration },
}

impl RetryPolicy {
    pub fn unbounded(max_attempts: Option<usize>, delay: Duration) -> Self {
        Self::Unbounded {
            max_attempts,
            delay,
        }
    }

    pub fn bounded(max_attempts: usize, delay: Duration) -> Self {
        Self::Bounded {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    fn max_attempts(&self) -> Option<usize> {
        match *self {
            Self::Unbounded { max_attempts, .. } => max_attempts.map(|max| max.max(1)),
            Self::Bounded { max_attempts, .. } => Some(max_attempts.max(1)),
        }
    }

    fn delay(&self) -> Duration {
        match *self {
            Self::Unbounded { delay, .. } | Self::Bounded { delay, .. } => delay,
        }
    }

    fn stops_on_terminal(&self) -> bool {
        matches!(self, Self::Bounded { .. })
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives `attempt` (called with the 1-based attempt number) under `policy`.
pub async fn retry_with_policy<T, F, Fut>(
    label: &str,
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    mut attempt: F,
) -> Result<T, PipelineError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, ExecError>>,
{
    let max_attempts = policy.max_attempts();
    let delay = policy.delay();
    let mut attempts = 0;

    loop {
        attempts += 1;

        let err = match attempt(attempts).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if let ExecError::Terminal(reason) = &err {
            if policy.stops_on_terminal() {
                tracing::error!(attempt = attempts, "{label}: {reason}. Stopping retries");
                return Err(PipelineError::Terminal {
                    attempts,
                    reason: reason.clone(),
                });
            }
        }

        if max_attempts.is_some_and(|max| attempts >= max) {
            tracing::error!(attempt = attempts, "{label}: amount of tries exceeded");
            return Err(PipelineError::ExhaustedRetries {
                attempts,
                last_error: err.to_string(),
            });
        }

        tracing::warn!(attempt = attempts, "{label} failed: {err}. Retrying in {delay:?}");

        if !delay.is_zero() {
            sleeper.sleep(delay).await;
        }
    }
}

pub async fn send_with_retries(
    executor: &dyn RequestExecutor,
    request: &RequestParams,
    proxy: &ProxyHandle,
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<Value, PipelineError> {
    let label = format!("{} {}", request.method, request.url);

    retry_with_policy(&label, policy, sleeper, |_| executor.execute(request, proxy)).await
}
