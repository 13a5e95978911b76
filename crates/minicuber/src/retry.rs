//! Bounded retry with exponential backoff at the provider call boundary.

use cube_common::ProductCube;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::provider::{LoadRequest, Provider};

/// Typed result of one provider call after retries.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Data(ProductCube),
    NoData,
    Failed(ProviderError),
}

impl ProviderOutcome {
    pub fn is_data(&self) -> bool {
        matches!(self, ProviderOutcome::Data(_))
    }
}

/// Retry schedule for provider calls.
///
/// Only [`ProviderError::Transient`] is retried. The delay doubles after
/// every attempt up to `max_delay`; with `jitter` each sleep is scaled by a
/// random factor in `[0.5, 1.5)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Un-jittered delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    fn sleep_for(&self, retry: u32) -> Duration {
        let base = self.backoff(retry);
        if self.jitter {
            base.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
        } else {
            base
        }
    }

    /// Call `provider` under this policy.
    ///
    /// Exhausted transient retries degrade to [`ProviderOutcome::NoData`].
    pub async fn call(&self, provider: &dyn Provider, request: &LoadRequest) -> ProviderOutcome {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match provider.load_data(request).await {
                Ok(Some(cube)) => return ProviderOutcome::Data(cube),
                Ok(None) => return ProviderOutcome::NoData,
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.sleep_for(attempt);
                    warn!(
                        provider = %provider.name(),
                        error = %e,
                        attempt = attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        provider = %provider.name(),
                        error = %e,
                        attempts = attempts,
                        "Retries exhausted, treating as no data"
                    );
                    return ProviderOutcome::NoData;
                }
                Err(e) => {
                    debug!(provider = %provider.name(), error = %e, "Provider call failed");
                    return ProviderOutcome::Failed(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cube_common::{BoundingBox, ProviderKind, SpatialAxes, TimeInterval};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        error: ProviderError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Provider for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Temporal
        }

        async fn load_data(
            &self,
            _request: &LoadRequest,
        ) -> Result<Option<ProductCube>, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(self.error.clone());
            }
            Ok(Some(ProductCube::new(SpatialAxes::Geographic {
                lon: vec![0.0],
                lat: vec![0.0],
            })))
        }
    }

    fn flaky(failures: u32, error: ProviderError) -> Flaky {
        Flaky {
            failures,
            error,
            calls: AtomicU32::new(0),
        }
    }

    fn request() -> LoadRequest {
        LoadRequest::static_layer(
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            TimeInterval::parse("2021-06-01/2021-06-10").unwrap(),
        )
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            jitter: false,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(500));
        assert_eq!(policy.backoff(40), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_then_success() {
        let provider = flaky(2, ProviderError::Transient("rate limited".into()));
        let outcome = RetryPolicy::default().call(&provider, &request()).await;
        assert!(outcome.is_data());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_degrade_to_no_data() {
        let provider = flaky(10, ProviderError::Transient("timeout".into()));
        let outcome = RetryPolicy::default().call(&provider, &request()).await;
        assert!(matches!(outcome, ProviderOutcome::NoData));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_errors_not_retried() {
        let provider = flaky(1, ProviderError::Failed("bad scene".into()));
        let outcome = RetryPolicy::default().call(&provider, &request()).await;
        assert!(matches!(outcome, ProviderOutcome::Failed(ProviderError::Failed(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
