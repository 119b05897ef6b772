// ABOUTME: Request coordinator facade composing admission, gating and fan-out.
// ABOUTME: Guarantees the per-user gate is idle again on every exit path.

use std::sync::Arc;

use tracing::{debug, info, Instrument};
use uuid::Uuid;

use super::fan_out::{FanOut, FanOutResult};
use super::rate_limiter::RateLimiter;
use super::user_gate::{ReleaseOnDrop, UserGate};
use crate::config::{CoordinatorConfig, SUB_LOOKUP_COUNT};
use crate::error::{ConfigError, CoordinatorError};
use crate::provider::LookupProvider;

/// Reduce a raw query to the word that is looked up: its first
/// whitespace-delimited token, or an empty string.
pub fn normalize_query(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or("")
}

/// Public entry point for dictionary requests.
///
/// Each call to [`handle`](Self::handle) goes through three stages:
///
/// 1. **Admission:** the global [`RateLimiter`] must have room in the current
///    window, otherwise the call fails with
///    [`CoordinatorError::CapacityExceeded`].
/// 2. **Gating:** the [`UserGate`] must be idle for the user, otherwise the
///    call fails with [`CoordinatorError::TooFast`]. The admission slot is
///    not refunded.
/// 3. **Fan-out:** definitions and synonyms are looked up concurrently.
///
/// The admission counter and the gate registry each sit behind their own
/// lock, and neither lock is held while a lookup runs.
pub struct RequestCoordinator {
    limiter: RateLimiter,
    gate: UserGate,
    fan_out: FanOut,
}

impl RequestCoordinator {
    /// Create a coordinator and start its admission reset task.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(
        provider: Arc<dyn LookupProvider>,
        config: CoordinatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(?config, "starting request coordinator");

        Ok(Self {
            limiter: RateLimiter::new(config.max_requests_per_window, config.window_duration()),
            gate: UserGate::new(SUB_LOOKUP_COUNT),
            fan_out: FanOut::new(provider, config.dispatch_spacing()),
        })
    }

    /// Look up definitions and synonyms of the first word of `raw_query`.
    pub async fn handle(
        &self,
        user: &str,
        raw_query: &str,
    ) -> Result<FanOutResult, CoordinatorError> {
        let span = tracing::info_span!("request", id = %Uuid::new_v4(), user = %user);
        self.handle_inner(user, raw_query).instrument(span).await
    }

    async fn handle_inner(
        &self,
        user: &str,
        raw_query: &str,
    ) -> Result<FanOutResult, CoordinatorError> {
        if !self.limiter.try_admit() {
            let retry_after = self.limiter.retry_after();
            debug!(?retry_after, "rejected: admission window saturated");
            return Err(CoordinatorError::CapacityExceeded {
                retry_after_secs: retry_after.as_secs_f64().ceil() as u64,
            });
        }

        if !self.gate.try_claim(user) {
            debug!("rejected: request already in flight");
            return Err(CoordinatorError::TooFast);
        }
        let release = ReleaseOnDrop::new(&self.gate, user);

        let word = normalize_query(raw_query);
        debug!(word, "looking up");

        let result = self.fan_out.run(&self.gate, user, word).await;
        release.disarm();

        if result.is_ok() {
            info!(word, "request completed");
        }
        result
    }

    /// Returns true if no request is in flight for `user`.
    pub fn is_idle(&self, user: &str) -> bool {
        self.gate.is_idle(user)
    }

    /// Number of users with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.gate.in_flight()
    }

    /// Requests admitted in the current window.
    pub fn admitted(&self) -> usize {
        self.limiter.admitted()
    }

    /// Start a fresh admission window immediately.
    pub fn reset_window(&self) {
        self.limiter.reset();
    }

    /// Stop the admission reset task.
    pub fn shutdown(&self) {
        self.limiter.shutdown();
    }
}
