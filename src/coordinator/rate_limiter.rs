// ABOUTME: Fixed-window admission limiter guarding the shared dictionary backend.
// ABOUTME: A background task owned by the limiter resets the counter every window.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Mutable state for the limiter, protected by a single mutex.
#[derive(Debug)]
struct AdmissionCounter {
    count: usize,
    window_started: Instant,
}

/// Global ceiling on admitted requests per fixed window.
///
/// Admission is a non-blocking check: [`try_admit`](Self::try_admit) either
/// consumes a slot or reports saturation. The counter is reset to zero once
/// per window by a task spawned in [`new`](Self::new), whether or not any
/// request arrived. The task stops on [`shutdown`](Self::shutdown) or when the
/// limiter is dropped.
#[derive(Debug)]
pub struct RateLimiter {
    state: Arc<Mutex<AdmissionCounter>>,
    limit: usize,
    window: Duration,
    restart: Arc<Notify>,
    shutdown: CancellationToken,
}

impl RateLimiter {
    /// Create a limiter and start its reset task.
    ///
    /// # Arguments
    ///
    /// * `limit` - Requests admitted per window. Zero rejects everything.
    /// * `window` - Length of the admission window.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero or if called outside a tokio runtime.
    pub fn new(limit: usize, window: Duration) -> Self {
        assert!(!window.is_zero(), "window must be positive");

        let state = Arc::new(Mutex::new(AdmissionCounter {
            count: 0,
            window_started: Instant::now(),
        }));
        let restart = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();

        tokio::spawn(reset_loop(
            Arc::clone(&state),
            window,
            Arc::clone(&restart),
            shutdown.clone(),
        ));

        Self {
            state,
            limit,
            window,
            restart,
            shutdown,
        }
    }

    /// Consume one admission slot if the window still has room.
    ///
    /// Returns `false` without side effects once `limit` requests have been
    /// admitted in the current window.
    pub fn try_admit(&self) -> bool {
        let mut state = lock(&self.state);
        if state.count >= self.limit {
            return false;
        }
        state.count += 1;
        true
    }

    /// Requests admitted in the current window.
    pub fn admitted(&self) -> usize {
        lock(&self.state).count
    }

    /// The configured ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Approximate time left until the counter is next reset.
    pub fn retry_after(&self) -> Duration {
        let state = lock(&self.state);
        self.window.saturating_sub(state.window_started.elapsed())
    }

    /// Reset the counter immediately and start a new window.
    ///
    /// The background timer is rescheduled so the next automatic reset comes
    /// one full window from now.
    pub fn reset(&self) {
        reset_counter(&self.state);
        self.restart.notify_one();
    }

    /// Stop the background reset task. Admission keeps working, but the
    /// counter is no longer reset.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn reset_loop(
    state: Arc<Mutex<AdmissionCounter>>,
    window: Duration,
    restart: Arc<Notify>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + window, window);
    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                trace!("admission reset task stopped");
                return;
            }
            () = restart.notified() => {
                ticker.reset();
            }
            _ = ticker.tick() => {
                reset_counter(&state);
            }
        }
    }
}

fn reset_counter(state: &Mutex<AdmissionCounter>) {
    let mut state = lock(state);
    trace!(admitted = state.count, "admission window reset");
    state.count = 0;
    state.window_started = Instant::now();
}

fn lock(state: &Mutex<AdmissionCounter>) -> MutexGuard<'_, AdmissionCounter> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
