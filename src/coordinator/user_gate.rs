// ABOUTME: Per-user single-flight gate for coordinated requests.
// ABOUTME: Tracks how many sub-lookups are still outstanding for each user.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Admits at most one in-flight request per user key.
///
/// A claimed key maps to the number of sub-lookups still outstanding. Idle
/// keys are removed, so a key that was never seen and a key whose last
/// request finished are indistinguishable.
#[derive(Debug)]
pub struct UserGate {
    remaining: Mutex<HashMap<String, usize>>,
    sub_lookups: usize,
}

impl UserGate {
    /// Create a gate that expects `sub_lookups` completions per request.
    ///
    /// # Panics
    ///
    /// Panics if `sub_lookups` is zero.
    pub fn new(sub_lookups: usize) -> Self {
        assert!(sub_lookups > 0, "sub_lookups must be positive");
        Self {
            remaining: Mutex::new(HashMap::new()),
            sub_lookups,
        }
    }

    /// Claim the gate for `user`.
    ///
    /// Returns `false` if a request for this user is already in flight.
    pub fn try_claim(&self, user: &str) -> bool {
        let mut remaining = self.lock();
        if remaining.get(user).is_some_and(|n| *n > 0) {
            return false;
        }
        remaining.insert(user.to_string(), self.sub_lookups);
        true
    }

    /// Record one finished sub-lookup and return how many are left.
    ///
    /// Zero means the request is complete and the gate is idle again.
    pub fn mark_sub_completion(&self, user: &str) -> usize {
        let mut remaining = self.lock();
        let Some(count) = remaining.get_mut(user) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let left = *count;
        if left == 0 {
            remaining.remove(user);
        }
        left
    }

    /// Return `user` to idle without waiting for outstanding sub-lookups.
    pub fn force_idle(&self, user: &str) {
        self.lock().remove(user);
    }

    /// Release the gate for `user`. Idempotent.
    pub fn release(&self, user: &str) {
        self.force_idle(user);
    }

    /// Returns true if no request is in flight for `user`.
    pub fn is_idle(&self, user: &str) -> bool {
        self.lock().get(user).is_none_or(|n| *n == 0)
    }

    /// Number of users with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a claimed gate when dropped, unless disarmed first.
///
/// Covers the case where the request future is dropped while sub-lookups are
/// still outstanding; the normal exit paths leave the gate idle themselves.
pub(crate) struct ReleaseOnDrop<'a> {
    gate: &'a UserGate,
    user: &'a str,
    armed: bool,
}

impl<'a> ReleaseOnDrop<'a> {
    pub(crate) fn new(gate: &'a UserGate, user: &'a str) -> Self {
        Self {
            gate,
            user,
            armed: true,
        }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.gate.release(self.user);
        }
    }
}
