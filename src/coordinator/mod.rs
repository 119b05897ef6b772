// ABOUTME: Coordinator module for rate-limited dictionary requests.
// ABOUTME: Contains admission limiting, per-user gating and the lookup fan-out.

mod coordinator;
mod fan_out;
mod rate_limiter;
mod user_gate;

pub use coordinator::{normalize_query, RequestCoordinator};
pub use fan_out::FanOutResult;
pub use rate_limiter::RateLimiter;
pub use user_gate::UserGate;
