// ABOUTME: Root module for dictbot - rate-limited dictionary lookup coordinator.
// ABOUTME: Re-exports all public types from submodules.

pub mod bot;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod prelude;
pub mod provider;

pub use error::DictError;
