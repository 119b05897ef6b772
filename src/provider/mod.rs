// ABOUTME: Provider module - lookup capability and its implementations.
// ABOUTME: Contains the Oxford HTTP adapter and a scripted test double.

mod oxford;
mod scripted;
mod traits;

pub use oxford::*;
pub use scripted::{Script, ScriptedProvider};
pub use traits::LookupProvider;
