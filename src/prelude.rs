// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use dictbot::prelude::*;` to get started quickly.

pub use crate::bot::{DictBot, Event, ReplySink, StdoutSink};
pub use crate::config::{CoordinatorConfig, OxfordConfig, SUB_LOOKUP_COUNT};
pub use crate::coordinator::{FanOutResult, RequestCoordinator, normalize_query};
pub use crate::error::{ConfigError, CoordinatorError, DeliveryError, DictError, LookupError};
pub use crate::provider::{LookupProvider, OxfordClient, Script, ScriptedProvider};
