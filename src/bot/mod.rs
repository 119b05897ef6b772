// ABOUTME: Bot module - chat front end on top of the request coordinator.
// ABOUTME: Turns inbound events into coordinator calls and replies.

mod dict_bot;
mod sink;

pub use dict_bot::{DictBot, Event, WELCOME_MESSAGE};
pub use sink::{ReplySink, StdoutSink};
