// ABOUTME: Dictionary chat bot answering word lookups through the coordinator.
// ABOUTME: Replies with definitions and synonyms, or with the error text.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ReplySink;
use crate::coordinator::{normalize_query, RequestCoordinator};
use crate::error::DeliveryError;

/// Greeting sent when the bot is added to a chat.
pub const WELCOME_MESSAGE: &str = "Thanks for adding me. I'm Dict Bot, I'm here to help you to find English word definitions and synonyms. Try to send me some words.";

const EMPTY_MESSAGE_HINT: &str = "Please send me a word to look up.";

/// An inbound chat event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A text message from a user.
    Message {
        user_id: String,
        reply_token: String,
        text: String,
    },
    /// The bot was added to a chat.
    Join { reply_token: String },
    /// Anything the bot does not react to.
    Unsupported,
}

/// Chat front end for the [`RequestCoordinator`].
pub struct DictBot<S> {
    coordinator: Arc<RequestCoordinator>,
    sink: S,
}

impl<S: ReplySink> DictBot<S> {
    /// Create a bot replying through `sink`.
    pub fn new(coordinator: Arc<RequestCoordinator>, sink: S) -> Self {
        Self { coordinator, sink }
    }

    /// The coordinator requests are sent to.
    pub fn coordinator(&self) -> &Arc<RequestCoordinator> {
        &self.coordinator
    }

    /// Handle a batch of events in order.
    ///
    /// Stops at the first reply that cannot be delivered and returns its error.
    pub async fn respond(&self, events: &[Event]) -> Result<(), DeliveryError> {
        for event in events {
            self.respond_one(event).await?;
        }
        Ok(())
    }

    async fn respond_one(&self, event: &Event) -> Result<(), DeliveryError> {
        match event {
            Event::Message {
                user_id,
                reply_token,
                text,
            } => {
                let replies = self.answer(user_id, text).await;
                self.deliver(reply_token, &replies).await
            }
            Event::Join { reply_token } => {
                self.deliver(reply_token, &[WELCOME_MESSAGE.to_string()])
                    .await
            }
            Event::Unsupported => {
                debug!("ignoring unsupported event");
                Ok(())
            }
        }
    }

    async fn answer(&self, user_id: &str, text: &str) -> Vec<String> {
        if normalize_query(text).is_empty() {
            return vec![EMPTY_MESSAGE_HINT.to_string()];
        }
        match self.coordinator.handle(user_id, text).await {
            Ok(result) => vec![result.definitions, result.synonyms],
            Err(err) => vec![err.to_string()],
        }
    }

    async fn deliver(&self, reply_token: &str, messages: &[String]) -> Result<(), DeliveryError> {
        self.sink.reply(reply_token, messages).await.inspect_err(|err| {
            warn!(reply_token, error = %err, "reply delivery failed");
        })
    }
}
