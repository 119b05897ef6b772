// ABOUTME: Defines the ReplySink trait - where bot replies are delivered.
// ABOUTME: Includes a sink that writes replies to stdout.

use std::io::Write;

use async_trait::async_trait;

use crate::error::DeliveryError;

/// Delivers reply messages for an inbound event.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Deliver `messages`, in order, as the reply to `reply_token`.
    async fn reply(&self, reply_token: &str, messages: &[String]) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: ReplySink + ?Sized> ReplySink for std::sync::Arc<T> {
    async fn reply(&self, reply_token: &str, messages: &[String]) -> Result<(), DeliveryError> {
        (**self).reply(reply_token, messages).await
    }
}

/// Prints each reply message on its own line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl ReplySink for StdoutSink {
    async fn reply(&self, _reply_token: &str, messages: &[String]) -> Result<(), DeliveryError> {
        let mut out = std::io::stdout().lock();
        for message in messages {
            writeln!(out, "{}", message)?;
        }
        out.flush()?;
        Ok(())
    }
}
