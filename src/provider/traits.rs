// ABOUTME: Defines the LookupProvider trait - the capability the coordinator
// ABOUTME: fans out to. One method per independent sub-lookup.

use async_trait::async_trait;

use crate::error::LookupError;

/// A source of dictionary answers.
///
/// Both methods are independent and may be slow or fail; the coordinator
/// runs them concurrently and never retries.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Look up definitions for a single word.
    async fn definitions(&self, word: &str) -> Result<String, LookupError>;

    /// Look up synonyms for a single word.
    async fn synonyms(&self, word: &str) -> Result<String, LookupError>;
}
