// ABOUTME: Scripted LookupProvider returning canned, delayed, failing or
// ABOUTME: never-completing answers. Records calls and abandoned lookups.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::LookupProvider;
use crate::error::LookupError;

#[derive(Debug, Clone)]
enum Outcome {
    Answer(String),
    Fail(String),
    Pending,
}

/// Scripted behavior for one sub-lookup.
#[derive(Debug, Clone)]
pub struct Script {
    outcome: Outcome,
    delay: Duration,
}

impl Script {
    /// Succeed with `text`.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Answer(text.into()),
            delay: Duration::ZERO,
        }
    }

    /// Fail with `message` as a [`LookupError::Failed`].
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail(message.into()),
            delay: Duration::ZERO,
        }
    }

    /// Never complete.
    pub fn pending() -> Self {
        Self {
            outcome: Outcome::Pending,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before producing the outcome.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Deterministic [`LookupProvider`] for tests and offline runs.
///
/// Every call plays the same script. A lookup whose future is dropped
/// before it produced its outcome counts as abandoned, which is how tests
/// observe that the coordinator cancelled it.
#[derive(Debug)]
pub struct ScriptedProvider {
    definitions: Script,
    synonyms: Script,
    calls: AtomicUsize,
    abandoned: AtomicUsize,
    words: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Create a provider with one script per sub-lookup.
    pub fn new(definitions: Script, synonyms: Script) -> Self {
        Self {
            definitions,
            synonyms,
            calls: AtomicUsize::new(0),
            abandoned: AtomicUsize::new(0),
            words: Mutex::new(Vec::new()),
        }
    }

    /// Total lookups started, across both methods.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups dropped before they finished.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Words received, in call order.
    pub fn words(&self) -> Vec<String> {
        self.words
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn play(&self, script: &Script, word: &str) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.words
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(word.to_string());

        let mut watch = AbandonWatch {
            abandoned: &self.abandoned,
            finished: false,
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        let outcome = match &script.outcome {
            Outcome::Answer(text) => Ok(text.clone()),
            Outcome::Fail(message) => Err(LookupError::Failed(message.clone())),
            Outcome::Pending => std::future::pending().await,
        };
        watch.finished = true;
        outcome
    }
}

#[async_trait]
impl LookupProvider for ScriptedProvider {
    async fn definitions(&self, word: &str) -> Result<String, LookupError> {
        self.play(&self.definitions, word).await
    }

    async fn synonyms(&self, word: &str) -> Result<String, LookupError> {
        self.play(&self.synonyms, word).await
    }
}

struct AbandonWatch<'a> {
    abandoned: &'a AtomicUsize,
    finished: bool,
}

impl Drop for AbandonWatch<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}
