// ABOUTME: Concurrent fan-out of the definitions and synonyms lookups.
// ABOUTME: Joins both results or returns the first failure, aborting the sibling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use super::user_gate::UserGate;
use crate::error::{CoordinatorError, LookupError};
use crate::provider::LookupProvider;

/// Combined answer of one coordinated request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FanOutResult {
    /// Outcome of the definitions lookup.
    pub definitions: String,
    /// Outcome of the synonyms lookup.
    pub synonyms: String,
}

/// The independent sub-lookups of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Definitions,
    Synonyms,
}

impl Lookup {
    async fn run(self, provider: &dyn LookupProvider, word: &str) -> Result<String, LookupError> {
        match self {
            Lookup::Definitions => provider.definitions(word).await,
            Lookup::Synonyms => provider.synonyms(word).await,
        }
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Definitions => write!(f, "definitions"),
            Lookup::Synonyms => write!(f, "synonyms"),
        }
    }
}

type Outcome = Result<String, LookupError>;

/// Runs both sub-lookups of a request concurrently.
pub(crate) struct FanOut {
    provider: Arc<dyn LookupProvider>,
    spacing: Duration,
}

impl FanOut {
    pub(crate) fn new(provider: Arc<dyn LookupProvider>, spacing: Duration) -> Self {
        Self { provider, spacing }
    }

    /// Look up `word` for `user`, whose gate must already be claimed.
    ///
    /// On success every sub-lookup has been marked complete on the gate, so it
    /// is idle again. On failure the gate is forced idle before returning and
    /// the sibling lookup is cancelled.
    pub(crate) async fn run(
        &self,
        gate: &UserGate,
        user: &str,
        word: &str,
    ) -> Result<FanOutResult, CoordinatorError> {
        let cancel = CancellationToken::new();
        // Aborts both lookups if this future is dropped before they finish.
        let _abort = cancel.clone().drop_guard();

        let mut definitions_rx = self.dispatch(Lookup::Definitions, word, cancel.child_token());
        let mut synonyms_rx = self.dispatch(Lookup::Synonyms, word, cancel.child_token());

        let mut definitions: Option<String> = None;
        let mut synonyms: Option<String> = None;

        loop {
            let (lookup, received) = tokio::select! {
                received = &mut definitions_rx, if definitions.is_none() => (Lookup::Definitions, received),
                received = &mut synonyms_rx, if synonyms.is_none() => (Lookup::Synonyms, received),
                else => break,
            };

            match received.unwrap_or(Err(LookupError::Abandoned)) {
                Ok(answer) => {
                    match lookup {
                        Lookup::Definitions => definitions = Some(answer),
                        Lookup::Synonyms => synonyms = Some(answer),
                    }
                    let remaining = gate.mark_sub_completion(user);
                    debug!(%lookup, remaining, "sub-lookup completed");
                    if remaining == 0 {
                        break;
                    }
                }
                Err(err) => {
                    gate.force_idle(user);
                    cancel.cancel();
                    warn!(%lookup, error = %err, "sub-lookup failed");
                    return Err(CoordinatorError::Downstream(err));
                }
            }
        }

        Ok(FanOutResult {
            definitions: definitions.unwrap_or_default(),
            synonyms: synonyms.unwrap_or_default(),
        })
    }

    fn dispatch(
        &self,
        lookup: Lookup,
        word: &str,
        cancel: CancellationToken,
    ) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        let provider = Arc::clone(&self.provider);
        let word = word.to_string();
        let spacing = self.spacing;
        let span = tracing::debug_span!("lookup", %lookup);

        tokio::spawn(
            async move {
                let outcome = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(LookupError::Cancelled),
                    outcome = async {
                        if !spacing.is_zero() {
                            tokio::time::sleep(spacing).await;
                        }
                        lookup.run(provider.as_ref(), &word).await
                    } => outcome,
                };
                // The receiver is gone once the request has already finished.
                let _ = tx.send(outcome);
            }
            .instrument(span),
        );

        rx
    }
}
