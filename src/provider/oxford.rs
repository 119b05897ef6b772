// ABOUTME: Oxford Dictionaries API client implementation.
// ABOUTME: Implements LookupProvider for definitions and synonyms over HTTP.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::LookupProvider;
use crate::config::OxfordConfig;
use crate::error::LookupError;

/// Maximum number of synonyms collected for one word.
pub const MAX_SYNONYMS: usize = 5;

/// Oxford API response body, reduced to the fields we read.
#[derive(Debug, Default, Deserialize)]
pub struct OxfordResponse {
    #[serde(default)]
    pub results: Vec<HeadwordEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadwordEntry {
    #[serde(default)]
    pub lexical_entries: Vec<LexicalEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LexicalEntry {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub senses: Vec<Sense>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sense {
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<Synonym>,
    #[serde(default)]
    pub subsenses: Vec<Sense>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Synonym {
    #[serde(default)]
    pub text: String,
}

impl OxfordResponse {
    /// Senses in document order. Subsenses are not included.
    fn senses(&self) -> impl Iterator<Item = &Sense> {
        self.results
            .iter()
            .flat_map(|r| &r.lexical_entries)
            .flat_map(|l| &l.entries)
            .flat_map(|e| &e.senses)
    }

    /// The first definition of the first sense (or subsense) that has one.
    pub fn first_definition(&self) -> String {
        self.senses()
            .flat_map(|sense| {
                sense
                    .definitions
                    .iter()
                    .chain(sense.subsenses.iter().flat_map(|sub| &sub.definitions))
            })
            .next()
            .cloned()
            .unwrap_or_default()
    }

    /// Up to [`MAX_SYNONYMS`] synonyms, deduplicated, sorted and joined.
    pub fn synonym_list(&self) -> String {
        let collected: BTreeSet<&str> = self
            .senses()
            .flat_map(|sense| {
                sense
                    .synonyms
                    .iter()
                    .chain(sense.subsenses.iter().flat_map(|sub| &sub.synonyms))
            })
            .map(|s| s.text.as_str())
            .filter(|text| !text.is_empty())
            .take(MAX_SYNONYMS)
            .collect();
        join_words(collected.into_iter())
    }
}

/// Join words as "a, b and c".
pub fn join_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let words: Vec<&str> = words.collect();
    match words.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// Client for the Oxford Dictionaries API.
#[derive(Debug, Clone)]
pub struct OxfordClient {
    config: OxfordConfig,
    http: reqwest::Client,
}

impl OxfordClient {
    /// Create a client from credentials and endpoint.
    pub fn new(config: OxfordConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from `OXFORD_*` environment variables.
    pub fn from_env() -> Result<Self, crate::error::ConfigError> {
        Ok(Self::new(OxfordConfig::from_env()?))
    }

    pub(crate) fn entry_url(&self, word: &str) -> String {
        format!(
            "{}/api/v1/entries/en/{}",
            self.config.endpoint,
            urlencoding::encode(word)
        )
    }

    /// Fetch an entry. `Ok(None)` means the API has no entry for the word.
    async fn fetch(&self, url: &str) -> Result<Option<OxfordResponse>, LookupError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .header("app_id", &self.config.app_id)
            .header("app_key", &self.config.app_key)
            .send()
            .await?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "oxford response");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await?;
            warn!(%url, status = status.as_u16(), "oxford request failed");
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[async_trait]
impl LookupProvider for OxfordClient {
    async fn definitions(&self, word: &str) -> Result<String, LookupError> {
        match self.fetch(&self.entry_url(word)).await? {
            Some(entry) => Ok(entry.first_definition()),
            None => Ok(format!("No definition for '{}'.", word)),
        }
    }

    async fn synonyms(&self, word: &str) -> Result<String, LookupError> {
        let url = format!("{}/synonyms", self.entry_url(word));
        match self.fetch(&url).await? {
            Some(entry) => Ok(entry.synonym_list()),
            None => Ok(format!("No synonyms for '{}'.", word)),
        }
    }
}
