// ABOUTME: Configuration for the request coordinator and the Oxford provider.
// ABOUTME: Values come from serde defaults or environment variables.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Number of sub-lookups dispatched per request (definitions and synonyms).
pub const SUB_LOOKUP_COUNT: usize = 2;

/// Default Oxford Dictionaries API endpoint.
pub const OXFORD_DEFAULT_ENDPOINT: &str = "https://od-api.oxforddictionaries.com";

/// Settings consumed by [`RequestCoordinator`](crate::coordinator::RequestCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoordinatorConfig {
    /// Global ceiling on admitted requests per window.
    #[serde(default = "default_max_requests_per_window")]
    pub max_requests_per_window: usize,

    /// Length of the admission window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Delay each sub-lookup by `window / max_requests_per_window`.
    #[serde(default)]
    pub paced_dispatch: bool,
}

fn default_max_requests_per_window() -> usize {
    60
}

fn default_window_ms() -> u64 {
    60_000
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: default_max_requests_per_window(),
            window_ms: default_window_ms(),
            paced_dispatch: false,
        }
    }
}

impl CoordinatorConfig {
    /// Create a config with the given ceiling and the default one-minute window.
    pub fn new(max_requests_per_window: usize) -> Self {
        Self {
            max_requests_per_window,
            ..Self::default()
        }
    }

    /// Set the window length.
    pub fn window(mut self, window: Duration) -> Self {
        self.window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable or disable paced dispatch.
    pub fn paced_dispatch(mut self, enabled: bool) -> Self {
        self.paced_dispatch = enabled;
        self
    }

    /// The admission window as a Duration.
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Delay applied before each sub-lookup.
    pub fn dispatch_spacing(&self) -> Duration {
        if !self.paced_dispatch || self.max_requests_per_window == 0 {
            return Duration::ZERO;
        }
        self.window_duration() / self.max_requests_per_window as u32
    }

    /// Reject settings the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests_per_window == 0 {
            return Err(ConfigError::Invalid {
                key: "max_requests_per_window".to_string(),
                value: "0".to_string(),
            });
        }
        if u32::try_from(self.max_requests_per_window).is_err() {
            return Err(ConfigError::Invalid {
                key: "max_requests_per_window".to_string(),
                value: self.max_requests_per_window.to_string(),
            });
        }
        if self.window_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "window_ms".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Load from `DICTBOT_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = get("DICTBOT_MAX_PER_WINDOW") {
            config.max_requests_per_window = parse_var("DICTBOT_MAX_PER_WINDOW", &value)?;
        }
        if let Some(value) = get("DICTBOT_WINDOW_MS") {
            config.window_ms = parse_var("DICTBOT_WINDOW_MS", &value)?;
        }
        if let Some(value) = get("DICTBOT_PACED_DISPATCH") {
            config.paced_dispatch = parse_flag("DICTBOT_PACED_DISPATCH", &value)?;
        }
        config.validate()?;
        debug!(?config, "coordinator config loaded");
        Ok(config)
    }
}

/// Credentials and endpoint for the Oxford Dictionaries API.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct OxfordConfig {
    pub app_id: String,
    pub app_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    OXFORD_DEFAULT_ENDPOINT.to_string()
}

// Keeps the key out of logs.
impl std::fmt::Debug for OxfordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OxfordConfig")
            .field("app_id", &self.app_id)
            .field("app_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl OxfordConfig {
    /// Load from `OXFORD_API_ID`, `OXFORD_API_KEY` and optional `OXFORD_ENDPOINT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));
        let endpoint = get("OXFORD_ENDPOINT")
            .map(|e| e.trim_end_matches('/').to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(default_endpoint);

        Ok(Self {
            app_id: required("OXFORD_API_ID")?,
            app_key: required("OXFORD_API_KEY")?,
            endpoint,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_coordinator_defaults() {
        let config = CoordinatorConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.window_duration(), Duration::from_secs(60));
        assert_eq!(config.dispatch_spacing(), Duration::ZERO);
    }

    #[test]
    fn test_coordinator_from_vars() {
        let config = CoordinatorConfig::from_vars(vars(&[
            ("DICTBOT_MAX_PER_WINDOW", "30"),
            ("DICTBOT_WINDOW_MS", "10000"),
            ("DICTBOT_PACED_DISPATCH", "true"),
        ]))
        .unwrap();

        assert_eq!(config.max_requests_per_window, 30);
        assert_eq!(config.window_ms, 10_000);
        assert!(config.paced_dispatch);
    }

    #[test]
    fn test_dispatch_spacing_spreads_window() {
        let config = CoordinatorConfig::new(60).paced_dispatch(true);
        assert_eq!(config.dispatch_spacing(), Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_zero_ceiling() {
        let err = CoordinatorConfig::from_vars(vars(&[("DICTBOT_MAX_PER_WINDOW", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "max_requests_per_window"));
    }

    #[test]
    fn test_rejects_garbage_number() {
        let err = CoordinatorConfig::from_vars(vars(&[("DICTBOT_WINDOW_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("DICTBOT_WINDOW_MS"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: CoordinatorConfig =
            serde_json::from_str(r#"{"max_requests_per_window": 5}"#).unwrap();
        assert_eq!(config.max_requests_per_window, 5);
        assert_eq!(config.window_ms, 60_000);
        assert!(!config.paced_dispatch);
    }

    #[test]
    fn test_oxford_requires_credentials() {
        let err = OxfordConfig::from_vars(vars(&[("OXFORD_API_ID", "id")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref key) if key == "OXFORD_API_KEY"));
    }

    #[test]
    fn test_oxford_endpoint_override() {
        let config = OxfordConfig::from_vars(vars(&[
            ("OXFORD_API_ID", "id"),
            ("OXFORD_API_KEY", "s3cret"),
            ("OXFORD_ENDPOINT", "http://localhost:8080/"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "http://localhost:8080");
        assert!(!format!("{:?}", config).contains("s3cret"));
    }

    #[test]
    fn test_oxford_default_endpoint() {
        let config = OxfordConfig::from_vars(vars(&[
            ("OXFORD_API_ID", "id"),
            ("OXFORD_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, OXFORD_DEFAULT_ENDPOINT);
    }
}
