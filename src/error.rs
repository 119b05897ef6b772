// ABOUTME: Defines all error types for the dictbot library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under DictError.

/// Top-level error type for the dictbot library.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Terminal failures of a coordinated request.
///
/// The display strings are shown to end users as-is.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error(
        "Sorry, we've reached the number of requests limit, please wait {retry_after_secs} seconds and try again."
    )]
    CapacityExceeded { retry_after_secs: u64 },

    #[error("You're too fast, please slow down.")]
    TooFast,

    #[error("There was error on the dictionary service: {0}")]
    Downstream(#[source] LookupError),
}

/// Errors from dictionary lookup providers.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),

    #[error("lookup cancelled")]
    Cancelled,

    #[error("lookup task ended without reporting a result")]
    Abandoned,
}

/// Errors from the reply delivery sink.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(String),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },
}
