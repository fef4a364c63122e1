use thiserror::Error;

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The dispatcher itself failed, as opposed to reporting an application error
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher call failed: {0}")]
    Invocation(String),

    #[error("malformed dispatcher response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// A channel frame could not be decoded
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed channel event: {0}")]
    Malformed(#[from] serde_json::Error),
}
