use thiserror::Error;

/// Scorer failed for a single post. Recovered locally: the post is
/// annotated with an `error` field and the window is left untouched.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("scorer failed: {0}")]
    Failed(String),

    #[error("scorer returned an out-of-contract value: {0}")]
    InvalidValue(f64),
}

/// Source read or sink publish failed. Fatal to the driver loop;
/// restart policy belongs to the outer supervisor.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to receive from input channel: {0}")]
    Receive(#[source] std::io::Error),

    #[error("failed to publish to output channel: {0}")]
    Publish(#[source] std::io::Error),

    #[error("failed to encode outbound post: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Invalid configuration supplied at construction. Fails fast at
/// startup, before any post is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window_size must be greater than zero")]
    InvalidWindowSize,

    #[error("alert_threshold must be a non-negative finite number, got {0}")]
    InvalidAlertThreshold(f64),
}
