//! Error types for vocabulary card generation.

use thiserror::Error;

/// Errors raised while resolving providers, generating definitions and
/// talking to the host.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid definition: {0}")]
    ValidationError(String),

    #[error("Failed to parse model output: {0}")]
    ParseError(String),

    #[error("No object generated: {0}")]
    NoObjectGenerated(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Host error: {0}")]
    HostError(String),
}

impl ApiError {
    /// True for failures reported by a generation backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            ApiError::ProviderError(_)
                | ApiError::ProviderRequestFailed(_)
                | ApiError::ProviderAuthFailed(_)
                | ApiError::ProviderRateLimit(_)
                | ApiError::ProviderModelNotFound(_)
                | ApiError::NoObjectGenerated(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
