use std::time::Duration;

use thiserror::Error;

/// Failure surfaced to the caller of `DocumentAnalyzer::analyze`.
///
/// Only input validation ends up here. Everything that goes wrong after
/// validation degrades to a fallback value instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Invalid document: {reason}")]
    Validation { reason: String },
}

/// Failure of a single call to the text-generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation service returned status {status}")]
    UpstreamError { status: u16 },

    #[error("Generation service returned a malformed response: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("Generation request failed: {0}")]
    Transport(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Missing API key for {provider_name}: {env_var} environment variable is not set")]
    MissingApiKey {
        provider_name: String,
        env_var: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
