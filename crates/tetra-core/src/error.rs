//! Error types for the Tetra system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for Tetra operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Tetra system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (raised before any network access)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A candidate record set broke a structural invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Name resolution failed while flattening an apex CNAME
    #[error("Resolve error: {0}")]
    Resolve(String),

    /// Local I/O errors (config files, secret files, exec sources)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a resolve error
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised before any provider was contacted
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Yaml(_) | Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = Error::provider("cloudflare", "zone lookup failed");
        assert_eq!(
            err.to_string(),
            "Provider error (cloudflare): zone lookup failed"
        );
    }

    #[test]
    fn test_config_classification() {
        assert!(Error::config("bad zone").is_config());
        assert!(Error::validation("duplicate CNAME").is_config());
        assert!(!Error::http("timeout").is_config());
    }
}
