//! Error types for the resolution pipeline.

use thiserror::Error;

/// Errors that can occur while talking to remote sources or writing
/// resolved results.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// An HTTP request to an external source returned a failure status.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The external source returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The requested entity was not found at the external source.
    #[error("not found: {entity} at {source_name}")]
    NotFound { entity: String, source_name: String },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A configured endpoint is not a usable URL.
    #[error("invalid endpoint URL: {0}")]
    Endpoint(String),

    /// A batch run in which not a single name resolved.
    #[error("no records resolved from {attempted} name(s)")]
    EmptyBatch { attempted: usize },

    /// A resolved media file has no download URL.
    #[error("image info for {title} has no download URL")]
    MissingDownloadUrl { title: String },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the record store or asset catalog.
    #[error("catalog error: {0}")]
    Catalog(#[from] alpenflora_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnrichError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::RateLimited { .. } => true,
            Self::Request(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            _ => false,
        }
    }

    /// Returns `true` when the error indicates the entity was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias for pipeline results.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let http = EnrichError::Http {
            source_name: "Wikidata".to_string(),
            message: "502 Bad Gateway".to_string(),
        };
        assert!(http.is_transient());
        assert!(!http.is_not_found());

        let missing = EnrichError::NotFound {
            entity: "Q1".to_string(),
            source_name: "Wikidata".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());

        let parse = EnrichError::Parse {
            source_name: "Commons".to_string(),
            message: "expected value".to_string(),
        };
        assert!(!parse.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = EnrichError::RateLimited {
            source_name: "Commons".to_string(),
        };
        assert_eq!(err.to_string(), "rate limited by Commons");
    }
}
