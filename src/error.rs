//! Error types for Everactive API operations.

use thiserror::Error;

/// Errors that can occur during Everactive API operations.
#[derive(Debug, Error)]
pub enum EveractiveError {
    /// A required credential could not be resolved.
    #[error("Everactive configuration required: {0}")]
    Configuration(String),

    /// The OAuth2 token fetch failed.
    #[error("Failed to authenticate against {url}: {reason}")]
    Authentication { url: String, reason: String },

    /// Network or connection failure, after connection retries ran out.
    #[error("Error requesting url {url}{}: {source}", page_suffix(.page))]
    Transport {
        url: String,
        page: Option<u32>,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("Everactive API error ({status}) for {url}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response from {url}{}: {reason}", page_suffix(.page))]
    UnexpectedResponse {
        url: String,
        page: Option<u32>,
        reason: String,
    },

    /// A caller-supplied argument was not recognized.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A reading record had an unexpected rail/load count shape.
    #[error("Failed to normalize reading: {0}")]
    Normalization(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

fn page_suffix(page: &Option<u32>) -> String {
    page.map(|p| format!(" (page {p})")).unwrap_or_default()
}

impl EveractiveError {
    /// Page number the failure happened on, for paginated requests.
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Transport { page, .. } | Self::UnexpectedResponse { page, .. } => *page,
            _ => None,
        }
    }

    /// URL of the failed request, when the failure was request-scoped.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Authentication { url, .. }
            | Self::Transport { url, .. }
            | Self::Api { url, .. }
            | Self::UnexpectedResponse { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Result type alias for Everactive operations.
pub type Result<T> = core::result::Result<T, EveractiveError>;
