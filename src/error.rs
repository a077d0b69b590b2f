use crate::validation::ValidationError;

/// Errors from resolving an identifier against the remote catalogue.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("{0} is not a valid Open Library olid")]
    InvalidIdentifier(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url:    String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Record not found at {url}")]
    NotFound { url: String },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url:    String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {url} is not a JSON object")]
    NotAnObject { url: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl FetchError {
    /// True when the identifier was rejected before any request was made.
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }
}
