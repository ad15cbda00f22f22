//! Error types for the GitHub transport

use boardsync_core::TransportError;
use thiserror::Error;

/// Errors that can occur talking to the GitHub GraphQL API
#[derive(Error, Debug)]
pub enum GithubError {
    /// Connection, TLS or timeout failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-2xx response
    #[error("GitHub returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response carried a GraphQL `errors` array
    #[error("GraphQL errors: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    /// Body was not the JSON shape we asked for
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node the query addressed does not exist (or is not visible to the token)
    #[error("missing data: {0}")]
    MissingData(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Http(err.to_string())
    }
}

impl From<GithubError> for TransportError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Http(msg) => TransportError::Request(msg),
            GithubError::Status { status, body } => TransportError::Status { status, body },
            GithubError::GraphQl { messages } => TransportError::Api { messages },
            GithubError::Json(e) => TransportError::Decode(e.to_string()),
            GithubError::MissingData(what) => TransportError::NotFound(what),
        }
    }
}
