// src/github/error.rs
// =============================================================================
// The one error kind a page section can fail with: FetchError.
//
// Every variant displays as the user-facing message. The caller picks that
// message ("Could not retrieve gists") when it makes the request, so whatever
// goes wrong underneath, the alert on the page reads the same.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Message used when the caller did not supply one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Error while fetching data from server";

#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { message: String, status: StatusCode },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not the JSON shape we expected.
    #[error("{message}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// GraphQL answered 200 but reported errors (or no data).
    #[error("{message}")]
    Api { message: String, errors: Vec<String> },

    /// The endpoint path could not be joined onto the API base URL.
    #[error("{message}")]
    InvalidUrl {
        message: String,
        #[source]
        source: url::ParseError,
    },

    #[error("A GitHub token is required to use the GraphQL API")]
    MissingToken,
}

impl FetchError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Resolves the message a failure should carry
pub(crate) fn message_or_default(message: Option<&str>) -> String {
    message.unwrap_or(DEFAULT_ERROR_MESSAGE).to_string()
}
