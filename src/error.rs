//! Error types shared by the library and both binaries.
//!
//! `Error` is what every library operation returns. Transport problems talking
//! to the GitHub API are captured separately as `ApiError` and attached as the
//! source of `Error::Auth` or `Error::Api`, so the binaries can print the whole
//! chain after the `[ERROR]` prefix.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or contradictory options. Raised before any I/O happens.
    #[error("{0}")]
    Config(String),

    #[error("fail to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fail to decode credential file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("fail to encode credential")]
    Encode(#[source] serde_json::Error),

    #[error("{login} is not found in installations")]
    NotFound { login: String },

    /// Building the signed client or minting a token failed.
    #[error("{context}")]
    Auth {
        context: &'static str,
        #[source]
        source: ApiError,
    },

    /// Any other GitHub API call failed (installation listing).
    #[error("{context}")]
    Api {
        context: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("input text is invalid: input line={0}")]
    InvalidInput(String),
}

/// Failures below the orchestration layer: key handling, HTTP, API status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("cannot read private key {}", path.display())]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JWT signing failed")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid API base URL {0}")]
    BaseUrl(String),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
