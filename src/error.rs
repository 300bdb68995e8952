// Error types shared by the gateway, the credential provider and the
// command handlers. Remote failures are typed so the loop can tell an
// expired secret from a missing container without string matching.

use std::fmt;
use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by the identity endpoint or the storage API.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed with {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Classify a non-success HTTP response. `body` is the raw response text;
    /// the known Graph and identity error shapes are summarised.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = summarize_error_body(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                GatewayError::Auth(format!("{} - {}", status, message))
            }
            StatusCode::NOT_FOUND => GatewayError::NotFound(message),
            _ => GatewayError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

/// Pull a readable message out of an error payload.
///
/// Graph answers `{"error": {"code": .., "message": ..}}`, the identity
/// endpoint answers `{"error": "..", "error_description": ".."}`. Anything
/// else is returned as-is.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.to_string();
    };
    match value.get("error") {
        Some(serde_json::Value::Object(inner)) => {
            let code = inner.get("code").and_then(|c| c.as_str()).unwrap_or("error");
            let message = inner.get("message").and_then(|m| m.as_str()).unwrap_or("");
            format!("{}: {}", code, message)
        }
        Some(serde_json::Value::String(code)) => {
            match value.get("error_description").and_then(|d| d.as_str()) {
                Some(description) => format!("{}: {}", code, description),
                None => code.clone(),
            }
        }
        _ => trimmed.to_string(),
    }
}

/// Why a command refused to run. Printed to the user; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NoToken,
    TokenExpired,
    NoContainer,
    NoDocument,
    /// The listing used for a selection came back empty.
    NothingToSelect(&'static str),
    InvalidSelection,
    MissingInput(&'static str),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoToken => write!(f, "Please acquire an access token first (Option 1)."),
            Rejection::TokenExpired => {
                write!(f, "The access token has expired. Acquire a new one (Option 1).")
            }
            Rejection::NoContainer => write!(f, "Please set an active container first (Option 4)."),
            Rejection::NoDocument => write!(f, "Please set an active document first (Option 8)."),
            Rejection::NothingToSelect(kind) => write!(f, "No {} available to set as active.", kind),
            Rejection::InvalidSelection => write!(f, "Invalid selection. Please try again."),
            Rejection::MissingInput(field) => write!(f, "No {} given, nothing to do.", field),
        }
    }
}

/// Everything that can stop a single command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Rejected(Rejection),

    #[error(transparent)]
    Remote(#[from] GatewayError),

    #[error("could not read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from the terminal failed; no further input can arrive.
    #[error("console error: {0}")]
    Console(#[source] io::Error),
}

impl From<Rejection> for CommandError {
    fn from(rejection: Rejection) -> Self {
        CommandError::Rejected(rejection)
    }
}
