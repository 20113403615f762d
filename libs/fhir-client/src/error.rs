//! Error types for the FHIR client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a facade call and the FHIR server.
///
/// Only [`Error::Http`] carries a status code; see [`Error::status_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed credentials, raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {reason}{}", body_suffix(.body))]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// DNS, connect, TLS or timeout failure; the message includes its causes
    #[error("{}", with_causes(.0))]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// A required UI field was missing; no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// SMART discovery or token exchange failed
    #[error("SMART authorization error: {0}")]
    Smart(String),

    #[error("Model error: {0}")]
    Model(#[from] ehr_models::Error),
}

impl Error {
    /// HTTP status of a protocol error; `None` for every other kind
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// `outer: cause: root cause`, skipping causes already quoted by their parent
fn with_causes(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}
