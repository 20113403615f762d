//! Credentials and their resolution from request headers and environment.
//!
//! Resolution is a pure function of its inputs: callers pass the request
//! headers and a snapshot of the environment instead of the client reading
//! process-wide state during request handling.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const HEADER_BASE_URL: &str = "x-fhir-base-url";
pub const HEADER_CLIENT_ID: &str = "x-fhir-client-id";
pub const HEADER_CLIENT_SECRET: &str = "x-fhir-client-secret";
pub const HEADER_ACCESS_TOKEN: &str = "x-fhir-access-token";

pub const ENV_BASE_URL: &str = "FHIR_BASE_URL";
pub const ENV_CLIENT_ID: &str = "FHIR_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "FHIR_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "FHIR_ACCESS_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection details for one FHIR server.
///
/// Either `access_token` or `client_id` + `client_secret` should be present
/// for authenticated calls; this is not enforced here, whatever is present is
/// sent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>, secret: Option<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = secret;
        self
    }

    /// Base URL must be non-empty and start with `http`
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::Config("FHIR base URL is required".to_string()));
        }
        if !base_url.starts_with("http") {
            return Err(Error::Config(format!(
                "FHIR base URL must start with http: {base_url}"
            )));
        }
        Ok(())
    }

    /// Whether a client id/secret pair is available for token exchange
    pub fn has_client_secret(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Transport tuning for [`crate::FhirClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout; a hung server fails the call after this long
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("ehr-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Resolve credentials for one request.
///
/// Each field is taken from the request headers first, then from `env`.
/// Blank values count as absent. For the access token an
/// `Authorization: Bearer <token>` header is accepted when
/// `x-fhir-access-token` is not set.
pub fn resolve_credentials(
    headers: &HeaderMap,
    env: &HashMap<String, String>,
) -> Result<Credentials> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(non_blank)
    };
    let var = |key: &str| env.get(key).and_then(|v| non_blank(v));

    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .and_then(non_blank);

    let credentials = Credentials {
        base_url: header(HEADER_BASE_URL)
            .or_else(|| var(ENV_BASE_URL))
            .unwrap_or_default(),
        client_id: header(HEADER_CLIENT_ID).or_else(|| var(ENV_CLIENT_ID)),
        client_secret: header(HEADER_CLIENT_SECRET).or_else(|| var(ENV_CLIENT_SECRET)),
        access_token: header(HEADER_ACCESS_TOKEN)
            .or(bearer)
            .or_else(|| var(ENV_ACCESS_TOKEN)),
    };

    credentials.validate()?;
    Ok(credentials)
}

/// Token of an `Authorization: Bearer <token>` value; the scheme is case-insensitive
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
