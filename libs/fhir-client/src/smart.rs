//! SMART on FHIR discovery and OAuth2 token documents.
//!
//! `<fhirBase>/.well-known/smart-configuration` advertises the authorization
//! server endpoints; the token endpoint answers with a [`TokenResponse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// SMART discovery document (the fields this client uses)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grant_types_supported: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes_supported: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl SmartConfiguration {
    /// The token endpoint, treating a blank value as absent
    pub fn token_endpoint(&self) -> Option<&str> {
        self.token_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// OAuth2 token endpoint response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// SMART launch context: patient in scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Result of a connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Always "connected" for a successful check
    pub status: String,
    pub server: String,
    pub version: String,
}

/// Form body for the `authorization_code` grant
pub(crate) fn authorization_code_form(
    code: &str,
    redirect_uri: &str,
    client_id: Option<&str>,
    client_secret: Option<&str>,
    code_verifier: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("grant_type", "authorization_code".to_string()),
        ("code", code.to_string()),
        ("redirect_uri", redirect_uri.to_string()),
    ];
    if let Some(id) = client_id {
        form.push(("client_id", id.to_string()));
    }
    if let Some(secret) = client_secret {
        form.push(("client_secret", secret.to_string()));
    }
    if let Some(verifier) = code_verifier {
        form.push(("code_verifier", verifier.to_string()));
    }
    form
}

/// Form body for the `client_credentials` grant
pub(crate) fn client_credentials_form(
    client_id: &str,
    client_secret: &str,
    scope: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("grant_type", "client_credentials".to_string()),
        ("client_id", client_id.to_string()),
        ("client_secret", client_secret.to_string()),
    ];
    if let Some(scope) = scope {
        form.push(("scope", scope.to_string()));
    }
    form
}
