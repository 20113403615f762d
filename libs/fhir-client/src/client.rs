//! Authenticated FHIR REST client

use crate::credentials::{ClientOptions, Credentials};
use crate::error::{Error, Result};
use crate::search::SearchParams;
use crate::smart::{
    authorization_code_form, client_credentials_form, ConnectionStatus, SmartConfiguration,
    TokenResponse,
};
use ehr_models::{Bundle, CapabilityStatement, FhirResource, ResourceType};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

pub const FHIR_JSON: &str = "application/fhir+json";
const PLAIN_JSON: &str = "application/json";

/// Client for one FHIR server.
///
/// Stateless between calls except for the bearer token, which starts as the
/// configured `access_token` and is replaced by a successful token exchange.
/// Concurrent exchanges on one instance race; the last write wins. Build one
/// client per authentication context when that matters.
pub struct FhirClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    access_token: RwLock<Option<String>>,
}

/// Raw outcome of a successful (2xx) exchange
struct RawResponse {
    headers: HeaderMap,
    body: Vec<u8>,
}

impl FhirClient {
    /// Create a client with default options. No network call is made.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_options(credentials, ClientOptions::default())
    }

    pub fn with_options(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        credentials.validate()?;

        let trimmed = credentials.base_url.trim();
        let base_url = trimmed.strip_suffix('/').unwrap_or(trimmed).to_string();

        let http = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token: RwLock::new(credentials.access_token.clone()),
            credentials,
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Bearer token currently attached to requests
    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// `GET [base]/[type]/[id]`
    pub async fn read<R: FhirResource>(&self, id: &str) -> Result<R> {
        let url = self.resource_url(R::RESOURCE_TYPE, Some(id));
        let raw = self.send(self.fhir_request(Method::GET, &url).await).await?;
        let value: Value = serde_json::from_slice(&raw.body)?;
        Ok(R::from_value(value)?)
    }

    /// `GET [base]/[type]?params`
    pub async fn search<R: FhirResource>(&self, params: &SearchParams) -> Result<Bundle> {
        let mut url = self.resource_url(R::RESOURCE_TYPE, None);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string());
        }
        let raw = self.send(self.fhir_request(Method::GET, &url).await).await?;
        parse_json(&raw.body)
    }

    /// Search and decode the matching entries, in bundle order.
    ///
    /// An entry that does not decode is logged and left out; the rest of the
    /// page is still returned.
    pub async fn search_resources<R: FhirResource>(&self, params: &SearchParams) -> Result<Vec<R>> {
        let bundle = self.search::<R>(params).await?;
        let (resources, failed) = bundle.resources_lenient::<R>();
        for (id, err) in &failed {
            tracing::warn!(
                resource_type = %R::RESOURCE_TYPE,
                id = id.as_deref().unwrap_or("-"),
                error = %err,
                "Skipping search entry that failed to decode"
            );
        }
        Ok(resources)
    }

    /// `POST [base]/[type]`, returning the stored resource
    pub async fn create<R: FhirResource>(&self, resource: &R) -> Result<R> {
        let url = self.resource_url(R::RESOURCE_TYPE, None);
        let body = resource.to_value()?;
        let request = self.fhir_request(Method::POST, &url).await.json(&body);
        let raw = self.send(request).await?;
        self.stored_resource(raw, body, None)
    }

    /// `PUT [base]/[type]/[id]`; the body's `id` is forced to `id`
    pub async fn update<R: FhirResource>(&self, id: &str, resource: &R) -> Result<R> {
        let url = self.resource_url(R::RESOURCE_TYPE, Some(id));
        let mut body = resource.to_value()?;
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        let request = self.fhir_request(Method::PUT, &url).await.json(&body);
        let raw = self.send(request).await?;
        self.stored_resource(raw, body, Some(id))
    }

    /// `DELETE [base]/[type]/[id]`
    pub async fn delete<R: FhirResource>(&self, id: &str) -> Result<()> {
        let url = self.resource_url(R::RESOURCE_TYPE, Some(id));
        self.send(self.fhir_request(Method::DELETE, &url).await)
            .await?;
        Ok(())
    }

    /// `GET [base]/metadata`, authenticated
    pub async fn capability_statement(&self) -> Result<CapabilityStatement> {
        let url = format!("{}/metadata", self.base_url);
        let raw = self.send(self.fhir_request(Method::GET, &url).await).await?;
        let value: Value = serde_json::from_slice(&raw.body)?;
        Ok(CapabilityStatement::from_value(value)?)
    }

    /// `GET [base]/.well-known/smart-configuration`, unauthenticated
    pub async fn smart_configuration(&self) -> Result<SmartConfiguration> {
        let url = format!("{}/.well-known/smart-configuration", self.base_url);
        let request = self.http.get(&url).header(ACCEPT, PLAIN_JSON);
        let raw = self.send(request).await?;
        parse_json(&raw.body)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The token endpoint is discovered through the SMART configuration; a
    /// configuration without one is an error. On success the returned token
    /// replaces the bearer token used by this client.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse> {
        let token_endpoint = self.discover_token_endpoint().await?;

        let form = authorization_code_form(
            code,
            redirect_uri,
            self.credentials.client_id.as_deref(),
            self.credentials.client_secret.as_deref(),
            code_verifier,
        );

        self.request_token(&token_endpoint, &form).await
    }

    /// Obtain a token with the `client_credentials` grant using the
    /// configured client id and secret.
    pub async fn request_client_credentials_token(
        &self,
        scope: Option<&str>,
    ) -> Result<TokenResponse> {
        let (Some(client_id), Some(secret)) = (
            self.credentials.client_id.as_deref(),
            self.credentials.client_secret.as_deref(),
        ) else {
            return Err(Error::Config(
                "client_credentials grant requires a client id and secret".to_string(),
            ));
        };

        let token_endpoint = self.discover_token_endpoint().await?;
        let form = client_credentials_form(client_id, secret, scope);
        self.request_token(&token_endpoint, &form).await
    }

    /// Check connectivity and summarise the CapabilityStatement
    pub async fn test_connection(&self) -> Result<ConnectionStatus> {
        let statement = self.capability_statement().await?;
        Ok(ConnectionStatus {
            status: "connected".to_string(),
            server: statement
                .software
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            version: statement
                .fhir_version
                .unwrap_or_else(|| "Unknown".to_string()),
        })
    }

    async fn discover_token_endpoint(&self) -> Result<String> {
        let config = self.smart_configuration().await?;
        config.token_endpoint().map(str::to_string).ok_or_else(|| {
            Error::Smart(
                "SMART configuration does not advertise a token_endpoint".to_string(),
            )
        })
    }

    async fn request_token(
        &self,
        token_endpoint: &str,
        form: &[(&'static str, String)],
    ) -> Result<TokenResponse> {
        let request = self
            .http
            .post(token_endpoint)
            .header(ACCEPT, PLAIN_JSON)
            .form(form);
        let raw = self.send(request).await?;
        let token: TokenResponse = parse_json(&raw.body)?;

        *self.access_token.write().await = Some(token.access_token.clone());
        tracing::info!(
            token_type = %token.token_type,
            expires_in = ?token.expires_in,
            "Obtained FHIR access token"
        );

        Ok(token)
    }

    fn resource_url(&self, resource_type: ResourceType, id: Option<&str>) -> String {
        match id {
            Some(id) => format!(
                "{}/{}/{}",
                self.base_url,
                resource_type,
                urlencoding::encode(id)
            ),
            None => format!("{}/{}", self.base_url, resource_type),
        }
    }

    async fn fhir_request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, FHIR_JSON)
            .header(CONTENT_TYPE, FHIR_JSON);

        if let Some(token) = self.access_token.read().await.as_deref() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "FHIR request could not be sent");
            Error::Transport(e)
        })?;

        let status = response.status();
        let url = response.url().clone();
        tracing::debug!(status = status.as_u16(), url = %url, "FHIR response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), url = %url, "FHIR request failed");
            return Err(http_error(status, body));
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { headers, body })
    }

    /// Decode the server's copy of a created/updated resource. Servers that
    /// answer with an empty body get the submitted resource back, with the id
    /// taken from `Location` when one was not already known.
    fn stored_resource<R: FhirResource>(
        &self,
        raw: RawResponse,
        mut submitted: Value,
        known_id: Option<&str>,
    ) -> Result<R> {
        if !raw.body.iter().all(u8::is_ascii_whitespace) {
            let value: Value = serde_json::from_slice(&raw.body)?;
            return Ok(R::from_value(value)?);
        }

        let id = known_id.map(str::to_string).or_else(|| {
            raw.headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| id_from_location(loc, R::RESOURCE_TYPE))
        });
        if let (Some(id), Value::Object(map)) = (id, &mut submitted) {
            map.insert("id".to_string(), Value::String(id));
        }
        Ok(R::from_value(submitted)?)
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(Error::from)
}

fn http_error(status: StatusCode, body: String) -> Error {
    Error::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
        body,
    }
}

/// `[base]/Patient/123/_history/1` -> `123`
fn id_from_location(location: &str, resource_type: ResourceType) -> Option<String> {
    let mut segments = location.split('/');
    segments.find(|s| *s == resource_type.as_str())?;
    segments
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
