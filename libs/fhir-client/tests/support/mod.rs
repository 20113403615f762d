pub mod fixtures;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use ehr_client::{Credentials, EhrService, FhirClient};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub use fixtures::*;

/// FHIR base path served by the mock
pub const FHIR_BASE: &str = "/fhir";

/// A request as the mock server received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Path plus query, e.g. `/fhir/Observation?patient=42`
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> anyhow::Result<Value> {
        serde_json::from_slice(&self.body).context("request body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
enum MockBody {
    Fixed(String),
    /// Answer with the request body, `id` set to the given value
    EchoWithId(String),
}

/// A canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: MockBody,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/fhir+json".to_string())],
            body: MockBody::Fixed(body.to_string()),
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: MockBody::Fixed(body.to_string()),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::text(status, "")
    }

    pub fn echo_with_id(status: StatusCode, id: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/fhir+json".to_string())],
            body: MockBody::EchoWithId(id.to_string()),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn render(&self, request_body: &Bytes) -> Response {
        let body = match &self.body {
            MockBody::Fixed(body) => body.clone(),
            MockBody::EchoWithId(id) => {
                let mut value: Value =
                    serde_json::from_slice(request_body).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut value {
                    map.insert("id".to_string(), Value::String(id.clone()));
                }
                value.to_string()
            }
        };

        let mut response = (self.status, Body::from(body)).into_response();
        for (name, value) in &self.headers {
            response.headers_mut().insert(
                HeaderName::from_bytes(name.as_bytes()).expect("valid header name"),
                HeaderValue::from_str(value).expect("valid header value"),
            );
        }
        response
    }
}

struct Route {
    method: Method,
    path: String,
    response: MockResponse,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process FHIR server on an ephemeral port.
///
/// Routes match on method and path (query ignored); the most recently
/// registered route wins. Unmatched requests get a 404 OperationOutcome.
pub struct MockFhirServer {
    origin: String,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockFhirServer {
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .fallback(handle_request)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock FHIR server")?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            origin: format!("http://{addr}"),
            state,
            handle,
        })
    }

    /// `http://127.0.0.1:<port>/fhir`
    pub fn base_url(&self) -> String {
        format!("{}{}", self.origin, FHIR_BASE)
    }

    /// Absolute URL for a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Register a response for `method` on a path relative to the FHIR base
    pub fn on(&self, method: Method, path: &str, response: MockResponse) {
        self.on_absolute(method, &format!("{FHIR_BASE}{path}"), response);
    }

    /// Register a response for `method` on an absolute server path
    pub fn on_absolute(&self, method: Method, path: &str, response: MockResponse) {
        self.state.routes.lock().expect("routes lock").push(Route {
            method,
            path: path.to_string(),
            response,
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("requests lock").len()
    }

    /// The only request received so far
    pub fn single_request(&self) -> anyhow::Result<RecordedRequest> {
        let requests = self.requests();
        anyhow::ensure!(
            requests.len() == 1,
            "expected exactly one request, got {}",
            requests.len()
        );
        Ok(requests[0].clone())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.base_url())
    }

    pub fn client(&self) -> anyhow::Result<FhirClient> {
        Ok(FhirClient::new(self.credentials())?)
    }

    pub fn service(&self) -> anyhow::Result<EhrService> {
        Ok(EhrService::new(self.client()?))
    }
}

impl Drop for MockFhirServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().expect("requests lock").push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.clone(),
    });

    let routes = state.routes.lock().expect("routes lock");
    match routes
        .iter()
        .rev()
        .find(|r| r.method == method && r.path == path)
    {
        Some(route) => route.response.render(&body),
        None => MockResponse::json(StatusCode::NOT_FOUND, &operation_outcome("not-found", &path))
            .render(&body),
    }
}

/// Base URL of a port with nothing listening on it
pub fn unreachable_base_url() -> anyhow::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}{FHIR_BASE}"))
}
