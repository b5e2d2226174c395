use std::sync::Arc;
use std::time::Duration;

use crawldash_core::{FailureKind, RequestError};
use crawldash_logging::dash_trace;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{resolve_credential, CredentialSource};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api";

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TransportSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One call against the crawl service, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(path)
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            ..Self::get(path)
        }
    }

    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests and hands back the decoded JSON payload.
///
/// An empty success body decodes to `Value::Null`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    credentials: Arc<dyn CredentialSource>,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(
        settings: TransportSettings,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            credentials,
            client,
        })
    }

    fn endpoint(&self, request: &ApiRequest) -> Result<reqwest::Url, RequestError> {
        let raw = format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<String>,
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let url = self.endpoint(&request)?;
        dash_trace!("{:?} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        builder = resolve_credential(self.credentials.as_ref()).apply(builder);
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let server_message = serde_json::from_slice::<ErrorPayload>(&bytes)
                .ok()
                .and_then(|payload| payload.error);
            return Err(RequestError::from_status(status.as_u16(), server_message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|err| {
            RequestError::new(FailureKind::Decode, format!("malformed response: {err}"))
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, format!("request failed: {err}"));
    }
    RequestError::new(FailureKind::Network, format!("request failed: {err}"))
}
