//! Credential resolution for outbound requests.
//!
//! Credentials are owned by the session layer; this module only reads them.

/// Read-only access to whatever credentials the session currently holds.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
    fn api_key(&self) -> Option<String>;
}

/// The credential attached to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
    Anonymous,
}

/// Picks the credential for the next request.
///
/// A session bearer token wins over a standing API key. With neither, the
/// request goes out unauthenticated and the server decides. Blank values
/// count as absent.
pub fn resolve_credential(source: &dyn CredentialSource) -> Credential {
    if let Some(token) = source.bearer_token().filter(|t| !t.trim().is_empty()) {
        return Credential::Bearer(token);
    }
    if let Some(key) = source.api_key().filter(|k| !k.trim().is_empty()) {
        return Credential::ApiKey(key);
    }
    Credential::Anonymous
}

impl Credential {
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Credential::Anonymous => request,
        }
    }
}

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Fixed credentials, e.g. from the environment or command line.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
    api_key: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>, api_key: Option<String>) -> Self {
        Self { token, api_key }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialSource for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }
}
