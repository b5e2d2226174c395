//! Crawldash engine: HTTP transport and the async dashboard driving the core state machine.
mod api;
mod auth;
mod dashboard;
mod detail;
mod error;
mod persist;
mod poller;
mod transport;

pub use api::JobsApi;
pub use auth::{resolve_credential, Credential, CredentialSource, StaticCredentials, API_KEY_HEADER};
pub use dashboard::Dashboard;
pub use detail::DetailFetcher;
pub use error::{DashboardError, PersistError};
pub use persist::{read_if_exists, write_atomic};
pub use transport::{
    ApiRequest, HttpMethod, ReqwestTransport, Transport, TransportSettings, DEFAULT_BASE_URL,
};
