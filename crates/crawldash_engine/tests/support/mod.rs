#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use crawldash_engine::{Dashboard, StaticCredentials, TransportSettings};
use serde_json::{json, Value};
use wiremock::MockServer;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawldash_logging::initialize_for_tests);
}

pub fn settings(server: &MockServer) -> TransportSettings {
    TransportSettings::with_base_url(format!("{}/api", server.uri()))
}

pub fn dashboard(server: &MockServer, poll_interval: Duration) -> Dashboard {
    Dashboard::connect(
        settings(server),
        Arc::new(StaticCredentials::new(Some("tok".into()), None)),
        poll_interval,
    )
    .expect("dashboard")
}

pub fn job_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "url": format!("https://site{id}.example"),
        "status": status,
    })
}

pub fn page_json(jobs: &[(u64, &str)], total: u64) -> Value {
    let jobs: Vec<Value> = jobs.iter().map(|(id, status)| job_json(*id, status)).collect();
    json!({
        "jobs": jobs,
        "total": total,
        "page": 1,
        "limit": 10,
    })
}

pub async fn list_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == "GET" && request.url.path() == "/api/urls")
        .count()
}
