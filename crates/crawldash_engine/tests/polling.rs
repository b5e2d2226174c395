mod support;

use std::time::Duration;

use crawldash_core::{JobStatus, Query};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{dashboard, init_logging, list_requests, page_json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAST: Duration = Duration::from_millis(80);

async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

async fn wait_for_requests(server: &MockServer, at_least: usize) -> bool {
    for _ in 0..100 {
        if list_requests(server).await >= at_least {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn polling_stops_once_every_job_is_terminal() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "running")], 1)))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "completed")], 1)))
        .mount(&server)
        .await;

    let dash = dashboard(&server, FAST);
    dash.list(Query::default()).await.unwrap();
    assert!(dash.is_polling());

    assert!(wait_until(|| !dash.is_polling()).await);
    assert_eq!(dash.jobs()[0].status, JobStatus::Completed);
    assert!(!dash.view().polling.active);

    let settled = list_requests(&server).await;
    assert!(settled >= 4);
    tokio::time::sleep(FAST * 4).await;
    assert_eq!(list_requests(&server).await, settled);
}

#[tokio::test]
async fn poll_failures_are_not_surfaced() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "queued")], 1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "overloaded"})))
        .mount(&server)
        .await;

    let dash = dashboard(&server, FAST);
    dash.list(Query::default()).await.unwrap();
    assert!(wait_for_requests(&server, 3).await);

    let view = dash.view();
    assert_eq!(view.error, None);
    assert!(!view.loading);
    assert_eq!(view.jobs.len(), 1);
    assert_eq!(view.jobs[0].status, JobStatus::Queued);
    assert!(dash.is_polling());
}

#[tokio::test]
async fn manual_pause_holds_until_resumed() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "running")], 1)))
        .mount(&server)
        .await;

    let dash = dashboard(&server, FAST);
    dash.list(Query::default()).await.unwrap();
    assert!(dash.is_polling());

    dash.stop_polling();
    assert!(!dash.is_polling());
    assert!(dash.view().polling.paused);

    // A refresh that still shows active work must not undo the pause.
    tokio::time::sleep(FAST).await;
    dash.refresh().await.unwrap();
    let paused_at = list_requests(&server).await;
    tokio::time::sleep(FAST * 4).await;
    assert_eq!(list_requests(&server).await, paused_at);
    assert!(!dash.is_polling());

    dash.start_polling();
    assert!(dash.is_polling());
    assert!(wait_for_requests(&server, paused_at + 1).await);
}

#[tokio::test]
async fn resume_without_active_jobs_stays_idle() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "completed")], 1)))
        .mount(&server)
        .await;

    let dash = dashboard(&server, FAST);
    dash.list(Query::default()).await.unwrap();
    dash.start_polling();
    assert!(!dash.is_polling());
}

#[tokio::test]
async fn interval_changes_restart_the_timer() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "running")], 1)))
        .mount(&server)
        .await;

    let dash = dashboard(&server, Duration::from_secs(60));
    dash.list(Query::default()).await.unwrap();
    assert!(dash.is_polling());
    assert_eq!(list_requests(&server).await, 1);

    dash.set_polling_interval(FAST);
    assert_eq!(dash.view().polling.interval, FAST);
    assert!(dash.is_polling());
    assert!(wait_for_requests(&server, 3).await);

    dash.set_polling_interval(Duration::ZERO);
    assert_eq!(dash.view().polling.interval, FAST);
}

#[tokio::test]
async fn dropping_the_dashboard_cancels_polling() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "running")], 1)))
        .mount(&server)
        .await;

    let dash = dashboard(&server, FAST);
    dash.list(Query::default()).await.unwrap();
    assert!(wait_for_requests(&server, 2).await);
    drop(dash);

    tokio::time::sleep(FAST).await;
    let after_drop = list_requests(&server).await;
    tokio::time::sleep(FAST * 4).await;
    assert_eq!(list_requests(&server).await, after_drop);
}

#[tokio::test]
async fn a_failed_poll_is_retried_on_the_next_tick() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "running")], 1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "completed")], 1)))
        .mount(&server)
        .await;

    let dash = dashboard(&server, FAST);
    dash.list(Query::default()).await.unwrap();

    assert!(wait_until(|| !dash.is_polling()).await);
    assert!(list_requests(&server).await >= 3);
    assert_eq!(dash.jobs()[0].status, JobStatus::Completed);
    assert_eq!(dash.view().error, None);
}
