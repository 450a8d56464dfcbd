//! Integration tests for the sweep pipeline
//!
//! These tests use wiremock to stand in for the profile site and test
//! the full probe, parse and store cycle end-to-end.

use profile_sweep::config::{parse_config, validate, Config};
use profile_sweep::crawler::{Coordinator, ReqwestTransport, Transport, TransportError};
use profile_sweep::storage::{RecordStore, SqliteStore};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a validated test configuration probing `base_url`
fn create_test_config(base_url: &str, alphabet: &str, length: usize, db_path: &Path) -> Config {
    let config = parse_config(&format!(
        r#"
[target]
base-url = "{}"
user-agent = "TestSweep/1.0"

[candidates]
alphabet = "{}"
length = {}

[crawler]
concurrent-requests = 4
timeout-secs = 1
batch-size = 2
timeout-backoff-ms = 10

[output]
database-path = "{}"
"#,
        base_url,
        alphabet,
        length,
        db_path.display()
    ))
    .expect("Failed to parse test config");

    validate(&config).expect("Test config should be valid");
    config
}

fn profile_html(name: &str, level: &str) -> String {
    format!(
        r#"<html><head><title>Profile</title></head><body>
        <div class="profile_header">
            <span class="actual_persona_name">{}</span>
            <div class="persona_name persona_level">Уровень <span class="friendPlayerLevelNum">{}</span></div>
        </div>
        </body></html>"#,
        name, level
    )
}

const NOT_FOUND_HTML: &str = r#"<html><body>
    <div id="message">
        <h2>Произошла ошибка при обработке вашего запроса:</h2>
        <h3>Указанный профиль не найден.</h3>
    </div>
</body></html>"#;

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_full_sweep_stores_single_profile_once() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/id/", mock_server.uri());

    // Only "ab" exists; every other path gets wiremock's default 404
    mount_page(&mock_server, "/id/ab", 200, profile_html("Foo", "5")).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profiles.db");
    let config = create_test_config(&base_url, "ab", 2, &db_path);

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let first = coordinator.run().await.expect("First sweep failed");

    assert_eq!(first.candidates, 4);
    assert_eq!(first.batches, 2);
    assert_eq!(first.stored, 1);
    assert_eq!(first.not_found, 3);

    let second = coordinator.run().await.expect("Second sweep failed");
    assert_eq!(second.stored, 0);
    assert_eq!(second.already_present, 1);

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.count_records().unwrap(), 1);

    let record = store
        .get_by_link(&format!("{}ab", base_url))
        .unwrap()
        .expect("Profile should be stored");
    assert_eq!(record.display_name, "Foo");
    assert_eq!(record.level, "5");
}

#[tokio::test]
async fn test_fresh_coordinator_reuses_existing_database() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/id/", mock_server.uri());
    mount_page(&mock_server, "/id/b", 200, profile_html("Bee", "2")).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profiles.db");

    let summary = Coordinator::new(create_test_config(&base_url, "ab", 1, &db_path))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.stored, 1);

    // A second process over the same database adds nothing
    let summary = Coordinator::new(create_test_config(&base_url, "ab", 1, &db_path))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.stored, 0);
    assert_eq!(summary.already_present, 1);

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.count_records().unwrap(), 1);
}

#[tokio::test]
async fn test_not_found_page_is_not_stored() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/id/", mock_server.uri());

    mount_page(&mock_server, "/id/a", 200, NOT_FOUND_HTML.to_string()).await;
    mount_page(&mock_server, "/id/b", 200, profile_html("Bee", "7")).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profiles.db");
    let config = create_test_config(&base_url, "ab", 1, &db_path);

    let summary = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.no_profile, 1);
    assert_eq!(summary.stored, 1);

    let store = SqliteStore::new(&db_path).unwrap();
    assert!(store.get_by_link(&format!("{}a", base_url)).unwrap().is_none());
    assert!(store.get_by_link(&format!("{}b", base_url)).unwrap().is_some());
}

#[tokio::test]
async fn test_server_errors_are_isolated() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/id/", mock_server.uri());

    mount_page(&mock_server, "/id/a", 503, String::new()).await;
    mount_page(&mock_server, "/id/b", 200, profile_html("Bee", "1")).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profiles.db");
    let config = create_test_config(&base_url, "ab", 1, &db_path);

    let summary = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.fetch_failed, 1);
    assert_eq!(summary.stored, 1);
    assert_eq!(summary.unit_failures, 0);

    // Non-success statuses are not retried
    assert_eq!(requests_to(&mock_server, "/id/a").await, 1);
}

#[tokio::test]
async fn test_timeout_gives_up_without_refetch() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/id/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/id/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(profile_html("Slow", "1"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profiles.db");
    let config = create_test_config(&base_url, "a", 1, &db_path);

    let summary = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.stored, 0);
    assert_eq!(requests_to(&mock_server, "/id/a").await, 1);
}

#[tokio::test]
async fn test_timeout_retry_reissues_request() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/id/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/id/a"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profiles.db");
    let mut config = create_test_config(&base_url, "a", 1, &db_path);
    config.crawler.timeout_retries = 1;

    let summary = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.timed_out, 1);
    assert_eq!(requests_to(&mock_server, "/id/a").await, 2);
}

#[tokio::test]
async fn test_reqwest_transport_reports_status_and_body() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/id/ok", 200, "hello".to_string()).await;

    let transport = ReqwestTransport::new(reqwest::Client::new());

    let ok = transport
        .get(&format!("{}/id/ok", mock_server.uri()), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body, "hello");

    let missing = transport
        .get(&format!("{}/id/missing", mock_server.uri()), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(missing.status, 404);
    assert!(missing.body.is_empty());
}

#[tokio::test]
async fn test_reqwest_transport_classifies_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::new(reqwest::Client::new());
    let result = transport
        .get(&format!("{}/id/slow", mock_server.uri()), Duration::from_millis(200))
        .await;

    assert!(matches!(result, Err(TransportError::Timeout)));
}
