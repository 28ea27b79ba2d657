//! HttpFetcher and HttpRepository against a local fixture server

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use recipebox_core::{
    Config, CoreError, FetchError, HttpFetcher, HttpRepository, Locator, RecordFetcher,
};
use std::net::SocketAddr;

async fn spawn_fixture_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/recipes/cornbread.json",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"titleTxt":"Mom's Cornbread Stuffing","rating":5}"#,
                )
            }),
        )
        .route(
            "/recipes/turkey.json",
            get(|| async { r#"{"titleTxt":"Roasting Turkey Breast"}"# }),
        )
        .route(
            "/recipes/broken.json",
            get(|| async { "<html>not json</html>" }),
        )
        .route(
            "/recipes/agent.json",
            get(|headers: axum::http::HeaderMap| async move {
                let agent = headers
                    .get(header::USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                format!(r#"{{"agent":"{agent}"}}"#)
            }),
        )
        .route(
            "/recipes/gone.json",
            get(|| async { (StatusCode::NOT_FOUND, "missing").into_response() }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn locator(addr: SocketAddr, path: &str) -> Locator {
    Locator::parse(&format!("http://{addr}{path}")).unwrap()
}

#[tokio::test]
async fn test_fetches_json_record() {
    let addr = spawn_fixture_server().await;
    let fetcher = HttpFetcher::new(None).unwrap();

    let record = fetcher
        .fetch(&locator(addr, "/recipes/cornbread.json"))
        .await
        .unwrap();

    assert_eq!(record.display_title(), Some("Mom's Cornbread Stuffing"));
    assert_eq!(record.as_value()["rating"], 5);
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let addr = spawn_fixture_server().await;
    let fetcher = HttpFetcher::new(None).unwrap();

    let err = fetcher
        .fetch(&locator(addr, "/recipes/broken.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let addr = spawn_fixture_server().await;
    let fetcher = HttpFetcher::new(None).unwrap();

    let err = fetcher
        .fetch(&locator(addr, "/recipes/gone.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404 }));
}

#[tokio::test]
async fn test_custom_user_agent() {
    let addr = spawn_fixture_server().await;
    let fetcher = HttpFetcher::new(Some("recipebox-test/1.0")).unwrap();

    let record = fetcher
        .fetch(&locator(addr, "/recipes/agent.json"))
        .await
        .unwrap();

    assert_eq!(record.as_value()["agent"], "recipebox-test/1.0");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new(None).unwrap();
    let err = fetcher
        .fetch(&locator(addr, "/recipes/cornbread.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn test_http_repository_end_to_end() {
    let addr = spawn_fixture_server().await;
    let dir = tempfile::tempdir().unwrap();

    let config = Config {
        storage_dir: Some(dir.path().to_path_buf()),
        sources: vec![
            format!("http://{addr}/recipes/cornbread.json"),
            format!("http://{addr}/recipes/turkey.json"),
        ],
        ..Config::default()
    };

    let repo = HttpRepository::from_config(&config).unwrap();
    let records = repo.get_all().await.unwrap();
    assert_eq!(records.len(), 2);

    let mut titles: Vec<&str> = records.iter().filter_map(|r| r.display_title()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Mom's Cornbread Stuffing", "Roasting Turkey Breast"]);

    let on_disk = std::fs::read_to_string(dir.path().join("recipes.json")).unwrap();
    let cached: Vec<recipebox_core::Record> = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(cached, records);
}

#[tokio::test]
async fn test_http_repository_failure_leaves_no_cache() {
    let addr = spawn_fixture_server().await;
    let dir = tempfile::tempdir().unwrap();

    let config = Config {
        storage_dir: Some(dir.path().to_path_buf()),
        sources: vec![
            format!("http://{addr}/recipes/cornbread.json"),
            format!("http://{addr}/recipes/gone.json"),
        ],
        ..Config::default()
    };

    let repo = HttpRepository::from_config(&config).unwrap();
    let err = repo.get_all().await.unwrap_err();

    assert!(matches!(err, CoreError::FetchFailure { ref locator, .. } if locator.ends_with("/recipes/gone.json")));
    assert!(!dir.path().join("recipes.json").exists());
}
