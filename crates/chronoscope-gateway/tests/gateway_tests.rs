//! Integration tests: HTTP requests against a directory served by the gateway.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, SecondsFormat, Utc};
use chronoscope_core::ChronoscopeConfig;
use chronoscope_gateway::{build_store, router, GatewayState};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const BASE: &str = "http://pod.example/";

fn write_observation(dir: &Path, name: &str, hours_ago: i64, value: &str) {
    let ts = (Utc::now() - Duration::hours(hours_ago)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let body = format!(
        r#"@prefix sosa: <http://www.w3.org/ns/sosa/> .
           <#obs> a sosa:Observation ;
               sosa:resultTime "{ts}" ;
               sosa:hasResult [
                   <http://qudt.org/vocab/unit/numericValue> {value} ;
                   <http://qudt.org/schema/qudt/hasUnit> <http://qudt.org/vocab/unit/DEG_C>
               ] ."#
    );
    std::fs::write(dir.join(name), body).unwrap();
}

fn pod() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let temperature = tmp.path().join("temperature");
    std::fs::create_dir_all(&temperature).unwrap();
    std::fs::write(
        temperature.join(".meta"),
        "<> a <https://solid.ti.rw.fau.de/public/ns/tc#TemporalContainer> .",
    )
    .unwrap();
    write_observation(&temperature, "r1.ttl", 1, "10");
    write_observation(&temperature, "r2.ttl", 2, "20");
    write_observation(&temperature, "r3.ttl", 3, "30");

    let site = tmp.path().join("site");
    std::fs::create_dir_all(&site).unwrap();
    std::fs::write(site.join("index.html"), "<h1>sensors</h1>").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "plain").unwrap();
    tmp
}

fn app(root: &Path) -> axum::Router {
    let mut config = ChronoscopeConfig::default();
    config.server.root = root.to_path_buf();
    config.server.base_url = BASE.into();
    let store = build_store(&config).unwrap();
    router(Arc::new(GatewayState {
        store,
        base_url: config.base_url(),
    }))
}

async fn send(root: &Path, uri: &str, accept: Option<&str>) -> (StatusCode, String, String) {
    let mut request = Request::builder().uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }
    let response = app(root)
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn health() {
    let tmp = pod();
    let (status, _, body) = send(tmp.path(), "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn modal_queries_answer_json() {
    let tmp = pod();
    let (status, content_type, body) =
        send(tmp.path(), "/temperature/?value=gte_20&operator=box", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(body, "false");

    let (_, _, body) = send(tmp.path(), "/temperature/?value=gte_20&operator=diamond", None).await;
    assert_eq!(body, "true");
}

#[tokio::test]
async fn dump_answers_sorted_csv() {
    let tmp = pod();
    let (status, content_type, body) = send(tmp.path(), "/temperature/?intervalStart=PT90M", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/csv");
    let values: Vec<&str> = body
        .lines()
        .map(|line| line.split(", ").nth(1).unwrap())
        .collect();
    assert_eq!(values, vec!["30", "20"]);
    assert!(body.lines().all(|l| l.ends_with("http://qudt.org/vocab/unit/DEG_C")));
}

#[tokio::test]
async fn container_without_query_is_listed() {
    let tmp = pod();
    let (status, content_type, body) = send(tmp.path(), "/temperature/", Some("text/turtle")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/turtle");
    assert!(body.contains("<http://pod.example/temperature/r2.ttl>"));
    assert!(body.contains("TemporalContainer"));
}

#[tokio::test]
async fn html_clients_get_the_index() {
    let tmp = pod();
    let (_, content_type, body) = send(tmp.path(), "/site/", Some("text/html,*/*;q=0.8")).await;
    assert_eq!(content_type, "text/html");
    assert_eq!(body, "<h1>sensors</h1>");

    let (_, content_type, _) = send(tmp.path(), "/site/", Some("text/turtle")).await;
    assert_eq!(content_type, "text/turtle");
}

#[tokio::test]
async fn plain_files_are_streamed() {
    let tmp = pod();
    let (status, content_type, body) = send(tmp.path(), "/notes.txt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/plain");
    assert_eq!(body, "plain");
}

#[tokio::test]
async fn error_statuses() {
    let tmp = pod();
    let (status, _, _) = send(tmp.path(), "/missing.ttl", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(tmp.path(), "/temperature/?intervalEnd=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("intervalEnd"));
}

#[tokio::test]
async fn broken_member_is_bad_gateway() {
    let tmp = pod();
    std::fs::write(tmp.path().join("temperature").join("r4.ttl"), "<#obs> a ").unwrap();
    let (status, _, _) = send(tmp.path(), "/temperature/?operator=diamond", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn writes_are_rejected() {
    let tmp = pod();
    let response = app(tmp.path())
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/notes.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn spaced_names_round_trip_through_listings() {
    let tmp = pod();
    std::fs::write(tmp.path().join("field notes.txt"), "spaced").unwrap();

    let (status, _, body) = send(tmp.path(), "/", Some("text/turtle")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<http://pod.example/field%20notes.txt>"));

    let (status, _, body) = send(tmp.path(), "/field%20notes.txt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "spaced");

    let (status, _, _) = send(tmp.path(), "/temperature/%2E%2E/notes.txt", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
