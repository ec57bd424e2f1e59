//! End-to-end tests for the unwrap endpoint with a scripted prober.

use reqwest::StatusCode;
use serde_json::Value;

use link_unwrapper::chain::ChainError;

mod common;

use common::{config_for, config_with_permitted, ScriptedProber, TestServer};

async fn get(server: &TestServer, path: &str, host: &str) -> (StatusCode, reqwest::header::HeaderMap, Value) {
    let response = reqwest::Client::new()
        .get(server.url(path))
        .header("x-forwarded-host", host)
        .send()
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.json().await.unwrap();
    (status, headers, body)
}

#[tokio::test]
async fn test_chain_across_hosts_is_sanitized() {
    let prober = ScriptedProber::default()
        .redirect("https://a.test/x", "https://b.test/y?utm_source=tw")
        .redirect(
            "https://b.test/y",
            "https://example.com/article?id=7&utm_medium=social&ref=home#comments",
        );
    let server = TestServer::start(config_for(&["a.test", "b.test"]), prober).await;

    let (status, headers, body) = get(&server, "/x", "a.test").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(body["result"], "https://example.com/article?id=7");
    assert_eq!(body["error"], Value::Null);

    let hops = body["hops"].as_array().unwrap();
    assert_eq!(hops.len(), 2);
    assert_eq!(hops[0]["from"], "https://a.test/x");
    assert_eq!(hops[0]["to"], "https://b.test/y");
    assert_eq!(hops[0]["using"]["host"], "a.test");
    assert_eq!(hops[0]["using"]["description"], "a.test shortener");
    assert_eq!(hops[1]["from"], "https://b.test/y");
    assert_eq!(hops[1]["using"]["host"], "b.test");

    assert_eq!(server.prober.calls(), vec!["https://a.test/x", "https://b.test/y"]);
    server.stop().await;
}

#[tokio::test]
async fn test_unknown_host_is_rejected_without_probing() {
    let server = TestServer::start(config_for(&["a.test"]), ScriptedProber::default()).await;

    let (status, _, body) = get(&server, "/x", "unknown.example").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "no_resolver_found");
    assert_eq!(body["hops"], serde_json::json!([]));
    assert_eq!(body["result"], Value::Null);
    assert!(server.prober.calls().is_empty());
    server.stop().await;
}

#[tokio::test]
async fn test_failure_keeps_partial_trace() {
    let prober = ScriptedProber::default()
        .redirect("https://a.test/x", "https://b.test/y")
        .fail(
            "https://b.test/y",
            ChainError::NetworkFailure {
                endpoint: "https://b.test/y".to_string(),
                reason: "connection refused".to_string(),
            },
        );
    let server = TestServer::start(config_for(&["a.test", "b.test"]), prober).await;

    let (status, _, body) = get(&server, "/x", "a.test").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["kind"], "network_failure");
    assert_eq!(body["result"], Value::Null);
    assert_eq!(body["hops"].as_array().unwrap().len(), 1);
    assert_eq!(server.prober.calls().len(), 2);
    server.stop().await;
}

#[tokio::test]
async fn test_missing_location_is_bad_gateway() {
    let server = TestServer::start(config_for(&["a.test"]), ScriptedProber::default()).await;

    let (status, _, body) = get(&server, "/gone", "a.test").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["kind"], "no_redirect_target");
    server.stop().await;
}

#[tokio::test]
async fn test_cycle_is_loop_detected() {
    let prober = ScriptedProber::default()
        .redirect("https://a.test/x", "https://b.test/y")
        .redirect("https://b.test/y", "https://a.test/x");
    let server = TestServer::start(config_for(&["a.test", "b.test"]), prober).await;

    let (status, _, body) = get(&server, "/x", "a.test").await;

    assert_eq!(status, StatusCode::LOOP_DETECTED);
    assert_eq!(body["error"]["kind"], "cycle_detected");
    assert_eq!(body["hops"].as_array().unwrap().len(), 2);
    assert_eq!(server.prober.calls().len(), 2);
    server.stop().await;
}

#[tokio::test]
async fn test_hop_limit_is_loop_detected() {
    let prober = ScriptedProber::default()
        .redirect("https://a.test/1", "https://a.test/2")
        .redirect("https://a.test/2", "https://a.test/3")
        .redirect("https://a.test/3", "https://a.test/4")
        .redirect("https://a.test/4", "https://a.test/5");
    let server = TestServer::start(config_for(&["a.test"]), prober).await;

    let (status, _, body) = get(&server, "/1", "a.test").await;

    assert_eq!(status, StatusCode::LOOP_DETECTED);
    assert_eq!(body["error"]["kind"], "too_many_hops");
    assert_eq!(body["hops"].as_array().unwrap().len(), 4);
    server.stop().await;
}

#[tokio::test]
async fn test_root_path_is_rejected() {
    let server = TestServer::start(config_for(&["a.test"]), ScriptedProber::default()).await;

    let (status, _, body) = get(&server, "/", "a.test").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "empty_path");
    assert!(server.prober.calls().is_empty());
    server.stop().await;
}

#[tokio::test]
async fn test_forwarded_host_takes_precedence_over_host() {
    let prober = ScriptedProber::default().redirect("https://b.test/x", "https://example.com/");
    let server = TestServer::start(config_for(&["a.test", "b.test"]), prober).await;

    let response = reqwest::Client::new()
        .get(server.url("/x"))
        .header("host", "a.test")
        .header("x-forwarded-host", "B.test:443, a.test")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.prober.calls(), vec!["https://b.test/x"]);
    server.stop().await;
}

#[tokio::test]
async fn test_permitted_params_survive_on_final_url() {
    let prober = ScriptedProber::default()
        .redirect("https://a.test/v", "https://shop.example/dp/B0?tag=me-20&psc=1&utm_source=x");
    let server = TestServer::start(config_with_permitted(&["a.test"], &["tag"]), prober).await;

    let (status, _, body) = get(&server, "/v", "a.test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "https://shop.example/dp/B0?tag=me-20");
    server.stop().await;
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let prober = ScriptedProber::default().redirect("https://a.test/x", "https://example.com/");
    let server = TestServer::start(config_for(&["a.test"]), prober).await;

    let response = reqwest::Client::new()
        .get(server.url("/x"))
        .header("x-forwarded-host", "a.test")
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
    server.stop().await;
}
