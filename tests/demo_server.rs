use std::collections::HashMap;
use std::net::SocketAddr;

use authenticator::{app::build_router, config::Config};
use axum::{
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request},
    http::{StatusCode, header},
};
use tower::ServiceExt;

fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Request as `serve(..into_make_service_with_connect_info..)` would hand it over.
fn whoami_from(peer: &str) -> Request {
    let mut request = Request::get("/api/v1/whoami").body(Body::empty()).unwrap();
    let peer: SocketAddr = format!("{peer}:40000").parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

fn with_forwarded_for(mut request: Request, addr: &str) -> Request {
    request
        .headers_mut()
        .insert("x-forwarded-for", addr.parse().unwrap());
    request
}

#[tokio::test]
async fn allowlisted_client_gets_its_profile() {
    let router = build_router(&config(&[("AUTH_ALLOWED_IDENTITIES", "192.0.2.1")]));

    let response = router.oneshot(whoami_from("192.0.2.1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({"addr": "192.0.2.1"}));
}

#[tokio::test]
async fn unknown_client_is_rejected_with_configured_challenge() {
    let router = build_router(&config(&[
        ("AUTH_ALLOWED_IDENTITIES", "0.0.0.0"),
        ("AUTH_CHALLENGE", "Bearer"),
    ]));

    let response = router.oneshot(whoami_from("192.0.2.1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn spoofed_forwarding_header_is_ignored_by_default() {
    let router = build_router(&config(&[("AUTH_ALLOWED_IDENTITIES", "10.0.0.1")]));
    let request = with_forwarded_for(whoami_from("203.0.113.9"), "10.0.0.1");

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forwarding_header_is_used_when_configured() {
    let router = build_router(&config(&[
        ("AUTH_ALLOWED_IDENTITIES", "10.0.0.1"),
        ("AUTH_IDENTITY_HEADER", "x-forwarded-for"),
    ]));
    let request = with_forwarded_for(whoami_from("203.0.113.9"), "10.0.0.1, 203.0.113.9");

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_without_any_address_is_rejected() {
    let router = build_router(&config(&[("AUTH_ALLOWED_IDENTITIES", "192.0.2.1")]));
    let request = Request::get("/api/v1/whoami").body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let router = build_router(&config(&[]));
    let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unmatched_route_is_not_found_rather_than_unauthorized() {
    let router = build_router(&config(&[]));
    let request = Request::get("/api/v1/nope").body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
