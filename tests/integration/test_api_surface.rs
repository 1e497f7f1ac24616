use super::helpers::{expect_status, get_uri, post_json, read_json, send, spawn_offline_app};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn ping_answers_pong_with_request_id() {
    let app = spawn_offline_app(false).await;
    let res = expect_status(send(&app.app, get_uri("/ping", None)).await, StatusCode::OK).await;
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = read_json(res).await;
    assert_eq!(body, json!({"message": "pong"}));
}

#[tokio::test]
async fn malformed_json_gets_400_envelope() {
    let app = spawn_offline_app(false).await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/user/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"user_id\":"))
        .unwrap();
    let res = expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn generation_requires_exactly_one_image_source() {
    let app = spawn_offline_app(false).await;

    let neither = post_json(
        "/api/hair-style",
        json!({"user_id": "o1", "prompt": "wolf cut"}),
        None,
    );
    expect_status(send(&app.app, neither).await, StatusCode::BAD_REQUEST).await;

    let both = post_json(
        "/api/hair-style",
        json!({
            "user_id": "o1",
            "prompt": "wolf cut",
            "image_url": "https://example.com/me.jpg",
            "base64_image": "aGVsbG8="
        }),
        None,
    );
    expect_status(send(&app.app, both).await, StatusCode::BAD_REQUEST).await;

    let no_prompt = post_json(
        "/api/hair-style",
        json!({"user_id": "o1", "prompt": "", "image_url": "https://example.com/me.jpg"}),
        None,
    );
    let res = expect_status(send(&app.app, no_prompt).await, StatusCode::BAD_REQUEST).await;
    let body: Value = read_json(res).await;
    assert!(body["message"].as_str().unwrap().contains("prompt"));

    assert_eq!(app.upstream.vision_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn query_parameters_are_validated() {
    let app = spawn_offline_app(false).await;
    expect_status(
        send(&app.app, get_uri("/api/user/info/get", None)).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    expect_status(
        send(&app.app, get_uri("/api/square/contents?user_id=o1&cursor=-3", None)).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    expect_status(
        send(&app.app, get_uri("/api/hair-style/records?user_id=o1&page=x", None)).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    expect_status(
        send(&app.app, get_uri("/api/hair-style/records?user_id=o1&page=0", None)).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn invalid_bearer_token_is_forbidden() {
    let app = spawn_offline_app(false).await;
    let req = post_json("/api/user/sign-in", json!({"user_id": "o1"}), Some("not-a-jwt"));
    let res = expect_status(send(&app.app, req).await, StatusCode::FORBIDDEN).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn require_auth_rejects_missing_token() {
    let app = spawn_offline_app(true).await;
    let req = post_json("/api/square/like", json!({"user_id": "o1", "content_id": 1}), None);
    expect_status(send(&app.app, req).await, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn wechat_rejection_maps_to_bad_gateway() {
    let app = spawn_offline_app(false).await;
    let req = post_json("/api/user/wx-login", json!({"code": "bad-code"}), None);
    let res = expect_status(send(&app.app, req).await, StatusCode::BAD_GATEWAY).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["code"], 502);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = spawn_offline_app(false).await;
    let res = send(&app.app, get_uri("/api/nope", None)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
