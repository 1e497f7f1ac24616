use super::helpers::{expect_status, get_uri, login, post_json, read_json, send, spawn_app};
use axum::http::StatusCode;
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use tokio::task::JoinSet;

fn generate_body(user_id: &Value, prompt: &str) -> Value {
    json!({
        "user_id": user_id,
        "prompt": prompt,
        "image_url": "https://example.com/portrait.jpg"
    })
}

async fn coin_of(app: &axum::Router, user_id: &str) -> i64 {
    let res = send(app, get_uri(&format!("/api/user/info/get?user_id={}", user_id), None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    body["data"]["coin"].as_i64().expect("coin")
}

#[tokio::test]
async fn generation_debits_cost_and_records_history() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;
    let user_id = user["user_id"].as_str().unwrap();

    let req = post_json("/api/hair-style", generate_body(&user["user_id"], "short pixie"), None);
    let body: Value = read_json(expect_status(send(&app.app, req).await, StatusCode::OK).await).await;
    let data = &body["data"];
    assert_eq!(data["coin_cost"], 20);
    let image_url = data["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("https://test-storage.local/hair_style/"));
    assert!(image_url.ends_with(".png"));

    assert_eq!(coin_of(&app.app, user_id).await, 40);
    assert_eq!(app.upstream.vision_calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.storage.uploaded.lock().unwrap().len(), 1);

    let res = send(
        &app.app,
        get_uri(&format!("/api/hair-style/records?user_id={}&page=1&page_size=5", user_id), None),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["prompt"], "short pixie");
    assert_eq!(body["data"]["records"][0]["image_url"], image_url);
}

#[tokio::test]
async fn history_page_far_past_the_end_is_empty() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;
    let user_id = user["user_id"].as_str().unwrap();

    let req = post_json("/api/hair-style", generate_body(&user["user_id"], "undercut"), None);
    expect_status(send(&app.app, req).await, StatusCode::OK).await;

    let uri = format!("/api/hair-style/records?user_id={}&page={}", user_id, i64::MAX);
    let body: Value =
        read_json(expect_status(send(&app.app, get_uri(&uri, None)).await, StatusCode::OK).await).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_generations_never_overdraw() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;
    let user_id = user["user_id"].as_str().unwrap().to_string();

    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let router = app.app.clone();
        let body = generate_body(&user["user_id"], &format!("wolf cut {}", i));
        tasks.spawn(async move { send(&router, post_json("/api/hair-style", body, None)).await.status() });
    }

    let mut ok = 0;
    while let Some(status) = tasks.join_next().await {
        match status.expect("task panicked") {
            StatusCode::OK => ok += 1,
            other => assert_eq!(other, StatusCode::BAD_REQUEST),
        }
    }

    // 60 initial coins cover exactly three generations at 20 each.
    assert_eq!(ok, 3);
    assert_eq!(coin_of(&app.app, &user_id).await, 0);

    let uploaded = app.storage.uploaded.lock().unwrap().clone();
    let deleted = app.storage.deleted.lock().unwrap().clone();
    assert_eq!(uploaded.len(), app.upstream.vision_calls.load(Ordering::SeqCst));
    assert_eq!(deleted.len(), uploaded.len() - 3);
    assert!(deleted.iter().all(|key| uploaded.contains(key)));

    let uri = format!("/api/hair-style/records?user_id={}&page_size=10", user_id);
    let body: Value =
        read_json(expect_status(send(&app.app, get_uri(&uri, None)).await, StatusCode::OK).await).await;
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn insufficient_balance_skips_the_vision_api() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;

    for _ in 0..3 {
        let req = post_json("/api/hair-style", generate_body(&user["user_id"], "buzz cut"), None);
        expect_status(send(&app.app, req).await, StatusCode::OK).await;
    }
    assert_eq!(coin_of(&app.app, user["user_id"].as_str().unwrap()).await, 0);

    let req = post_json("/api/hair-style", generate_body(&user["user_id"], "buzz cut"), None);
    let body: Value =
        read_json(expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await).await;
    assert_eq!(body["code"], 400);
    assert_eq!(app.upstream.vision_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn throttled_upstream_maps_to_503_and_keeps_balance() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;
    app.upstream.throttle.store(true, Ordering::SeqCst);

    let req = post_json("/api/hair-style", generate_body(&user["user_id"], "mullet"), None);
    let body: Value = read_json(
        expect_status(send(&app.app, req).await, StatusCode::SERVICE_UNAVAILABLE).await,
    )
    .await;
    assert!(body["message"].as_str().unwrap().contains("5 seconds"));
    assert_eq!(coin_of(&app.app, user["user_id"].as_str().unwrap()).await, 60);
    assert!(app.storage.uploaded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn share_feed_and_like_round() {
    let Some(app) = spawn_app().await else { return };
    let author = login(&app.app).await;
    let viewer = login(&app.app).await;

    let req = post_json("/api/hair-style", generate_body(&author["user_id"], "curtain bangs"), None);
    let body: Value = read_json(expect_status(send(&app.app, req).await, StatusCode::OK).await).await;
    let record_id = body["data"]["record_id"].as_i64().unwrap();

    let stranger_share = post_json(
        "/api/square/share",
        json!({"user_id": viewer["user_id"], "record_id": record_id}),
        None,
    );
    expect_status(send(&app.app, stranger_share).await, StatusCode::NOT_FOUND).await;

    let share = post_json(
        "/api/square/share",
        json!({"user_id": author["user_id"], "record_id": record_id}),
        None,
    );
    let body: Value = read_json(expect_status(send(&app.app, share).await, StatusCode::OK).await).await;
    let content_id = body["data"]["content_id"].as_i64().unwrap();

    let again = post_json(
        "/api/square/share",
        json!({"user_id": author["user_id"], "record_id": record_id}),
        None,
    );
    expect_status(send(&app.app, again).await, StatusCode::CONFLICT).await;

    let like = || {
        post_json(
            "/api/square/like",
            json!({"user_id": viewer["user_id"], "content_id": content_id}),
            None,
        )
    };
    let body: Value = read_json(expect_status(send(&app.app, like()).await, StatusCode::OK).await).await;
    assert_eq!(body["data"], json!({"is_liked": true, "like_count": 1}));

    let feed_uri = format!(
        "/api/square/contents?user_id={}&cursor={}&page_size=1",
        viewer["user_id"].as_str().unwrap(),
        content_id + 1
    );
    let res = send(&app.app, get_uri(&feed_uri, None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    let item = &body["data"]["records"][0];
    assert_eq!(item["id"], content_id);
    assert_eq!(item["is_liked"], true);
    assert_eq!(item["like_count"], 1);
    assert_eq!(item["record"]["prompt"], "curtain bangs");
    assert!(item["user_info"]["nickname"].as_str().unwrap().starts_with("User"));
    assert_eq!(item["user_info"]["avatar_url"], app.config.default_avatar_url.as_str());
    assert_eq!(body["data"]["next_cursor"], content_id);

    let body: Value = read_json(expect_status(send(&app.app, like()).await, StatusCode::OK).await).await;
    assert_eq!(body["data"], json!({"is_liked": false, "like_count": 0}));

    let missing = post_json(
        "/api/square/like",
        json!({"user_id": viewer["user_id"], "content_id": i64::MAX}),
        None,
    );
    expect_status(send(&app.app, missing).await, StatusCode::NOT_FOUND).await;
}
