use super::helpers::{expect_status, get_uri, login, post_json, read_json, send, spawn_app};
use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn first_login_grants_initial_coins_and_token() {
    let Some(app) = spawn_app().await else { return };
    let data = login(&app.app).await;

    let user_id = data["user_id"].as_str().expect("missing user_id");
    assert!(user_id.starts_with("wx-"));
    assert_eq!(data["coin"], 60);
    assert_eq!(data["avatar_url"], app.config.default_avatar_url.as_str());
    assert_eq!(data["invite_code"].as_str().map(str::len), Some(6));
    let token = data["token"].as_str().expect("missing token");

    let res = send(
        &app.app,
        get_uri(&format!("/api/user/info/get?user_id={}", user_id), Some(token)),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["coin"], 60);
}

#[tokio::test]
async fn token_for_another_user_is_forbidden() {
    let Some(app) = spawn_app().await else { return };
    let alice = login(&app.app).await;
    let bob = login(&app.app).await;

    let req = post_json(
        "/api/user/sign-in",
        json!({"user_id": alice["user_id"]}),
        bob["token"].as_str(),
    );
    expect_status(send(&app.app, req).await, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn sign_in_pays_once_per_day() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;

    let req = post_json("/api/user/sign-in", json!({"user_id": user["user_id"]}), None);
    let body: Value = read_json(expect_status(send(&app.app, req).await, StatusCode::OK).await).await;
    assert_eq!(body["data"]["coin"], 80);

    let again = post_json("/api/user/sign-in", json!({"user_id": user["user_id"]}), None);
    let body: Value =
        read_json(expect_status(send(&app.app, again).await, StatusCode::CONFLICT).await).await;
    assert_eq!(body["code"], 409);

    let unknown = post_json("/api/user/sign-in", json!({"user_id": "wx-nobody"}), None);
    expect_status(send(&app.app, unknown).await, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn profile_update_is_visible_on_next_read() {
    let Some(app) = spawn_app().await else { return };
    let user = login(&app.app).await;
    let user_id = user["user_id"].as_str().unwrap();

    let req = post_json(
        "/api/user/info",
        json!({"user_id": user_id, "nickname": "Mia", "avatar_url": "https://cdn.example.com/mia.png"}),
        None,
    );
    let body: Value = read_json(expect_status(send(&app.app, req).await, StatusCode::OK).await).await;
    assert!(body.get("data").is_none());

    let res = send(&app.app, get_uri(&format!("/api/user/info/get?user_id={}", user_id), None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["data"]["nickname"], "Mia");
    assert_eq!(body["data"]["avatar_url"], "https://cdn.example.com/mia.png");
}

#[tokio::test]
async fn invite_code_credits_owner_once() {
    let Some(app) = spawn_app().await else { return };
    let owner = login(&app.app).await;
    let guest = login(&app.app).await;
    let code = owner["invite_code"].as_str().unwrap().to_lowercase();

    let own = post_json(
        "/api/user/invite-code/use",
        json!({"user_id": owner["user_id"], "invite_code": owner["invite_code"]}),
        None,
    );
    expect_status(send(&app.app, own).await, StatusCode::BAD_REQUEST).await;

    let unknown = post_json(
        "/api/user/invite-code/use",
        json!({"user_id": guest["user_id"], "invite_code": "ZZZZZ0"}),
        None,
    );
    expect_status(send(&app.app, unknown).await, StatusCode::NOT_FOUND).await;

    let redeem = post_json(
        "/api/user/invite-code/use",
        json!({"user_id": guest["user_id"], "invite_code": code}),
        None,
    );
    expect_status(send(&app.app, redeem).await, StatusCode::OK).await;

    let again = post_json(
        "/api/user/invite-code/use",
        json!({"user_id": guest["user_id"], "invite_code": code}),
        None,
    );
    expect_status(send(&app.app, again).await, StatusCode::CONFLICT).await;

    let res = send(
        &app.app,
        get_uri(&format!("/api/user/info/get?user_id={}", owner["user_id"].as_str().unwrap()), None),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["data"]["coin"], 80);

    let res = send(
        &app.app,
        get_uri(&format!("/api/user/info/get?user_id={}", guest["user_id"].as_str().unwrap()), None),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["data"]["used_invite_code"], code.to_uppercase());
    assert_eq!(body["data"]["coin"], 60);
}

#[tokio::test]
async fn malformed_invite_code_is_rejected() {
    let Some(app) = spawn_app().await else { return };
    let guest = login(&app.app).await;
    let req = post_json(
        "/api/user/invite-code/use",
        json!({"user_id": guest["user_id"], "invite_code": "AB-1"}),
        None,
    );
    expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await;
}
