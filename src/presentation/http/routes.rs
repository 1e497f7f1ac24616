use super::{
    handlers::{hair_style, health, square, user},
    middleware::rate_limit::generation_rate_limit,
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    let generation_routes = Router::new()
        .route("/api/hair-style", post(hair_style::generate_hair_style))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            generation_rate_limit,
        ));

    Router::new()
        // Health
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))
        // Hairstyle records
        .route("/api/hair-style/records", get(hair_style::list_records))
        // User
        .route("/api/user/wx-login", post(user::wx_login))
        .route("/api/user/info/get", get(user::get_info))
        .route("/api/user/info", post(user::update_info))
        .route("/api/user/sign-in", post(user::sign_in))
        .route("/api/user/invite-code/use", post(user::use_invite_code))
        // Square
        .route("/api/square/share", post(square::share))
        .route("/api/square/contents", get(square::list_contents))
        .route("/api/square/like", post(square::toggle_like))
        .merge(generation_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
