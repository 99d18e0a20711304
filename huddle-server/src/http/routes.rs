use crate::http::{
    AppState, delete_message, get_history, health, mark_read, recent_statuses, set_status, upload,
};
use crate::signaling::ws_handler;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.uploads.max_bytes + MULTIPART_OVERHEAD;
    let uploads = ServeDir::new(&state.uploads.dir);

    Router::new()
        .route("/ws/{username}", get(ws_handler))
        .route("/history", get(get_history))
        .route("/delete_message/{id}", post(delete_message))
        .route("/upload", post(upload))
        .route("/mark_read", post(mark_read))
        .route("/set_status", post(set_status))
        .route("/statuses", get(recent_statuses))
        .route("/health", get(health))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
