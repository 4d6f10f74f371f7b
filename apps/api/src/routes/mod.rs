pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::essays::handlers as essays;
use crate::feedback::handlers as feedback;
use crate::ocr::handlers as ocr;
use crate::reference::handlers as reference;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Essay review
        .route("/api/analyze", post(feedback::handle_analyze))
        .route("/api/chat", post(feedback::handle_chat))
        .route("/api/ocr", post(ocr::handle_ocr))
        // Reference data
        .route("/api/conjunctions", get(reference::handle_conjunctions))
        .route("/api/hot-topics", get(reference::handle_hot_topics))
        .route("/api/random-topic", get(reference::handle_random_topic))
        // Signed-in user
        .route("/api/user/profile", get(essays::handle_profile))
        .route("/api/user/essays", get(essays::handle_list_essays))
        .route("/api/user/essays/:id", get(essays::handle_get_essay))
        // Accounts
        .route("/login", post(auth::handle_login))
        .route("/register", post(auth::handle_register))
        .route("/logout", get(auth::handle_logout))
        .with_state(state)
}
