//! medsim-api
//!
//! HTTP and WebSocket transport for the simulation stores.

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use state::AppState;

/// Build the full router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Cases (public view, answer keys stripped)
        .route("/cases", get(routes::cases::list_cases))
        .route("/cases/{id}", get(routes::cases::get_case))
        // Solo and contest sessions
        .route("/sessions", post(routes::sessions::start_session))
        .route("/sessions/{id}", get(routes::sessions::get_session))
        .route("/sessions/{id}/chat", post(routes::sessions::submit_chat))
        .route("/sessions/{id}/answers", post(routes::sessions::submit_answer))
        .route("/sessions/{id}/end", post(routes::sessions::end_session))
        .route("/leaderboard", get(routes::leaderboard::list_leaderboard))
        // Multiplayer rooms
        .route("/rooms", post(routes::rooms::create_room))
        .route("/rooms/{id}", get(routes::rooms::get_room))
        .route("/rooms/{id}/join", post(routes::rooms::join_room))
        .route("/rooms/{id}/chat", post(routes::rooms::room_chat))
        .route("/rooms/{id}/answers", post(routes::rooms::room_answer))
        .route("/rooms/{id}/end", post(routes::rooms::end_room))
        .route("/rooms/{id}/ws", get(routes::ws::room_socket))
        .layer(
            ServiceBuilder::new()
                .layer(axum_mw::from_fn(middleware::audit::audit_log))
                .layer(cors),
        )
        .with_state(state)
}
