// src/routes/mod.rs
pub mod actions;
pub mod integration;

use crate::config::IntegrationKind;
use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use actions::{giphy_handler, roll_the_dice_handler};
use integration::integration_handler;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const LIVENESS: &str = "The Turn UI integration API endpoint is at /integration";

pub fn create_router(kind: IntegrationKind) -> Router<SharedState> {
    let mut router = Router::new()
        .route("/", get(|| async { LIVENESS }))
        .route("/integration", post(integration_handler));

    if kind == IntegrationKind::Actions {
        router = router
            .route("/action/roll_the_dice", post(roll_the_dice_handler))
            .route("/action/giphy", post(giphy_handler));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
