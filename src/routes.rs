use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use tower_http::trace::TraceLayer;
use serde_json::json;

use crate::{
    handler::{dashboard::dashboard_handler, tools::tools_handler},
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest(
            "/dashboard",
            dashboard_handler()
                .layer(middleware::from_fn(auth))
        )
        .nest("/tools", tools_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
