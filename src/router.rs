use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::{
    create_garden_location_router, create_irrigation_zone_router, create_measurement_router,
    create_observation_router, create_plant_router,
};

/// Liveness probe. Does not touch the database.
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Builds the full application: every resource router under `/api/v1`, `/health`, and
/// request tracing.
pub fn create_router(pool: PgPool) -> Router {
    let api = Router::new()
        .merge(create_irrigation_zone_router(pool.clone()))
        .merge(create_garden_location_router(pool.clone()))
        .merge(create_plant_router(pool.clone()))
        .merge(create_observation_router(pool.clone()))
        .merge(create_measurement_router(pool));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
}
