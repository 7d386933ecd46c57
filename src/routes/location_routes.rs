use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::location_controller::LocationController;
use crate::dto::common::ApiResponse;
use crate::dto::location_dto::{
    CleanupQuery, CreateLocationRequest, LocationHistoryQuery, LocationWindowQuery,
};
use crate::middleware::auth::AuthUser;
use crate::models::location::Location;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_location_router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_location))
        .route("/current", get(current_locations))
        .route("/simulate", post(simulate_movement))
        .route("/cleanup", delete(cleanup_locations))
        .route("/vehicle/:id", get(vehicle_locations))
        .route("/vehicle/:id/history", get(location_history))
        .route("/mission/:id", get(mission_locations))
}

async fn add_location(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(request): Json<CreateLocationRequest>,
) -> Result<Json<ApiResponse<Location>>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let location = controller.add(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        location,
        "Location added successfully".to_string(),
    )))
}

async fn vehicle_locations(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<LocationWindowQuery>,
) -> Result<Json<Vec<Location>>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let locations = controller.vehicle_locations(id, query).await?;
    Ok(Json(locations))
}

async fn location_history(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<LocationHistoryQuery>,
) -> Result<Json<Vec<Location>>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let locations = controller.history(id, query).await?;
    Ok(Json(locations))
}

async fn mission_locations(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Location>>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let locations = controller.mission_locations(id).await?;
    Ok(Json(locations))
}

async fn current_locations(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Vec<Location>>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let locations = controller.current_locations().await?;
    Ok(Json(locations))
}

/// Un paso de simulación de movimiento para toda la flota (demo)
async fn simulate_movement(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<Location>>>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let movements = controller.simulate().await?;
    let message = format!("Simulated movement for {} vehicles", movements.len());
    Ok(Json(ApiResponse::success_with_message(movements, message)))
}

async fn cleanup_locations(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = LocationController::new(state.pool.clone());
    let deleted = controller.cleanup(caller, query).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Deleted {} old location records", deleted)
    })))
}
