use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::middleware::auth::AuthUser;
use crate::models::vehicle::Vehicle;
use crate::services::vehicle_service::ReconciliationReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(list_vehicles))
        .route("/reconcile", post(reconcile_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id", delete(delete_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let vehicle = controller.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle,
        "Vehicle created successfully".to_string(),
    )))
}

async fn get_vehicle(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let vehicle = controller.get(id).await?;
    Ok(Json(vehicle))
}

async fn list_vehicles(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let vehicles = controller.list().await?;
    Ok(Json(vehicles))
}

async fn update_vehicle(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let vehicle = controller.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle,
        "Vehicle updated successfully".to_string(),
    )))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehicle deleted successfully"
    })))
}

/// Reconciliación de estados de la flota (admin/manager)
async fn reconcile_vehicles(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<ReconciliationReport>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let report = controller.reconcile(caller).await?;
    let message = format!(
        "Reconciliation completed: {} released, {} conflicts",
        report.released.len(),
        report.conflicts.len()
    );
    Ok(Json(ApiResponse::success_with_message(report, message)))
}
