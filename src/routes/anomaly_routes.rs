use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::anomaly_controller::AnomalyController;
use crate::dto::anomaly_dto::{
    AnomalyFilters, CheckVehicleRequest, CreateAnomalyRequest, RecentAnomaliesQuery,
    ResolveAnomalyRequest,
};
use crate::repositories::anomaly_repository::AnomalyDraft;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::AuthUser;
use crate::models::anomaly::Anomaly;
use crate::services::anomaly_service::DetectionReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_anomaly_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_anomalies))
        .route("/", post(create_anomaly))
        .route("/recent", get(recent_anomalies))
        .route("/detect", post(run_detection))
        .route("/check", post(check_vehicle))
        .route("/:id/resolve", patch(resolve_anomaly))
        .route("/:id", delete(delete_anomaly))
}

/// Pasada de detección sobre todas las misiones activas (admin/manager)
async fn run_detection(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<DetectionReport>>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    let report = controller.run_detection(caller).await?;
    let message = format!(
        "Anomaly detection completed. Found {} anomalies.",
        report.created_count
    );
    Ok(Json(ApiResponse::success_with_message(report, message)))
}

/// Evaluación puntual de un vehículo contra su misión, sin persistir
async fn check_vehicle(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(request): Json<CheckVehicleRequest>,
) -> Result<Json<Vec<AnomalyDraft>>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    let drafts = controller.check_vehicle(request).await?;
    Ok(Json(drafts))
}

async fn list_anomalies(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(filters): Query<AnomalyFilters>,
) -> Result<Json<Vec<Anomaly>>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    let anomalies = controller.list(filters).await?;
    Ok(Json(anomalies))
}

async fn recent_anomalies(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(query): Query<RecentAnomaliesQuery>,
) -> Result<Json<Vec<Anomaly>>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    let anomalies = controller.recent(query).await?;
    Ok(Json(anomalies))
}

async fn create_anomaly(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CreateAnomalyRequest>,
) -> Result<Json<ApiResponse<Anomaly>>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    let anomaly = controller.create_manual(caller, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        anomaly,
        "Anomaly created successfully".to_string(),
    )))
}

async fn resolve_anomaly(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveAnomalyRequest>,
) -> Result<Json<ApiResponse<Anomaly>>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    let anomaly = controller.resolve(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        anomaly,
        "Anomaly resolved successfully".to_string(),
    )))
}

async fn delete_anomaly(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = AnomalyController::new(state.pool.clone(), state.detection.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Anomaly deleted successfully"
    })))
}
