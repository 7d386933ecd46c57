use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::mission_controller::MissionController;
use crate::dto::common::ApiResponse;
use crate::dto::mission_dto::{CreateMissionRequest, UpdateMissionRequest};
use crate::middleware::auth::AuthUser;
use crate::models::mission::Mission;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mission_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_mission))
        .route("/", get(list_missions))
        .route("/:id", get(get_mission))
        .route("/:id", put(update_mission))
        .route("/:id", delete(delete_mission))
        .route("/:id/start", post(start_mission))
        .route("/:id/complete", post(complete_mission))
        .route("/:id/cancel", post(cancel_mission))
}

async fn create_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CreateMissionRequest>,
) -> Result<Json<ApiResponse<Mission>>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let mission = controller.create(caller, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        mission,
        "Mission created successfully".to_string(),
    )))
}

async fn list_missions(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Mission>>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let missions = controller.list(caller).await?;
    Ok(Json(missions))
}

async fn get_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Mission>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let mission = controller.get(caller, id).await?;
    Ok(Json(mission))
}

async fn update_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMissionRequest>,
) -> Result<Json<ApiResponse<Mission>>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let mission = controller.update(caller, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        mission,
        "Mission updated successfully".to_string(),
    )))
}

async fn start_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Mission>>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let mission = controller.start(caller, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        mission,
        "Mission started successfully".to_string(),
    )))
}

async fn complete_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Mission>>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let mission = controller.complete(caller, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        mission,
        "Mission completed successfully".to_string(),
    )))
}

async fn cancel_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Mission>>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    let mission = controller.cancel(caller, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        mission,
        "Mission cancelled successfully".to_string(),
    )))
}

async fn delete_mission(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = MissionController::new(state.pool.clone());
    controller.delete(caller, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Mission deleted successfully"
    })))
}
