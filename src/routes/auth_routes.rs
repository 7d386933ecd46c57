use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn register(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    let profile = controller.register(caller, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        profile,
        "User registered successfully".to_string(),
    )))
}

async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    let profile = controller.me(caller).await?;
    Ok(Json(ApiResponse::success(profile)))
}
