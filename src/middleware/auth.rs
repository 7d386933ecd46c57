//! Extracción del usuario autenticado
//!
//! Extractor de Axum que valida el Bearer token y expone el id y rol del
//! llamador a los handlers. Los checks de permisos por operación viven en
//! los servicios; aquí solo se establece la identidad.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token};

/// Usuario autenticado del request actual
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = extract_token_from_header(header)?;
        let claims = verify_token(token, &state.jwt)?;

        Ok(AuthUser {
            id: claims.user_id()?,
            role: claims.role,
        })
    }
}
