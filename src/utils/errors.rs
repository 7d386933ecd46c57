//! Sistema de manejo de errores
//!
//! Las operaciones del núcleo devuelven errores tipados según la taxonomía
//! del dominio, de forma que los llamadores ramifican por variante en lugar
//! de parsear mensajes. La capa HTTP los convierte en respuestas JSON con
//! un código estable por variante.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transición de misión intentada desde un estado que no la admite
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Asignación de un vehículo que no está disponible
    #[error("Vehicle unavailable: {0}")]
    VehicleUnavailable(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status HTTP, título y código estable de cada variante
    fn http_parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AppError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database Error", "DB_ERROR")
            }
            AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "Validation Error", "VALIDATION_ERROR")
            }
            AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", "UNAUTHORIZED")
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found", "NOT_FOUND"),
            AppError::InvalidState(_) => (StatusCode::CONFLICT, "Invalid State", "INVALID_STATE"),
            AppError::VehicleUnavailable(_) => {
                (StatusCode::CONFLICT, "Vehicle Unavailable", "VEHICLE_UNAVAILABLE")
            }
            AppError::Jwt(_) => (StatusCode::UNAUTHORIZED, "JWT Error", "JWT_ERROR"),
            AppError::Hash(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Hash Error", "HASH_ERROR")
            }
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", "INTERNAL_ERROR")
            }
        }
    }

    /// Mensaje expuesto al cliente. Los errores de servidor no filtran
    /// detalles internos; el detalle queda en los logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            AppError::Hash(_) => "An error occurred while processing credentials".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidState(msg)
            | AppError::VehicleUnavailable(msg)
            | AppError::Jwt(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, code) = self.http_parts();

        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = json!({
            "error": error,
            "message": self.public_message(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_mapping_per_variant() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidState("x".into()), StatusCode::CONFLICT),
            (AppError::VehicleUnavailable("x".into()), StatusCode::CONFLICT),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        ];

        for (error, expected) in cases {
            assert_eq!(error.http_parts().0, expected);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let error = AppError::Internal("connection pool poisoned".to_string());
        assert!(!error.public_message().contains("pool"));
    }

    #[test]
    fn test_helper_messages() {
        let err = not_found_error("Mission", "abc");
        assert!(matches!(err, AppError::NotFound(ref m) if m.contains("Mission")));

        let err = forbidden_error("cancel missions", "management role required");
        assert!(matches!(err, AppError::Forbidden(ref m) if m.starts_with("Cannot cancel")));
    }
}
