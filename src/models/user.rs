//! Modelo de User
//!
//! Usuarios del sistema: administradores, managers de flota y conductores.
//! Los conductores son los operadores asignados a las misiones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Driver,
}

impl UserRole {
    /// Los roles de gestión pueden crear/cancelar misiones y lanzar la
    /// detección de anomalías sobre toda la flota.
    pub fn is_management(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}

/// User principal - mapea a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}
