//! Modelo de Mission
//!
//! Una misión asigna un conductor y un vehículo a un trayecto entre dos
//! puntos geográficos dentro de una ventana horaria. El ciclo de vida es
//! pending -> in_progress -> completed, con cancelled alcanzable desde
//! pending o in_progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la misión - mapea al ENUM mission_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "mission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Pending => "pending",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Completed => "completed",
            MissionStatus::Cancelled => "cancelled",
        }
    }

    /// Estados terminales: la misión ya no admite transiciones
    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Cancelled)
    }

    /// Una misión solo puede eliminarse si nunca llegó a ejecutarse
    pub fn is_deletable(&self) -> bool {
        matches!(self, MissionStatus::Pending | MissionStatus::Cancelled)
    }
}

/// Prioridad de la misión - mapea al ENUM mission_priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "mission_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MissionPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Mission principal - mapea a la tabla missions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mission {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: MissionStatus,
    pub priority: MissionPriority,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_address: Option<String>,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub end_address: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub assigned_user_id: Uuid,
    pub vehicle_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
