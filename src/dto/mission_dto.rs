use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::mission::MissionPriority;

/// Request para crear una misión. Las referencias a conductor y vehículo
/// son obligatorias: una misión sin ellas no puede existir.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMissionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default = "default_priority")]
    pub priority: MissionPriority,

    #[validate(range(min = -90.0, max = 90.0))]
    pub start_latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub start_longitude: f64,

    #[validate(length(max = 500))]
    pub start_address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub end_latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub end_longitude: f64,

    #[validate(length(max = 500))]
    pub end_address: Option<String>,

    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,

    pub assigned_user_id: Uuid,
    pub vehicle_id: Uuid,
}

fn default_priority() -> MissionPriority {
    MissionPriority::Medium
}

/// Request para editar una misión; todos los campos son opcionales
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMissionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub priority: Option<MissionPriority>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub start_latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub start_longitude: Option<f64>,

    #[validate(length(max = 500))]
    pub start_address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub end_latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub end_longitude: Option<f64>,

    #[validate(length(max = 500))]
    pub end_address: Option<String>,

    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,

    pub assigned_user_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
}
