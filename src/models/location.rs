//! Modelo de Location
//!
//! Una observación GPS puntual e inmutable de un vehículo. Las filas son
//! append-only: nunca se actualizan, solo se podan por retención.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Location principal - mapea a la tabla locations
///
/// speed en km/h, heading en grados [0, 360), accuracy en metros.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub vehicle_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
