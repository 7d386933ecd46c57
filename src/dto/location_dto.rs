use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request para registrar una muestra GPS. Mismo formato para telemetría
/// real y simulada: speed en km/h, heading en grados, accuracy en metros.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub altitude: Option<f64>,

    #[validate(range(min = 0.0))]
    pub speed: Option<f64>,

    #[validate(range(min = 0.0, max = 360.0))]
    pub heading: Option<f64>,

    #[validate(range(min = 0.0))]
    pub accuracy: Option<f64>,

    /// Ausente = ahora
    pub timestamp: Option<DateTime<Utc>>,

    pub vehicle_id: Uuid,
    pub mission_id: Option<Uuid>,
}

/// Filtros de consulta de telemetría por vehículo
#[derive(Debug, Deserialize)]
pub struct LocationWindowQuery {
    pub hours: Option<i64>,
}

/// Filtros de historial por rango de fechas
#[derive(Debug, Deserialize)]
pub struct LocationHistoryQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Parámetros de la poda por retención
#[derive(Debug, Deserialize)]
pub struct CleanupQuery {
    pub days: Option<i64>,
}
