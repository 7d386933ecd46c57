use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::anomaly::AnomalySeverity;

/// Request para registrar una anomalía manual. El tipo es libre (p.ej.
/// "excessive_fuel"); los tipos del detector se reservan a la detección
/// automática solo por convención.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnomalyRequest {
    #[validate(length(min = 1, max = 50))]
    pub anomaly_type: String,

    #[validate(length(min = 1))]
    pub description: String,

    /// Ausente = medium
    pub severity: Option<AnomalySeverity>,

    pub vehicle_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub user_id: Option<Uuid>,

    pub fuel_consumed: Option<f64>,
    pub expected_fuel: Option<f64>,

    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
}

/// Request de evaluación puntual de un vehículo contra su misión.
/// Solo evalúa las reglas; no persiste nada.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckVehicleRequest {
    pub vehicle_id: Uuid,
    pub mission_id: Uuid,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = 0.0))]
    pub speed: Option<f64>,
}

/// Filtros del listado de anomalías
#[derive(Debug, Deserialize)]
pub struct AnomalyFilters {
    pub vehicle_id: Option<Uuid>,
    pub mission_id: Option<Uuid>,
    pub severity: Option<AnomalySeverity>,
}

/// Ventana de la consulta de anomalías recientes
#[derive(Debug, Deserialize)]
pub struct RecentAnomaliesQuery {
    pub hours: Option<i64>,
}

/// Request para marcar una anomalía como resuelta
#[derive(Debug, Deserialize)]
pub struct ResolveAnomalyRequest {
    pub notes: Option<String>,
}
