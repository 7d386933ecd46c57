//! Modelo de Anomaly
//!
//! Desviaciones operativas detectadas por el sistema (ruta, velocidad,
//! inactividad, retraso) o registradas manualmente por un operador.
//! Solo mutan para marcar su resolución.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Severidad de la anomalía - mapea al ENUM anomaly_severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "anomaly_severity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Tipo de anomalía. Los cuatro primeros los emite el detector; las
/// entradas manuales pueden traer tipos libres (p.ej. "excessive_fuel")
/// que se conservan en la variante Other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnomalyType {
    RouteDeviation,
    Speeding,
    Idle,
    Delay,
    Other(String),
}

impl AnomalyType {
    pub fn as_str(&self) -> &str {
        match self {
            AnomalyType::RouteDeviation => "route_deviation",
            AnomalyType::Speeding => "speeding",
            AnomalyType::Idle => "idle",
            AnomalyType::Delay => "delay",
            AnomalyType::Other(s) => s,
        }
    }
}

impl From<String> for AnomalyType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "route_deviation" => AnomalyType::RouteDeviation,
            "speeding" => AnomalyType::Speeding,
            "idle" => AnomalyType::Idle,
            "delay" => AnomalyType::Delay,
            _ => AnomalyType::Other(s),
        }
    }
}

impl From<AnomalyType> for String {
    fn from(t: AnomalyType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anomaly principal - mapea a la tabla anomalies
///
/// anomaly_type se persiste como TEXT para admitir los tipos libres de
/// las entradas manuales; usar kind() para obtener la variante tipada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Anomaly {
    pub id: Uuid,
    pub anomaly_type: String,
    pub description: String,
    pub severity: AnomalySeverity,
    pub detected_at: DateTime<Utc>,
    pub vehicle_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub fuel_consumed: Option<f64>,
    pub expected_fuel: Option<f64>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    pub is_resolved: bool,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyType {
        AnomalyType::from(self.anomaly_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_type_roundtrip() {
        assert_eq!(AnomalyType::from("speeding".to_string()), AnomalyType::Speeding);
        assert_eq!(AnomalyType::RouteDeviation.as_str(), "route_deviation");

        // Los tipos desconocidos se conservan tal cual
        let other = AnomalyType::from("excessive_fuel".to_string());
        assert_eq!(other, AnomalyType::Other("excessive_fuel".to_string()));
        assert_eq!(other.as_str(), "excessive_fuel");
    }

    #[test]
    fn test_anomaly_kind_parses_stored_type() {
        let now = Utc::now();
        let anomaly = Anomaly {
            id: Uuid::new_v4(),
            anomaly_type: "idle".to_string(),
            description: "Vehicle idle for more than 30 minutes".to_string(),
            severity: AnomalySeverity::Medium,
            detected_at: now,
            vehicle_id: Uuid::new_v4(),
            mission_id: None,
            user_id: None,
            fuel_consumed: None,
            expected_fuel: None,
            location_latitude: None,
            location_longitude: None,
            is_resolved: false,
            resolution_notes: None,
            resolved_at: None,
            created_at: now,
        };

        assert_eq!(anomaly.kind(), AnomalyType::Idle);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AnomalySeverity::Low < AnomalySeverity::Medium);
        assert!(AnomalySeverity::High < AnomalySeverity::Critical);
    }
}
