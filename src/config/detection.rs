//! Umbrales de detección de anomalías
//!
//! Los umbrales viven en una estructura explícita que se pasa al detector
//! en su construcción; no hay constantes ambientales repartidas por el
//! código. Todos los valores pueden sobreescribirse por entorno.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuración del detector de anomalías
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Distancia (km) a ambos extremos de la misión a partir de la cual
    /// se considera desvío de ruta
    pub route_deviation_threshold_km: f64,
    /// Límite de velocidad en km/h
    pub speed_limit_kmh: f64,
    /// Factor sobre el límite a partir del cual el exceso es severidad high
    pub speeding_high_factor: f64,
    /// Ventana (minutos) para evaluar inactividad
    pub idle_window_minutes: i64,
    /// Distancia (km) bajo la cual dos muestras consecutivas cuentan
    /// como vehículo parado
    pub idle_distance_km: f64,
    /// Minutos de retraso de arranque a partir de los cuales la severidad
    /// pasa de medium a high
    pub start_delay_high_minutes: i64,
    /// Minutos de sobrepaso del fin programado a partir de los cuales la
    /// severidad pasa de medium a high
    pub end_overrun_high_minutes: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            route_deviation_threshold_km: 2.0,
            speed_limit_kmh: 80.0,
            speeding_high_factor: 1.5,
            idle_window_minutes: 30,
            idle_distance_km: 0.1,
            start_delay_high_minutes: 60,
            end_overrun_high_minutes: 120,
        }
    }
}

impl DetectionConfig {
    /// Leer overrides del entorno sobre los defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = read_f64("DETECTION_ROUTE_DEVIATION_KM") {
            config.route_deviation_threshold_km = v;
        }
        if let Some(v) = read_f64("DETECTION_SPEED_LIMIT_KMH") {
            config.speed_limit_kmh = v;
        }
        if let Some(v) = read_i64("DETECTION_IDLE_WINDOW_MINUTES") {
            config.idle_window_minutes = v;
        }

        config
    }
}

fn read_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn read_i64(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
