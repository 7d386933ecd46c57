//! Motor de detección de anomalías
//!
//! Las reglas son funciones puras: reciben el contexto actual y devuelven
//! un borrador de anomalía o nada. La persistencia es un paso separado que
//! ejecuta el servicio, de forma que las reglas se prueban sin base de
//! datos. La pasada batch recorre todas las misiones in_progress y aísla
//! los fallos por misión: una misión corrupta no ciega la detección del
//! resto de la flota.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DetectionConfig;
use crate::models::anomaly::{Anomaly, AnomalySeverity, AnomalyType};
use crate::models::location::Location;
use crate::models::mission::{Mission, MissionStatus};
use crate::models::user::UserRole;
use crate::repositories::anomaly_repository::{AnomalyDraft, AnomalyRepository};
use crate::repositories::location_repository::LocationRepository;
use crate::repositories::mission_repository::MissionRepository;
use crate::services::geo;
use crate::utils::errors::{AppError, AppResult};

/// Misiones evaluadas en paralelo por lote
const DETECTION_CHUNK_SIZE: usize = 8;

/// Resultado de una pasada de detección sobre la flota
#[derive(Debug, Serialize)]
pub struct DetectionReport {
    pub created_count: usize,
    pub anomalies: Vec<Anomaly>,
}

// ---------------------------------------------------------------------------
// Reglas puras
// ---------------------------------------------------------------------------

/// Desvío de ruta: el vehículo está lejos a la vez del origen y del destino
/// de la misión. Un vehículo cerca de cualquiera de los dos extremos sigue
/// "en misión"; solo la distancia simultánea a ambos indica desvío.
pub fn check_route_deviation(
    config: &DetectionConfig,
    mission: &Mission,
    current_lat: f64,
    current_lon: f64,
) -> Option<AnomalyDraft> {
    let from_start = geo::distance_km(
        current_lat,
        current_lon,
        mission.start_latitude,
        mission.start_longitude,
    );
    let from_end = geo::distance_km(
        current_lat,
        current_lon,
        mission.end_latitude,
        mission.end_longitude,
    );

    let threshold = config.route_deviation_threshold_km;
    if from_start > threshold && from_end > threshold {
        return Some(AnomalyDraft::detected(
            AnomalyType::RouteDeviation,
            AnomalySeverity::Medium,
            format!(
                "Vehicle deviated {:.1}km from start and {:.1}km from end",
                from_start, from_end
            ),
            mission.vehicle_id,
            Some(mission.id),
        ));
    }

    None
}

/// Exceso de velocidad sobre el límite configurado. Por encima de 1.5x el
/// límite la severidad sube a high.
pub fn check_speeding(
    config: &DetectionConfig,
    vehicle_id: Uuid,
    mission_id: Option<Uuid>,
    current_speed: f64,
) -> Option<AnomalyDraft> {
    let limit = config.speed_limit_kmh;
    if current_speed <= limit {
        return None;
    }

    let severity = if current_speed > limit * config.speeding_high_factor {
        AnomalySeverity::High
    } else {
        AnomalySeverity::Medium
    };

    Some(AnomalyDraft::detected(
        AnomalyType::Speeding,
        severity,
        format!(
            "Vehicle exceeded speed limit: {:.1} km/h (limit: {:.1} km/h)",
            current_speed, limit
        ),
        vehicle_id,
        mission_id,
    ))
}

/// Vehículo parado: las dos muestras más recientes dentro de la ventana
/// están a menos de idle_distance_km. Con menos de dos muestras no hay
/// veredicto (ni anomalía ni error).
pub fn check_idle(
    config: &DetectionConfig,
    vehicle_id: Uuid,
    mission_id: Option<Uuid>,
    recent_samples: &[Location],
) -> Option<AnomalyDraft> {
    if recent_samples.len() < 2 {
        return None;
    }

    let distance = geo::distance_km(
        recent_samples[0].latitude,
        recent_samples[0].longitude,
        recent_samples[1].latitude,
        recent_samples[1].longitude,
    );

    if distance < config.idle_distance_km {
        return Some(AnomalyDraft::detected(
            AnomalyType::Idle,
            AnomalySeverity::Medium,
            format!(
                "Vehicle idle for more than {} minutes",
                config.idle_window_minutes
            ),
            vehicle_id,
            mission_id,
        ));
    }

    None
}

/// Retraso sobre el horario: una misión pending cuyo arranque programado ya
/// pasó está "delayed"; una in_progress cuyo fin programado ya pasó está
/// "overdue". El umbral de severidad difiere entre ambos casos.
pub fn check_schedule_delay(
    config: &DetectionConfig,
    mission: &Mission,
    now: DateTime<Utc>,
) -> Option<AnomalyDraft> {
    match mission.status {
        MissionStatus::Pending if mission.scheduled_start < now => {
            let delay_minutes = (now - mission.scheduled_start).num_minutes();
            let severity = if delay_minutes > config.start_delay_high_minutes {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };

            Some(AnomalyDraft::detected(
                AnomalyType::Delay,
                severity,
                format!("Mission delayed by {} minutes", delay_minutes),
                mission.vehicle_id,
                Some(mission.id),
            ))
        }

        MissionStatus::InProgress if mission.scheduled_end < now => {
            let overrun_minutes = (now - mission.scheduled_end).num_minutes();
            let severity = if overrun_minutes > config.end_overrun_high_minutes {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };

            Some(AnomalyDraft::detected(
                AnomalyType::Delay,
                severity,
                format!("Mission overdue by {} minutes", overrun_minutes),
                mission.vehicle_id,
                Some(mission.id),
            ))
        }

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Servicio
// ---------------------------------------------------------------------------

pub struct AnomalyService {
    pool: PgPool,
    config: DetectionConfig,
}

impl AnomalyService {
    pub fn new(pool: PgPool, config: DetectionConfig) -> Self {
        Self { pool, config }
    }

    /// Pasada de detección sobre todas las misiones in_progress.
    ///
    /// Requiere rol de gestión: el check de permisos corre antes de evaluar
    /// ninguna regla. Las misiones se evalúan en lotes paralelos; un fallo
    /// evaluando una misión se loguea y se salta sin abortar el resto.
    pub async fn run_detection(&self, caller_role: UserRole) -> AppResult<DetectionReport> {
        if !caller_role.is_management() {
            return Err(AppError::Forbidden(
                "Insufficient permissions to run anomaly detection".to_string(),
            ));
        }

        let missions = MissionRepository::new(self.pool.clone())
            .find_by_status(MissionStatus::InProgress)
            .await?;

        log::info!("Running anomaly detection over {} active missions", missions.len());

        let mut anomalies: Vec<Anomaly> = Vec::new();

        for chunk in missions.chunks(DETECTION_CHUNK_SIZE) {
            let evaluations: Vec<_> = chunk
                .iter()
                .map(|mission| self.detect_and_persist(mission))
                .collect();

            for (mission, result) in chunk.iter().zip(futures::future::join_all(evaluations).await) {
                match result {
                    Ok(mut detected) => anomalies.append(&mut detected),
                    Err(e) => {
                        // Aislamiento de fallos parciales: la misión
                        // problemática se salta, el batch continúa
                        log::error!(
                            "Error detecting anomalies for mission {}: {}",
                            mission.id,
                            e
                        );
                    }
                }
            }
        }

        log::info!("Anomaly detection completed. Found {} anomalies", anomalies.len());

        Ok(DetectionReport {
            created_count: anomalies.len(),
            anomalies,
        })
    }

    /// Evaluación pura de un vehículo contra su misión: ejecuta las reglas
    /// y devuelve los borradores sin persistir nada. La persistencia es
    /// trabajo del llamador.
    pub async fn check_vehicle(
        &self,
        vehicle_id: Uuid,
        mission_id: Uuid,
        current_lat: f64,
        current_lon: f64,
        current_speed: Option<f64>,
    ) -> AppResult<Vec<AnomalyDraft>> {
        let mission = MissionRepository::new(self.pool.clone())
            .find_by_id(mission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mission not found".to_string()))?;

        let mut drafts = Vec::new();

        if let Some(draft) = check_route_deviation(&self.config, &mission, current_lat, current_lon)
        {
            drafts.push(draft);
        }

        if let Some(speed) = current_speed {
            if let Some(draft) = check_speeding(&self.config, vehicle_id, Some(mission_id), speed) {
                drafts.push(draft);
            }
        }

        let recent = self.recent_samples(vehicle_id).await?;
        if let Some(draft) = check_idle(&self.config, vehicle_id, Some(mission_id), &recent) {
            drafts.push(draft);
        }

        if let Some(draft) = check_schedule_delay(&self.config, &mission, Utc::now()) {
            drafts.push(draft);
        }

        Ok(drafts)
    }

    /// Evaluar una misión y persistir los resultados
    async fn detect_and_persist(&self, mission: &Mission) -> AppResult<Vec<Anomaly>> {
        let location_repo = LocationRepository::new(self.pool.clone());
        let anomaly_repo = AnomalyRepository::new(self.pool.clone());

        let mut drafts = Vec::new();

        // Las reglas de posición solo corren si el vehículo ya reportó
        // telemetría; el check de horario corre siempre
        if let Some(latest) = location_repo.find_latest_for_vehicle(mission.vehicle_id).await? {
            if let Some(draft) =
                check_route_deviation(&self.config, mission, latest.latitude, latest.longitude)
            {
                drafts.push(draft);
            }

            if let Some(speed) = latest.speed {
                if let Some(draft) =
                    check_speeding(&self.config, mission.vehicle_id, Some(mission.id), speed)
                {
                    drafts.push(draft);
                }
            }

            let recent = self.recent_samples(mission.vehicle_id).await?;
            if let Some(draft) =
                check_idle(&self.config, mission.vehicle_id, Some(mission.id), &recent)
            {
                drafts.push(draft);
            }
        }

        if let Some(draft) = check_schedule_delay(&self.config, mission, Utc::now()) {
            drafts.push(draft);
        }

        let mut anomalies = Vec::with_capacity(drafts.len());
        for draft in drafts {
            anomalies.push(anomaly_repo.insert(draft).await?);
        }

        Ok(anomalies)
    }

    /// Las dos muestras más recientes dentro de la ventana de inactividad
    async fn recent_samples(&self, vehicle_id: Uuid) -> AppResult<Vec<Location>> {
        LocationRepository::new(self.pool.clone())
            .find_recent_for_vehicle(
                vehicle_id,
                Duration::minutes(self.config.idle_window_minutes),
                2,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mission::MissionPriority;

    fn test_mission(status: MissionStatus) -> Mission {
        let now = Utc::now();
        Mission {
            id: Uuid::new_v4(),
            title: "Livraison Paris Nord".to_string(),
            description: None,
            status,
            priority: MissionPriority::Medium,
            start_latitude: 48.8566,
            start_longitude: 2.3522,
            start_address: None,
            end_latitude: 48.9000,
            end_longitude: 2.4000,
            end_address: None,
            scheduled_start: now,
            scheduled_end: now + Duration::hours(2),
            actual_start: None,
            actual_end: None,
            assigned_user_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_at(lat: f64, lon: f64, at: DateTime<Utc>, vehicle_id: Uuid) -> Location {
        Location {
            id: Uuid::new_v4(),
            latitude: lat,
            longitude: lon,
            altitude: None,
            speed: None,
            heading: None,
            accuracy: None,
            timestamp: at,
            vehicle_id,
            mission_id: None,
            created_at: at,
        }
    }

    #[test]
    fn test_route_deviation_far_from_both_anchors() {
        let config = DetectionConfig::default();
        let mission = test_mission(MissionStatus::InProgress);

        // (49.0, 2.0) queda a más de 2 km tanto del origen como del destino
        let draft = check_route_deviation(&config, &mission, 49.0, 2.0)
            .expect("expected a route deviation");
        assert_eq!(draft.anomaly_type, AnomalyType::RouteDeviation);
        assert_eq!(draft.severity, AnomalySeverity::Medium);
        assert_eq!(draft.mission_id, Some(mission.id));
    }

    #[test]
    fn test_route_deviation_none_at_start_point() {
        let config = DetectionConfig::default();
        let mission = test_mission(MissionStatus::InProgress);

        let draft = check_route_deviation(
            &config,
            &mission,
            mission.start_latitude,
            mission.start_longitude,
        );
        assert!(draft.is_none());
    }

    #[test]
    fn test_speeding_medium_and_high() {
        let config = DetectionConfig::default();
        let vehicle = Uuid::new_v4();

        let medium = check_speeding(&config, vehicle, None, 100.0).unwrap();
        assert_eq!(medium.severity, AnomalySeverity::Medium);
        assert!(medium.description.contains("100.0"));
        assert!(medium.description.contains("80.0"));

        // 130 > 1.5 * 80 = 120
        let high = check_speeding(&config, vehicle, None, 130.0).unwrap();
        assert_eq!(high.severity, AnomalySeverity::High);
    }

    #[test]
    fn test_speeding_under_limit() {
        let config = DetectionConfig::default();
        assert!(check_speeding(&config, Uuid::new_v4(), None, 70.0).is_none());
    }

    #[test]
    fn test_idle_detected_for_stationary_samples() {
        let config = DetectionConfig::default();
        let vehicle = Uuid::new_v4();
        let now = Utc::now();

        let samples = vec![
            sample_at(48.8566, 2.3522, now, vehicle),
            sample_at(48.8566, 2.3522, now - Duration::seconds(30), vehicle),
        ];

        let draft = check_idle(&config, vehicle, None, &samples).expect("expected idle");
        assert_eq!(draft.anomaly_type, AnomalyType::Idle);
        assert_eq!(draft.severity, AnomalySeverity::Medium);
    }

    #[test]
    fn test_idle_none_when_moving() {
        let config = DetectionConfig::default();
        let vehicle = Uuid::new_v4();
        let now = Utc::now();

        // ~5 km de separación
        let samples = vec![
            sample_at(48.8566, 2.3522, now, vehicle),
            sample_at(48.9000, 2.3522, now - Duration::minutes(10), vehicle),
        ];

        assert!(check_idle(&config, vehicle, None, &samples).is_none());
    }

    #[test]
    fn test_idle_none_with_single_sample() {
        let config = DetectionConfig::default();
        let vehicle = Uuid::new_v4();
        let samples = vec![sample_at(48.8566, 2.3522, Utc::now(), vehicle)];

        assert!(check_idle(&config, vehicle, None, &samples).is_none());
    }

    #[test]
    fn test_schedule_delay_pending_high_after_90_minutes() {
        let config = DetectionConfig::default();
        let now = Utc::now();
        let mut mission = test_mission(MissionStatus::Pending);
        mission.scheduled_start = now - Duration::minutes(90);

        let draft = check_schedule_delay(&config, &mission, now).expect("expected delay");
        assert_eq!(draft.severity, AnomalySeverity::High);
        assert!(draft.description.contains("delayed by 90 minutes"));
    }

    #[test]
    fn test_schedule_delay_pending_medium_after_10_minutes() {
        let config = DetectionConfig::default();
        let now = Utc::now();
        let mut mission = test_mission(MissionStatus::Pending);
        mission.scheduled_start = now - Duration::minutes(10);

        let draft = check_schedule_delay(&config, &mission, now).expect("expected delay");
        assert_eq!(draft.severity, AnomalySeverity::Medium);
    }

    #[test]
    fn test_schedule_delay_in_progress_overdue() {
        let config = DetectionConfig::default();
        let now = Utc::now();
        let mut mission = test_mission(MissionStatus::InProgress);
        mission.scheduled_end = now - Duration::minutes(130);

        let draft = check_schedule_delay(&config, &mission, now).expect("expected delay");
        assert_eq!(draft.severity, AnomalySeverity::High);
        assert!(draft.description.contains("overdue by 130 minutes"));
    }

    #[test]
    fn test_schedule_delay_none_when_on_time() {
        let config = DetectionConfig::default();
        let now = Utc::now();
        let mission = test_mission(MissionStatus::Pending);

        // scheduled_start == now no cuenta como retraso todavía
        assert!(check_schedule_delay(&config, &mission, mission.scheduled_start).is_none());

        let mut future = test_mission(MissionStatus::InProgress);
        future.scheduled_end = now + Duration::hours(1);
        assert!(check_schedule_delay(&config, &future, now).is_none());
    }

    #[test]
    fn test_terminal_missions_never_delayed() {
        let config = DetectionConfig::default();
        let now = Utc::now();
        let mut mission = test_mission(MissionStatus::Completed);
        mission.scheduled_end = now - Duration::hours(5);

        assert!(check_schedule_delay(&config, &mission, now).is_none());
    }
}
