use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::DetectionConfig;
use crate::dto::anomaly_dto::{
    AnomalyFilters, CheckVehicleRequest, CreateAnomalyRequest, RecentAnomaliesQuery,
    ResolveAnomalyRequest,
};
use crate::middleware::auth::AuthUser;
use crate::models::anomaly::{Anomaly, AnomalySeverity, AnomalyType};
use crate::repositories::anomaly_repository::{AnomalyDraft, AnomalyRepository};
use crate::services::anomaly_service::{AnomalyService, DetectionReport};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_latitude, validate_longitude};

/// Ventana por defecto del listado de anomalías recientes
const DEFAULT_RECENT_HOURS: i64 = 24;

pub struct AnomalyController {
    repository: AnomalyRepository,
    service: AnomalyService,
}

impl AnomalyController {
    pub fn new(pool: PgPool, detection: DetectionConfig) -> Self {
        Self {
            repository: AnomalyRepository::new(pool.clone()),
            service: AnomalyService::new(pool, detection),
        }
    }

    /// Lanzar la pasada de detección sobre la flota
    pub async fn run_detection(&self, caller: AuthUser) -> AppResult<DetectionReport> {
        self.service.run_detection(caller.role).await
    }

    /// Evaluación puntual sin persistencia: devuelve los borradores que
    /// las reglas producirían para la posición dada
    pub async fn check_vehicle(&self, request: CheckVehicleRequest) -> AppResult<Vec<AnomalyDraft>> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.service
            .check_vehicle(
                request.vehicle_id,
                request.mission_id,
                request.latitude,
                request.longitude,
                request.speed,
            )
            .await
    }

    pub async fn list(&self, filters: AnomalyFilters) -> AppResult<Vec<Anomaly>> {
        self.repository
            .find_filtered(filters.vehicle_id, filters.mission_id, filters.severity)
            .await
    }

    pub async fn recent(&self, query: RecentAnomaliesQuery) -> AppResult<Vec<Anomaly>> {
        let hours = query.hours.unwrap_or(DEFAULT_RECENT_HOURS);
        self.repository
            .find_since(Utc::now() - Duration::hours(hours))
            .await
    }

    /// Registro manual de una anomalía por un operador
    pub async fn create_manual(
        &self,
        caller: AuthUser,
        request: CreateAnomalyRequest,
    ) -> AppResult<Anomaly> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(lat) = request.location_latitude {
            validate_latitude(lat)
                .map_err(|_| AppError::Validation("location_latitude out of range".to_string()))?;
        }
        if let Some(lon) = request.location_longitude {
            validate_longitude(lon)
                .map_err(|_| AppError::Validation("location_longitude out of range".to_string()))?;
        }

        let draft = AnomalyDraft {
            anomaly_type: AnomalyType::from(request.anomaly_type),
            description: request.description,
            severity: request.severity.unwrap_or(AnomalySeverity::Medium),
            vehicle_id: request.vehicle_id,
            mission_id: request.mission_id,
            user_id: request.user_id.or(Some(caller.id)),
            fuel_consumed: request.fuel_consumed,
            expected_fuel: request.expected_fuel,
            location_latitude: request.location_latitude,
            location_longitude: request.location_longitude,
        };

        self.repository.insert(draft).await
    }

    pub async fn resolve(
        &self,
        anomaly_id: Uuid,
        request: ResolveAnomalyRequest,
    ) -> AppResult<Anomaly> {
        self.repository.resolve(anomaly_id, request.notes).await
    }

    pub async fn delete(&self, anomaly_id: Uuid) -> AppResult<()> {
        self.repository.delete(anomaly_id).await
    }
}
