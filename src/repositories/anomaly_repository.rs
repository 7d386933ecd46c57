use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::anomaly::{Anomaly, AnomalySeverity, AnomalyType};
use crate::utils::errors::AppError;

/// Borrador de anomalía producido por las reglas del detector o por una
/// entrada manual; la persistencia es un paso separado de la evaluación.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnomalyDraft {
    pub anomaly_type: AnomalyType,
    pub description: String,
    pub severity: AnomalySeverity,
    pub vehicle_id: Uuid,
    pub mission_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub fuel_consumed: Option<f64>,
    pub expected_fuel: Option<f64>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
}

impl AnomalyDraft {
    /// Borrador mínimo del detector: tipo, severidad y descripción sobre
    /// un par vehículo/misión
    pub fn detected(
        anomaly_type: AnomalyType,
        severity: AnomalySeverity,
        description: String,
        vehicle_id: Uuid,
        mission_id: Option<Uuid>,
    ) -> Self {
        Self {
            anomaly_type,
            description,
            severity,
            vehicle_id,
            mission_id,
            user_id: None,
            fuel_consumed: None,
            expected_fuel: None,
            location_latitude: None,
            location_longitude: None,
        }
    }
}

pub struct AnomalyRepository {
    pool: PgPool,
}

impl AnomalyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, draft: AnomalyDraft) -> Result<Anomaly, AppError> {
        let anomaly_type = String::from(draft.anomaly_type);

        let anomaly = sqlx::query_as::<_, Anomaly>(
            r#"
            INSERT INTO anomalies (
                id, anomaly_type, description, severity, detected_at,
                vehicle_id, mission_id, user_id,
                fuel_consumed, expected_fuel, location_latitude, location_longitude,
                is_resolved, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(anomaly_type)
        .bind(draft.description)
        .bind(draft.severity)
        .bind(Utc::now())
        .bind(draft.vehicle_id)
        .bind(draft.mission_id)
        .bind(draft.user_id)
        .bind(draft.fuel_consumed)
        .bind(draft.expected_fuel)
        .bind(draft.location_latitude)
        .bind(draft.location_longitude)
        .fetch_one(&self.pool)
        .await?;

        Ok(anomaly)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Anomaly>, AppError> {
        let anomaly = sqlx::query_as::<_, Anomaly>("SELECT * FROM anomalies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(anomaly)
    }

    /// Listado con filtros opcionales por vehículo, misión y severidad
    pub async fn find_filtered(
        &self,
        vehicle_id: Option<Uuid>,
        mission_id: Option<Uuid>,
        severity: Option<AnomalySeverity>,
    ) -> Result<Vec<Anomaly>, AppError> {
        let anomalies = sqlx::query_as::<_, Anomaly>(
            r#"
            SELECT * FROM anomalies
            WHERE ($1::uuid IS NULL OR vehicle_id = $1)
              AND ($2::uuid IS NULL OR mission_id = $2)
              AND ($3::anomaly_severity IS NULL OR severity = $3)
            ORDER BY detected_at DESC
            "#,
        )
        .bind(vehicle_id)
        .bind(mission_id)
        .bind(severity)
        .fetch_all(&self.pool)
        .await?;

        Ok(anomalies)
    }

    pub async fn find_since(&self, threshold: DateTime<Utc>) -> Result<Vec<Anomaly>, AppError> {
        let anomalies = sqlx::query_as::<_, Anomaly>(
            "SELECT * FROM anomalies WHERE detected_at >= $1 ORDER BY detected_at DESC",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(anomalies)
    }

    /// Marcar como resuelta con notas; única mutación permitida
    pub async fn resolve(&self, id: Uuid, notes: Option<String>) -> Result<Anomaly, AppError> {
        let anomaly = sqlx::query_as::<_, Anomaly>(
            r#"
            UPDATE anomalies
            SET is_resolved = TRUE, resolution_notes = $2, resolved_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Anomaly not found".to_string()))?;

        Ok(anomaly)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM anomalies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Anomaly not found".to_string()));
        }

        Ok(())
    }
}
