use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::location::Location;
use crate::utils::errors::AppError;

/// Campos de una muestra GPS nueva. El formato es idéntico para telemetría
/// real y simulada: speed en km/h, heading en grados.
pub struct NewLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub vehicle_id: Uuid,
    pub mission_id: Option<Uuid>,
}

pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar una muestra dentro de una transacción. Las filas son
    /// append-only: no existe update.
    pub async fn insert(conn: &mut PgConnection, new: NewLocation) -> Result<Location, AppError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (
                id, latitude, longitude, altitude, speed, heading, accuracy,
                timestamp, vehicle_id, mission_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.altitude)
        .bind(new.speed)
        .bind(new.heading)
        .bind(new.accuracy)
        .bind(new.timestamp)
        .bind(new.vehicle_id)
        .bind(new.mission_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(location)
    }

    /// Última muestra conocida de un vehículo
    pub async fn find_latest_for_vehicle(&self, vehicle_id: Uuid) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE vehicle_id = $1 ORDER BY timestamp DESC LIMIT 1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    /// Las n muestras más recientes de un vehículo dentro de una ventana
    /// hacia atrás desde ahora
    pub async fn find_recent_for_vehicle(
        &self,
        vehicle_id: Uuid,
        window: Duration,
        limit: i64,
    ) -> Result<Vec<Location>, AppError> {
        let threshold = Utc::now() - window;

        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT * FROM locations
            WHERE vehicle_id = $1 AND timestamp >= $2
            ORDER BY timestamp DESC
            LIMIT $3
            "#,
        )
        .bind(vehicle_id)
        .bind(threshold)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    pub async fn find_by_mission(&self, mission_id: Uuid) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE mission_id = $1 ORDER BY timestamp DESC",
        )
        .bind(mission_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Historial de un vehículo acotado por fechas opcionales
    pub async fn find_history_for_vehicle(
        &self,
        vehicle_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT * FROM locations
            WHERE vehicle_id = $1
              AND ($2::timestamptz IS NULL OR timestamp >= $2)
              AND ($3::timestamptz IS NULL OR timestamp <= $3)
            ORDER BY timestamp DESC
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Última muestra de cada vehículo de la flota
    pub async fn find_latest_per_vehicle(&self) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT DISTINCT ON (vehicle_id) *
            FROM locations
            ORDER BY vehicle_id, timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Poda por retención: borra muestras anteriores al umbral y devuelve
    /// cuántas se eliminaron. Única vía de borrado de telemetría.
    pub async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE timestamp < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
