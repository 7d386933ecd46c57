use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::mission::{Mission, MissionPriority, MissionStatus};
use crate::utils::errors::AppError;

/// Campos de una misión nueva, ya validados por el servicio
pub struct NewMission {
    pub title: String,
    pub description: Option<String>,
    pub priority: MissionPriority,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_address: Option<String>,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub end_address: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub assigned_user_id: Uuid,
    pub vehicle_id: Uuid,
    pub created_by: Uuid,
}

pub struct MissionRepository {
    pool: PgPool,
}

impl MissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Mission>, AppError> {
        let mission = sqlx::query_as::<_, Mission>("SELECT * FROM missions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(mission)
    }

    pub async fn find_all(&self) -> Result<Vec<Mission>, AppError> {
        let missions =
            sqlx::query_as::<_, Mission>("SELECT * FROM missions ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(missions)
    }

    pub async fn find_by_assigned_user(&self, user_id: Uuid) -> Result<Vec<Mission>, AppError> {
        let missions = sqlx::query_as::<_, Mission>(
            "SELECT * FROM missions WHERE assigned_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(missions)
    }

    pub async fn find_by_status(&self, status: MissionStatus) -> Result<Vec<Mission>, AppError> {
        let missions = sqlx::query_as::<_, Mission>(
            "SELECT * FROM missions WHERE status = $1 ORDER BY scheduled_start",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(missions)
    }

    /// Insertar la misión dentro de la transacción de creación
    pub async fn insert(conn: &mut PgConnection, new: NewMission) -> Result<Mission, AppError> {
        let mission = sqlx::query_as::<_, Mission>(
            r#"
            INSERT INTO missions (
                id, title, description, status, priority,
                start_latitude, start_longitude, start_address,
                end_latitude, end_longitude, end_address,
                scheduled_start, scheduled_end,
                assigned_user_id, vehicle_id, created_by,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.title)
        .bind(new.description)
        .bind(new.priority)
        .bind(new.start_latitude)
        .bind(new.start_longitude)
        .bind(new.start_address)
        .bind(new.end_latitude)
        .bind(new.end_longitude)
        .bind(new.end_address)
        .bind(new.scheduled_start)
        .bind(new.scheduled_end)
        .bind(new.assigned_user_id)
        .bind(new.vehicle_id)
        .bind(new.created_by)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(mission)
    }

    /// Transición de estado dentro de una transacción, fijando los
    /// timestamps reales según corresponda
    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: MissionStatus,
        actual_start: Option<DateTime<Utc>>,
        actual_end: Option<DateTime<Utc>>,
    ) -> Result<Mission, AppError> {
        let mission = sqlx::query_as::<_, Mission>(
            r#"
            UPDATE missions
            SET status = $2,
                actual_start = COALESCE($3, actual_start),
                actual_end = COALESCE($4, actual_end),
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(actual_start)
        .bind(actual_end)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(mission)
    }

    /// Actualización de campos de una misión (solo la invoca el servicio
    /// tras validar el estado y las referencias)
    pub async fn update_fields(&self, mission: &Mission) -> Result<Mission, AppError> {
        let updated = sqlx::query_as::<_, Mission>(
            r#"
            UPDATE missions
            SET title = $2, description = $3, priority = $4,
                start_latitude = $5, start_longitude = $6, start_address = $7,
                end_latitude = $8, end_longitude = $9, end_address = $10,
                scheduled_start = $11, scheduled_end = $12,
                assigned_user_id = $13, vehicle_id = $14, updated_at = $15
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(mission.id)
        .bind(&mission.title)
        .bind(&mission.description)
        .bind(mission.priority)
        .bind(mission.start_latitude)
        .bind(mission.start_longitude)
        .bind(&mission.start_address)
        .bind(mission.end_latitude)
        .bind(mission.end_longitude)
        .bind(&mission.end_address)
        .bind(mission.scheduled_start)
        .bind(mission.scheduled_end)
        .bind(mission.assigned_user_id)
        .bind(mission.vehicle_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Borrar la misión dentro de la transacción de eliminación
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM missions WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }
}
