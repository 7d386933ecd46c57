use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::utils::errors::AppError;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        license_plate: String,
        brand: String,
        model: String,
        year: Option<i32>,
        color: Option<String>,
        fuel_type: Option<String>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, license_plate, brand, model, year, color, fuel_type, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'available', $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(license_plate)
        .bind(brand)
        .bind(model)
        .bind(year)
        .bind(color)
        .bind(fuel_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(vehicles)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        id: Uuid,
        license_plate: Option<String>,
        brand: Option<String>,
        model: Option<String>,
        year: Option<i32>,
        color: Option<String>,
        fuel_type: Option<String>,
        status: Option<VehicleStatus>,
    ) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET license_plate = $2, brand = $3, model = $4, year = $5, color = $6,
                fuel_type = $7, status = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(license_plate.unwrap_or(current.license_plate))
        .bind(brand.unwrap_or(current.brand))
        .bind(model.unwrap_or(current.model))
        .bind(year.or(current.year))
        .bind(color.or(current.color))
        .bind(fuel_type.or(current.fuel_type))
        .bind(status.unwrap_or(current.status))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        Ok(())
    }

    /// Actualizar la posición actual del vehículo tras ingerir telemetría
    pub async fn update_position(
        conn: &mut PgConnection,
        id: Uuid,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET current_latitude = $2, current_longitude = $3,
                last_location_update = $4, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Bloquear la fila del vehículo dentro de una transacción.
    ///
    /// Toda transición de misión que toque el estado del vehículo pasa por
    /// aquí: dos transiciones concurrentes sobre el mismo vehículo quedan
    /// serializadas por el lock de fila.
    pub async fn lock_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(vehicle)
    }

    /// Cambiar el estado del vehículo dentro de una transacción
    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE vehicles SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Vehículos en in_use junto al número de misiones activas que los
    /// referencian. Base de la pasada de reconciliación.
    pub async fn find_in_use_with_active_mission_count(
        &self,
    ) -> Result<Vec<(Vehicle, i64)>, AppError> {
        let rows = sqlx::query_as::<_, VehicleWithCount>(
            r#"
            SELECT v.*, COUNT(m.id) AS active_missions
            FROM vehicles v
            LEFT JOIN missions m
                ON m.vehicle_id = v.id AND m.status IN ('pending', 'in_progress')
            WHERE v.status = 'in_use'
            GROUP BY v.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.vehicle, row.active_missions))
            .collect())
    }
}

struct VehicleWithCount {
    vehicle: Vehicle,
    active_missions: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for VehicleWithCount {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::{FromRow, Row};
        Ok(Self {
            vehicle: Vehicle::from_row(row)?,
            active_missions: row.try_get("active_missions")?,
        })
    }
}
