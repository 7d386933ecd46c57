//! Ingesta y consulta de telemetría
//!
//! Las muestras GPS son append-only. La inserción actualiza la posición
//! actual del vehículo en la misma transacción; el único borrado posible
//! es la poda por retención, reservada a administradores.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::location_dto::CreateLocationRequest;
use crate::models::location::Location;
use crate::models::user::UserRole;
use crate::repositories::location_repository::{LocationRepository, NewLocation};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{forbidden_error, AppError, AppResult};

/// Ventana por defecto de las consultas de telemetría reciente
const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Retención por defecto de la poda de muestras
const DEFAULT_RETENTION_DAYS: i64 = 30;

pub struct LocationService {
    pool: PgPool,
}

impl LocationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registrar una muestra GPS. El vehículo referenciado debe existir;
    /// una referencia colgante se rechaza en lugar de dejar deriva.
    pub async fn add_location(&self, request: CreateLocationRequest) -> AppResult<Location> {
        VehicleRepository::new(self.pool.clone())
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let location = LocationRepository::insert(
            &mut tx,
            NewLocation {
                latitude: request.latitude,
                longitude: request.longitude,
                altitude: request.altitude,
                speed: request.speed,
                heading: request.heading,
                accuracy: request.accuracy,
                timestamp: request.timestamp.unwrap_or_else(Utc::now),
                vehicle_id: request.vehicle_id,
                mission_id: request.mission_id,
            },
        )
        .await?;

        VehicleRepository::update_position(
            &mut tx,
            request.vehicle_id,
            request.latitude,
            request.longitude,
        )
        .await?;

        tx.commit().await?;

        Ok(location)
    }

    /// Muestras de un vehículo dentro de las últimas `hours` horas
    pub async fn vehicle_locations(
        &self,
        vehicle_id: Uuid,
        hours: Option<i64>,
    ) -> AppResult<Vec<Location>> {
        VehicleRepository::new(self.pool.clone())
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        LocationRepository::new(self.pool.clone())
            .find_recent_for_vehicle(
                vehicle_id,
                Duration::hours(hours.unwrap_or(DEFAULT_WINDOW_HOURS)),
                i64::MAX,
            )
            .await
    }

    pub async fn mission_locations(&self, mission_id: Uuid) -> AppResult<Vec<Location>> {
        LocationRepository::new(self.pool.clone())
            .find_by_mission(mission_id)
            .await
    }

    /// Última posición conocida de cada vehículo de la flota
    pub async fn current_locations(&self) -> AppResult<Vec<Location>> {
        LocationRepository::new(self.pool.clone())
            .find_latest_per_vehicle()
            .await
    }

    /// Historial de un vehículo acotado por fechas
    pub async fn location_history(
        &self,
        vehicle_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Location>> {
        VehicleRepository::new(self.pool.clone())
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        LocationRepository::new(self.pool.clone())
            .find_history_for_vehicle(vehicle_id, from, to)
            .await
    }

    /// Poda por retención: borra muestras más antiguas que `days` días.
    /// Operación privilegiada, solo administradores.
    pub async fn cleanup_old_locations(
        &self,
        days: Option<i64>,
        caller_role: UserRole,
    ) -> AppResult<u64> {
        if caller_role != UserRole::Admin {
            return Err(forbidden_error(
                "delete location history",
                "administrator role required",
            ));
        }

        let days = days.unwrap_or(DEFAULT_RETENTION_DAYS);
        let threshold = Utc::now() - Duration::days(days);

        let deleted = LocationRepository::new(self.pool.clone())
            .delete_older_than(threshold)
            .await?;

        log::info!("Retention cleanup deleted {} location records older than {} days", deleted, days);

        Ok(deleted)
    }
}
