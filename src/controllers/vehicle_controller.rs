use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::middleware::auth::AuthUser;
use crate::models::vehicle::Vehicle;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::vehicle_service::{ReconciliationReport, VehicleService};
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::validate_not_empty;

pub struct VehicleController {
    repository: VehicleRepository,
    service: VehicleService,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            service: VehicleService::new(pool),
        }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        validate_not_empty(&request.license_plate)
            .map_err(|_| AppError::Validation("License plate is required".to_string()))?;

        if self.repository.license_plate_exists(&request.license_plate).await? {
            return Err(AppError::Validation(format!(
                "License plate '{}' is already registered",
                request.license_plate
            )));
        }

        self.repository
            .create(
                request.license_plate,
                request.brand,
                request.model,
                request.year,
                request.color,
                request.fuel_type,
            )
            .await
    }

    pub async fn get(&self, vehicle_id: Uuid) -> AppResult<Vehicle> {
        self.repository
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        self.repository.find_all().await
    }

    pub async fn update(&self, vehicle_id: Uuid, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository
            .update(
                vehicle_id,
                request.license_plate,
                request.brand,
                request.model,
                request.year,
                request.color,
                request.fuel_type,
                request.status,
            )
            .await
    }

    pub async fn delete(&self, vehicle_id: Uuid) -> AppResult<()> {
        self.repository.delete(vehicle_id).await
    }

    /// Pasada de reconciliación de estados de la flota
    pub async fn reconcile(&self, caller: AuthUser) -> AppResult<ReconciliationReport> {
        self.service.reconcile_statuses(caller.role).await
    }
}
