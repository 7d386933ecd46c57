use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::location_dto::{
    CleanupQuery, CreateLocationRequest, LocationHistoryQuery, LocationWindowQuery,
};
use crate::middleware::auth::AuthUser;
use crate::models::location::Location;
use crate::services::location_service::LocationService;
use crate::services::tracking_service::TrackingService;
use crate::utils::errors::{AppError, AppResult};

pub struct LocationController {
    service: LocationService,
    tracking: TrackingService,
}

impl LocationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: LocationService::new(pool.clone()),
            tracking: TrackingService::new(pool),
        }
    }

    pub async fn add(&self, request: CreateLocationRequest) -> AppResult<Location> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.service.add_location(request).await
    }

    pub async fn vehicle_locations(
        &self,
        vehicle_id: Uuid,
        query: LocationWindowQuery,
    ) -> AppResult<Vec<Location>> {
        self.service.vehicle_locations(vehicle_id, query.hours).await
    }

    pub async fn mission_locations(&self, mission_id: Uuid) -> AppResult<Vec<Location>> {
        self.service.mission_locations(mission_id).await
    }

    pub async fn current_locations(&self) -> AppResult<Vec<Location>> {
        self.service.current_locations().await
    }

    pub async fn history(
        &self,
        vehicle_id: Uuid,
        query: LocationHistoryQuery,
    ) -> AppResult<Vec<Location>> {
        self.service
            .location_history(vehicle_id, query.start_date, query.end_date)
            .await
    }

    /// Un paso de simulación de movimiento para toda la flota (demo)
    pub async fn simulate(&self) -> AppResult<Vec<Location>> {
        self.tracking.simulate_fleet().await
    }

    pub async fn cleanup(&self, caller: AuthUser, query: CleanupQuery) -> AppResult<u64> {
        self.service.cleanup_old_locations(query.days, caller.role).await
    }
}
