use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::mission_dto::{CreateMissionRequest, UpdateMissionRequest};
use crate::middleware::auth::AuthUser;
use crate::models::mission::Mission;
use crate::services::mission_service::MissionService;
use crate::utils::errors::{AppError, AppResult};

pub struct MissionController {
    service: MissionService,
}

impl MissionController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: MissionService::new(pool),
        }
    }

    pub async fn create(&self, caller: AuthUser, request: CreateMissionRequest) -> AppResult<Mission> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if request.scheduled_end <= request.scheduled_start {
            return Err(AppError::Validation(
                "scheduled_end must be after scheduled_start".to_string(),
            ));
        }

        self.service.create(request, caller.id, caller.role).await
    }

    pub async fn list(&self, caller: AuthUser) -> AppResult<Vec<Mission>> {
        self.service.list_for(caller.id, caller.role).await
    }

    pub async fn get(&self, caller: AuthUser, mission_id: Uuid) -> AppResult<Mission> {
        self.service.get_for(mission_id, caller.id, caller.role).await
    }

    pub async fn update(
        &self,
        caller: AuthUser,
        mission_id: Uuid,
        request: UpdateMissionRequest,
    ) -> AppResult<Mission> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.service.update(mission_id, request, caller.role).await
    }

    pub async fn start(&self, caller: AuthUser, mission_id: Uuid) -> AppResult<Mission> {
        self.service.start(mission_id, caller.id).await
    }

    pub async fn complete(&self, caller: AuthUser, mission_id: Uuid) -> AppResult<Mission> {
        self.service.complete(mission_id, caller.id).await
    }

    pub async fn cancel(&self, caller: AuthUser, mission_id: Uuid) -> AppResult<Mission> {
        self.service.cancel(mission_id, caller.role).await
    }

    pub async fn delete(&self, caller: AuthUser, mission_id: Uuid) -> AppResult<()> {
        self.service.delete(mission_id, caller.role).await
    }
}
