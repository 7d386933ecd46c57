//! Máquina de estados de misiones
//!
//! Gobierna el ciclo de vida pending -> in_progress -> completed/cancelled
//! y sus efectos sobre el estado del vehículo asignado. Cada transición es
//! atómica: el cambio de estado de la misión y el del vehículo se
//! confirman juntos o no se confirman. La fila del vehículo se bloquea
//! (SELECT ... FOR UPDATE) para serializar transiciones concurrentes que
//! compitan por el mismo vehículo.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::mission_dto::{CreateMissionRequest, UpdateMissionRequest};
use crate::models::mission::{Mission, MissionStatus};
use crate::models::user::UserRole;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::location_repository::{LocationRepository, NewLocation};
use crate::repositories::mission_repository::{MissionRepository, NewMission};
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::tracking_service;
use crate::utils::errors::{not_found_error, AppError, AppResult};

// ---------------------------------------------------------------------------
// Guards puros
// ---------------------------------------------------------------------------

/// Solo admin/manager pueden crear, cancelar, editar o eliminar misiones
pub fn ensure_management(role: UserRole, operation: &str) -> AppResult<()> {
    if !role.is_management() {
        return Err(AppError::Forbidden(format!(
            "Insufficient permissions to {}",
            operation
        )));
    }
    Ok(())
}

/// Solo el operador asignado puede arrancar o completar su misión
pub fn ensure_assigned_operator(mission: &Mission, user_id: Uuid) -> AppResult<()> {
    if mission.assigned_user_id != user_id {
        return Err(AppError::Forbidden(
            "You are not assigned to this mission".to_string(),
        ));
    }
    Ok(())
}

/// La misión debe estar exactamente en el estado que la transición espera
pub fn ensure_status(mission: &Mission, expected: MissionStatus, action: &str) -> AppResult<()> {
    if mission.status != expected {
        return Err(AppError::InvalidState(format!(
            "Mission cannot be {}: status is '{}'",
            action,
            mission.status.as_str()
        )));
    }
    Ok(())
}

/// Cancelar solo tiene sentido antes de llegar a un estado terminal;
/// una segunda cancelación sobre la misma misión es un error de estado
pub fn ensure_cancellable(mission: &Mission) -> AppResult<()> {
    if mission.status.is_terminal() {
        return Err(AppError::InvalidState(format!(
            "Mission cannot be cancelled: status is '{}'",
            mission.status.as_str()
        )));
    }
    Ok(())
}

/// Asignar un vehículo al crear exige que esté disponible
pub fn ensure_vehicle_available(vehicle: &Vehicle) -> AppResult<()> {
    if vehicle.status != VehicleStatus::Available {
        return Err(AppError::VehicleUnavailable(format!(
            "Vehicle {} is not available (status: {})",
            vehicle.license_plate,
            vehicle.status.as_str()
        )));
    }
    Ok(())
}

/// Reasignación de vehículo en una edición: la disponibilidad solo se
/// comprueba mientras la misión sigue pending, y el destino puede estar
/// available o in_use. Política heredada del sistema original; si hay que
/// endurecerla, este es el único sitio que cambiar.
pub fn ensure_vehicle_reassignable(
    mission_status: MissionStatus,
    vehicle: &Vehicle,
) -> AppResult<()> {
    if mission_status == MissionStatus::Pending
        && !matches!(vehicle.status, VehicleStatus::Available | VehicleStatus::InUse)
    {
        return Err(AppError::VehicleUnavailable(format!(
            "Vehicle {} is not available (status: {})",
            vehicle.license_plate,
            vehicle.status.as_str()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Servicio
// ---------------------------------------------------------------------------

pub struct MissionService {
    pool: PgPool,
}

impl MissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear una misión. El vehículo asignado debe estar disponible y pasa
    /// a in_use en la misma transacción que inserta la misión.
    pub async fn create(
        &self,
        request: CreateMissionRequest,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> AppResult<Mission> {
        ensure_management(caller_role, "create missions")?;

        let assigned_user = UserRepository::new(self.pool.clone())
            .find_by_id(request.assigned_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assigned user not found".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let vehicle = VehicleRepository::lock_by_id(&mut tx, request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
        ensure_vehicle_available(&vehicle)?;

        let mission = MissionRepository::insert(
            &mut tx,
            NewMission {
                title: request.title,
                description: request.description,
                priority: request.priority,
                start_latitude: request.start_latitude,
                start_longitude: request.start_longitude,
                start_address: request.start_address,
                end_latitude: request.end_latitude,
                end_longitude: request.end_longitude,
                end_address: request.end_address,
                scheduled_start: request.scheduled_start,
                scheduled_end: request.scheduled_end,
                assigned_user_id: assigned_user.id,
                vehicle_id: vehicle.id,
                created_by: caller_id,
            },
        )
        .await?;

        VehicleRepository::set_status(&mut tx, vehicle.id, VehicleStatus::InUse).await?;

        tx.commit().await?;

        log::info!(
            "Mission {} created, vehicle {} now in use",
            mission.id,
            vehicle.license_plate
        );

        Ok(mission)
    }

    /// Arrancar una misión pending. Solo el operador asignado. Fija
    /// actual_start, ancla el historial de telemetría con una muestra
    /// sintética en el punto de salida y dispara un ciclo de tracking.
    pub async fn start(&self, mission_id: Uuid, caller_id: Uuid) -> AppResult<Mission> {
        let mission = self.find_required(mission_id).await?;

        ensure_assigned_operator(&mission, caller_id)?;
        ensure_status(&mission, MissionStatus::Pending, "started")?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let vehicle = VehicleRepository::lock_by_id(&mut tx, mission.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let mission = MissionRepository::set_status(
            &mut tx,
            mission_id,
            MissionStatus::InProgress,
            Some(now),
            None,
        )
        .await?;

        // Muestra inicial en el punto de salida: ancla el historial para
        // las reglas de inactividad y el simulador
        LocationRepository::insert(
            &mut tx,
            NewLocation {
                latitude: mission.start_latitude,
                longitude: mission.start_longitude,
                altitude: None,
                speed: Some(0.0),
                heading: Some(0.0),
                accuracy: None,
                timestamp: now,
                vehicle_id: mission.vehicle_id,
                mission_id: Some(mission.id),
            },
        )
        .await?;

        VehicleRepository::update_position(
            &mut tx,
            mission.vehicle_id,
            mission.start_latitude,
            mission.start_longitude,
        )
        .await?;

        if vehicle.status != VehicleStatus::InUse {
            VehicleRepository::set_status(&mut tx, vehicle.id, VehicleStatus::InUse).await?;
        }

        tx.commit().await?;

        // El primer paso de simulación es best-effort: un fallo aquí no
        // deshace el arranque ya confirmado
        if let Err(e) = tracking_service::TrackingService::new(self.pool.clone())
            .advance_mission(&mission)
            .await
        {
            log::warn!("Tracking step after start of mission {} failed: {}", mission.id, e);
        }

        log::info!("Mission {} started by {}", mission.id, caller_id);

        Ok(mission)
    }

    /// Completar una misión in_progress. Solo el operador asignado. Fija
    /// actual_end y libera el vehículo.
    pub async fn complete(&self, mission_id: Uuid, caller_id: Uuid) -> AppResult<Mission> {
        let mission = self.find_required(mission_id).await?;

        ensure_assigned_operator(&mission, caller_id)?;
        ensure_status(&mission, MissionStatus::InProgress, "completed")?;

        let mut tx = self.pool.begin().await?;

        VehicleRepository::lock_by_id(&mut tx, mission.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let mission = MissionRepository::set_status(
            &mut tx,
            mission_id,
            MissionStatus::Completed,
            None,
            Some(Utc::now()),
        )
        .await?;

        VehicleRepository::set_status(&mut tx, mission.vehicle_id, VehicleStatus::Available)
            .await?;

        tx.commit().await?;

        log::info!("Mission {} completed", mission.id);

        Ok(mission)
    }

    /// Cancelar una misión pending o in_progress. Requiere rol de gestión.
    /// Libera el vehículo.
    pub async fn cancel(&self, mission_id: Uuid, caller_role: UserRole) -> AppResult<Mission> {
        ensure_management(caller_role, "cancel missions")?;

        let mission = self.find_required(mission_id).await?;

        ensure_cancellable(&mission)?;

        let mut tx = self.pool.begin().await?;

        VehicleRepository::lock_by_id(&mut tx, mission.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let mission =
            MissionRepository::set_status(&mut tx, mission_id, MissionStatus::Cancelled, None, None)
                .await?;

        VehicleRepository::set_status(&mut tx, mission.vehicle_id, VehicleStatus::Available)
            .await?;

        tx.commit().await?;

        log::info!("Mission {} cancelled", mission.id);

        Ok(mission)
    }

    /// Eliminar una misión que nunca llegó a ejecutarse (pending o
    /// cancelled). Si el vehículo seguía in_use por esta misión, se libera.
    pub async fn delete(&self, mission_id: Uuid, caller_role: UserRole) -> AppResult<()> {
        ensure_management(caller_role, "delete missions")?;

        let mission = self.find_required(mission_id).await?;

        if !mission.status.is_deletable() {
            return Err(AppError::InvalidState(
                "Cannot delete mission that is in progress or completed".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let vehicle = VehicleRepository::lock_by_id(&mut tx, mission.vehicle_id).await?;

        MissionRepository::delete(&mut tx, mission_id).await?;

        if let Some(vehicle) = vehicle {
            if vehicle.status == VehicleStatus::InUse {
                VehicleRepository::set_status(&mut tx, vehicle.id, VehicleStatus::Available)
                    .await?;
            }
        }

        tx.commit().await?;

        log::info!("Mission {} deleted", mission_id);

        Ok(())
    }

    /// Editar los campos de una misión. Requiere rol de gestión. La
    /// reasignación de vehículo aplica la regla de disponibilidad de
    /// ensure_vehicle_reassignable.
    pub async fn update(
        &self,
        mission_id: Uuid,
        request: UpdateMissionRequest,
        caller_role: UserRole,
    ) -> AppResult<Mission> {
        ensure_management(caller_role, "update missions")?;

        let mut mission = self.find_required(mission_id).await?;

        if let Some(vehicle_id) = request.vehicle_id {
            let vehicle = VehicleRepository::new(self.pool.clone())
                .find_by_id(vehicle_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
            ensure_vehicle_reassignable(mission.status, &vehicle)?;
            mission.vehicle_id = vehicle.id;
        }

        if let Some(user_id) = request.assigned_user_id {
            UserRepository::new(self.pool.clone())
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Assigned user not found".to_string()))?;
            mission.assigned_user_id = user_id;
        }

        if let Some(title) = request.title {
            mission.title = title;
        }
        if let Some(description) = request.description {
            mission.description = Some(description);
        }
        if let Some(priority) = request.priority {
            mission.priority = priority;
        }
        if let Some(lat) = request.start_latitude {
            mission.start_latitude = lat;
        }
        if let Some(lon) = request.start_longitude {
            mission.start_longitude = lon;
        }
        if let Some(address) = request.start_address {
            mission.start_address = Some(address);
        }
        if let Some(lat) = request.end_latitude {
            mission.end_latitude = lat;
        }
        if let Some(lon) = request.end_longitude {
            mission.end_longitude = lon;
        }
        if let Some(address) = request.end_address {
            mission.end_address = Some(address);
        }
        if let Some(start) = request.scheduled_start {
            mission.scheduled_start = start;
        }
        if let Some(end) = request.scheduled_end {
            mission.scheduled_end = end;
        }

        MissionRepository::new(self.pool.clone())
            .update_fields(&mission)
            .await
    }

    /// Listado de misiones según el rol: gestión ve toda la flota, un
    /// conductor solo las suyas
    pub async fn list_for(&self, caller_id: Uuid, caller_role: UserRole) -> AppResult<Vec<Mission>> {
        let repo = MissionRepository::new(self.pool.clone());
        if caller_role.is_management() {
            repo.find_all().await
        } else {
            repo.find_by_assigned_user(caller_id).await
        }
    }

    /// Obtener una misión; un conductor solo puede ver las suyas
    pub async fn get_for(
        &self,
        mission_id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> AppResult<Mission> {
        let mission = self.find_required(mission_id).await?;

        if !caller_role.is_management() && mission.assigned_user_id != caller_id {
            return Err(AppError::Forbidden(
                "Insufficient permissions to view this mission".to_string(),
            ));
        }

        Ok(mission)
    }

    async fn find_required(&self, mission_id: Uuid) -> AppResult<Mission> {
        MissionRepository::new(self.pool.clone())
            .find_by_id(mission_id)
            .await?
            .ok_or_else(|| not_found_error("Mission", mission_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mission::MissionPriority;
    use chrono::Duration;

    fn test_mission(status: MissionStatus, assigned: Uuid) -> Mission {
        let now = Utc::now();
        Mission {
            id: Uuid::new_v4(),
            title: "Transfert entrepôt".to_string(),
            description: None,
            status,
            priority: MissionPriority::High,
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
            assigned_user_id: assigned,
            vehicle_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn test_vehicle(status: VehicleStatus) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: Uuid::new_v4(),
            license_plate: "AB-123-CD".to_string(),
            brand: "Renault".to_string(),
            model: "Kangoo".to_string(),
            year: Some(2021),
            color: None,
            fuel_type: Some("diesel".to_string()),
            status,
            current_latitude: None,
            current_longitude: None,
            last_location_update: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_ensure_management_rejects_driver() {
        assert!(ensure_management(UserRole::Admin, "create missions").is_ok());
        assert!(ensure_management(UserRole::Manager, "create missions").is_ok());

        let err = ensure_management(UserRole::Driver, "create missions").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_ensure_assigned_operator() {
        let driver = Uuid::new_v4();
        let mission = test_mission(MissionStatus::Pending, driver);

        assert!(ensure_assigned_operator(&mission, driver).is_ok());

        let err = ensure_assigned_operator(&mission, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_ensure_status_rejects_wrong_state() {
        let mission = test_mission(MissionStatus::InProgress, Uuid::new_v4());

        // Arrancar una misión ya in_progress es un error de estado
        let err = ensure_status(&mission, MissionStatus::Pending, "started").unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        assert!(ensure_status(&mission, MissionStatus::InProgress, "completed").is_ok());
    }

    #[test]
    fn test_ensure_vehicle_available() {
        assert!(ensure_vehicle_available(&test_vehicle(VehicleStatus::Available)).is_ok());

        let err = ensure_vehicle_available(&test_vehicle(VehicleStatus::Maintenance)).unwrap_err();
        assert!(matches!(err, AppError::VehicleUnavailable(_)));

        let err = ensure_vehicle_available(&test_vehicle(VehicleStatus::InUse)).unwrap_err();
        assert!(matches!(err, AppError::VehicleUnavailable(_)));
    }

    #[test]
    fn test_reassignment_checked_only_while_pending() {
        let maintenance = test_vehicle(VehicleStatus::Maintenance);
        let in_use = test_vehicle(VehicleStatus::InUse);

        // Pending: available o in_use valen, maintenance no
        assert!(ensure_vehicle_reassignable(MissionStatus::Pending, &in_use).is_ok());
        assert!(ensure_vehicle_reassignable(MissionStatus::Pending, &maintenance).is_err());

        // Fuera de pending no se comprueba disponibilidad
        assert!(ensure_vehicle_reassignable(MissionStatus::InProgress, &maintenance).is_ok());
    }

    #[test]
    fn test_cancel_is_not_idempotent() {
        let mut mission = test_mission(MissionStatus::InProgress, Uuid::new_v4());
        assert!(ensure_cancellable(&mission).is_ok());

        // La segunda cancelación sobre una misión ya cancelada falla
        mission.status = MissionStatus::Cancelled;
        let err = ensure_cancellable(&mission).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        mission.status = MissionStatus::Completed;
        assert!(ensure_cancellable(&mission).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(MissionStatus::Completed.is_terminal());
        assert!(MissionStatus::Cancelled.is_terminal());
        assert!(!MissionStatus::Pending.is_terminal());
        assert!(!MissionStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_deletable_states() {
        assert!(MissionStatus::Pending.is_deletable());
        assert!(MissionStatus::Cancelled.is_deletable());
        assert!(!MissionStatus::InProgress.is_deletable());
        assert!(!MissionStatus::Completed.is_deletable());
    }
}
