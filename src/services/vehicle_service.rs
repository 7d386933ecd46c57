//! Reconciliación de estados de flota
//!
//! El estado in_use de un vehículo debería implicar una misión activa que
//! lo referencia. Cuando esa correspondencia se rompe (deriva de datos),
//! esta pasada idempotente libera los vehículos huérfanos y reporta los
//! conflictos de doble asignación sin arreglarlos en silencio.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::models::vehicle::VehicleStatus;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::mission_service::ensure_management;
use crate::utils::errors::AppResult;

/// Vehículo referenciado por más de una misión activa a la vez
#[derive(Debug, Serialize)]
pub struct VehicleConflict {
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub active_missions: i64,
}

/// Resultado de una pasada de reconciliación
#[derive(Debug, Serialize)]
pub struct ReconciliationReport {
    /// Vehículos in_use sin misión activa, liberados a available
    pub released: Vec<Uuid>,
    /// Dobles asignaciones detectadas; se reportan, no se corrigen
    pub conflicts: Vec<VehicleConflict>,
}

pub struct VehicleService {
    pool: PgPool,
}

impl VehicleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pasada idempotente de reconciliación sobre la flota. Requiere rol
    /// de gestión.
    pub async fn reconcile_statuses(&self, caller_role: UserRole) -> AppResult<ReconciliationReport> {
        ensure_management(caller_role, "reconcile vehicle statuses")?;

        let rows = VehicleRepository::new(self.pool.clone())
            .find_in_use_with_active_mission_count()
            .await?;

        let mut report = ReconciliationReport {
            released: Vec::new(),
            conflicts: Vec::new(),
        };

        let mut tx = self.pool.begin().await?;

        for (vehicle, active_missions) in rows {
            if active_missions == 0 {
                // Huérfano: in_use sin misión que lo justifique
                if let Some(locked) = VehicleRepository::lock_by_id(&mut tx, vehicle.id).await? {
                    if locked.status == VehicleStatus::InUse {
                        VehicleRepository::set_status(&mut tx, locked.id, VehicleStatus::Available)
                            .await?;
                        log::warn!(
                            "Released orphaned vehicle {} ({})",
                            locked.license_plate,
                            locked.id
                        );
                        report.released.push(locked.id);
                    }
                }
            } else if active_missions > 1 {
                log::warn!(
                    "Vehicle {} is claimed by {} active missions",
                    vehicle.license_plate,
                    active_missions
                );
                report.conflicts.push(VehicleConflict {
                    vehicle_id: vehicle.id,
                    license_plate: vehicle.license_plate,
                    active_missions,
                });
            }
        }

        tx.commit().await?;

        log::info!(
            "Reconciliation pass: {} released, {} conflicts",
            report.released.len(),
            report.conflicts.len()
        );

        Ok(report)
    }
}
