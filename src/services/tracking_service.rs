//! Simulador de telemetría
//!
//! Genera la siguiente posición de un vehículo avanzando hacia el destino
//! de su misión: rumbo desde la última muestra conocida, velocidad urbana
//! aleatoria y un jitter acotado para que el trazado no sea una recta
//! perfecta. No forma parte del camino crítico de detección, pero sus
//! muestras tienen exactamente el mismo formato que el GPS real (km/h,
//! grados), así que alimentan el detector sin distinción.

use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;

use crate::models::location::Location;
use crate::models::mission::Mission;
use crate::repositories::location_repository::{LocationRepository, NewLocation};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::geo;
use crate::utils::errors::AppResult;

/// Intervalo simulado entre muestras, en segundos
const STEP_INTERVAL_SECS: f64 = 30.0;

/// Metros por grado de latitud (aprox.)
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Jitter máximo en grados sobre cada componente
const JITTER_DEGREES: f64 = 0.0002;

pub struct TrackingService {
    pool: PgPool,
}

impl TrackingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Avanzar un paso de simulación hacia el destino de la misión.
    /// Sin última posición conocida no hay nada que avanzar.
    pub async fn advance_mission(&self, mission: &Mission) -> AppResult<Option<Location>> {
        let location_repo = LocationRepository::new(self.pool.clone());

        let last = match location_repo.find_latest_for_vehicle(mission.vehicle_id).await? {
            Some(location) => location,
            None => return Ok(None),
        };

        let bearing = geo::initial_bearing(
            last.latitude,
            last.longitude,
            mission.end_latitude,
            mission.end_longitude,
        );

        let (new_lat, new_lon, speed_kmh) = {
            let mut rng = rand::thread_rng();

            // Velocidad urbana realista
            let speed_kmh: f64 = rng.gen_range(20.0..60.0);
            let distance_m = speed_kmh * 1000.0 / 3600.0 * STEP_INTERVAL_SECS;

            let mut lat_change =
                (distance_m / METERS_PER_DEGREE) * bearing.to_radians().cos();
            let mut lon_change = (distance_m
                / (METERS_PER_DEGREE * last.latitude.to_radians().cos()))
                * bearing.to_radians().sin();

            lat_change += rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES);
            lon_change += rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES);

            (last.latitude + lat_change, last.longitude + lon_change, speed_kmh)
        };

        let location = self
            .append_sample(mission.vehicle_id, Some(mission.id), new_lat, new_lon, speed_kmh, bearing)
            .await?;

        Ok(Some(location))
    }

    /// Paso de simulación para toda la flota: paseo aleatorio desde la
    /// última posición, o posición inicial cerca del centro de París para
    /// vehículos sin historial. Solo para demostraciones.
    pub async fn simulate_fleet(&self) -> AppResult<Vec<Location>> {
        let vehicle_repo = VehicleRepository::new(self.pool.clone());
        let location_repo = LocationRepository::new(self.pool.clone());

        let vehicles = vehicle_repo.find_all().await?;
        let mut movements = Vec::with_capacity(vehicles.len());

        for vehicle in vehicles {
            let last = location_repo.find_latest_for_vehicle(vehicle.id).await?;

            let (lat, lon, speed, heading) = {
                let mut rng = rand::thread_rng();
                match &last {
                    Some(location) => (
                        location.latitude + rng.gen_range(-0.001..0.001),
                        location.longitude + rng.gen_range(-0.001..0.001),
                        rng.gen_range(0.0..60.0),
                        rng.gen_range(0.0..360.0),
                    ),
                    None => (
                        48.8566 + rng.gen_range(-0.05..0.05),
                        2.3522 + rng.gen_range(-0.05..0.05),
                        rng.gen_range(10.0..50.0),
                        rng.gen_range(0.0..360.0),
                    ),
                }
            };

            let location = self
                .append_sample(vehicle.id, None, lat, lon, speed, heading)
                .await?;
            movements.push(location);
        }

        log::info!("Simulated one movement step for {} vehicles", movements.len());

        Ok(movements)
    }

    /// Insertar la muestra y actualizar la posición del vehículo en la
    /// misma transacción, igual que la ingesta de GPS real
    async fn append_sample(
        &self,
        vehicle_id: uuid::Uuid,
        mission_id: Option<uuid::Uuid>,
        latitude: f64,
        longitude: f64,
        speed_kmh: f64,
        heading: f64,
    ) -> AppResult<Location> {
        let mut tx = self.pool.begin().await?;

        let location = LocationRepository::insert(
            &mut tx,
            NewLocation {
                latitude,
                longitude,
                altitude: None,
                speed: Some(speed_kmh),
                heading: Some(heading),
                accuracy: None,
                timestamp: Utc::now(),
                vehicle_id,
                mission_id,
            },
        )
        .await?;

        VehicleRepository::update_position(&mut tx, vehicle_id, latitude, longitude).await?;

        tx.commit().await?;

        Ok(location)
    }
}
