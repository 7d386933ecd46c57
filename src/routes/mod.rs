//! Routers de la API
//!
//! Un router por recurso, montados bajo /api en main.rs.

pub mod anomaly_routes;
pub mod auth_routes;
pub mod location_routes;
pub mod mission_routes;
pub mod vehicle_routes;
