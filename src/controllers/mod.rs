//! Controladores MVC
//!
//! Orquestan la validación de DTOs y delegan en los servicios y
//! repositorios. No contienen lógica de negocio propia.

pub mod anomaly_controller;
pub mod auth_controller;
pub mod location_controller;
pub mod mission_controller;
pub mod vehicle_controller;
