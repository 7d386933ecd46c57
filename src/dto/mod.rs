//! DTOs de la API
//!
//! Requests y responses de la capa HTTP. La validación de formato ocurre
//! aquí, en la frontera, antes de llegar a los servicios.

pub mod anomaly_dto;
pub mod auth_dto;
pub mod common;
pub mod location_dto;
pub mod mission_dto;
pub mod vehicle_dto;
