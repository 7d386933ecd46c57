//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula el SQL de un agregado. Las operaciones que
//! participan en transiciones de misión exponen variantes que operan sobre
//! una conexión de transacción, para que el servicio componga los efectos
//! de forma atómica.

pub mod anomaly_repository;
pub mod location_repository;
pub mod mission_repository;
pub mod user_repository;
pub mod vehicle_repository;
