//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL, junto con los ENUMs cerrados de estados.

pub mod anomaly;
pub mod location;
pub mod mission;
pub mod user;
pub mod vehicle;
