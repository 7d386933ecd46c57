//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el motor de
//! detección de anomalías, la máquina de estados de misiones, la ingesta de
//! telemetría y el simulador de movimiento.

pub mod anomaly_service;
pub mod geo;
pub mod location_service;
pub mod mission_service;
pub mod tracking_service;
pub mod vehicle_service;
