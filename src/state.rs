//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;

use crate::config::{DetectionConfig, EnvironmentConfig};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub detection: DetectionConfig,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig, detection: DetectionConfig) -> Self {
        let jwt = JwtConfig::from(&config);
        Self {
            pool,
            config,
            detection,
            jwt,
        }
    }
}
