//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de variables de entorno y los
//! umbrales de detección de anomalías.

pub mod detection;
pub mod environment;

pub use detection::DetectionConfig;
pub use environment::EnvironmentConfig;
