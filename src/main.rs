mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::{DetectionConfig, EnvironmentConfig};
use database::DatabaseConnection;
use middleware::cors::cors_layer;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;
    let detection = DetectionConfig::from_env();

    // Configurar logging
    let log_level = if config.is_production() {
        tracing::Level::INFO
    } else {
        tracing::Level::DEBUG
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚚 Fleet Tracker - seguimiento de flota y detección de anomalías");
    info!("================================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    // CORS abierto en desarrollo, orígenes explícitos en producción
    let cors = cors_layer(&config);

    // Crear router de la API
    let app_state = AppState::new(pool, config.clone(), detection);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/auth", routes::auth_routes::create_auth_router())
        .nest("/api/vehicle", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/mission", routes::mission_routes::create_mission_router())
        .nest("/api/location", routes::location_routes::create_location_router())
        .nest("/api/anomaly", routes::anomaly_routes::create_anomaly_router())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Endpoints - Auth:");
    info!("   POST /api/auth/login - Login");
    info!("   POST /api/auth/register - Registrar usuario (admin)");
    info!("   GET  /api/auth/me - Usuario actual");
    info!("🚗 Endpoints - Vehicle:");
    info!("   POST /api/vehicle - Crear vehículo");
    info!("   GET  /api/vehicle - Listar vehículos");
    info!("   GET  /api/vehicle/:id - Obtener vehículo");
    info!("   PUT  /api/vehicle/:id - Actualizar vehículo");
    info!("   DELETE /api/vehicle/:id - Eliminar vehículo");
    info!("   POST /api/vehicle/reconcile - Reconciliar estados de flota");
    info!("🧭 Endpoints - Mission:");
    info!("   POST /api/mission - Crear misión");
    info!("   GET  /api/mission - Listar misiones");
    info!("   GET  /api/mission/:id - Obtener misión");
    info!("   PUT  /api/mission/:id - Editar misión");
    info!("   POST /api/mission/:id/start - Arrancar misión");
    info!("   POST /api/mission/:id/complete - Completar misión");
    info!("   POST /api/mission/:id/cancel - Cancelar misión");
    info!("   DELETE /api/mission/:id - Eliminar misión");
    info!("📍 Endpoints - Location:");
    info!("   POST /api/location - Registrar muestra GPS");
    info!("   GET  /api/location/current - Última posición por vehículo");
    info!("   GET  /api/location/vehicle/:id - Telemetría de un vehículo");
    info!("   GET  /api/location/vehicle/:id/history - Historial por fechas");
    info!("   GET  /api/location/mission/:id - Telemetría de una misión");
    info!("   POST /api/location/simulate - Simular movimiento de flota");
    info!("   DELETE /api/location/cleanup - Poda por retención (admin)");
    info!("⚠️ Endpoints - Anomaly:");
    info!("   POST /api/anomaly/detect - Lanzar detección (admin/manager)");
    info!("   POST /api/anomaly/check - Evaluar un vehículo sin persistir");
    info!("   GET  /api/anomaly - Listar anomalías");
    info!("   GET  /api/anomaly/recent - Anomalías recientes");
    info!("   POST /api/anomaly - Registrar anomalía manual");
    info!("   PATCH /api/anomaly/:id/resolve - Resolver anomalía");
    info!("   DELETE /api/anomaly/:id - Eliminar anomalía");

    // Iniciar servidor
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fleet-tracker",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
