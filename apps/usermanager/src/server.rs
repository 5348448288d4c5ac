//! gRPC server initialization and lifecycle management
//!
//! - Tracing initialization
//! - Database connection and migrations
//! - Change publisher setup (degrades to a no-op when NATS is unreachable)
//! - Health check service (grpc.health.v1.Health)
//! - Graceful shutdown on SIGINT/SIGTERM

use std::time::Duration;

use core_config::{Environment, FromEnv, server::ServerConfig};
use database::postgres::{PostgresConfig, connect_from_config_with_retry, run_migrations};
use domain_users::{PgUserRepository, UserService};
use eyre::{Result, WrapErr};
use messaging::{ChangePublisher, NatsConfig};
use migration::Migrator;
use rpc::users::users_service_server::{SERVICE_NAME, UsersServiceServer};
use tokio::signal;
use tonic::transport::Server;
use tonic_health::{ServingStatus, server::health_reporter};
use tracing::{error, info, warn};

use crate::service::UsersServiceImpl;

const APP_NAME: &str = "usermanager";

/// How long queued change notifications may take to flush on shutdown
const PUBLISHER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the gRPC server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Database connection or migrations fail
/// - Server binding fails
///
/// An unreachable broker is not an error; updates then go unannounced.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let db_config = PostgresConfig::from_env().wrap_err("Failed to load database configuration")?;
    let nats_config = NatsConfig::from_env().wrap_err("Failed to load NATS configuration")?;
    let server_config = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;
    let addr = server_config
        .socket_addr()
        .wrap_err_with(|| format!("Invalid listen address: {}", server_config.address()))?;

    info!("Connecting to database...");
    let db = connect_from_config_with_retry(db_config, None)
        .await
        .wrap_err("Failed to connect to database")?;
    run_migrations::<Migrator>(&db, APP_NAME)
        .await
        .wrap_err("Failed to run database migrations")?;

    let (publisher, publisher_worker) = ChangePublisher::connect(&nats_config).await;
    if publisher.is_connected() {
        info!(
            url = %nats_config.url,
            stream = %nats_config.stream,
            subject = %nats_config.subject,
            "Publishing user changes"
        );
    }

    let service = UserService::new(PgUserRepository::new(db), publisher);
    let users_service = UsersServiceImpl::new(service);

    let (health_reporter, health_service) = health_reporter();
    health_reporter
        .set_service_status(SERVICE_NAME, ServingStatus::Serving)
        .await;
    health_reporter
        .set_service_status("", ServingStatus::Serving)
        .await;

    info!(%addr, environment = ?environment, "UsersService listening");

    Server::builder()
        .add_service(health_service)
        .add_service(
            UsersServiceServer::new(users_service)
                .accept_compressed(tonic::codec::CompressionEncoding::Zstd)
                .send_compressed(tonic::codec::CompressionEncoding::Zstd),
        )
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .wrap_err("gRPC server failed")?;

    // The server owned the last publisher handle, so the worker stops once
    // its queue is empty.
    if let Some(worker) = publisher_worker {
        match tokio::time::timeout(PUBLISHER_DRAIN_TIMEOUT, worker).await {
            Ok(Ok(())) => info!("Change publisher drained"),
            Ok(Err(e)) => error!(error = %e, "Change publisher task failed"),
            Err(_) => warn!(
                timeout_secs = PUBLISHER_DRAIN_TIMEOUT.as_secs(),
                "Change publisher did not drain in time, pending notifications dropped"
            ),
        }
    }

    info!("UsersService stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating shutdown..."),
    }
}
