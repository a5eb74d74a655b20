//! Entry point for the `slotgate-gateway` HTTP server.

use std::sync::Arc;

use slotgate_gateway::{
    auth::Credential,
    config::{BackendKind, GatewayConfig},
    routes::create_router,
};
use slotgate_store::{Connector, MemoryConnector, RedisConnector, SlotPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let credential = match Credential::new(config.auth_username.clone(), &config.auth_password) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "cannot prepare gateway credential");
            std::process::exit(1);
        }
    };

    let connector: Arc<dyn Connector> = match &config.backend {
        BackendKind::Redis(redis) => {
            info!(host = %redis.host, port = redis.port, "using redis backend");
            Arc::new(RedisConnector::new(redis.clone()))
        }
        BackendKind::Memory => {
            info!("using in-memory backend");
            Arc::new(MemoryConnector::new())
        }
    };
    let pool = Arc::new(SlotPool::new(connector));
    let app = create_router(Arc::clone(&pool), credential);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %config.listen_addr, user = %config.auth_username, "slotgate-gateway listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }

    let connected = pool.connected_slots();
    info!(count = connected.len(), slots = ?connected, "closing backend connections");
    drop(pool);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
