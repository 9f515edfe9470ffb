use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restart_controller::cluster::ClusterClient;
use restart_controller::config::ControllerConfig;
use restart_controller::coordinator::RestartCoordinator;
use restart_controller::server::{AppState, build_router};
use restart_controller::state::CooldownLedger;
use restart_controller::supervisor::Supervisor;
use restart_controller::watch::run_pod_watcher;
use restart_controller::worker::CoordinatorWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restart_controller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ControllerConfig::parse();
    info!(
        namespace = %config.namespace,
        cooldown_secs = config.cooldown_secs,
        "Starting restart controller"
    );

    let client = ClusterClient::try_default(config.namespace.clone())
        .await
        .context("failed to create Kubernetes client")?;

    let coordinator = Arc::new(RestartCoordinator::new(
        client.clone(),
        client.clone(),
        CooldownLedger::new(config.cooldown()),
    ));

    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let shutdown = CancellationToken::new();

    let app = build_router(AppState::new(coordinator.clone()));
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!("listening on {}", config.listen_addr);

    let mut tasks = Supervisor::new(shutdown.clone());
    tasks.spawn(
        "worker",
        CoordinatorWorker::new(coordinator).run(rx, shutdown.clone()),
    );
    tasks.spawn("pod watcher", run_pod_watcher(client, tx, shutdown.clone()));
    let server_shutdown = shutdown.clone();
    tasks.spawn_fallible("HTTP server", async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
    });

    tasks.run_until(shutdown_signal()).await?;
    info!("Restart controller stopped");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
