use std::future::IntoFuture;
use std::sync::Arc;

use agui_core::{AguiAdapter, Orchestrator, SessionManager, ThreadStateStore};
use agui_server::{spawn_state_janitor, AguiRouter, Config, EchoRunner};
use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agui_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        app_name = %config.app_name,
        user_id = %config.user_id,
        run_timeout_secs = config.run_timeout_secs,
        state_ttl_secs = config.state_ttl_secs,
        "Configuration loaded"
    );

    let states = Arc::new(ThreadStateStore::new());
    let adapter = AguiAdapter::new(
        Arc::new(EchoRunner::new()),
        SessionManager::in_memory(),
        config.adapter_config(),
    );
    let orchestrator =
        Orchestrator::new(Arc::new(adapter), states.clone()).with_user_id(config.user_id.clone());

    let shutdown = CancellationToken::new();

    let janitor = config.cleanup_interval().map(|interval| {
        spawn_state_janitor(states, interval, config.state_ttl(), shutdown.clone())
    });

    let app = AguiRouter::new(orchestrator)
        .with_default_routes()
        .with_shutdown(shutdown.clone())
        .build()?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "AG-UI server listening");

    let server_shutdown = shutdown.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, draining streams");
        server_shutdown.cancel();
    })
    .into_future();

    let grace = config.shutdown_timeout();
    let drained = tokio::select! {
        result = server => {
            result.context("server error")?;
            true
        }
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => false,
    };

    if !drained {
        tracing::warn!(grace_secs = grace.as_secs(), "streams still open after grace period, exiting");
    }

    if let Some(janitor) = janitor {
        let _ = janitor.await;
    }

    tracing::info!("AG-UI server stopped");
    Ok(())
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
