use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use configs::AppConfig;
use store::DocumentStore;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes;

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutdown signal received, draining connections");
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// The pid file (if configured) exists exactly while the server accepts
/// connections.
pub async fn serve<F>(listener: TcpListener, cfg: &AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = Arc::new(DocumentStore::with_segments(cfg.store.segments));
    let app = routes::build_router(Arc::clone(&store), cfg.server.max_body_bytes);

    let local_addr = listener.local_addr()?;
    info!(%local_addr, segments = store.segment_count(), "docstore listening");

    if let Some(pid_file) = &cfg.process.pid_file {
        common::env::write_pid_file(pid_file)?;
    }

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    if let Some(pid_file) = &cfg.process.pid_file {
        common::env::remove_pid_file(pid_file);
    }
    info!(documents = store.count(), "in-memory documents discarded");
    served.context("server error")
}

/// Public entry: bind the configured address and serve until Ctrl+C/SIGTERM.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    serve(listener, &cfg, shutdown_signal()).await
}
