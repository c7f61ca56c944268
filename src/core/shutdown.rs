use std::future::pending;

use tokio::signal;

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            tracing::error!(error = %err, "Ctrl+C handler unavailable");
            pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use signal::unix::{signal, SignalKind};

    let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
        tracing::error!("SIGTERM handler unavailable");
        return pending::<()>().await;
    };
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn terminate() {
    pending::<()>().await;
}

/// Completes on the first of Ctrl+C or SIGTERM; axum then stops accepting and drains.
pub(crate) async fn shutdown_signal() {
    let source = tokio::select! {
        () = ctrl_c() => "ctrl_c",
        () = terminate() => "sigterm",
    };
    tracing::info!(source, "Shutting down");
}
