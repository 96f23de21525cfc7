//! Signal-driven graceful shutdown (spec §5): stop accepting new RPCs,
//! drain in-flight ones up to a fixed budget, then force-stop.

use std::time::Duration;

use tracing::{info, warn};

const DRAIN_BUDGET: Duration = Duration::from_secs(10);

pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    }
    info!("shutdown signal received, draining in-flight RPCs");
}

/// Runs `serve`, which is expected to resolve once `tonic`'s shutdown
/// future completes and in-flight RPCs have finished. If it doesn't
/// resolve within [`DRAIN_BUDGET`], the drain is abandoned and this
/// returns anyway so the process can exit.
pub async fn drain_with_budget<F>(serve: F)
where
    F: std::future::Future<Output = Result<(), tonic::transport::Error>>,
{
    match tokio::time::timeout(DRAIN_BUDGET, serve).await {
        Ok(Ok(())) => info!("server stopped cleanly"),
        Ok(Err(err)) => warn!(error = %err, "server stopped with an error"),
        Err(_) => warn!("drain budget exceeded, force-stopping"),
    }
}
