use std::future::Future;

use tokio::sync::watch;

use crate::application::services::controller::{Controller, RunReport};

/// Run the agent until Ctrl+C (or SIGTERM on unix) or until the sampler
/// gives up.
///
/// The current tick always completes before the controller tears down, so a
/// signal never interrupts a snapshot half way.
pub async fn run_daemon(controller: Controller) -> RunReport {
    run_until(controller, async {
        wait_for_stop_signal().await;
        tracing::info!("Stop signal received, finishing current tick...");
    })
    .await
}

/// Run `controller` until `stop` resolves.
pub async fn run_until<F>(controller: Controller, stop: F) -> RunReport
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let watcher = tokio::spawn(async move {
        stop.await;
        let _ = stop_tx.send(true);
        // keep the sender alive so the controller sees `true`, not a closed channel
        std::future::pending::<()>().await;
    });

    let report = controller.run(stop_rx).await;
    watcher.abort();
    report
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_stop_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                () = ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {e}");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() {
    ctrl_c().await;
}
