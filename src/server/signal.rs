// Signal handling module
//
// Supported signals:
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGTERM: Graceful shutdown

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start signal handlers (Unix only)
///
/// Registers the handlers up front so a registration failure surfaces at startup, then
/// spawns a background task that wakes the accept loop through `shutdown`.
///
/// | Signal  | Action        |
/// |---------|---------------|
/// | SIGINT  | Stop server   |
/// | SIGTERM | Stop server   |
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => logger::log_signal("SIGINT (Ctrl+C)"),
            _ = sigterm.recv() => logger::log_signal("SIGTERM"),
        }
        // notify_one keeps a permit if the loop is not currently waiting
        shutdown.notify_one();
    });

    Ok(())
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_signal("Ctrl+C");
            shutdown.notify_one();
        }
    });

    Ok(())
}
