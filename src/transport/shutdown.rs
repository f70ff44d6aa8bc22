//! Shutdown notification for long-lived push connections.
//!
//! SSE streams and WebSocket connections otherwise stay open until the
//! viewer leaves, which would keep a graceful shutdown waiting forever.

use tokio::sync::watch;

pub type ShutdownSignal = watch::Receiver<bool>;

/// Returns the trigger and the signal handed to the transports.
pub fn channel() -> (watch::Sender<bool>, ShutdownSignal) {
    watch::channel(false)
}

/// A signal that never fires.
pub fn never() -> ShutdownSignal {
    channel().1
}

/// Resolves once `true` has been sent. A sender dropped without firing
/// never resolves.
pub async fn requested(mut signal: ShutdownSignal) {
    let fired = signal.wait_for(|stop| *stop).await.is_ok();
    if !fired {
        std::future::pending::<()>().await;
    }
}
