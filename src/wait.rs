// ABOUTME: Polling primitive for long-running RDS operations.
// ABOUTME: Fixed-interval checks with optional timeout, interruptible by shutdown.

use crate::config::WaitConfig;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("Condition not met within the timeout period: {} seconds.", .timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("wait interrupted by shutdown signal")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeout: None,
        }
    }
}

impl From<&WaitConfig> for WaitOptions {
    fn from(config: &WaitConfig) -> Self {
        Self {
            interval: config.interval,
            timeout: config.timeout,
        }
    }
}

/// Sender half used by the binary to request shutdown.
pub type ShutdownTrigger = watch::Sender<bool>;

/// A shutdown channel: send `true` to interrupt any pending wait.
pub fn shutdown_channel() -> (ShutdownTrigger, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Flip `trigger` on the first SIGINT or SIGTERM.
pub async fn forward_shutdown_signals(trigger: ShutdownTrigger) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("received Ctrl+C, cancelling"),
        () = terminate => warn!("received SIGTERM, cancelling"),
    }
    let _ = trigger.send(true);
}

/// Polls a condition until it holds, the timeout elapses, or shutdown is
/// requested.
#[derive(Debug, Clone)]
pub struct Waiter {
    options: WaitOptions,
    shutdown: watch::Receiver<bool>,
}

impl Waiter {
    pub fn new(options: WaitOptions, shutdown: watch::Receiver<bool>) -> Self {
        Self { options, shutdown }
    }

    /// Evaluate `condition` every interval until it returns `true`.
    ///
    /// Errors from the condition abort the wait immediately.
    pub async fn until<F, Fut, E>(&self, mut condition: F) -> Result<(), E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
        E: From<WaitError>,
    {
        let start = Instant::now();
        let mut shutdown = self.shutdown.clone();

        info!("Waiting for condition to be met...");
        while !condition().await? {
            let elapsed = start.elapsed();
            if let Some(timeout) = self.options.timeout.filter(|t| elapsed >= *t) {
                return Err(WaitError::Timeout { timeout }.into());
            }

            info!("Still waiting... [{}s elapsed]", elapsed.as_secs());

            if *shutdown.borrow() {
                return Err(WaitError::Cancelled.into());
            }
            tokio::select! {
                _ = tokio::time::sleep(self.options.interval) => {}
                changed = shutdown.changed() => {
                    // A dropped sender can never signal, so keep sleeping.
                    if changed.is_ok() && *shutdown.borrow() {
                        return Err(WaitError::Cancelled.into());
                    }
                    if changed.is_err() {
                        tokio::time::sleep(self.options.interval).await;
                    }
                }
            }
        }
        Ok(())
    }
}
