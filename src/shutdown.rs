// src/shutdown.rs
//! Process stop signals: Ctrl-C everywhere, plus SIGTERM on unix
//! (`docker stop`, systemd, Kubernetes).

use anyhow::{Context, Result};
use tokio::sync::watch;

pub struct ShutdownSignal {
    #[cfg(unix)]
    term: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    /// Register the handlers now, so a signal arriving before `recv` is not lost
    /// and SIGTERM no longer kills the process outright.
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let term = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
            Ok(Self { term })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the first stop signal; returns its name.
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = ctrl_c() => "SIGINT",
                _ = self.term.recv() => "SIGTERM",
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c().await;
            "ctrl-c"
        }
    }

    /// Wait for a stop signal, then flip `tx` to `true`.
    pub async fn forward(mut self, tx: watch::Sender<bool>) {
        let which = self.recv().await;
        tracing::info!(signal = which, "shutdown requested");
        let _ = tx.send(true);
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
