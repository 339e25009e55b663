//! Interruption signals.

use std::fmt;

use tracing::warn;

/// An external request to stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
  /// SIGINT / Ctrl-C.
  Interrupt,
  /// SIGTERM.
  Terminate,
}

impl Signal {
  /// Conventional shell exit status for a process killed by this signal.
  pub fn exit_code(&self) -> u8 {
    match self {
      Self::Interrupt => 130,
      Self::Terminate => 143,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Interrupt => "SIGINT",
      Self::Terminate => "SIGTERM",
    }
  }
}

impl fmt::Display for Signal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Resolve when SIGINT or SIGTERM arrives.
///
/// If handlers cannot be installed the future never resolves, so the run
/// proceeds without interruption support instead of failing.
#[cfg(unix)]
pub async fn shutdown_signal() -> Signal {
  use tokio::signal::unix::{SignalKind, signal};

  let (mut interrupt, mut terminate) = match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
    (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
    (Err(e), _) | (_, Err(e)) => {
      warn!(error = %e, "failed to install signal handlers");
      return std::future::pending().await;
    }
  };

  tokio::select! {
    _ = interrupt.recv() => Signal::Interrupt,
    _ = terminate.recv() => Signal::Terminate,
  }
}

#[cfg(not(unix))]
pub async fn shutdown_signal() -> Signal {
  match tokio::signal::ctrl_c().await {
    Ok(()) => Signal::Interrupt,
    Err(e) => {
      warn!(error = %e, "failed to install Ctrl-C handler");
      std::future::pending().await
    }
  }
}
