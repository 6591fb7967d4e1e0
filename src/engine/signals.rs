//! # OS termination requests.
//!
//! [`TerminationListener`] yields every termination request the process
//! receives. Exactly two kinds are listened for.
//!
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationRequest {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationRequest::Interrupt => write!(f, "interrupt"),
            TerminationRequest::Terminate => write!(f, "terminated"),
        }
    }
}

/// Installed signal streams. Creating one replaces the default disposition
/// of the listened-for signals for the rest of the process lifetime.
#[derive(Debug)]
pub struct TerminationListener {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl TerminationListener {
    /// Returns `Err` if signal registration fails.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination request.
    ///
    /// `None` means the signal streams closed and no further requests will
    /// arrive.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Option<TerminationRequest> {
        tokio::select! {
            got = self.sigint.recv() => got.map(|_| TerminationRequest::Interrupt),
            got = self.sigterm.recv() => got.map(|_| TerminationRequest::Terminate),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Option<TerminationRequest> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| TerminationRequest::Interrupt)
    }
}
