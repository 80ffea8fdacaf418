//! Readiness probe port.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a single readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ProbeOutcome {
    /// The server answered and can take requests.
    Ready,
    /// Not (yet) serving. Not an error by itself.
    NotReady { reason: String },
}

impl ProbeOutcome {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::NotReady {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Distinguishes "process started" from "process able to serve".
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Check once whether the server at `address` (`host:port`) is ready.
    ///
    /// Implementations must give up after `timeout` and report
    /// [`ProbeOutcome::NotReady`].
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome;
}
