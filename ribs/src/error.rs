//! Error types for the rib tree.

use std::any::Any;

use thiserror::Error;

use crate::bundle::BundleError;
use crate::lifecycle::{LifecycleEvent, LifecycleState};

/// Errors raised while driving a rib tree.
///
/// Lifecycle calls never return these. Misuse and cleanup failures are
/// handed to the error handler configured through
/// [`RibsConfig::on_error`](crate::RibsConfig::on_error), which logs them by
/// default.
#[derive(Debug, Clone, Error)]
pub enum RibError {
    /// A lifecycle event arrived in a state that does not accept it.
    #[error("Rib '{rib}' cannot {event} while {state}")]
    InvalidTransition {
        /// Rib that received the event.
        rib: String,
        /// The rejected event.
        event: LifecycleEvent,
        /// State the rib was in.
        state: LifecycleState,
    },

    /// A root was attached to a tree that already has one.
    #[error("Tree already has root '{0}'")]
    RootAlreadyAttached(String),

    /// A connector operation referenced a child the node does not own.
    #[error("Rib '{rib}' has no child {child}")]
    UnknownChild {
        /// Parent rib.
        rib: String,
        /// Missing child id.
        child: String,
    },

    /// Routing commands kept producing more commands.
    #[error("Routing did not settle after {rounds} dispatch rounds")]
    RoutingLoop {
        /// Number of rounds that ran.
        rounds: usize,
    },

    /// A child or hook failed while being torn down.
    #[error("Cleanup of rib '{rib}' failed: {message}")]
    CleanupFailed {
        /// Rib being detached.
        rib: String,
        /// Panic message.
        message: String,
    },

    /// A worker panicked while starting or stopping.
    #[error("Worker '{worker}' of rib '{rib}' panicked: {message}")]
    WorkerPanicked {
        /// Owning rib.
        rib: String,
        /// Worker name.
        worker: &'static str,
        /// Panic message.
        message: String,
    },

    /// Background work was requested without a tokio runtime.
    #[error("No tokio runtime available to run '{0}'")]
    NoRuntime(String),

    /// A worker or task was bound after the interactor became inactive.
    #[error("Rib '{rib}' is inactive, cannot run '{task}'")]
    Inactive {
        /// Owning rib.
        rib: String,
        /// Worker or task name.
        task: String,
    },

    /// Persisted state could not be read or written.
    #[error(transparent)]
    Bundle(#[from] BundleError),

    /// A request code did not fit the configured layout.
    #[error("Request code error: {0}")]
    RequestCode(String),
}

impl RibError {
    /// Whether this error stems from calling the API out of order.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::RootAlreadyAttached(_)
                | Self::UnknownChild { .. }
                | Self::RoutingLoop { .. }
                | Self::Inactive { .. }
        )
    }

    /// Whether this error was captured while tearing something down.
    pub fn is_cleanup_failure(&self) -> bool {
        matches!(self, Self::CleanupFailed { .. } | Self::WorkerPanicked { .. })
    }
}

/// Extract a human-readable message from a panic payload.
///
/// Panics carry either `&str` or `String` payloads; anything else maps to a
/// generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
