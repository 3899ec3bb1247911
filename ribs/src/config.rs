//! Tree configuration.

use std::fmt;
use std::sync::Arc;

use crate::directory::CustomisationDirectory;
use crate::error::RibError;
use crate::request_code::RequestCodeLayout;
use crate::worker::WorkerBinderListener;

/// Callback receiving misuse and cleanup errors.
pub type ErrorHandler = Arc<dyn Fn(&RibError) + Send + Sync>;

/// Configuration for one [`RibTree`](crate::RibTree).
///
/// Passed to the tree at construction and shared with every node through
/// the [`RibContext`](crate::RibContext).
#[derive(Clone)]
pub struct RibsConfig {
    /// Receives misuse and cleanup errors. Logs them when unset.
    pub error_handler: ErrorHandler,

    /// Told when a worker finishes starting or stopping.
    pub worker_listener: Option<Arc<dyn WorkerBinderListener>>,

    /// Capacity of the [`RibEvent`](crate::RibEvent) broadcast ring.
    pub event_capacity: usize,

    /// How many dispatch rounds may run before routing is considered stuck.
    pub max_dispatch_rounds: usize,

    /// Root customisation directory.
    pub directory: CustomisationDirectory,

    pub request_code_layout: RequestCodeLayout,
}

impl Default for RibsConfig {
    fn default() -> Self {
        Self {
            error_handler: Arc::new(log_error),
            worker_listener: None,
            event_capacity: 64,
            max_dispatch_rounds: 32,
            directory: CustomisationDirectory::default(),
            request_code_layout: RequestCodeLayout::default(),
        }
    }
}

impl RibsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error handler.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RibError) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn worker_listener<L>(mut self, listener: L) -> Self
    where
        L: WorkerBinderListener + 'static,
    {
        self.worker_listener = Some(Arc::new(listener));
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn max_dispatch_rounds(mut self, rounds: usize) -> Self {
        self.max_dispatch_rounds = rounds.max(1);
        self
    }

    pub fn directory(mut self, directory: CustomisationDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn request_code_layout(mut self, layout: RequestCodeLayout) -> Self {
        self.request_code_layout = layout;
        self
    }
}

impl fmt::Debug for RibsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RibsConfig")
            .field("worker_listener", &self.worker_listener.is_some())
            .field("event_capacity", &self.event_capacity)
            .field("max_dispatch_rounds", &self.max_dispatch_rounds)
            .field("directory", &self.directory)
            .field("request_code_layout", &self.request_code_layout)
            .finish_non_exhaustive()
    }
}

fn log_error(error: &RibError) {
    if error.is_cleanup_failure() {
        log::error!("{error}");
    } else {
        log::warn!("{error}");
    }
}
