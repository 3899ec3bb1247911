//! Shared tree context and per-node build context.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, oneshot};

use crate::config::RibsConfig;
use crate::directory::CustomisationDirectory;
use crate::error::RibError;
use crate::events::RibEvent;
use crate::node::Rib;
use crate::request_code::RequestCodeRegistry;
use crate::wakeup::{self, WakeupReceiver, WakeupSender};

/// State shared by every node of one tree.
///
/// Cheap to clone. Holds the configuration, the event broadcast, the
/// routing wakeup channel, outstanding worker transitions and the request
/// code registry.
#[derive(Clone)]
pub struct RibContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: RibsConfig,
    events: broadcast::Sender<RibEvent>,
    wakeup: WakeupSender,
    wakeup_rx: Mutex<Option<WakeupReceiver>>,
    transitions: Mutex<Vec<oneshot::Receiver<()>>>,
    request_codes: Mutex<RequestCodeRegistry>,
}

impl RibContext {
    pub fn new(config: RibsConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        let (wakeup, wakeup_rx) = wakeup::channel();
        let request_codes = RequestCodeRegistry::new(config.request_code_layout);
        Self {
            inner: Arc::new(ContextInner {
                config,
                events,
                wakeup,
                wakeup_rx: Mutex::new(Some(wakeup_rx)),
                transitions: Mutex::new(Vec::new()),
                request_codes: Mutex::new(request_codes),
            }),
        }
    }

    pub fn config(&self) -> &RibsConfig {
        &self.inner.config
    }

    /// Hand an error to the configured handler.
    pub fn report(&self, error: RibError) {
        (self.inner.config.error_handler)(&error);
    }

    /// Subscribe to attach/detach notifications.
    pub fn events(&self) -> broadcast::Receiver<RibEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: RibEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn wakeup(&self) -> WakeupSender {
        self.inner.wakeup.clone()
    }

    pub(crate) fn take_wakeup_receiver(&self) -> Option<WakeupReceiver> {
        self.inner
            .wakeup_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) fn return_wakeup_receiver(&self, rx: WakeupReceiver) {
        *self
            .inner
            .wakeup_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(rx);
    }

    /// Register a worker start or stop that [`settle`](Self::settle) waits on.
    pub(crate) fn track(&self, done: oneshot::Receiver<()>) {
        self.inner
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(done);
    }

    /// Wait until every tracked worker start and stop has completed.
    ///
    /// Transitions registered while waiting are awaited too.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(
                &mut *self
                    .inner
                    .transitions
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if pending.is_empty() {
                return;
            }
            // A dropped sender means the task died; it is settled either way.
            futures::future::join_all(pending).await;
        }
    }

    /// Request code for `group`, see [`RequestCodeRegistry::request_code`].
    pub fn request_code(&self, group: &str, id: u16) -> Result<u16, RibError> {
        self.registry().request_code(group, id)
    }

    /// Group that generated `code`.
    pub fn request_group(&self, code: u16) -> Option<String> {
        self.registry().group_name(code).map(str::to_string)
    }

    pub(crate) fn registry(&self) -> std::sync::MutexGuard<'_, RequestCodeRegistry> {
        self.inner
            .request_codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// What a [`Builder`](crate::Builder) gets to construct a node.
#[derive(Clone)]
pub struct BuildContext {
    context: RibContext,
    directory: CustomisationDirectory,
    parent: Option<Rib>,
}

impl BuildContext {
    /// Context for the root of a tree.
    pub fn new(context: RibContext) -> Self {
        let directory = context.config().directory.clone();
        Self {
            context,
            directory,
            parent: None,
        }
    }

    pub fn context(&self) -> &RibContext {
        &self.context
    }

    /// Customisations visible at this level of the tree.
    pub fn directory(&self) -> &CustomisationDirectory {
        &self.directory
    }

    /// Rib whose router is building, `None` at the root.
    pub fn parent(&self) -> Option<&Rib> {
        self.parent.as_ref()
    }

    /// Context handed to the children of `rib`.
    pub(crate) fn scoped(&self, rib: &Rib) -> Self {
        Self {
            context: self.context.clone(),
            directory: self.directory.sub_directory(rib.name()),
            parent: Some(rib.clone()),
        }
    }
}
