//! Interactors: the business logic of a node.

mod instance;

pub(crate) use instance::{AnyInteractor, InteractorInstance};

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bundle::Bundle;
use crate::context::{BuildContext, RibContext};
use crate::directory::CustomisationDirectory;
use crate::error::RibError;
use crate::lifecycle::{InteractorEvent, InteractorLifecycle};
use crate::node::Rib;
use crate::view::RibView;
use crate::worker::{Worker, WorkerBinder, WorkerUnbinder};

/// Business logic of a node.
///
/// Every hook has an empty default. Hooks run on the thread driving the
/// tree; async work goes through [`InteractorContext::spawn`] or a bound
/// [`Worker`].
pub trait Interactor: Send + 'static {
    /// View this interactor drives. Use [`NoView`](crate::NoView) for
    /// view-less nodes.
    type View: RibView;

    /// Called once the node is attached. `saved` holds what
    /// [`on_save_instance_state`](Self::on_save_instance_state) wrote
    /// last time, if the node is being restored.
    fn on_attach(&mut self, cx: &InteractorContext, saved: Option<&Bundle>) {
        let _ = (cx, saved);
    }

    fn on_view_created(&mut self, view: &mut Self::View, cx: &InteractorContext) {
        let _ = (view, cx);
    }

    fn on_view_destroyed(&mut self, cx: &InteractorContext) {
        let _ = cx;
    }

    fn on_start(&mut self, cx: &InteractorContext) {
        let _ = cx;
    }

    fn on_stop(&mut self, cx: &InteractorContext) {
        let _ = cx;
    }

    /// Called after every child has been detached. Workers and scoped
    /// tasks are cancelled right after this returns, or after it panics.
    fn on_detach(&mut self, cx: &InteractorContext) {
        let _ = cx;
    }

    /// Return `true` to consume the back press.
    fn handle_back_press(&mut self, cx: &InteractorContext) -> bool {
        let _ = cx;
        false
    }

    fn on_save_instance_state(&mut self, out: &mut Bundle) {
        let _ = out;
    }

    /// Result for a code generated through
    /// [`InteractorContext::request_code`]. Return `true` if handled.
    fn on_external_result(
        &mut self,
        request_id: u16,
        data: &Bundle,
        cx: &InteractorContext,
    ) -> bool {
        let _ = (request_id, data, cx);
        false
    }
}

/// What an interactor can reach while attached.
#[derive(Clone)]
pub struct InteractorContext {
    rib: Rib,
    tag: String,
    build: BuildContext,
    lifecycle: Arc<watch::Sender<InteractorEvent>>,
    scope: CancellationToken,
    workers: WorkerBinder,
}

impl InteractorContext {
    pub(crate) fn new(
        rib: Rib,
        tag: String,
        build: BuildContext,
        lifecycle: Arc<watch::Sender<InteractorEvent>>,
    ) -> Self {
        let scope = CancellationToken::new();
        let workers = WorkerBinder::new(rib.clone(), build.context().clone(), scope.clone());
        Self {
            rib,
            tag,
            build,
            lifecycle,
            scope,
            workers,
        }
    }

    pub fn rib(&self) -> &Rib {
        &self.rib
    }

    /// Persistent tag, stable across save and restore.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn context(&self) -> &RibContext {
        self.build.context()
    }

    /// Customisations scoped to this node.
    pub fn directory(&self) -> &CustomisationDirectory {
        self.build.directory()
    }

    pub fn lifecycle(&self) -> InteractorLifecycle {
        InteractorLifecycle::new(self.lifecycle.subscribe())
    }

    pub fn is_active(&self) -> bool {
        !self.scope.is_cancelled()
    }

    pub fn workers(&self) -> &WorkerBinder {
        &self.workers
    }

    /// Bind a worker to this interactor's lifetime.
    pub fn bind_worker<W: Worker>(&self, worker: W) -> WorkerUnbinder {
        self.workers.bind(worker)
    }

    /// Token cancelled when this interactor detaches.
    ///
    /// A child token, so cancelling it does not affect the interactor.
    pub fn scope(&self) -> CancellationToken {
        self.scope.child_token()
    }

    /// Spawn a task that is dropped when this interactor detaches.
    ///
    /// Returns `None` when there is no runtime or the interactor is
    /// already inactive; the error handler is told why.
    pub fn spawn<F>(&self, future: F) -> Option<JoinHandle<Option<F::Output>>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let task = std::any::type_name::<F>();
        if self.scope.is_cancelled() {
            self.context().report(RibError::Inactive {
                rib: self.rib.to_string(),
                task: task.to_string(),
            });
            return None;
        }
        let Ok(runtime) = Handle::try_current() else {
            self.context().report(RibError::NoRuntime(task.to_string()));
            return None;
        };

        let token = self.scope.clone();
        Some(runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        }))
    }

    /// Request code owned by this interactor, see
    /// [`RequestCodeRegistry`](crate::RequestCodeRegistry).
    pub fn request_code(&self, request_id: u16) -> Result<u16, RibError> {
        self.context().request_code(&self.tag, request_id)
    }

    pub(crate) fn shutdown(&self) {
        self.workers.unbind_all();
        self.scope.cancel();
    }
}
