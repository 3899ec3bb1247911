//! Workers: background units bound to an interactor's lifetime.
//!
//! A worker is started on the tokio runtime when bound and stopped when
//! unbound or when its interactor detaches, whichever comes first. Start
//! and stop completion are reported to the configured
//! [`WorkerBinderListener`] and tracked so [`RibTree::settle`] can await
//! them.
//!
//! [`RibTree::settle`]: crate::RibTree::settle

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::RibContext;
use crate::error::{RibError, extract_panic_message};
use crate::node::Rib;

/// Background unit of work scoped to an interactor.
///
/// `on_start` should return once the worker is set up; long-running work
/// belongs in tasks spawned through [`WorkerScope::spawn`], which end when
/// the worker stops.
#[async_trait]
pub trait Worker: Send + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn on_start(&mut self, scope: WorkerScope);

    async fn on_stop(&mut self) {}
}

/// Handle given to a running worker.
#[derive(Debug, Clone)]
pub struct WorkerScope {
    token: CancellationToken,
}

impl WorkerScope {
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Resolves once the worker is asked to stop.
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a task that is dropped when the worker stops.
    ///
    /// Resolves to `None` if it was cut short.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    Start,
    Stop,
}

/// Timing of one worker transition.
#[derive(Debug, Clone)]
pub struct WorkerBinderInfo {
    pub worker: &'static str,
    pub rib: Rib,
    pub event: WorkerEvent,
    /// Thread the transition completed on.
    pub thread: String,
    pub duration: Duration,
}

/// Observer of worker start/stop timing.
pub trait WorkerBinderListener: Send + Sync {
    fn on_bind_completed(&self, info: &WorkerBinderInfo);
}

impl<F> WorkerBinderListener for F
where
    F: Fn(&WorkerBinderInfo) + Send + Sync,
{
    fn on_bind_completed(&self, info: &WorkerBinderInfo) {
        self(info)
    }
}

struct Binding {
    token: CancellationToken,
    stopped: Mutex<Option<oneshot::Receiver<()>>>,
}

impl Binding {
    fn cancel(&self, context: &RibContext) {
        self.token.cancel();
        let stopped = self
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(stopped) = stopped {
            context.track(stopped);
        }
    }
}

/// Binds workers to one interactor.
#[derive(Clone)]
pub struct WorkerBinder {
    inner: Arc<BinderInner>,
}

struct BinderInner {
    rib: Rib,
    context: RibContext,
    scope: CancellationToken,
    bindings: Mutex<Vec<Arc<Binding>>>,
}

impl WorkerBinder {
    pub(crate) fn new(rib: Rib, context: RibContext, scope: CancellationToken) -> Self {
        Self {
            inner: Arc::new(BinderInner {
                rib,
                context,
                scope,
                bindings: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Start `worker` now and stop it when the interactor detaches.
    pub fn bind<W: Worker>(&self, worker: W) -> WorkerUnbinder {
        let inner = &self.inner;
        let name = worker.name();

        if inner.scope.is_cancelled() {
            inner.context.report(RibError::Inactive {
                rib: inner.rib.to_string(),
                task: name.to_string(),
            });
            return WorkerUnbinder::unbound(inner.context.clone());
        }
        let Ok(runtime) = Handle::try_current() else {
            inner.context.report(RibError::NoRuntime(name.to_string()));
            return WorkerUnbinder::unbound(inner.context.clone());
        };

        let token = inner.scope.child_token();
        let (started_tx, started_rx) = oneshot::channel();
        let (stopped_tx, stopped_rx) = oneshot::channel();
        let binding = Arc::new(Binding {
            token: token.clone(),
            stopped: Mutex::new(Some(stopped_rx)),
        });

        inner.context.track(started_rx);
        {
            let mut bindings = inner.bindings.lock().unwrap_or_else(PoisonError::into_inner);
            bindings.retain(|b| !b.token.is_cancelled());
            bindings.push(Arc::clone(&binding));
        }

        runtime.spawn(run_worker(
            worker,
            WorkerScope { token },
            inner.rib.clone(),
            inner.context.clone(),
            started_tx,
            stopped_tx,
        ));

        WorkerUnbinder {
            binding: Some(binding),
            context: inner.context.clone(),
        }
    }

    /// Number of workers still bound.
    pub fn active_bindings(&self) -> usize {
        self.inner
            .bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|b| !b.token.is_cancelled())
            .count()
    }

    /// Stop every bound worker. Cancellation happens before this returns.
    pub(crate) fn unbind_all(&self) {
        let bindings = std::mem::take(
            &mut *self
                .inner
                .bindings
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for binding in bindings {
            binding.cancel(&self.inner.context);
        }
    }
}

/// Stops one bound worker early.
///
/// Dropping it leaves the worker bound until the interactor detaches.
pub struct WorkerUnbinder {
    binding: Option<Arc<Binding>>,
    context: RibContext,
}

impl WorkerUnbinder {
    fn unbound(context: RibContext) -> Self {
        Self {
            binding: None,
            context,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| !b.token.is_cancelled())
    }

    pub fn unbind(self) {
        if let Some(binding) = &self.binding {
            binding.cancel(&self.context);
        }
    }
}

async fn run_worker<W: Worker>(
    mut worker: W,
    scope: WorkerScope,
    rib: Rib,
    context: RibContext,
    started: oneshot::Sender<()>,
    stopped: oneshot::Sender<()>,
) {
    let name = worker.name();

    let begin = Instant::now();
    let start = tokio::select! {
        result = AssertUnwindSafe(worker.on_start(scope.clone())).catch_unwind() => Some(result),
        _ = scope.stopped() => None,
    };
    report_timing(&context, &rib, name, WorkerEvent::Start, begin.elapsed());
    let _ = started.send(());

    if let Some(Err(panic)) = start {
        context.report(RibError::WorkerPanicked {
            rib: rib.to_string(),
            worker: name,
            message: extract_panic_message(&panic),
        });
        return;
    }

    scope.stopped().await;

    let begin = Instant::now();
    if let Err(panic) = AssertUnwindSafe(worker.on_stop()).catch_unwind().await {
        context.report(RibError::WorkerPanicked {
            rib: rib.to_string(),
            worker: name,
            message: extract_panic_message(&panic),
        });
    }
    report_timing(&context, &rib, name, WorkerEvent::Stop, begin.elapsed());
    let _ = stopped.send(());
}

fn report_timing(
    context: &RibContext,
    rib: &Rib,
    worker: &'static str,
    event: WorkerEvent,
    duration: Duration,
) {
    log::trace!("{rib}: worker {worker} {event:?} took {duration:?}");
    if let Some(listener) = &context.config().worker_listener {
        let info = WorkerBinderInfo {
            worker,
            rib: rib.clone(),
            event,
            thread: std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
            duration,
        };
        listener.on_bind_completed(&info);
    }
}
