//! Worker binding, scoped tasks and cancellation on detach.

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::recording_config;
use ribs::prelude::*;
use ribs::{WorkerBinderInfo, WorkerEvent};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
struct Trace {
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    token: Arc<Mutex<Option<CancellationToken>>>,
    ticks: Arc<AtomicUsize>,
}

impl Trace {
    fn token(&self) -> CancellationToken {
        self.token.lock().unwrap().clone().unwrap()
    }
}

struct TickWorker {
    trace: Trace,
}

#[async_trait]
impl Worker for TickWorker {
    fn name(&self) -> &'static str {
        "TickWorker"
    }

    async fn on_start(&mut self, scope: WorkerScope) {
        *self.trace.token.lock().unwrap() = Some(scope.token());
        self.trace.started.store(true, Ordering::SeqCst);
        let ticks = self.trace.ticks.clone();
        scope.spawn(async move {
            loop {
                ticks.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });
    }

    async fn on_stop(&mut self) {
        self.trace.stopped.store(true, Ordering::SeqCst);
    }
}

/// Binds a worker and spawns a scoped task on attach.
struct Owner {
    trace: Trace,
    task: Arc<Mutex<Option<JoinHandle<Option<()>>>>>,
}

impl Interactor for Owner {
    type View = NoView;

    fn on_attach(&mut self, cx: &InteractorContext, _saved: Option<&Bundle>) {
        cx.bind_worker(TickWorker {
            trace: self.trace.clone(),
        });
        *self.task.lock().unwrap() = cx.spawn(futures::future::pending::<()>());
    }
}

type TaskSlot = Arc<Mutex<Option<JoinHandle<Option<()>>>>>;

fn owner_tree(config: RibsConfig, trace: &Trace) -> (RibTree, TaskSlot) {
    let task = Arc::new(Mutex::new(None));
    let mut tree = RibTree::new(config);
    let trace = trace.clone();
    let slot = task.clone();
    tree.attach_root(
        &BuildFn(move |cx: &BuildContext| {
            Node::builder(
                cx,
                "owner",
                Owner {
                    trace: trace.clone(),
                    task: slot.clone(),
                },
            )
            .build()
        }),
        None,
    );
    (tree, task)
}

#[tokio::test]
async fn test_detach_cancels_workers_synchronously() {
    let trace = Trace::default();
    let (mut tree, _task) = owner_tree(RibsConfig::default(), &trace);

    tree.settle().await;
    assert!(trace.started.load(Ordering::SeqCst));
    let token = trace.token();
    assert!(!token.is_cancelled());

    tree.detach_root();
    assert!(token.is_cancelled());

    tree.settle().await;
    assert!(trace.stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_scoped_task_is_cancelled_on_detach() {
    let trace = Trace::default();
    let (mut tree, task) = owner_tree(RibsConfig::default(), &trace);
    tree.settle().await;

    tree.detach_root();
    let handle = task.lock().unwrap().take().unwrap();
    assert_eq!(handle.await.unwrap(), None);
}

#[tokio::test]
async fn test_listener_reports_start_and_stop() {
    let seen: Arc<Mutex<Vec<WorkerBinderInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let config = RibsConfig::new().worker_listener(move |info: &WorkerBinderInfo| {
        sink.lock().unwrap().push(info.clone());
    });
    let trace = Trace::default();
    let (mut tree, _task) = owner_tree(config, &trace);

    tree.settle().await;
    tree.detach_root();
    tree.settle().await;

    let seen = seen.lock().unwrap();
    let events: Vec<_> = seen.iter().map(|info| (info.worker, info.event)).collect();
    assert_eq!(
        events,
        vec![("TickWorker", WorkerEvent::Start), ("TickWorker", WorkerEvent::Stop)]
    );
    assert_eq!(seen[0].rib, Rib::from("owner"));
}

#[tokio::test]
async fn test_unbind_stops_one_worker() {
    let trace = Trace::default();
    let unbinder = Arc::new(Mutex::new(None));

    struct Manual {
        trace: Trace,
        unbinder: Arc<Mutex<Option<ribs::WorkerUnbinder>>>,
    }

    impl Interactor for Manual {
        type View = NoView;

        fn on_attach(&mut self, cx: &InteractorContext, _saved: Option<&Bundle>) {
            let unbinder = cx.bind_worker(TickWorker {
                trace: self.trace.clone(),
            });
            *self.unbinder.lock().unwrap() = Some(unbinder);
        }
    }

    let mut tree = RibTree::new(RibsConfig::default());
    let trace_for_build = trace.clone();
    let slot = unbinder.clone();
    tree.attach_root(
        &BuildFn(move |cx: &BuildContext| {
            Node::builder(
                cx,
                "manual",
                Manual {
                    trace: trace_for_build.clone(),
                    unbinder: slot.clone(),
                },
            )
            .build()
        }),
        None,
    );
    tree.settle().await;

    let unbinder = unbinder.lock().unwrap().take().unwrap();
    assert!(unbinder.is_bound());
    unbinder.unbind();
    tree.settle().await;

    assert!(trace.stopped.load(Ordering::SeqCst));
    let workers = tree.root().unwrap().interactor_context().unwrap().workers();
    assert_eq!(workers.active_bindings(), 0);
}

#[test]
fn test_binding_without_runtime_is_reported() {
    let (config, errors) = recording_config();
    let trace = Trace::default();
    let (_tree, task) = owner_tree(config, &trace);

    assert!(task.lock().unwrap().is_none());
    let errors = errors.all();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| matches!(error, RibError::NoRuntime(_))));
    assert!(!trace.started.load(Ordering::SeqCst));
}

/// Binds a worker, keeps its scope and lifecycle, then panics on detach.
struct Brittle {
    trace: Trace,
    scope: Arc<Mutex<Option<CancellationToken>>>,
    lifecycle: Arc<Mutex<Option<InteractorLifecycle>>>,
}

impl Interactor for Brittle {
    type View = NoView;

    fn on_attach(&mut self, cx: &InteractorContext, _saved: Option<&Bundle>) {
        cx.bind_worker(TickWorker {
            trace: self.trace.clone(),
        });
        *self.scope.lock().unwrap() = Some(cx.scope());
        *self.lifecycle.lock().unwrap() = Some(cx.lifecycle());
    }

    fn on_detach(&mut self, _cx: &InteractorContext) {
        panic!("brittle cleanup");
    }
}

#[tokio::test]
async fn test_panicking_detach_hook_still_releases_scope() {
    let (config, errors) = recording_config();
    let trace = Trace::default();
    let scope = Arc::new(Mutex::new(None));
    let lifecycle = Arc::new(Mutex::new(None));

    let mut tree = RibTree::new(config);
    let (child_trace, child_scope, child_lifecycle) =
        (trace.clone(), scope.clone(), lifecycle.clone());
    tree.attach_root(
        &BuildFn(move |cx: &BuildContext| {
            let (trace, scope, lifecycle) =
                (child_trace.clone(), child_scope.clone(), child_lifecycle.clone());
            let routing = LeafRouting::new().permanent_with(move |cx| {
                Node::builder(
                    cx,
                    "brittle",
                    Brittle {
                        trace: trace.clone(),
                        scope: scope.clone(),
                        lifecycle: lifecycle.clone(),
                    },
                )
                .build()
            });
            Node::builder(cx, "parent", common::Recording::new("parent", &common::Journal::new()))
                .router(routing)
                .build()
        }),
        None,
    );
    tree.settle().await;
    let scope = scope.lock().unwrap().take().unwrap();
    let lifecycle = lifecycle.lock().unwrap().take().unwrap();
    assert!(!scope.is_cancelled());
    assert!(lifecycle.is_active());

    tree.detach_root();

    assert!(scope.is_cancelled());
    assert!(trace.token().is_cancelled());
    assert!(!lifecycle.is_active());
    assert!(lifecycle.is_detached());
    tree.settle().await;
    assert!(trace.stopped.load(Ordering::SeqCst));

    let errors = errors.all();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], RibError::CleanupFailed { rib, .. } if rib == "brittle"));
}
