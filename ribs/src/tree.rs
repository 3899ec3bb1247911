//! Tree runtime: owns the root node and drives routing.

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::builder::Builder;
use crate::bundle::Bundle;
use crate::config::RibsConfig;
use crate::context::{BuildContext, RibContext};
use crate::error::RibError;
use crate::events::RibEvent;
use crate::node::{Node, NodeId, detach_isolated};
use crate::request_code::RequestCodeRegistry;
use crate::view::ContainerRef;
use crate::wakeup::WakeupReceiver;

const KEY_ROOT: &str = "ribs.tree.root";
const KEY_REQUEST_CODES: &str = "ribs.tree.request_codes";

/// Owner of one rib tree.
///
/// All lifecycle calls go through the tree, which forwards them to the
/// root. Routing commands queued on [`RouterHandle`](crate::RouterHandle)s
/// run on [`dispatch`](Self::dispatch), which every entry point calls
/// before returning, and from [`run`](Self::run) when a handle wakes it.
pub struct RibTree {
    context: RibContext,
    root: Option<Node>,
}

impl RibTree {
    pub fn new(config: RibsConfig) -> Self {
        Self {
            context: RibContext::new(config),
            root: None,
        }
    }

    pub fn context(&self) -> &RibContext {
        &self.context
    }

    /// Subscribe to attach/detach notifications.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<RibEvent> {
        self.context.events()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Node> {
        self.root.as_mut()
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.root.as_ref()?.find(id)
    }

    /// Build and attach the root, restoring `saved` from
    /// [`save_instance_state`](Self::save_instance_state).
    pub fn attach_root<B: Builder + ?Sized>(
        &mut self,
        builder: &B,
        saved: Option<Bundle>,
    ) -> NodeId {
        if let Some(root) = &self.root {
            self.context
                .report(RibError::RootAlreadyAttached(root.rib().to_string()));
            return root.id();
        }

        let saved = saved.unwrap_or_default();
        if let Some(codes) = saved.get_bundle(KEY_REQUEST_CODES) {
            let layout = self.context.config().request_code_layout;
            match RequestCodeRegistry::restore(layout, codes) {
                Ok(registry) => *self.context.registry() = registry,
                Err(error) => self.context.report(error),
            }
        }
        let root_state = saved.get_bundle(KEY_ROOT).cloned();

        let mut root = builder.build(&BuildContext::new(self.context.clone()));
        info!("Attaching root {}", root.rib());
        root.attach(root_state);
        let id = root.id();
        self.root = Some(root);
        self.dispatch();
        id
    }

    pub fn attach_to_view(&mut self, container: ContainerRef) {
        if let Some(root) = &mut self.root {
            root.attach_to_view(container);
        }
        self.dispatch();
    }

    pub fn detach_from_view(&mut self) {
        if let Some(root) = &mut self.root {
            root.detach_from_view();
        }
        self.dispatch();
    }

    pub fn start(&mut self) {
        if let Some(root) = &mut self.root {
            root.start();
        }
        self.dispatch();
    }

    pub fn stop(&mut self) {
        if let Some(root) = &mut self.root {
            root.stop();
        }
        self.dispatch();
    }

    /// Returns `false` when nothing consumed the press and the host
    /// should handle it.
    pub fn handle_back_press(&mut self) -> bool {
        let handled = self
            .root
            .as_mut()
            .is_some_and(|root| root.handle_back_press());
        self.dispatch();
        handled
    }

    /// Snapshot the whole tree. Nothing is detached.
    pub fn save_instance_state(&mut self) -> Bundle {
        self.dispatch();
        let mut out = Bundle::new();
        if let Some(root) = &mut self.root {
            out.put_bundle(KEY_ROOT, root.save_instance_state());
        }
        let codes = self.context.registry().save();
        match codes {
            Ok(codes) => out.put_bundle(KEY_REQUEST_CODES, codes),
            Err(error) => self.context.report(error),
        }
        out
    }

    /// Deliver a result for a request code handed out by an interactor.
    pub fn on_external_result(&mut self, code: u16, data: &Bundle) -> bool {
        let handled = self
            .root
            .as_mut()
            .is_some_and(|root| root.on_external_result(code, data));
        if !handled {
            debug!("No interactor handled request code {code:#06x}");
        }
        self.dispatch();
        handled
    }

    /// Detach and drop the root.
    pub fn detach_root(&mut self) {
        if let Some(mut root) = self.root.take() {
            info!("Detaching root {}", root.rib());
            detach_isolated(&mut root, &self.context);
        }
    }

    /// Run queued routing commands until none are left.
    ///
    /// Commands may queue further commands; after `max_dispatch_rounds`
    /// rounds the remaining ones wait for the next call and a
    /// [`RibError::RoutingLoop`] is reported.
    pub fn dispatch(&mut self) -> usize {
        let Some(root) = &mut self.root else {
            return 0;
        };
        let rounds = self.context.config().max_dispatch_rounds;
        let mut total = 0;
        for _ in 0..rounds {
            if !root.has_pending() {
                return total;
            }
            total += root.dispatch();
        }
        if root.has_pending() {
            self.context.report(RibError::RoutingLoop { rounds });
        }
        total
    }

    /// Wait for every outstanding worker start and stop.
    pub async fn settle(&self) {
        self.context.settle().await;
    }

    /// Dispatch routing commands as they arrive until `shutdown` fires.
    ///
    /// Cancel safe: dropping the future mid-wait leaves the tree ready for
    /// the next call.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let Some(wakeup) = self.context.take_wakeup_receiver() else {
            warn!("Tree is already running");
            return;
        };
        let mut lease = WakeupLease {
            context: self.context.clone(),
            wakeup: Some(wakeup),
        };
        self.dispatch();

        while let Some(wakeup) = lease.wakeup.as_mut() {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                signal = wakeup.recv() => {
                    if signal.is_none() {
                        break;
                    }
                    wakeup.drain();
                    let dispatched = self.dispatch();
                    debug!("Dispatched {dispatched} routing commands");
                }
            }
        }
    }
}

/// Hands the wakeup receiver back to the context when `run` ends.
struct WakeupLease {
    context: RibContext,
    wakeup: Option<WakeupReceiver>,
}

impl Drop for WakeupLease {
    fn drop(&mut self) {
        if let Some(wakeup) = self.wakeup.take() {
            self.context.return_wakeup_receiver(wakeup);
        }
    }
}

impl Drop for RibTree {
    fn drop(&mut self) {
        self.detach_root();
    }
}
