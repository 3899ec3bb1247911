//! Nodes: the elements of a rib tree.
//!
//! A node combines an interactor, a routing strategy, an optional view and
//! the children its router attached. All lifecycle calls are driven by the
//! parent (or the [`RibTree`](crate::RibTree) for the root) and propagate
//! downwards:
//!
//! - attach: the node first, then the children its router creates
//! - detach: children in reverse attach order, then the node
//! - start: the node, then its visible children
//! - stop: visible children in reverse order, then the node

mod host;

pub(crate) use host::{ChildHost, detach_isolated, run_isolated};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bundle::Bundle;
use crate::context::{BuildContext, RibContext};
use crate::error::RibError;
use crate::events::{RibEvent, RibEventKind};
use crate::interactor::{AnyInteractor, Interactor, InteractorContext, InteractorInstance};
use crate::lifecycle::{InteractorLifecycle, LifecycleEvent, LifecycleState, Transition};
use crate::routing::{LeafRouting, RoutingStrategy};
use crate::view::{ContainerRef, ViewFactory};

const KEY_RIB: &str = "ribs.node.rib";
const KEY_INTERACTOR: &str = "ribs.node.interactor";
const KEY_ROUTER: &str = "ribs.node.router";
const KEY_VIEW: &str = "ribs.node.view";

/// Name of a kind of node, e.g. `"LoggedIn"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rib(String);

impl Rib {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Rib {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Rib {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Rib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Rib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rib({})", self.0)
    }
}

/// Runtime identity of one node. Not persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One element of a rib tree.
pub struct Node {
    id: NodeId,
    rib: Rib,
    parent: Option<Rib>,
    state: LifecycleState,
    interactor: Box<dyn AnyInteractor>,
    router: Box<dyn RoutingStrategy>,
    host: ChildHost,
    container: Option<ContainerRef>,
    saved_view: Option<Bundle>,
    build: BuildContext,
}

impl Node {
    /// Start building a node for `rib` driven by `interactor`.
    pub fn builder<I: Interactor>(
        cx: &BuildContext,
        rib: impl Into<Rib>,
        interactor: I,
    ) -> NodeBuilder<I> {
        NodeBuilder {
            cx: cx.clone(),
            rib: rib.into(),
            interactor,
            view_factory: None,
            router: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn rib(&self) -> &Rib {
        &self.rib
    }

    pub fn parent(&self) -> Option<&Rib> {
        self.parent.as_ref()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state.is_attached()
    }

    /// True once the node has been given a container, whether or not it
    /// created a view of its own. See [`Node::has_view`].
    pub fn is_view_attached(&self) -> bool {
        self.state.is_view_attached()
    }

    /// Whether the interactor holds a view. A node built without a view
    /// factory never has one; its children use the container it was given.
    pub fn has_view(&self) -> bool {
        self.interactor.has_view()
    }

    /// Interactor tag, stable across save and restore.
    pub fn tag(&self) -> &str {
        self.interactor.tag()
    }

    pub fn lifecycle(&self) -> InteractorLifecycle {
        self.interactor.lifecycle()
    }

    /// Interactor context while attached.
    pub fn interactor_context(&self) -> Option<&InteractorContext> {
        self.interactor.context()
    }

    pub fn context(&self) -> &RibContext {
        self.build.context()
    }

    /// Context this node hands to the builders of its children.
    pub fn build_context(&self) -> &BuildContext {
        &self.build
    }

    /// Children in attach order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.host.children()
    }

    pub fn child(&self, id: NodeId) -> Option<&Node> {
        self.host.child(id)
    }

    /// Depth-first search of this subtree.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().find_map(|child| child.find(id))
    }

    /// First node in this subtree with the given rib name.
    pub fn find_rib(&self, name: &str) -> Option<&Node> {
        if self.rib.name() == name {
            return Some(self);
        }
        self.children().find_map(|child| child.find_rib(name))
    }

    pub(crate) fn set_parent(&mut self, parent: Rib) {
        self.parent = Some(parent);
    }

    fn transition(&self, event: LifecycleEvent) -> Option<LifecycleState> {
        match self.state.on(event) {
            Transition::To(next) => Some(next),
            Transition::Ignore => None,
            Transition::Invalid => {
                self.context().report(RibError::InvalidTransition {
                    rib: self.rib.to_string(),
                    event,
                    state: self.state,
                });
                None
            }
        }
    }

    fn emit(&self, kind: RibEventKind) {
        self.context().emit(RibEvent {
            kind,
            rib: self.rib.clone(),
            node: self.id,
            parent: self.parent.clone(),
        });
    }

    /// Attach this node, restoring `saved` if given.
    ///
    /// Attaching twice reports a misuse and changes nothing.
    pub fn attach(&mut self, saved: Option<Bundle>) {
        let Some(next) = self.transition(LifecycleEvent::Attach) else {
            return;
        };
        if let Some(saved) = &saved
            && let Some(rib) = saved.get_string(KEY_RIB)
            && rib != self.rib.name()
        {
            log::warn!("{}: restoring state saved by '{rib}'", self.rib);
        }

        self.state = next;
        self.saved_view = saved
            .as_ref()
            .and_then(|bundle| bundle.get_bundle(KEY_VIEW))
            .cloned();
        match &self.parent {
            Some(parent) => log::debug!("ATTACHED {} to {parent}", self.rib),
            None => log::debug!("ATTACHED {} as root", self.rib),
        }
        self.emit(RibEventKind::Attached);

        self.interactor.attach(
            &self.rib,
            &self.build,
            saved.as_ref().and_then(|bundle| bundle.get_bundle(KEY_INTERACTOR)),
        );
        self.router.on_attach(
            &mut self.host,
            saved.as_ref().and_then(|bundle| bundle.get_bundle(KEY_ROUTER)),
        );
    }

    /// Detach this node and everything below it.
    ///
    /// Children go first, in reverse attach order. A no-op on a node that
    /// is not attached. A panicking view, router or interactor hook is
    /// reported and the remaining steps still run.
    pub fn detach(&mut self) {
        let Some(next) = self.transition(LifecycleEvent::Detach) else {
            return;
        };
        let context = self.build.context().clone();
        let rib = self.rib.clone();

        if self.state.is_view_attached() {
            run_isolated(&context, &rib, || self.detach_from_view());
        }
        run_isolated(&context, &rib, || self.router.on_detach(&mut self.host));
        self.host.detach_all();
        self.interactor.detach();

        self.state = next;
        match &self.parent {
            Some(parent) => log::debug!("DETACHED {} from {parent}", self.rib),
            None => log::debug!("DETACHED {} as root", self.rib),
        }
        self.emit(RibEventKind::Detached);
    }

    /// Give this node a view inside `container`.
    ///
    /// Visible children follow into the container the view exposes. A node
    /// without a view factory still moves to `ViewAttached` so start and stop
    /// reach its children, which go into `container` directly.
    pub fn attach_to_view(&mut self, container: ContainerRef) {
        let Some(next) = self.transition(LifecycleEvent::AttachView) else {
            return;
        };

        let saved = self.saved_view.take();
        self.interactor.create_view(&container, saved.as_ref());
        let child_container = self
            .interactor
            .child_container()
            .unwrap_or_else(|| container.clone());
        self.container = Some(container);
        self.state = next;
        self.emit(RibEventKind::ViewAttached);

        self.host.attach_views(child_container);
    }

    /// Remove this node's view. The node stays attached.
    ///
    /// A started node is stopped first.
    pub fn detach_from_view(&mut self) {
        let Some(next) = self.transition(LifecycleEvent::DetachView) else {
            return;
        };
        if self.state.is_started() {
            self.stop();
        }

        self.host.detach_views();
        if let Some(container) = self.container.take() {
            self.saved_view = self.interactor.destroy_view(&container);
        }
        self.state = next;
        self.emit(RibEventKind::ViewDetached);
    }

    /// Requires a view.
    pub fn start(&mut self) {
        let Some(next) = self.transition(LifecycleEvent::Start) else {
            return;
        };
        self.state = next;
        self.interactor.start();
        self.host.start_children();
    }

    pub fn stop(&mut self) {
        let Some(next) = self.transition(LifecycleEvent::Stop) else {
            return;
        };
        self.host.stop_children();
        self.interactor.stop();
        self.state = next;
    }

    /// Offer a back press to this subtree.
    ///
    /// Visible children are asked first, most recently attached first, then
    /// the interactor, then the router pops its back stack.
    pub fn handle_back_press(&mut self) -> bool {
        if !self.state.is_attached() {
            return false;
        }
        if self.host.back_press() {
            return true;
        }
        if self.interactor.handle_back_press() {
            log::debug!("{}: back press handled by interactor", self.rib);
            return true;
        }
        self.router.pop_back_stack(&mut self.host)
    }

    /// Snapshot this subtree.
    ///
    /// Children stay alive; their state is nested inside the router's
    /// entry.
    pub fn save_instance_state(&mut self) -> Bundle {
        let mut out = Bundle::new();
        out.put_string(KEY_RIB, self.rib.name());
        out.put_bundle(KEY_INTERACTOR, self.interactor.save_state());
        out.put_bundle(KEY_ROUTER, self.router.save_state(&mut self.host));
        if let Some(view) = self
            .interactor
            .view_state()
            .or_else(|| self.saved_view.clone())
        {
            out.put_bundle(KEY_VIEW, view);
        }
        out
    }

    /// Deliver an external result to the interactor that owns `code`.
    pub fn on_external_result(&mut self, code: u16, data: &Bundle) -> bool {
        let Some(group) = self.context().request_group(code) else {
            return false;
        };
        let request_id = self.context().registry().resolve_request_id(code);
        self.deliver_result(&group, request_id, data)
    }

    fn deliver_result(&mut self, group: &str, request_id: u16, data: &Bundle) -> bool {
        if !self.state.is_attached() {
            return false;
        }
        if self.interactor.tag() == group {
            return self.interactor.on_external_result(request_id, data);
        }
        self.host
            .children_mut()
            .any(|child| child.deliver_result(group, request_id, data))
    }

    /// Run queued routing commands in this subtree.
    ///
    /// Returns how many commands ran.
    pub fn dispatch(&mut self) -> usize {
        if !self.state.is_attached() {
            return 0;
        }
        let mut dispatched = self.router.dispatch(&mut self.host);
        for child in self.host.children_mut() {
            dispatched += child.dispatch();
        }
        dispatched
    }

    /// Whether any router in this subtree has queued commands.
    pub fn has_pending(&self) -> bool {
        self.state.is_attached()
            && (self.router.has_pending() || self.children().any(Node::has_pending))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("rib", &self.rib)
            .field("state", &self.state)
            .field("children", &self.host.len())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Node`].
pub struct NodeBuilder<I: Interactor> {
    cx: BuildContext,
    rib: Rib,
    interactor: I,
    view_factory: Option<Box<dyn ViewFactory<I::View>>>,
    router: Option<Box<dyn RoutingStrategy>>,
}

impl<I: Interactor> NodeBuilder<I> {
    /// How to create this node's view. Without one the node stays view-less
    /// even when its parent has a view.
    pub fn view_factory(mut self, factory: impl ViewFactory<I::View> + 'static) -> Self {
        self.view_factory = Some(Box::new(factory));
        self
    }

    /// Routing strategy; defaults to [`LeafRouting`].
    pub fn router(mut self, router: impl RoutingStrategy + 'static) -> Self {
        self.router = Some(Box::new(router));
        self
    }

    pub fn build(self) -> Node {
        let build = self.cx.scoped(&self.rib);
        let id = NodeId::new();
        Node {
            id,
            rib: self.rib.clone(),
            parent: None,
            state: LifecycleState::Created,
            interactor: Box::new(InteractorInstance::new(self.interactor, self.view_factory)),
            router: self
                .router
                .unwrap_or_else(|| Box::new(LeafRouting::new())),
            host: ChildHost::new(self.rib, build.clone()),
            container: None,
            saved_view: None,
            build,
        }
    }
}
