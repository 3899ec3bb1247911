//! Child storage of a node and the connector routers use to reach it.

use std::panic::{self, AssertUnwindSafe};

use crate::bundle::Bundle;
use crate::context::{BuildContext, RibContext};
use crate::error::{RibError, extract_panic_message};
use crate::lifecycle::{LifecycleEvent, LifecycleState};
use crate::node::{Node, NodeId, Rib};
use crate::routing::RibConnector;
use crate::view::ContainerRef;

struct ChildSlot {
    node: Node,
    /// Set when the router took the child's view away.
    hidden: bool,
}

/// The children of one node, in attach order.
///
/// Children follow the parent's view and start state: a child attached to a
/// view-attached parent gets a view right away, a child attached to a
/// started parent is started.
pub(crate) struct ChildHost {
    rib: Rib,
    build: BuildContext,
    children: Vec<ChildSlot>,
    container: Option<ContainerRef>,
    started: bool,
}

impl ChildHost {
    pub(crate) fn new(rib: Rib, build: BuildContext) -> Self {
        Self {
            rib,
            build,
            children: Vec::new(),
            container: None,
            started: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().map(|slot| &slot.node)
    }

    pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().map(|slot| &mut slot.node)
    }

    pub(crate) fn child(&self, id: NodeId) -> Option<&Node> {
        self.children().find(|node| node.id() == id)
    }

    fn context(&self) -> &RibContext {
        self.build.context()
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        let position = self.children.iter().position(|slot| slot.node.id() == id);
        if position.is_none() {
            self.context().report(RibError::UnknownChild {
                rib: self.rib.to_string(),
                child: id.to_string(),
            });
        }
        position
    }

    /// Show visible children inside `container`.
    pub(crate) fn attach_views(&mut self, container: ContainerRef) {
        for slot in self.children.iter_mut().filter(|slot| !slot.hidden) {
            slot.node.attach_to_view(container.clone());
        }
        self.container = Some(container);
    }

    pub(crate) fn detach_views(&mut self) {
        for slot in self.children.iter_mut().rev() {
            slot.node.detach_from_view();
        }
        self.container = None;
    }

    pub(crate) fn start_children(&mut self) {
        self.started = true;
        for slot in self.children.iter_mut().filter(|slot| !slot.hidden) {
            slot.node.start();
        }
    }

    pub(crate) fn stop_children(&mut self) {
        self.started = false;
        for slot in self.children.iter_mut().rev() {
            slot.node.stop();
        }
    }

    /// Visible children, most recent first.
    pub(crate) fn back_press(&mut self) -> bool {
        self.children
            .iter_mut()
            .rev()
            .filter(|slot| !slot.hidden)
            .any(|slot| slot.node.handle_back_press())
    }

    /// Detach every child, most recent first.
    pub(crate) fn detach_all(&mut self) {
        while let Some(mut slot) = self.children.pop() {
            detach_isolated(&mut slot.node, self.build.context());
        }
    }
}

/// Detach `node`, reporting a panic instead of propagating it.
pub(crate) fn detach_isolated(node: &mut Node, context: &RibContext) {
    let rib = node.rib().clone();
    run_isolated(context, &rib, || node.detach());
}

/// Run one cleanup step of `rib`. A panic is reported as a cleanup failure.
pub(crate) fn run_isolated(context: &RibContext, rib: &Rib, step: impl FnOnce()) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(step)) {
        context.report(RibError::CleanupFailed {
            rib: rib.to_string(),
            message: extract_panic_message(&panic),
        });
    }
}

impl RibConnector for ChildHost {
    fn build_context(&self) -> &BuildContext {
        &self.build
    }

    fn attach_child(&mut self, mut child: Node, saved: Option<Bundle>) -> NodeId {
        let id = child.id();
        if child.state() != LifecycleState::Created {
            self.context().report(RibError::InvalidTransition {
                rib: child.rib().to_string(),
                event: LifecycleEvent::Attach,
                state: child.state(),
            });
            return id;
        }

        child.set_parent(self.rib.clone());
        child.attach(saved);
        if let Some(container) = &self.container {
            child.attach_to_view(container.clone());
        }
        if self.started {
            child.start();
        }
        self.children.push(ChildSlot {
            node: child,
            hidden: false,
        });
        id
    }

    fn attach_child_view(&mut self, id: NodeId) {
        let Some(index) = self.position(id) else {
            return;
        };
        let slot = &mut self.children[index];
        slot.hidden = false;
        if let Some(container) = &self.container {
            slot.node.attach_to_view(container.clone());
        }
        if self.started {
            slot.node.start();
        }
    }

    fn detach_child_view(&mut self, id: NodeId) {
        let Some(index) = self.position(id) else {
            return;
        };
        let slot = &mut self.children[index];
        slot.hidden = true;
        slot.node.detach_from_view();
    }

    fn detach_child(&mut self, id: NodeId) {
        let Some(index) = self.position(id) else {
            return;
        };
        let mut slot = self.children.remove(index);
        detach_isolated(&mut slot.node, self.build.context());
    }

    fn save_child_state(&mut self, id: NodeId) -> Option<Bundle> {
        let index = self.position(id)?;
        Some(self.children[index].node.save_instance_state())
    }
}
