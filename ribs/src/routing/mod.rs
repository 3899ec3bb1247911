//! Routing: deciding which children a node has.
//!
//! A node holds a [`RoutingStrategy`]. [`LeafRouting`] only attaches
//! permanent children; [`Router`] additionally maps a configuration value
//! to a [`RoutingAction`] and keeps a back stack of configurations driven
//! through its [`RouterHandle`].

mod action;
mod backstack;
mod connector;
mod router;

pub use action::{NodeFactory, RoutingAction};
pub use connector::RibConnector;
pub use router::{Router, RouterHandle, RoutingCommand};

use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::builder::Builder;
use crate::bundle::Bundle;
use crate::context::BuildContext;
use crate::node::{Node, NodeId};

/// Values a [`Router`] can route to. Usually a small enum.
pub trait Configuration:
    Clone + PartialEq + Debug + Send + Serialize + DeserializeOwned + 'static
{
}

impl<T> Configuration for T where
    T: Clone + PartialEq + Debug + Send + Serialize + DeserializeOwned + 'static
{
}

/// How a push treats what is already on a [`Router`]'s back stack.
///
/// Pushing the configuration that is already current is ignored for every
/// flag except [`PushFlag::NewTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushFlag {
    /// Cover the current entry.
    #[default]
    Default,
    /// Like `Default`, but the new entry is dropped instead of kept once
    /// something covers it, and it is never saved.
    Transient,
    /// Go back to the topmost entry holding the configuration, destroying
    /// everything above it. Pushes when there is none.
    ClearTop,
    /// Destroy every entry holding the configuration, then push a fresh one.
    SingleTop,
    /// Move the topmost entry holding the configuration to the top, keeping
    /// its children. Pushes when there is none.
    ReorderToTop,
    /// Leave the configuration as the only entry. Entries below it are
    /// destroyed if it is already current, otherwise this is a new root.
    NewTask,
}

/// How a node manages its children.
///
/// The node calls these with its child host as the connector.
pub trait RoutingStrategy: Send {
    /// The node was attached. `saved` is what `save_state` returned.
    fn on_attach(&mut self, connector: &mut dyn RibConnector, saved: Option<&Bundle>);

    /// Run queued commands; returns how many ran.
    fn dispatch(&mut self, connector: &mut dyn RibConnector) -> usize {
        let _ = connector;
        0
    }

    fn has_pending(&self) -> bool {
        false
    }

    /// Handle a back press nobody else consumed.
    fn pop_back_stack(&mut self, connector: &mut dyn RibConnector) -> bool {
        let _ = connector;
        false
    }

    fn save_state(&mut self, connector: &mut dyn RibConnector) -> Bundle {
        let _ = connector;
        Bundle::new()
    }

    /// The node is detaching. Children are detached by the node right
    /// after this returns.
    fn on_detach(&mut self, connector: &mut dyn RibConnector) {
        let _ = connector;
    }
}

const KEY_PERMANENT: &str = "permanent";

/// Children that live as long as their parent.
#[derive(Default)]
struct PermanentChildren {
    factories: Vec<NodeFactory>,
    children: Vec<NodeId>,
}

impl PermanentChildren {
    fn add<B: Builder + ?Sized + 'static>(&mut self, builder: Arc<B>) {
        self.factories
            .push(Box::new(move |cx: &BuildContext| builder.build(cx)));
    }

    fn add_with<F>(&mut self, factory: F)
    where
        F: Fn(&BuildContext) -> Node + Send + 'static,
    {
        self.factories.push(Box::new(factory));
    }

    fn attach(&mut self, connector: &mut dyn RibConnector, saved: Option<&Bundle>) {
        let saved = saved
            .and_then(|bundle| bundle.get_bundles(KEY_PERMANENT))
            .unwrap_or_default();
        let cx = connector.build_context().clone();
        for (index, factory) in self.factories.iter().enumerate() {
            let child = factory(&cx);
            let id = connector.attach_child(child, saved.get(index).cloned());
            self.children.push(id);
        }
    }

    fn save(&self, connector: &mut dyn RibConnector, out: &mut Bundle) {
        let saved = self
            .children
            .iter()
            .filter_map(|child| connector.save_child_state(*child))
            .collect();
        out.put_bundles(KEY_PERMANENT, saved);
    }

    fn forget(&mut self) {
        self.children.clear();
    }
}

/// Routing for nodes without configurations.
#[derive(Default)]
pub struct LeafRouting {
    permanent: PermanentChildren,
}

impl LeafRouting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a child built by `builder` whenever the node attaches.
    pub fn permanent<B: Builder + ?Sized + 'static>(mut self, builder: Arc<B>) -> Self {
        self.permanent.add(builder);
        self
    }

    pub fn permanent_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&BuildContext) -> Node + Send + 'static,
    {
        self.permanent.add_with(factory);
        self
    }
}

impl RoutingStrategy for LeafRouting {
    fn on_attach(&mut self, connector: &mut dyn RibConnector, saved: Option<&Bundle>) {
        self.permanent.attach(connector, saved);
    }

    fn save_state(&mut self, connector: &mut dyn RibConnector) -> Bundle {
        let mut out = Bundle::new();
        self.permanent.save(connector, &mut out);
        out
    }

    fn on_detach(&mut self, _connector: &mut dyn RibConnector) {
        self.permanent.forget();
    }
}
