use std::fmt;
use std::sync::Arc;

use crate::builder::Builder;
use crate::context::BuildContext;
use crate::node::Node;

/// Creates one child node.
pub type NodeFactory = Box<dyn Fn(&BuildContext) -> Node + Send>;

type Hook = Box<dyn FnMut() + Send>;

/// What becoming the current configuration means.
///
/// Children are created from `factories` the first time the action runs and
/// kept alive while its back stack entry exists. `execute` runs every time
/// the entry becomes current, `cleanup` every time it stops being current.
#[derive(Default)]
pub struct RoutingAction {
    factories: Vec<NodeFactory>,
    on_execute: Option<Hook>,
    on_cleanup: Option<Hook>,
}

impl RoutingAction {
    /// Action that attaches nothing.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Attach one child built by `builder`.
    pub fn attach<B: Builder + ?Sized + 'static>(builder: Arc<B>) -> Self {
        Self::noop().with_child(builder)
    }

    /// Attach one child built by a closure.
    pub fn attach_with<F>(factory: F) -> Self
    where
        F: Fn(&BuildContext) -> Node + Send + 'static,
    {
        Self {
            factories: vec![Box::new(factory)],
            ..Self::default()
        }
    }

    /// Attach several children, in order.
    pub fn attach_many<I>(builders: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Builder>>,
    {
        builders
            .into_iter()
            .fold(Self::noop(), |action, builder| action.with_child(builder))
    }

    /// Run `hook` when the configuration becomes current, attach nothing.
    pub fn invoke<F>(hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::noop().on_execute(hook)
    }

    pub fn with_child<B: Builder + ?Sized + 'static>(mut self, builder: Arc<B>) -> Self {
        self.factories
            .push(Box::new(move |cx: &BuildContext| builder.build(cx)));
        self
    }

    pub fn on_execute<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_execute = Some(Box::new(hook));
        self
    }

    pub fn on_cleanup<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_cleanup = Some(Box::new(hook));
        self
    }

    pub fn child_count(&self) -> usize {
        self.factories.len()
    }

    pub(crate) fn build_children(&self, cx: &BuildContext) -> Vec<Node> {
        self.factories.iter().map(|factory| factory(cx)).collect()
    }

    pub(crate) fn execute(&mut self) {
        if let Some(hook) = &mut self.on_execute {
            hook();
        }
    }

    pub(crate) fn cleanup(&mut self) {
        if let Some(hook) = &mut self.on_cleanup {
            hook();
        }
    }
}

impl fmt::Debug for RoutingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingAction")
            .field("children", &self.factories.len())
            .field("on_execute", &self.on_execute.is_some())
            .field("on_cleanup", &self.on_cleanup.is_some())
            .finish()
    }
}
