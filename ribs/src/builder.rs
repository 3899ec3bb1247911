//! Builders construct nodes.

use std::sync::Arc;

use crate::context::BuildContext;
use crate::node::Node;

/// Constructs a [`Node`] for a parent.
///
/// Builders hold the dependencies a rib needs; `build` wires them into a
/// fresh interactor and node each time the parent routes to the rib.
pub trait Builder: Send + Sync {
    fn build(&self, cx: &BuildContext) -> Node;
}

impl<B: Builder + ?Sized> Builder for Arc<B> {
    fn build(&self, cx: &BuildContext) -> Node {
        (**self).build(cx)
    }
}

impl<B: Builder + ?Sized> Builder for Box<B> {
    fn build(&self, cx: &BuildContext) -> Node {
        (**self).build(cx)
    }
}

/// Builder backed by a closure.
pub struct BuildFn<F>(pub F);

impl<F> Builder for BuildFn<F>
where
    F: Fn(&BuildContext) -> Node + Send + Sync,
{
    fn build(&self, cx: &BuildContext) -> Node {
        (self.0)(cx)
    }
}
