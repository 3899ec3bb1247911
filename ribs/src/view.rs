//! View seams.
//!
//! The tree never renders anything. It asks a [`ViewFactory`] for a view,
//! hands the view to a host-provided [`ViewContainer`] and removes it again
//! when the node loses its view.

use std::sync::Arc;

use crate::bundle::Bundle;

/// A view owned by a node.
pub trait RibView: Send + 'static {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Container that children of this node place their views into.
    ///
    /// `None` means children share the container this view lives in.
    fn child_container(&self) -> Option<ContainerRef> {
        None
    }

    /// View-local state persisted with the node.
    fn save_state(&self) -> Bundle {
        Bundle::new()
    }

    fn restore_state(&mut self, state: &Bundle) {
        let _ = state;
    }
}

/// Host-side parent of views.
pub trait ViewContainer: Send + Sync {
    fn add_view(&self, view: &dyn RibView);
    fn remove_view(&self, view: &dyn RibView);
}

pub type ContainerRef = Arc<dyn ViewContainer>;

/// Creates the view for a node.
pub trait ViewFactory<V>: Send + Sync {
    fn create(&self, container: &ContainerRef) -> V;
}

impl<V, F> ViewFactory<V> for F
where
    F: Fn(&ContainerRef) -> V + Send + Sync,
{
    fn create(&self, container: &ContainerRef) -> V {
        self(container)
    }
}

/// View type for view-less nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoView;

impl RibView for NoView {
    fn name(&self) -> &str {
        "NoView"
    }
}
