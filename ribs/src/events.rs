//! Tree-wide lifecycle notifications.

use crate::node::{NodeId, Rib};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RibEventKind {
    Attached,
    Detached,
    ViewAttached,
    ViewDetached,
}

/// A node changed attachment or view state.
///
/// Published on the broadcast channel returned by
/// [`RibContext::events`](crate::RibContext::events). Slow receivers skip
/// the oldest events instead of slowing the tree down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibEvent {
    pub kind: RibEventKind,
    pub rib: Rib,
    pub node: NodeId,
    /// `None` for the root.
    pub parent: Option<Rib>,
}
