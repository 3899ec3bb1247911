use crate::bundle::Bundle;
use crate::context::BuildContext;
use crate::node::{Node, NodeId};

/// How a router manipulates the children of its node.
///
/// Node attachment and view attachment are separate: a child can lose its
/// view and stay attached (pushed under another configuration), then get
/// it back later.
pub trait RibConnector {
    /// Context for building children of this node.
    fn build_context(&self) -> &BuildContext;

    /// Attach `child`, restoring `saved`. The child gets a view if the node
    /// has one and is started if the node is.
    fn attach_child(&mut self, child: Node, saved: Option<Bundle>) -> NodeId;

    /// Give a hidden child its view back.
    fn attach_child_view(&mut self, child: NodeId);

    /// Take a child's view away; the child stays attached.
    fn detach_child_view(&mut self, child: NodeId);

    /// Detach and drop a child.
    fn detach_child(&mut self, child: NodeId);

    /// Snapshot a child's state without detaching it.
    fn save_child_state(&mut self, child: NodeId) -> Option<Bundle>;
}
