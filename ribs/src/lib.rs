//! Tree-structured composition of business-logic units.
//!
//! A rib tree is made of [`Node`]s. Each node pairs an [`Interactor`]
//! (business logic) with a [`RoutingStrategy`] (which children exist) and an
//! optional view. Nodes attach and detach their children in a fixed order,
//! propagate lifecycle events down the tree and persist their state into
//! [`Bundle`]s.
//!
//! The [`RibTree`] owns the root node, drains routing commands issued through
//! [`RouterHandle`]s and exposes host-facing entry points (back press, view
//! attachment, state saving).

pub mod builder;
pub mod bundle;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod events;
pub mod interactor;
pub mod lifecycle;
pub mod node;
pub mod request_code;
pub mod routing;
pub mod tree;
pub mod view;
pub mod wakeup;
pub mod worker;

pub use builder::{BuildFn, Builder};
pub use bundle::{Bundle, BundleError};
pub use config::RibsConfig;
pub use context::{BuildContext, RibContext};
pub use directory::{Customisation, CustomisationDirectory};
pub use error::RibError;
pub use events::{RibEvent, RibEventKind};
pub use interactor::{Interactor, InteractorContext};
pub use lifecycle::{InteractorEvent, InteractorLifecycle, LifecycleEvent, LifecycleState};
pub use node::{Node, NodeBuilder, NodeId, Rib};
pub use request_code::{RequestCodeLayout, RequestCodeRegistry};
pub use routing::{
    Configuration, LeafRouting, PushFlag, RibConnector, Router, RouterHandle, RoutingAction,
    RoutingCommand, RoutingStrategy,
};
pub use tree::RibTree;
pub use view::{ContainerRef, NoView, RibView, ViewContainer, ViewFactory};
pub use worker::{
    Worker, WorkerBinder, WorkerBinderInfo, WorkerBinderListener, WorkerEvent, WorkerScope,
    WorkerUnbinder,
};

pub mod prelude {
    pub use crate::builder::{BuildFn, Builder};
    pub use crate::bundle::Bundle;
    pub use crate::config::RibsConfig;
    pub use crate::context::{BuildContext, RibContext};
    pub use crate::directory::{Customisation, CustomisationDirectory};
    pub use crate::error::RibError;
    pub use crate::interactor::{Interactor, InteractorContext};
    pub use crate::lifecycle::{InteractorEvent, InteractorLifecycle, LifecycleState};
    pub use crate::node::{Node, NodeId, Rib};
    pub use crate::routing::{LeafRouting, PushFlag, Router, RouterHandle, RoutingAction};
    pub use crate::tree::RibTree;
    pub use crate::view::{ContainerRef, NoView, RibView, ViewContainer};
    pub use crate::worker::{Worker, WorkerScope};
}
