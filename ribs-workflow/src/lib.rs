//! Workflows: chains of asynchronous steps driven across a rib tree.
//!
//! A [`Step`] yields a value together with the actionable item the next
//! step operates on. Steps are chained with [`Step::then`] and run as one
//! [`WorkflowRun`], which can be awaited directly or tied to an
//! interactor's scope so detaching the interactor cancels it.

pub mod error;
pub mod step;
pub mod workflow;

pub use error::WorkflowError;
pub use step::{ActionableItem, NoValue, Step, StepData, WorkflowSteps};
pub use workflow::{Workflow, WorkflowHandle, WorkflowRun};
