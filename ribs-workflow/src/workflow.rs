//! Running workflows.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use ribs::error::extract_panic_message;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::WorkflowError;
use crate::step::{ActionableItem, WorkflowSteps};

/// A named sequence of steps starting from a root actionable item.
pub trait Workflow<A: ActionableItem> {
    type Output: Send + 'static;

    /// Build the step chain. Nothing runs until the returned steps are
    /// polled.
    fn steps(&self, root: A) -> WorkflowSteps<Self::Output>;

    fn create(&self, root: A) -> WorkflowRun<Self::Output> {
        WorkflowRun::new(self.steps(root))
    }
}

/// One run of a workflow.
///
/// Resolves to `Ok(Some(value))` when the last step produced data,
/// `Ok(None)` when some step ended the chain early, and `Err` when a step
/// failed, panicked or the run was cancelled. Dropping it aborts the
/// remaining steps.
#[must_use = "workflows do nothing unless awaited or spawned"]
pub struct WorkflowRun<T> {
    future: BoxFuture<'static, Result<Option<T>, WorkflowError>>,
}

impl<T: Send + 'static> WorkflowRun<T> {
    pub fn new(steps: impl Into<WorkflowSteps<T>>) -> Self {
        let steps = steps.into().future;
        Self {
            future: async move {
                match AssertUnwindSafe(steps).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => Err(WorkflowError::Panicked(extract_panic_message(&panic))),
                }
            }
            .boxed(),
        }
    }

    /// Run until finished or until `cancel` fires.
    pub async fn run_until_cancelled(
        self,
        cancel: CancellationToken,
    ) -> Result<Option<T>, WorkflowError> {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("Workflow cancelled");
                Err(WorkflowError::Cancelled)
            }
            result = self => result,
        }
    }

    /// Run on the current tokio runtime until finished or `cancel` fires.
    ///
    /// Pass [`InteractorContext::scope`](ribs::InteractorContext::scope) to
    /// have the run cancelled when that interactor detaches.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> WorkflowHandle<T> {
        let task = tokio::spawn(self.run_until_cancelled(cancel.clone()));
        WorkflowHandle { cancel, task }
    }
}

impl<T> Future for WorkflowRun<T> {
    type Output = Result<Option<T>, WorkflowError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

/// A spawned [`WorkflowRun`].
pub struct WorkflowHandle<T> {
    cancel: CancellationToken,
    task: JoinHandle<Result<Option<T>, WorkflowError>>,
}

impl<T> WorkflowHandle<T> {
    /// Abort the remaining steps. The outcome becomes
    /// [`WorkflowError::Cancelled`] unless the run already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end.
    pub async fn outcome(self) -> Result<Option<T>, WorkflowError> {
        match self.task.await {
            Ok(result) => result,
            Err(error) if error.is_panic() => Err(WorkflowError::Panicked(extract_panic_message(
                &error.into_panic(),
            ))),
            Err(_) => Err(WorkflowError::Cancelled),
        }
    }
}
