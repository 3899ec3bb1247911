//! Steps and the data they pass along.

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use ribs::{InteractorContext, InteractorLifecycle};

use crate::error::WorkflowError;

/// Something a workflow step can act on, usually exposed by an interactor.
pub trait ActionableItem: Send + 'static {
    /// Lifecycle of the interactor behind this item. Steps wait for it to
    /// be active before handing the item on.
    fn lifecycle(&self) -> InteractorLifecycle;
}

impl ActionableItem for InteractorContext {
    fn lifecycle(&self) -> InteractorLifecycle {
        InteractorContext::lifecycle(self)
    }
}

/// Placeholder value for steps that only hand over an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoValue;

/// Output of one step: a value plus the item the next step acts on.
#[derive(Debug)]
pub struct StepData<T, A> {
    value: T,
    item: A,
}

impl<T, A> StepData<T, A> {
    pub fn new(value: T, item: A) -> Self {
        Self { value, item }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn item(&self) -> &A {
        &self.item
    }

    pub fn into_parts(self) -> (T, A) {
        (self.value, self.item)
    }
}

impl<A> StepData<NoValue, A> {
    pub fn to_actionable_item(item: A) -> Self {
        Self::new(NoValue, item)
    }
}

type StepFuture<T, A> = BoxFuture<'static, Result<Option<StepData<T, A>>, WorkflowError>>;

/// A lazy, single-shot step.
///
/// Nothing runs until the workflow built from it is polled.
#[must_use = "steps do nothing unless run as part of a workflow"]
pub struct Step<T, A> {
    future: StepFuture<T, A>,
}

impl<T, A> Step<T, A>
where
    T: Send + 'static,
    A: ActionableItem,
{
    /// Step that always produces data once `future` resolves.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<StepData<T, A>, WorkflowError>> + Send + 'static,
    {
        Self {
            future: future.map(|result| result.map(Some)).boxed(),
        }
    }

    /// Step that may finish without data, ending the workflow.
    pub fn from_optional<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<StepData<T, A>>, WorkflowError>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    pub fn ready(value: T, item: A) -> Self {
        Self::from_optional(futures::future::ready(Ok(Some(StepData::new(value, item)))))
    }

    pub fn absent() -> Self {
        Self::from_optional(futures::future::ready(Ok(None)))
    }

    pub fn failed(error: WorkflowError) -> Self {
        Self::from_optional(futures::future::ready(Err(error)))
    }

    /// Chain `next` after this step.
    ///
    /// `next` runs only if this step produced data and its item became
    /// active. An absent step short-circuits the rest of the chain, and so
    /// does an item whose interactor detached before becoming active.
    pub fn then<T2, A2, F>(self, next: F) -> Step<T2, A2>
    where
        T2: Send + 'static,
        A2: ActionableItem,
        F: FnOnce(T, A) -> Step<T2, A2> + Send + 'static,
    {
        Step {
            future: async move {
                let Some(data) = self.resolve().await? else {
                    return Ok(None);
                };
                let (value, item) = data.into_parts();
                next(value, item).future.await
            }
            .boxed(),
        }
    }

    /// Run this step and wait for its item to become active.
    async fn resolve(self) -> Result<Option<StepData<T, A>>, WorkflowError> {
        let Some(data) = self.future.await? else {
            return Ok(None);
        };
        let mut lifecycle = data.item.lifecycle();
        if !lifecycle.wait_active().await {
            log::debug!("Actionable item went away before becoming active");
            return Ok(None);
        }
        Ok(Some(data))
    }

    pub(crate) async fn into_result(self) -> Result<Option<T>, WorkflowError> {
        Ok(self.resolve().await?.map(|data| data.value))
    }
}

/// Final step of a workflow with its item type erased.
#[must_use = "workflow steps do nothing unless run"]
pub struct WorkflowSteps<T> {
    pub(crate) future: BoxFuture<'static, Result<Option<T>, WorkflowError>>,
}

impl<T, A> From<Step<T, A>> for WorkflowSteps<T>
where
    T: Send + 'static,
    A: ActionableItem,
{
    fn from(step: Step<T, A>) -> Self {
        Self {
            future: step.into_result().boxed(),
        }
    }
}
