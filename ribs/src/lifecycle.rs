//! Node lifecycle states and the interactor activity stream.

use std::fmt;

use tokio::sync::watch;

/// Lifecycle state of a [`Node`](crate::Node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Built but not yet attached to a parent.
    #[default]
    Created,
    /// Logically attached, no view.
    Attached,
    /// Attached with a view in a container.
    ViewAttached,
    /// View attached and visible to the user.
    Started,
    /// View attached but no longer visible.
    Stopped,
    /// Detached for good. A detached node cannot be attached again.
    Detached,
}

impl LifecycleState {
    pub fn is_attached(self) -> bool {
        matches!(
            self,
            Self::Attached | Self::ViewAttached | Self::Started | Self::Stopped
        )
    }

    pub fn is_view_attached(self) -> bool {
        matches!(self, Self::ViewAttached | Self::Started | Self::Stopped)
    }

    pub fn is_started(self) -> bool {
        self == Self::Started
    }

    /// Apply a lifecycle event to this state.
    pub fn on(self, event: LifecycleEvent) -> Transition {
        use LifecycleEvent as E;
        use LifecycleState as S;

        match (self, event) {
            (S::Created, E::Attach) => Transition::To(S::Attached),
            (_, E::Attach) => Transition::Invalid,

            (S::Attached, E::AttachView) => Transition::To(S::ViewAttached),
            (_, E::AttachView) => Transition::Invalid,

            (S::ViewAttached | S::Stopped, E::Start) => Transition::To(S::Started),
            (S::Started, E::Start) => Transition::Ignore,
            (_, E::Start) => Transition::Invalid,

            (S::Started, E::Stop) => Transition::To(S::Stopped),
            (S::Attached | S::ViewAttached | S::Stopped, E::Stop) => Transition::Ignore,
            (_, E::Stop) => Transition::Invalid,

            (S::ViewAttached | S::Started | S::Stopped, E::DetachView) => {
                Transition::To(S::Attached)
            }
            (_, E::DetachView) => Transition::Ignore,

            (S::Created | S::Detached, E::Detach) => Transition::Ignore,
            (_, E::Detach) => Transition::To(S::Detached),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Attached => "attached",
            Self::ViewAttached => "view-attached",
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Detached => "detached",
        };
        f.write_str(name)
    }
}

/// Events that move a node between lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Attach,
    AttachView,
    Start,
    Stop,
    DetachView,
    Detach,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attach => "attach",
            Self::AttachView => "attach a view",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::DetachView => "detach its view",
            Self::Detach => "detach",
        };
        f.write_str(name)
    }
}

/// Outcome of applying a [`LifecycleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given state.
    To(LifecycleState),
    /// Already there; nothing to do.
    Ignore,
    /// The event is not allowed in the current state.
    Invalid,
}

/// Activity of an interactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractorEvent {
    /// Between attach and detach.
    Active,
    /// Not attached yet.
    #[default]
    Inactive,
    /// Detached for good. Interactors never come back from here.
    Detached,
}

/// Observable activity of one interactor.
///
/// Backed by a watch channel: receivers always see the latest value and
/// never apply backpressure to the node.
#[derive(Debug, Clone)]
pub struct InteractorLifecycle {
    rx: watch::Receiver<InteractorEvent>,
}

impl InteractorLifecycle {
    pub(crate) fn new(rx: watch::Receiver<InteractorEvent>) -> Self {
        Self { rx }
    }

    /// Latest activity value.
    pub fn current(&self) -> InteractorEvent {
        *self.rx.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.current() == InteractorEvent::Active
    }

    pub fn is_detached(&self) -> bool {
        self.current() == InteractorEvent::Detached
    }

    /// Wait until the interactor is active.
    ///
    /// Returns `false` if the interactor detached or was dropped before
    /// becoming active.
    pub async fn wait_active(&mut self) -> bool {
        self.rx
            .wait_for(|event| *event != InteractorEvent::Inactive)
            .await
            .is_ok_and(|event| *event == InteractorEvent::Active)
    }

    /// Wait until the interactor is no longer active (or dropped).
    pub async fn wait_inactive(&mut self) {
        let _ = self
            .rx
            .wait_for(|event| *event != InteractorEvent::Active)
            .await;
    }

    /// Wait for the next activity change.
    ///
    /// Returns `None` once the interactor has been dropped.
    pub async fn changed(&mut self) -> Option<InteractorEvent> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_only_from_created() {
        assert_eq!(
            LifecycleState::Created.on(LifecycleEvent::Attach),
            Transition::To(LifecycleState::Attached)
        );
        for state in [
            LifecycleState::Attached,
            LifecycleState::ViewAttached,
            LifecycleState::Started,
            LifecycleState::Stopped,
            LifecycleState::Detached,
        ] {
            assert_eq!(state.on(LifecycleEvent::Attach), Transition::Invalid);
        }
    }

    #[test]
    fn test_view_requires_attach() {
        assert_eq!(
            LifecycleState::Created.on(LifecycleEvent::AttachView),
            Transition::Invalid
        );
        assert_eq!(
            LifecycleState::Attached.on(LifecycleEvent::AttachView),
            Transition::To(LifecycleState::ViewAttached)
        );
        assert_eq!(
            LifecycleState::Started.on(LifecycleEvent::AttachView),
            Transition::Invalid
        );
    }

    #[test]
    fn test_start_requires_view() {
        assert_eq!(
            LifecycleState::Attached.on(LifecycleEvent::Start),
            Transition::Invalid
        );
        assert_eq!(
            LifecycleState::Stopped.on(LifecycleEvent::Start),
            Transition::To(LifecycleState::Started)
        );
        assert_eq!(
            LifecycleState::Started.on(LifecycleEvent::Start),
            Transition::Ignore
        );
    }

    #[test]
    fn test_detach_is_idempotent() {
        assert_eq!(
            LifecycleState::Detached.on(LifecycleEvent::Detach),
            Transition::Ignore
        );
        assert_eq!(
            LifecycleState::Created.on(LifecycleEvent::Detach),
            Transition::Ignore
        );
        assert_eq!(
            LifecycleState::Started.on(LifecycleEvent::Detach),
            Transition::To(LifecycleState::Detached)
        );
    }

    #[test]
    fn test_detach_view_without_view_is_ignored() {
        assert_eq!(
            LifecycleState::Attached.on(LifecycleEvent::DetachView),
            Transition::Ignore
        );
        assert_eq!(
            LifecycleState::Started.on(LifecycleEvent::DetachView),
            Transition::To(LifecycleState::Attached)
        );
    }

    #[tokio::test]
    async fn test_wait_active_sees_current_value() {
        let (tx, rx) = watch::channel(InteractorEvent::Inactive);
        let mut lifecycle = InteractorLifecycle::new(rx);
        assert!(!lifecycle.is_active());

        tx.send_replace(InteractorEvent::Active);
        assert!(lifecycle.wait_active().await);
        assert!(lifecycle.is_active());
    }

    #[tokio::test]
    async fn test_wait_active_fails_when_dropped() {
        let (tx, rx) = watch::channel(InteractorEvent::Inactive);
        let mut lifecycle = InteractorLifecycle::new(rx);
        drop(tx);
        assert!(!lifecycle.wait_active().await);
    }

    #[tokio::test]
    async fn test_wait_active_fails_once_detached() {
        let (tx, rx) = watch::channel(InteractorEvent::Active);
        let mut lifecycle = InteractorLifecycle::new(rx);
        tx.send_replace(InteractorEvent::Detached);

        assert!(!lifecycle.wait_active().await);
        assert!(lifecycle.is_detached());
        lifecycle.wait_inactive().await;
    }
}
