//! Type-erased interactor wrapper for node storage.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::bundle::Bundle;
use crate::context::BuildContext;
use crate::error::{RibError, extract_panic_message};
use crate::lifecycle::{InteractorEvent, InteractorLifecycle};
use crate::node::Rib;
use crate::view::{ContainerRef, RibView, ViewFactory};

use super::{Interactor, InteractorContext};

const KEY_TAG: &str = "ribs.interactor.tag";

/// Type-erased interactor with its view.
///
/// Lets a [`Node`](crate::Node) drive any interactor without knowing its
/// concrete type or view type.
pub(crate) trait AnyInteractor: Send {
    fn tag(&self) -> &str;

    fn lifecycle(&self) -> InteractorLifecycle;

    fn context(&self) -> Option<&InteractorContext>;

    // Lifecycle

    fn attach(&mut self, rib: &Rib, build: &BuildContext, saved: Option<&Bundle>);

    fn detach(&mut self);

    fn start(&mut self);

    fn stop(&mut self);

    // View

    /// Create the view, add it to `container` and restore `saved`.
    fn create_view(&mut self, container: &ContainerRef, saved: Option<&Bundle>);

    /// Remove the view from `container`, returning its state.
    fn destroy_view(&mut self, container: &ContainerRef) -> Option<Bundle>;

    fn has_view(&self) -> bool;

    fn child_container(&self) -> Option<ContainerRef>;

    fn view_state(&self) -> Option<Bundle>;

    // Events

    fn handle_back_press(&mut self) -> bool;

    fn save_state(&mut self) -> Bundle;

    fn on_external_result(&mut self, request_id: u16, data: &Bundle) -> bool;
}

pub(crate) struct InteractorInstance<I: Interactor> {
    interactor: I,
    view_factory: Option<Box<dyn ViewFactory<I::View>>>,
    view: Option<I::View>,
    tag: String,
    lifecycle: Arc<watch::Sender<InteractorEvent>>,
    cx: Option<InteractorContext>,
}

impl<I: Interactor> InteractorInstance<I> {
    pub(crate) fn new(
        interactor: I,
        view_factory: Option<Box<dyn ViewFactory<I::View>>>,
    ) -> Self {
        let (lifecycle, _) = watch::channel(InteractorEvent::Inactive);
        Self {
            interactor,
            view_factory,
            view: None,
            tag: format!("{}.{}", std::any::type_name::<I>(), Uuid::new_v4()),
            lifecycle: Arc::new(lifecycle),
            cx: None,
        }
    }
}

impl<I: Interactor> AnyInteractor for InteractorInstance<I> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn lifecycle(&self) -> InteractorLifecycle {
        InteractorLifecycle::new(self.lifecycle.subscribe())
    }

    fn context(&self) -> Option<&InteractorContext> {
        self.cx.as_ref()
    }

    fn attach(&mut self, rib: &Rib, build: &BuildContext, saved: Option<&Bundle>) {
        if let Some(tag) = saved.and_then(|bundle| bundle.get_string(KEY_TAG)) {
            self.tag = tag.to_string();
        }
        let cx = InteractorContext::new(
            rib.clone(),
            self.tag.clone(),
            build.clone(),
            Arc::clone(&self.lifecycle),
        );
        self.lifecycle.send_replace(InteractorEvent::Active);
        self.interactor.on_attach(&cx, saved);
        self.cx = Some(cx);
    }

    /// Scope and workers are released even when `on_detach` panics; the
    /// panic is reported as a cleanup failure.
    fn detach(&mut self) {
        let Some(cx) = self.cx.take() else {
            return;
        };
        let interactor = &mut self.interactor;
        let hook = panic::catch_unwind(AssertUnwindSafe(|| interactor.on_detach(&cx)));
        cx.shutdown();
        self.lifecycle.send_replace(InteractorEvent::Detached);

        if let Err(panic) = hook {
            cx.context().report(RibError::CleanupFailed {
                rib: cx.rib().to_string(),
                message: extract_panic_message(&panic),
            });
        }
    }

    fn start(&mut self) {
        if let Some(cx) = &self.cx {
            self.interactor.on_start(cx);
        }
    }

    fn stop(&mut self) {
        if let Some(cx) = &self.cx {
            self.interactor.on_stop(cx);
        }
    }

    fn create_view(&mut self, container: &ContainerRef, saved: Option<&Bundle>) {
        let Some(factory) = &self.view_factory else {
            return;
        };
        let mut view = factory.create(container);
        if let Some(state) = saved {
            view.restore_state(state);
        }
        container.add_view(&view);
        if let Some(cx) = &self.cx {
            self.interactor.on_view_created(&mut view, cx);
        }
        self.view = Some(view);
    }

    fn destroy_view(&mut self, container: &ContainerRef) -> Option<Bundle> {
        let view = self.view.take()?;
        let state = view.save_state();
        container.remove_view(&view);
        if let Some(cx) = &self.cx {
            self.interactor.on_view_destroyed(cx);
        }
        Some(state)
    }

    fn has_view(&self) -> bool {
        self.view.is_some()
    }

    fn child_container(&self) -> Option<ContainerRef> {
        self.view.as_ref().and_then(|view| view.child_container())
    }

    fn view_state(&self) -> Option<Bundle> {
        self.view.as_ref().map(|view| view.save_state())
    }

    fn handle_back_press(&mut self) -> bool {
        match &self.cx {
            Some(cx) => self.interactor.handle_back_press(cx),
            None => false,
        }
    }

    fn save_state(&mut self) -> Bundle {
        let mut out = Bundle::new();
        self.interactor.on_save_instance_state(&mut out);
        out.put_string(KEY_TAG, self.tag.clone());
        out
    }

    fn on_external_result(&mut self, request_id: u16, data: &Bundle) -> bool {
        match &self.cx {
            Some(cx) => self.interactor.on_external_result(request_id, data, cx),
            None => false,
        }
    }
}
