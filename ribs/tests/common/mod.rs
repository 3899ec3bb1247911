//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ribs::prelude::*;
use ribs::BuildFn;

/// Ordered log of lifecycle calls across a tree.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries starting with `prefix`, e.g. `"detach:"`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Errors passed to the tree's error handler.
#[derive(Clone, Default)]
pub struct Errors(Arc<Mutex<Vec<RibError>>>);

impl Errors {
    pub fn all(&self) -> Vec<RibError> {
        self.0.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

pub fn recording_config() -> (RibsConfig, Errors) {
    let errors = Errors::default();
    let sink = errors.clone();
    let config =
        RibsConfig::new().on_error(move |error| sink.0.lock().unwrap().push(error.clone()));
    (config, errors)
}

/// A view that only knows its name.
pub struct TestView {
    pub name: String,
}

impl RibView for TestView {
    fn name(&self) -> &str {
        &self.name
    }

    fn save_state(&self) -> Bundle {
        let mut state = Bundle::new();
        state.put_string("view", self.name.clone());
        state
    }
}

/// Container listing the views currently inside it.
#[derive(Default)]
pub struct TestContainer {
    views: Mutex<Vec<String>>,
}

impl TestContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn views(&self) -> Vec<String> {
        self.views.lock().unwrap().clone()
    }
}

impl ViewContainer for TestContainer {
    fn add_view(&self, view: &dyn RibView) {
        self.views.lock().unwrap().push(view.name().to_string());
    }

    fn remove_view(&self, view: &dyn RibView) {
        let mut views = self.views.lock().unwrap();
        if let Some(index) = views.iter().position(|name| name == view.name()) {
            views.remove(index);
        }
    }
}

/// Interactor that writes every hook into a [`Journal`].
pub struct Recording {
    pub name: String,
    pub journal: Journal,
    pub consume_back: bool,
    pub panic_on_detach: bool,
}

impl Recording {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            consume_back: false,
            panic_on_detach: false,
        }
    }

    pub fn consuming_back(mut self) -> Self {
        self.consume_back = true;
        self
    }

    pub fn panicking_on_detach(mut self) -> Self {
        self.panic_on_detach = true;
        self
    }
}

impl Interactor for Recording {
    type View = TestView;

    fn on_attach(&mut self, _cx: &InteractorContext, _saved: Option<&Bundle>) {
        self.journal.record(format!("attach:{}", self.name));
    }

    fn on_view_created(&mut self, _view: &mut TestView, _cx: &InteractorContext) {
        self.journal.record(format!("view:{}", self.name));
    }

    fn on_view_destroyed(&mut self, _cx: &InteractorContext) {
        self.journal.record(format!("unview:{}", self.name));
    }

    fn on_start(&mut self, _cx: &InteractorContext) {
        self.journal.record(format!("start:{}", self.name));
    }

    fn on_stop(&mut self, _cx: &InteractorContext) {
        self.journal.record(format!("stop:{}", self.name));
    }

    fn on_detach(&mut self, _cx: &InteractorContext) {
        if self.panic_on_detach {
            panic!("{} failed to clean up", self.name);
        }
        self.journal.record(format!("detach:{}", self.name));
    }

    fn handle_back_press(&mut self, _cx: &InteractorContext) -> bool {
        self.journal.record(format!("back:{}", self.name));
        self.consume_back
    }
}

fn view_named(name: String) -> impl Fn(&ContainerRef) -> TestView + Send + Sync + 'static {
    move |_container: &ContainerRef| TestView { name: name.clone() }
}

/// Node with a recording interactor, a test view and the given routing.
pub fn recording_node(
    cx: &BuildContext,
    interactor: Recording,
    router: impl ribs::RoutingStrategy + 'static,
) -> Node {
    let name = interactor.name.clone();
    Node::builder(cx, name.as_str(), interactor)
        .view_factory(view_named(name.clone()))
        .router(router)
        .build()
}

/// Builder for a leaf with a recording interactor.
pub fn leaf(name: &str, journal: &Journal) -> Arc<dyn Builder> {
    let name = name.to_string();
    let journal = journal.clone();
    Arc::new(BuildFn(move |cx: &BuildContext| {
        recording_node(cx, Recording::new(&name, &journal), LeafRouting::new())
    }))
}

/// Root with permanent leaf children.
pub fn root_with_children(journal: &Journal, children: &[&str]) -> Arc<dyn Builder> {
    let journal = journal.clone();
    let children: Vec<Arc<dyn Builder>> =
        children.iter().map(|name| leaf(name, &journal)).collect();
    Arc::new(BuildFn(move |cx: &BuildContext| {
        let routing = children
            .iter()
            .fold(LeafRouting::new(), |routing, child| routing.permanent(child.clone()));
        recording_node(cx, Recording::new("root", &journal), routing)
    }))
}
