//! Back stack of configurations.
//!
//! Each entry remembers its configuration, the routing action resolved for
//! it and the children that action created. Entries below the top keep
//! their children alive without views; popping back to them gives the views
//! back and runs the stored action again instead of resolving a new one.

use crate::bundle::{Bundle, BundleError};
use crate::error::RibError;
use crate::node::NodeId;

use super::{Configuration, PushFlag, RibConnector, RoutingAction};

const KEY_ENTRIES: &str = "entries";
const KEY_CONFIGURATION: &str = "configuration";
const KEY_CHILDREN: &str = "children";

pub(crate) type Resolver<C> = dyn FnMut(&C) -> RoutingAction + Send;

struct Entry<C> {
    configuration: C,
    action: Option<RoutingAction>,
    /// `None` until the action has created its children.
    children: Option<Vec<NodeId>>,
    /// Child state to restore when the children are created.
    saved: Vec<Bundle>,
    /// Dropped instead of hidden when covered; never saved.
    transient: bool,
}

impl<C> Entry<C> {
    fn new(configuration: C) -> Self {
        Self {
            configuration,
            action: None,
            children: None,
            saved: Vec::new(),
            transient: false,
        }
    }
}

pub(crate) struct BackStack<C> {
    entries: Vec<Entry<C>>,
}

impl<C: Configuration> BackStack<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn current(&self) -> Option<&C> {
        self.entries.last().map(|entry| &entry.configuration)
    }

    /// Configurations, bottom first.
    pub(crate) fn configurations(&self) -> Vec<C> {
        self.entries
            .iter()
            .map(|entry| entry.configuration.clone())
            .collect()
    }

    /// Start with the saved stack if there is one, else with `initial`.
    pub(crate) fn bootstrap(
        &mut self,
        initial: C,
        saved: Option<&Bundle>,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) {
        let restored = match saved.map(Self::restore).transpose() {
            Ok(restored) => restored.unwrap_or_default(),
            Err(error) => {
                connector.build_context().context().report(error);
                Vec::new()
            }
        };

        if restored.is_empty() {
            self.new_root(initial, resolver, connector);
        } else {
            log::debug!("Restoring back stack of {} entries", restored.len());
            self.entries = restored;
            self.enter_top(resolver, connector);
        }
    }

    pub(crate) fn push(
        &mut self,
        configuration: C,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) -> bool {
        self.push_with(configuration, PushFlag::Default, resolver, connector)
    }

    /// Push `configuration`, letting `flag` decide what happens to the
    /// entries already on the stack.
    pub(crate) fn push_with(
        &mut self,
        configuration: C,
        flag: PushFlag,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) -> bool {
        if self.current() == Some(&configuration) {
            if flag == PushFlag::NewTask {
                return self.clear_below_top(connector);
            }
            log::debug!("Already at {configuration:?}, push ignored");
            return false;
        }

        match flag {
            PushFlag::Default => self.push_entry(configuration, false, resolver, connector),
            PushFlag::Transient => self.push_entry(configuration, true, resolver, connector),
            PushFlag::ClearTop => match self.position(&configuration) {
                Some(index) => self.clear_top(index, resolver, connector),
                None => self.push_entry(configuration, false, resolver, connector),
            },
            PushFlag::SingleTop => {
                self.cover_top(connector);
                self.remove_all(&configuration, connector);
                self.entries.push(Entry::new(configuration));
                self.enter_top(resolver, connector);
            }
            PushFlag::ReorderToTop => {
                self.cover_top(connector);
                match self.position(&configuration) {
                    Some(index) => {
                        let entry = self.entries.remove(index);
                        self.entries.push(entry);
                    }
                    None => self.entries.push(Entry::new(configuration)),
                }
                self.enter_top(resolver, connector);
            }
            PushFlag::NewTask => self.new_root(configuration, resolver, connector),
        }
        true
    }

    fn push_entry(
        &mut self,
        configuration: C,
        transient: bool,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) {
        self.cover_top(connector);
        let mut entry = Entry::new(configuration);
        entry.transient = transient;
        self.entries.push(entry);
        self.enter_top(resolver, connector);
    }

    /// Topmost entry holding `configuration`.
    fn position(&self, configuration: &C) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.configuration == *configuration)
    }

    /// Hide the top entry, or drop it if it is transient.
    fn cover_top(&mut self, connector: &mut dyn RibConnector) {
        let transient = self.entries.last().is_some_and(|entry| entry.transient);
        if transient {
            if let Some(mut top) = self.entries.pop() {
                leave(&mut top, connector);
            }
        } else if let Some(top) = self.entries.last_mut() {
            hide(top, connector);
        }
    }

    /// Drop every entry above `index` and make it current again.
    fn clear_top(
        &mut self,
        index: usize,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) {
        if let Some(mut top) = self.entries.pop() {
            leave(&mut top, connector);
        }
        while self.entries.len() > index + 1 {
            if let Some(mut entry) = self.entries.pop() {
                destroy_children(&mut entry, connector);
            }
        }
        self.enter_top(resolver, connector);
    }

    /// Destroy covered entries holding `configuration`.
    fn remove_all(&mut self, configuration: &C, connector: &mut dyn RibConnector) {
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].configuration == *configuration {
                let mut entry = self.entries.remove(index);
                destroy_children(&mut entry, connector);
            } else {
                index += 1;
            }
        }
    }

    /// Keep only the top entry.
    fn clear_below_top(&mut self, connector: &mut dyn RibConnector) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        let below = self.entries.len() - 1;
        for mut entry in self.entries.drain(..below).rev() {
            destroy_children(&mut entry, connector);
        }
        if let Some(top) = self.entries.last_mut() {
            top.transient = false;
        }
        true
    }

    /// Drop the top entry. The bottom entry is never popped.
    pub(crate) fn pop(
        &mut self,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        if let Some(mut top) = self.entries.pop() {
            leave(&mut top, connector);
        }
        self.enter_top(resolver, connector);
        true
    }

    pub(crate) fn replace(
        &mut self,
        configuration: C,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) -> bool {
        if self.current() == Some(&configuration) {
            log::debug!("Already at {configuration:?}, replace ignored");
            return false;
        }
        if let Some(mut top) = self.entries.pop() {
            leave(&mut top, connector);
        }
        self.entries.push(Entry::new(configuration));
        self.enter_top(resolver, connector);
        true
    }

    /// Destroy every entry and start over with `configuration`.
    pub(crate) fn new_root(
        &mut self,
        configuration: C,
        resolver: &mut Resolver<C>,
        connector: &mut dyn RibConnector,
    ) {
        if let Some(mut top) = self.entries.pop() {
            leave(&mut top, connector);
        }
        // Entries below the top already ran their cleanup when covered.
        while let Some(mut entry) = self.entries.pop() {
            destroy_children(&mut entry, connector);
        }
        self.entries.push(Entry::new(configuration));
        self.enter_top(resolver, connector);
    }

    /// Run the top entry's cleanup and forget all children. The node
    /// detaches them itself.
    pub(crate) fn tear_down(&mut self) {
        let top = self.entries.pop();
        self.entries.clear();
        if let Some(mut top) = top
            && let Some(action) = &mut top.action
        {
            action.cleanup();
        }
    }

    fn enter_top(&mut self, resolver: &mut Resolver<C>, connector: &mut dyn RibConnector) {
        let Some(entry) = self.entries.last_mut() else {
            return;
        };
        log::debug!("Routing to {:?}", entry.configuration);

        let action = entry
            .action
            .get_or_insert_with(|| resolver(&entry.configuration));
        action.execute();

        if let Some(children) = &entry.children {
            for child in children {
                connector.attach_child_view(*child);
            }
            return;
        }

        let cx = connector.build_context().clone();
        let nodes = action.build_children(&cx);
        let mut saved = std::mem::take(&mut entry.saved).into_iter();
        let children = nodes
            .into_iter()
            .map(|node| connector.attach_child(node, saved.next()))
            .collect();
        entry.children = Some(children);
    }

    pub(crate) fn save(&self, connector: &mut dyn RibConnector) -> Result<Bundle, RibError> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter().filter(|entry| !entry.transient) {
            let mut out = Bundle::new();
            out.put(KEY_CONFIGURATION, &entry.configuration)?;
            let children = match &entry.children {
                Some(children) => children
                    .iter()
                    .filter_map(|child| connector.save_child_state(*child))
                    .collect(),
                None => entry.saved.clone(),
            };
            out.put_bundles(KEY_CHILDREN, children);
            entries.push(out);
        }

        let mut out = Bundle::new();
        out.put_bundles(KEY_ENTRIES, entries);
        Ok(out)
    }

    fn restore(saved: &Bundle) -> Result<Vec<Entry<C>>, RibError> {
        let Some(entries) = saved.get_bundles(KEY_ENTRIES) else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|bundle| {
                let configuration = bundle.get::<C>(KEY_CONFIGURATION)?.ok_or_else(|| {
                    BundleError::Decode {
                        key: KEY_CONFIGURATION.to_string(),
                        message: "missing from back stack entry".to_string(),
                    }
                })?;
                let mut entry = Entry::new(configuration);
                entry.saved = bundle
                    .get_bundles(KEY_CHILDREN)
                    .map(<[Bundle]>::to_vec)
                    .unwrap_or_default();
                Ok(entry)
            })
            .collect()
    }
}

/// Covered by a new entry: children lose their views.
fn hide<C>(entry: &mut Entry<C>, connector: &mut dyn RibConnector) {
    if let Some(action) = &mut entry.action {
        action.cleanup();
    }
    if let Some(children) = &entry.children {
        for child in children.iter().rev() {
            connector.detach_child_view(*child);
        }
    }
}

/// Removed from the stack: children are destroyed.
fn leave<C>(entry: &mut Entry<C>, connector: &mut dyn RibConnector) {
    if let Some(action) = &mut entry.action {
        action.cleanup();
    }
    destroy_children(entry, connector);
}

fn destroy_children<C>(entry: &mut Entry<C>, connector: &mut dyn RibConnector) {
    if let Some(children) = entry.children.take() {
        for child in children.into_iter().rev() {
            connector.detach_child(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::config::RibsConfig;
    use crate::context::{BuildContext, RibContext};
    use crate::interactor::Interactor;
    use crate::node::Node;
    use crate::view::NoView;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Screen {
        Home,
        Settings,
        About,
    }

    struct Plain;

    impl Interactor for Plain {
        type View = NoView;
    }

    /// Records connector calls by rib name.
    struct Recorder {
        build: BuildContext,
        alive: Vec<(NodeId, String, bool)>,
        log: Vec<String>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                build: BuildContext::new(RibContext::new(RibsConfig::default())),
                alive: Vec::new(),
                log: Vec::new(),
            }
        }

        fn name(&self, id: NodeId) -> String {
            self.alive
                .iter()
                .find(|(child, _, _)| *child == id)
                .map(|(_, name, _)| name.clone())
                .unwrap_or_default()
        }

        fn visible(&self) -> Vec<String> {
            self.alive
                .iter()
                .filter(|(_, _, visible)| *visible)
                .map(|(_, name, _)| name.clone())
                .collect()
        }
    }

    impl RibConnector for Recorder {
        fn build_context(&self) -> &BuildContext {
            &self.build
        }

        fn attach_child(&mut self, child: Node, _saved: Option<Bundle>) -> NodeId {
            self.log.push(format!("attach {}", child.rib()));
            self.alive.push((child.id(), child.rib().to_string(), true));
            child.id()
        }

        fn attach_child_view(&mut self, id: NodeId) {
            self.log.push(format!("show {}", self.name(id)));
            if let Some(entry) = self.alive.iter_mut().find(|(child, _, _)| *child == id) {
                entry.2 = true;
            }
        }

        fn detach_child_view(&mut self, id: NodeId) {
            self.log.push(format!("hide {}", self.name(id)));
            if let Some(entry) = self.alive.iter_mut().find(|(child, _, _)| *child == id) {
                entry.2 = false;
            }
        }

        fn detach_child(&mut self, id: NodeId) {
            self.log.push(format!("detach {}", self.name(id)));
            self.alive.retain(|(child, _, _)| *child != id);
        }

        fn save_child_state(&mut self, id: NodeId) -> Option<Bundle> {
            let mut bundle = Bundle::new();
            bundle.put_string("name", self.name(id));
            Some(bundle)
        }
    }

    fn resolver(resolved: Arc<AtomicUsize>) -> Box<Resolver<Screen>> {
        Box::new(move |screen: &Screen| {
            resolved.fetch_add(1, Ordering::SeqCst);
            let name = format!("{screen:?}");
            RoutingAction::attach_with(move |cx| Node::builder(cx, name.as_str(), Plain).build())
        })
    }

    #[test]
    fn test_push_then_pop_reuses_action() {
        let resolved = Arc::new(AtomicUsize::new(0));
        let mut resolve = resolver(resolved.clone());
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        assert!(stack.push(Screen::Settings, &mut *resolve, &mut connector));
        assert_eq!(connector.visible(), vec!["Settings"]);

        assert!(stack.pop(&mut *resolve, &mut connector));
        assert_eq!(stack.current(), Some(&Screen::Home));
        assert_eq!(connector.visible(), vec!["Home"]);
        assert_eq!(resolved.load(Ordering::SeqCst), 2);
        assert_eq!(
            connector.log,
            vec![
                "attach Home",
                "hide Home",
                "attach Settings",
                "detach Settings",
                "show Home",
            ]
        );
    }

    #[test]
    fn test_same_configuration_is_ignored() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        assert!(!stack.push(Screen::Home, &mut *resolve, &mut connector));
        assert!(!stack.replace(Screen::Home, &mut *resolve, &mut connector));
        assert_eq!(stack.len(), 1);
        assert_eq!(connector.log, vec!["attach Home"]);
    }

    #[test]
    fn test_bottom_entry_is_never_popped() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        assert!(!stack.pop(&mut *resolve, &mut connector));
        assert_eq!(stack.len(), 1);
        assert_eq!(connector.visible(), vec!["Home"]);
    }

    #[test]
    fn test_replace_destroys_top() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        stack.push(Screen::Settings, &mut *resolve, &mut connector);
        stack.replace(Screen::About, &mut *resolve, &mut connector);

        assert_eq!(stack.configurations(), vec![Screen::Home, Screen::About]);
        assert!(connector.log.contains(&"detach Settings".to_string()));
        assert_eq!(connector.visible(), vec!["About"]);
    }

    #[test]
    fn test_new_root_destroys_every_entry() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        stack.push(Screen::Settings, &mut *resolve, &mut connector);
        stack.new_root(Screen::About, &mut *resolve, &mut connector);

        assert_eq!(stack.configurations(), vec![Screen::About]);
        let names: Vec<_> = connector.alive.iter().map(|(_, name, _)| name.clone()).collect();
        assert_eq!(names, vec!["About"]);
    }

    #[test]
    fn test_cleanup_runs_when_covered_and_when_left() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let counter = cleanups.clone();
        let mut resolve: Box<Resolver<Screen>> = Box::new(move |_screen: &Screen| {
            let counter = counter.clone();
            RoutingAction::noop().on_cleanup(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        stack.push(Screen::Settings, &mut *resolve, &mut connector);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        stack.pop(&mut *resolve, &mut connector);
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
        stack.tear_down();
        assert_eq!(cleanups.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_save_and_restore_stack() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = BackStack::new();

        stack.bootstrap(Screen::Home, None, &mut *resolve, &mut connector);
        stack.push(Screen::Settings, &mut *resolve, &mut connector);
        let saved = stack.save(&mut connector).unwrap();

        let mut restored_connector = Recorder::new();
        let mut restored = BackStack::new();
        restored.bootstrap(Screen::About, Some(&saved), &mut *resolve, &mut restored_connector);

        assert_eq!(restored.configurations(), vec![Screen::Home, Screen::Settings]);
        // Only the top entry is rebuilt; Home comes back lazily on pop.
        assert_eq!(restored_connector.log, vec!["attach Settings"]);

        restored.pop(&mut *resolve, &mut restored_connector);
        assert_eq!(restored_connector.visible(), vec!["Home"]);
    }

    fn stack_of(
        screens: &[Screen],
        resolve: &mut Resolver<Screen>,
        connector: &mut Recorder,
    ) -> BackStack<Screen> {
        let mut stack = BackStack::new();
        stack.bootstrap(screens[0].clone(), None, resolve, connector);
        for screen in &screens[1..] {
            stack.push(screen.clone(), resolve, connector);
        }
        connector.log.clear();
        stack
    }

    #[test]
    fn test_transient_entry_is_dropped_when_covered() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = stack_of(&[Screen::Home], &mut *resolve, &mut connector);

        let flag = PushFlag::Transient;
        assert!(stack.push_with(Screen::Settings, flag, &mut *resolve, &mut connector));
        stack.push(Screen::About, &mut *resolve, &mut connector);

        assert_eq!(stack.configurations(), vec![Screen::Home, Screen::About]);
        assert!(connector.log.contains(&"detach Settings".to_string()));
        stack.pop(&mut *resolve, &mut connector);
        assert_eq!(connector.visible(), vec!["Home"]);
    }

    #[test]
    fn test_transient_entry_is_not_saved() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = stack_of(&[Screen::Home], &mut *resolve, &mut connector);
        let flag = PushFlag::Transient;
        stack.push_with(Screen::About, flag, &mut *resolve, &mut connector);

        let saved = stack.save(&mut connector).unwrap();
        let mut restored = BackStack::new();
        restored.bootstrap(Screen::Settings, Some(&saved), &mut *resolve, &mut Recorder::new());
        assert_eq!(restored.configurations(), vec![Screen::Home]);
    }

    #[test]
    fn test_clear_top_returns_to_existing_entry() {
        let resolved = Arc::new(AtomicUsize::new(0));
        let mut resolve = resolver(resolved.clone());
        let mut connector = Recorder::new();
        let screens = [Screen::Home, Screen::Settings, Screen::About];
        let mut stack = stack_of(&screens, &mut *resolve, &mut connector);

        let flag = PushFlag::ClearTop;
        assert!(stack.push_with(Screen::Home, flag, &mut *resolve, &mut connector));

        assert_eq!(stack.configurations(), vec![Screen::Home]);
        assert_eq!(
            connector.log,
            vec!["detach About", "detach Settings", "show Home"]
        );
        // Home was not resolved again.
        assert_eq!(resolved.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_clear_top_pushes_missing_configuration() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let mut stack = stack_of(&[Screen::Home], &mut *resolve, &mut connector);

        let flag = PushFlag::ClearTop;
        stack.push_with(Screen::About, flag, &mut *resolve, &mut connector);
        assert_eq!(stack.configurations(), vec![Screen::Home, Screen::About]);
        assert!(!stack.push_with(Screen::About, flag, &mut *resolve, &mut connector));
    }

    #[test]
    fn test_single_top_replaces_every_instance() {
        let resolved = Arc::new(AtomicUsize::new(0));
        let mut resolve = resolver(resolved.clone());
        let mut connector = Recorder::new();
        let screens = [Screen::Home, Screen::Settings, Screen::Home, Screen::About];
        let mut stack = stack_of(&screens, &mut *resolve, &mut connector);

        let flag = PushFlag::SingleTop;
        assert!(stack.push_with(Screen::Home, flag, &mut *resolve, &mut connector));

        assert_eq!(stack.configurations(), vec![Screen::Settings, Screen::About, Screen::Home]);
        assert_eq!(resolved.load(Ordering::SeqCst), 5);
        let homes = connector.alive.iter().filter(|(_, name, _)| name == "Home").count();
        assert_eq!(homes, 1);
        assert_eq!(connector.visible(), vec!["Home"]);
    }

    #[test]
    fn test_reorder_to_top_keeps_children() {
        let resolved = Arc::new(AtomicUsize::new(0));
        let mut resolve = resolver(resolved.clone());
        let mut connector = Recorder::new();
        let screens = [Screen::Home, Screen::Settings, Screen::About];
        let mut stack = stack_of(&screens, &mut *resolve, &mut connector);

        let flag = PushFlag::ReorderToTop;
        assert!(stack.push_with(Screen::Settings, flag, &mut *resolve, &mut connector));

        assert_eq!(stack.configurations(), vec![Screen::Home, Screen::About, Screen::Settings]);
        assert_eq!(connector.log, vec!["hide About", "show Settings"]);
        assert_eq!(resolved.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_new_task_keeps_only_current_entry() {
        let mut resolve = resolver(Arc::new(AtomicUsize::new(0)));
        let mut connector = Recorder::new();
        let screens = [Screen::Home, Screen::Settings];
        let mut stack = stack_of(&screens, &mut *resolve, &mut connector);

        let flag = PushFlag::NewTask;
        assert!(stack.push_with(Screen::Settings, flag, &mut *resolve, &mut connector));
        assert_eq!(stack.configurations(), vec![Screen::Settings]);
        assert_eq!(connector.log, vec!["detach Home"]);
        assert_eq!(stack.len(), 1);

        assert!(!stack.push_with(Screen::Settings, flag, &mut *resolve, &mut connector));
        assert!(stack.push_with(Screen::About, flag, &mut *resolve, &mut connector));
        assert_eq!(stack.configurations(), vec![Screen::About]);
    }
}
