use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::builder::Builder;
use crate::bundle::Bundle;
use crate::context::BuildContext;
use crate::node::Node;
use crate::wakeup::WakeupHandle;

use super::backstack::{BackStack, Resolver};
use super::{
    Configuration, PermanentChildren, PushFlag, RibConnector, RoutingAction, RoutingStrategy,
};

const KEY_BACK_STACK: &str = "back_stack";

/// A change requested through a [`RouterHandle`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingCommand<C> {
    /// Cover the current configuration with another one.
    Push(C),
    /// Push with a flag deciding what happens to the entries below.
    PushWith(C, PushFlag),
    /// Go back to the configuration below the current one.
    Pop,
    /// Swap the current configuration.
    Replace(C),
    /// Drop the whole stack and start over.
    NewRoot(C),
}

struct RouterShared<C> {
    commands: VecDeque<RoutingCommand<C>>,
    stack: Vec<C>,
    closed: bool,
}

/// Cloneable remote control for a [`Router`].
///
/// Commands queue up and run when the tree dispatches, which happens on the
/// next wakeup of [`RibTree::run`](crate::RibTree::run) or an explicit
/// [`RibTree::dispatch`](crate::RibTree::dispatch).
pub struct RouterHandle<C> {
    shared: Arc<Mutex<RouterShared<C>>>,
    wakeup: WakeupHandle,
}

impl<C> Clone for RouterHandle<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            wakeup: self.wakeup.clone(),
        }
    }
}

impl<C: Configuration> RouterHandle<C> {
    fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(RouterShared {
                commands: VecDeque::new(),
                stack: Vec::new(),
                closed: false,
            })),
            wakeup: WakeupHandle::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RouterShared<C>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, configuration: C) {
        self.send(RoutingCommand::Push(configuration));
    }

    pub fn push_with(&self, configuration: C, flag: PushFlag) {
        self.send(RoutingCommand::PushWith(configuration, flag));
    }

    pub fn pop(&self) {
        self.send(RoutingCommand::Pop);
    }

    pub fn replace(&self, configuration: C) {
        self.send(RoutingCommand::Replace(configuration));
    }

    pub fn new_root(&self, configuration: C) {
        self.send(RoutingCommand::NewRoot(configuration));
    }

    /// Queue a command. Dropped if the router has detached.
    pub fn send(&self, command: RoutingCommand<C>) {
        {
            let mut shared = self.lock();
            if shared.closed {
                log::debug!("Router detached, dropping {command:?}");
                return;
            }
            shared.commands.push_back(command);
        }
        self.wakeup.send();
    }

    /// Configuration on top of the stack, as of the last dispatch.
    pub fn current(&self) -> Option<C> {
        self.lock().stack.last().cloned()
    }

    /// Configurations on the stack, bottom first.
    pub fn back_stack(&self) -> Vec<C> {
        self.lock().stack.clone()
    }

    /// Commands waiting for dispatch.
    pub fn pending(&self) -> usize {
        self.lock().commands.len()
    }

    fn take_commands(&self) -> VecDeque<RoutingCommand<C>> {
        std::mem::take(&mut self.lock().commands)
    }

    fn publish(&self, stack: Vec<C>) {
        self.lock().stack = stack;
    }

    fn close(&self) {
        let mut shared = self.lock();
        shared.closed = true;
        shared.commands.clear();
        shared.stack.clear();
    }
}

impl<C: Configuration> fmt::Debug for RouterHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("RouterHandle")
            .field("stack", &shared.stack)
            .field("pending", &shared.commands.len())
            .field("closed", &shared.closed)
            .finish()
    }
}

/// Routing driven by a configuration back stack.
pub struct Router<C: Configuration> {
    initial: C,
    resolver: Box<Resolver<C>>,
    permanent: PermanentChildren,
    back_stack: BackStack<C>,
    handle: RouterHandle<C>,
    attached: bool,
}

impl<C: Configuration> Router<C> {
    /// Router starting at `initial`. `resolver` turns each configuration
    /// into the action that makes it current; it runs once per back stack
    /// entry.
    pub fn new<F>(initial: C, resolver: F) -> Self
    where
        F: FnMut(&C) -> RoutingAction + Send + 'static,
    {
        Self {
            initial,
            resolver: Box::new(resolver),
            permanent: PermanentChildren::default(),
            back_stack: BackStack::new(),
            handle: RouterHandle::new(),
            attached: false,
        }
    }

    /// Attach a child built by `builder` for as long as the node is
    /// attached, regardless of configuration.
    pub fn permanent<B: Builder + ?Sized + 'static>(mut self, builder: Arc<B>) -> Self {
        self.permanent.add(builder);
        self
    }

    pub fn permanent_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&BuildContext) -> Node + Send + 'static,
    {
        self.permanent.add_with(factory);
        self
    }

    pub fn handle(&self) -> RouterHandle<C> {
        self.handle.clone()
    }

    fn publish(&self) {
        self.handle.publish(self.back_stack.configurations());
    }

    fn run(&mut self, command: RoutingCommand<C>, connector: &mut dyn RibConnector) {
        log::debug!("Routing command {command:?}");
        let resolver = &mut *self.resolver;
        match command {
            RoutingCommand::Push(configuration) => {
                self.back_stack.push(configuration, resolver, connector);
            }
            RoutingCommand::PushWith(configuration, flag) => {
                self.back_stack
                    .push_with(configuration, flag, resolver, connector);
            }
            RoutingCommand::Pop => {
                self.back_stack.pop(resolver, connector);
            }
            RoutingCommand::Replace(configuration) => {
                self.back_stack.replace(configuration, resolver, connector);
            }
            RoutingCommand::NewRoot(configuration) => {
                self.back_stack.new_root(configuration, resolver, connector);
            }
        }
    }
}

impl<C: Configuration> RoutingStrategy for Router<C> {
    fn on_attach(&mut self, connector: &mut dyn RibConnector, saved: Option<&Bundle>) {
        self.handle
            .wakeup
            .install(connector.build_context().context().wakeup());
        self.attached = true;

        self.permanent.attach(connector, saved);
        self.back_stack.bootstrap(
            self.initial.clone(),
            saved.and_then(|bundle| bundle.get_bundle(KEY_BACK_STACK)),
            &mut *self.resolver,
            connector,
        );
        self.publish();
    }

    fn dispatch(&mut self, connector: &mut dyn RibConnector) -> usize {
        if !self.attached {
            return 0;
        }
        let commands = self.handle.take_commands();
        let count = commands.len();
        for command in commands {
            self.run(command, connector);
        }
        if count > 0 {
            self.publish();
        }
        count
    }

    fn has_pending(&self) -> bool {
        self.attached && self.handle.pending() > 0
    }

    fn pop_back_stack(&mut self, connector: &mut dyn RibConnector) -> bool {
        let popped = self.back_stack.pop(&mut *self.resolver, connector);
        if popped {
            self.publish();
        }
        popped
    }

    fn save_state(&mut self, connector: &mut dyn RibConnector) -> Bundle {
        let mut out = Bundle::new();
        self.permanent.save(connector, &mut out);
        match self.back_stack.save(connector) {
            Ok(back_stack) => out.put_bundle(KEY_BACK_STACK, back_stack),
            Err(error) => connector.build_context().context().report(error),
        }
        out
    }

    fn on_detach(&mut self, _connector: &mut dyn RibConnector) {
        self.attached = false;
        self.handle.close();
        self.handle.wakeup.uninstall();
        self.permanent.forget();
        // Runs a user cleanup hook, so it goes last.
        self.back_stack.tear_down();
    }
}
