//! Root rib: switches between the login screen and a session.

use std::sync::Arc;

use ribs::prelude::*;
use ribs_workflow::{ActionableItem, Step, StepData, WorkflowError};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::console::{Console, TextView};
use crate::game::Players;
use crate::logged_in::{LoggedInBuilder, LoggedInItem};
use crate::logged_out::LoggedOutBuilder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RootScreen {
    LoggedOut,
    LoggedIn(Players),
}

/// Sent up by the root's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootEvent {
    LoggedIn(Players),
    LoggedOut,
}

/// Entry point for workflows started from outside the tree.
#[derive(Clone)]
pub struct RootItem {
    cx: InteractorContext,
    screens: RouterHandle<RootScreen>,
    logged_in: watch::Receiver<Option<LoggedInItem>>,
}

impl RootItem {
    /// Cancelled when the root detaches.
    pub fn scope(&self) -> CancellationToken {
        self.cx.scope()
    }

    /// Log `players` in unless they already are, then hand over the
    /// session.
    pub fn wait_for_login(self, players: Players) -> Step<Players, LoggedInItem> {
        Step::from_future(async move {
            let mut logged_in = self.logged_in;
            let current = logged_in.borrow().as_ref().map(|item| item.players().clone());
            if current.as_ref() != Some(&players) {
                self.screens.replace(RootScreen::LoggedIn(players.clone()));
            }

            let session = logged_in
                .wait_for(|item| item.as_ref().is_some_and(|item| *item.players() == players))
                .await
                .map(|item| item.clone());
            match session {
                Ok(Some(item)) => Ok(StepData::new(players, item)),
                _ => Err(WorkflowError::step_failed("session ended before login")),
            }
        })
    }
}

impl ActionableItem for RootItem {
    fn lifecycle(&self) -> InteractorLifecycle {
        self.cx.lifecycle()
    }
}

pub struct Root {
    screens: RouterHandle<RootScreen>,
    events: Option<mpsc::UnboundedReceiver<RootEvent>>,
    logged_in: watch::Receiver<Option<LoggedInItem>>,
    published: Arc<watch::Sender<Option<RootItem>>>,
}

impl Interactor for Root {
    type View = TextView;

    fn on_attach(&mut self, cx: &InteractorContext, _saved: Option<&Bundle>) {
        if let Some(mut events) = self.events.take() {
            let screens = self.screens.clone();
            cx.spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        RootEvent::LoggedIn(players) => {
                            screens.replace(RootScreen::LoggedIn(players));
                        }
                        RootEvent::LoggedOut => screens.replace(RootScreen::LoggedOut),
                    }
                }
            });
        }

        self.published.send_replace(Some(RootItem {
            cx: cx.clone(),
            screens: self.screens.clone(),
            logged_in: self.logged_in.clone(),
        }));
    }

    fn on_view_created(&mut self, view: &mut TextView, cx: &InteractorContext) {
        view.push_line(cx.directory().text_or("greeting", "Tic tac toe"));
        view.push_line("type help for commands");
        view.show();
    }

    fn on_detach(&mut self, _cx: &InteractorContext) {
        self.published.send_replace(None);
    }
}

pub struct RootBuilder {
    console: Console,
    published: Arc<watch::Sender<Option<RootItem>>>,
}

impl RootBuilder {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            published: Arc::new(watch::channel(None).0),
        }
    }

    /// The attached root's item, once there is one.
    pub fn root_item(&self) -> Option<RootItem> {
        self.published.borrow().clone()
    }
}

impl Builder for RootBuilder {
    fn build(&self, cx: &BuildContext) -> Node {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (sessions, logged_in) = watch::channel(None);
        let sessions = Arc::new(sessions);

        let console = self.console.clone();
        let router = Router::new(RootScreen::LoggedOut, move |screen: &RootScreen| match screen {
            RootScreen::LoggedOut => RoutingAction::attach(Arc::new(LoggedOutBuilder {
                console: console.clone(),
                events: events_tx.clone(),
            })),
            RootScreen::LoggedIn(players) => RoutingAction::attach(Arc::new(LoggedInBuilder {
                console: console.clone(),
                players: players.clone(),
                root_events: events_tx.clone(),
                published: sessions.clone(),
            })),
        });

        let interactor = Root {
            screens: router.handle(),
            events: Some(events_rx),
            logged_in,
            published: self.published.clone(),
        };
        Node::builder(cx, "root", interactor)
            .view_factory(|_: &ContainerRef| TextView::new("tic tac toe", &[]))
            .router(router)
            .build()
    }
}
