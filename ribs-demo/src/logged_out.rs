//! Login screen.

use ribs::prelude::*;
use tokio::sync::mpsc;

use crate::console::{Command, Console, TextView, next_command};
use crate::game::Players;
use crate::root::RootEvent;

pub struct LoggedOut {
    console: Console,
    events: mpsc::UnboundedSender<RootEvent>,
}

impl Interactor for LoggedOut {
    type View = TextView;

    fn on_attach(&mut self, cx: &InteractorContext, _saved: Option<&Bundle>) {
        let mut input = self.console.subscribe();
        let events = self.events.clone();
        cx.spawn(async move {
            while let Some(command) = next_command(&mut input).await {
                if let Command::Login { first, second } = command {
                    if first == second {
                        println!("Pick two different names");
                        continue;
                    }
                    let _ = events.send(RootEvent::LoggedIn(Players::new(first, second)));
                    break;
                }
            }
        });
    }

    fn on_view_created(&mut self, view: &mut TextView, _cx: &InteractorContext) {
        view.show();
    }
}

pub struct LoggedOutBuilder {
    pub console: Console,
    pub events: mpsc::UnboundedSender<RootEvent>,
}

impl Builder for LoggedOutBuilder {
    fn build(&self, cx: &BuildContext) -> Node {
        let interactor = LoggedOut {
            console: self.console.clone(),
            events: self.events.clone(),
        };
        Node::builder(cx, "logged_out", interactor)
            .view_factory(|_: &ContainerRef| {
                TextView::new("login", &["login <player> <player> to begin"])
            })
            .build()
    }
}
