//! Lobby between games.

use std::sync::{Arc, Mutex, PoisonError};

use ribs::prelude::*;
use tokio::sync::mpsc;

use crate::console::{Command, Console, TextView, next_command};
use crate::game::Players;
use crate::logged_in::{GameEvent, Scoreboard};

pub struct OffGame {
    console: Console,
    players: Players,
    scores: Arc<Mutex<Scoreboard>>,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl Interactor for OffGame {
    type View = TextView;

    fn on_attach(&mut self, cx: &InteractorContext, _saved: Option<&Bundle>) {
        let mut input = self.console.subscribe();
        let events = self.events.clone();
        cx.spawn(async move {
            while let Some(command) = next_command(&mut input).await {
                let event = match command {
                    Command::Play => GameEvent::Play,
                    Command::Logout => GameEvent::Logout,
                    _ => continue,
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        });
    }

    fn on_view_created(&mut self, view: &mut TextView, _cx: &InteractorContext) {
        let scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        for line in scores.lines(&self.players) {
            view.push_line(line);
        }
        view.push_line("play to start a game, logout to leave");
        view.show();
    }
}

pub struct OffGameBuilder {
    pub console: Console,
    pub players: Players,
    pub scores: Arc<Mutex<Scoreboard>>,
    pub events: mpsc::UnboundedSender<GameEvent>,
}

impl Builder for OffGameBuilder {
    fn build(&self, cx: &BuildContext) -> Node {
        let interactor = OffGame {
            console: self.console.clone(),
            players: self.players.clone(),
            scores: self.scores.clone(),
            events: self.events.clone(),
        };
        Node::builder(cx, "off_game", interactor)
            .view_factory(|_: &ContainerRef| TextView::new("lobby", &[]))
            .build()
    }
}
