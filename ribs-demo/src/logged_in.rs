//! The logged-in rib: routes between the lobby and a running game and keeps
//! score for the session.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use ribs::prelude::*;
use ribs::WorkerScope;
use ribs_workflow::{ActionableItem, Step};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::console::{Console, TextView};
use crate::game::{Outcome, Players, TicTacToeBuilder};
use crate::off_game::OffGameBuilder;
use crate::root::RootEvent;

const KEY_SCORES: &str = "scores";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameScreen {
    OffGame,
    Playing,
}

/// What the children of this rib report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Play,
    Logout,
    Finished(Outcome),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    wins: BTreeMap<String, u32>,
    draws: u32,
}

impl Scoreboard {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Won(name) => *self.wins.entry(name.clone()).or_default() += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn lines(&self, players: &Players) -> Vec<String> {
        let wins = |name: &str| self.wins.get(name).copied().unwrap_or(0);
        vec![
            format!("{}: {}", players.first, wins(&players.first)),
            format!("{}: {}", players.second, wins(&players.second)),
            format!("draws: {}", self.draws),
        ]
    }
}

/// Keeps the scoreboard up to date as games finish.
struct ScoreWorker {
    outcomes: Option<mpsc::UnboundedReceiver<Outcome>>,
    scores: Arc<Mutex<Scoreboard>>,
    players: Players,
}

#[async_trait]
impl Worker for ScoreWorker {
    fn name(&self) -> &'static str {
        "ScoreWorker"
    }

    async fn on_start(&mut self, scope: WorkerScope) {
        let Some(mut outcomes) = self.outcomes.take() else {
            return;
        };
        let scores = self.scores.clone();
        let players = self.players.clone();
        scope.spawn(async move {
            while let Some(outcome) = outcomes.recv().await {
                match &outcome {
                    Outcome::Won(name) => println!("{name} wins!"),
                    Outcome::Draw => println!("It's a draw"),
                }
                let lines = {
                    let mut scores = scores.lock().unwrap_or_else(PoisonError::into_inner);
                    scores.record(&outcome);
                    scores.lines(&players)
                };
                for line in lines {
                    println!("  {line}");
                }
            }
        });
    }

    async fn on_stop(&mut self) {
        let scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        log::info!("Session scores: {:?}", scores.lines(&self.players));
    }
}

/// Handle the start-game workflow uses once the players are logged in.
#[derive(Clone)]
pub struct LoggedInItem {
    cx: InteractorContext,
    games: RouterHandle<GameScreen>,
    players: Players,
}

impl LoggedInItem {
    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn start_game(self) -> Step<Players, LoggedInItem> {
        self.games.push(GameScreen::Playing);
        Step::ready(self.players.clone(), self)
    }
}

impl ActionableItem for LoggedInItem {
    fn lifecycle(&self) -> InteractorLifecycle {
        self.cx.lifecycle()
    }
}

pub struct LoggedIn {
    players: Players,
    games: RouterHandle<GameScreen>,
    events: Option<mpsc::UnboundedReceiver<GameEvent>>,
    root_events: mpsc::UnboundedSender<RootEvent>,
    scores: Arc<Mutex<Scoreboard>>,
    published: Arc<watch::Sender<Option<LoggedInItem>>>,
}

impl Interactor for LoggedIn {
    type View = TextView;

    fn on_attach(&mut self, cx: &InteractorContext, saved: Option<&Bundle>) {
        if let Some(saved) = saved {
            match saved.get::<Scoreboard>(KEY_SCORES) {
                Ok(Some(scores)) => {
                    *self.scores.lock().unwrap_or_else(PoisonError::into_inner) = scores;
                }
                Ok(None) => {}
                Err(error) => log::warn!("Discarding saved scores: {error}"),
            }
        }

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        cx.bind_worker(ScoreWorker {
            outcomes: Some(outcome_rx),
            scores: self.scores.clone(),
            players: self.players.clone(),
        });

        if let Some(mut events) = self.events.take() {
            let games = self.games.clone();
            let root_events = self.root_events.clone();
            cx.spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        GameEvent::Play => games.push(GameScreen::Playing),
                        GameEvent::Logout => {
                            let _ = root_events.send(RootEvent::LoggedOut);
                        }
                        GameEvent::Finished(outcome) => {
                            let _ = outcome_tx.send(outcome);
                            games.pop();
                        }
                    }
                }
            });
        }

        self.published.send_replace(Some(LoggedInItem {
            cx: cx.clone(),
            games: self.games.clone(),
            players: self.players.clone(),
        }));
    }

    fn on_view_created(&mut self, view: &mut TextView, _cx: &InteractorContext) {
        view.push_line(format!("{} (X) vs {} (O)", self.players.first, self.players.second));
        view.show();
    }

    fn on_detach(&mut self, _cx: &InteractorContext) {
        self.published.send_replace(None);
    }

    fn on_save_instance_state(&mut self, out: &mut Bundle) {
        let scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = out.put(KEY_SCORES, &*scores) {
            log::warn!("Could not save scores: {error}");
        }
    }
}

pub struct LoggedInBuilder {
    pub console: Console,
    pub players: Players,
    pub root_events: mpsc::UnboundedSender<RootEvent>,
    pub published: Arc<watch::Sender<Option<LoggedInItem>>>,
}

impl Builder for LoggedInBuilder {
    fn build(&self, cx: &BuildContext) -> Node {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let scores = Arc::new(Mutex::new(Scoreboard::default()));

        let console = self.console.clone();
        let players = self.players.clone();
        let lobby_scores = scores.clone();
        let router = Router::new(GameScreen::OffGame, move |screen: &GameScreen| match screen {
            GameScreen::OffGame => RoutingAction::attach(Arc::new(OffGameBuilder {
                console: console.clone(),
                players: players.clone(),
                scores: lobby_scores.clone(),
                events: events_tx.clone(),
            })),
            GameScreen::Playing => RoutingAction::attach(Arc::new(TicTacToeBuilder {
                console: console.clone(),
                players: players.clone(),
                events: events_tx.clone(),
            })),
        });

        let interactor = LoggedIn {
            players: self.players.clone(),
            games: router.handle(),
            events: Some(events_rx),
            root_events: self.root_events.clone(),
            scores,
            published: self.published.clone(),
        };
        Node::builder(cx, "logged_in", interactor)
            .view_factory(|_: &ContainerRef| TextView::new("logged in", &[]))
            .router(router)
            .build()
    }
}
