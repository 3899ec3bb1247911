//! Line-based console: commands in, text views out.

use std::str::FromStr;
use std::sync::Mutex;

use ribs::{RibView, ViewContainer};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { first: String, second: String },
    Play,
    Move { row: usize, col: usize },
    Logout,
    Back,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '{0}', type help for a list")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["login", first, second] => Ok(Self::Login {
                first: first.to_string(),
                second: second.to_string(),
            }),
            ["login", ..] => Err(ParseError::Usage("login <player> <player>")),
            ["play"] => Ok(Self::Play),
            ["move", row, col] => match (row.parse(), col.parse()) {
                (Ok(row), Ok(col)) => Ok(Self::Move { row, col }),
                _ => Err(ParseError::Usage("move <row> <col>")),
            },
            ["move", ..] => Err(ParseError::Usage("move <row> <col>")),
            ["logout"] => Ok(Self::Logout),
            ["back"] => Ok(Self::Back),
            ["save"] => Ok(Self::Save),
            ["help"] | [] => Ok(Self::Help),
            ["quit"] | ["exit"] => Ok(Self::Quit),
            [other, ..] => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

pub const HELP: &[&str] = &[
    "login <player> <player>  start a session",
    "play                     start a game",
    "move <row> <col>         place a mark (rows and columns count from 0)",
    "logout                   end the session",
    "back                     leave the current screen",
    "save                     write the current state to disk",
    "quit                     save and exit",
];

/// Fan-out of typed commands to every interactor listening.
#[derive(Debug, Clone)]
pub struct Console {
    input: broadcast::Sender<Command>,
}

impl Console {
    pub fn new() -> Self {
        let (input, _) = broadcast::channel(32);
        Self { input }
    }

    pub fn send(&self, command: Command) {
        if self.input.send(command).is_err() {
            println!("Nobody is listening for that right now");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Command> {
        self.input.subscribe()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for the next command, skipping ones missed while lagging.
pub async fn next_command(input: &mut broadcast::Receiver<Command>) -> Option<Command> {
    loop {
        match input.recv().await {
            Ok(command) => return Some(command),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                log::warn!("Dropped {missed} console commands");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// A titled block of text.
#[derive(Debug, Clone)]
pub struct TextView {
    title: String,
    lines: Vec<String>,
}

impl TextView {
    pub fn new(title: &str, lines: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn show(&self) {
        println!("== {} ==", self.title);
        for line in &self.lines {
            println!("  {line}");
        }
    }
}

impl RibView for TextView {
    fn name(&self) -> &str {
        &self.title
    }
}

/// The terminal, seen as a stack of views.
#[derive(Debug, Default)]
pub struct ConsoleContainer {
    shown: Mutex<Vec<String>>,
}

impl ConsoleContainer {
    /// Titles of the views currently on screen, outermost first.
    pub fn breadcrumbs(&self) -> String {
        self.shown
            .lock()
            .map(|shown| shown.join(" > "))
            .unwrap_or_default()
    }
}

impl ViewContainer for ConsoleContainer {
    fn add_view(&self, view: &dyn RibView) {
        log::debug!("Showing {}", view.name());
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(view.name().to_string());
        }
    }

    fn remove_view(&self, view: &dyn RibView) {
        log::debug!("Hiding {}", view.name());
        if let Ok(mut shown) = self.shown.lock()
            && let Some(index) = shown.iter().rposition(|name| name == view.name())
        {
            shown.remove(index);
        }
    }
}
