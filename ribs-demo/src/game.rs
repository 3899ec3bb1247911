//! The tic tac toe rib: board rules and the interactor playing them.

use std::sync::{Arc, Mutex, PoisonError};

use ribs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::console::{Command, Console, TextView, next_command};
use crate::logged_in::GameEvent;

const KEY_BOARD: &str = "board";
const DEFAULT_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub first: String,
    pub second: String,
}

impl Players {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn name(&self, mark: Mark) -> &str {
        match mark {
            Mark::Cross => &self.first,
            Mark::Nought => &self.second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    Cross,
    Nought,
}

impl Mark {
    fn other(self) -> Self {
        match self {
            Self::Cross => Self::Nought,
            Self::Nought => Self::Cross,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Cross => 'X',
            Self::Nought => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Continue,
    Won(Mark),
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("({row}, {col}) is off the board")]
    OffBoard { row: usize, col: usize },

    #[error("({row}, {col}) is already taken")]
    Taken { row: usize, col: usize },

    #[error("The game is over")]
    Finished,
}

/// How a finished game ended, by player name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Won(String),
    Draw,
}

/// Square board, three to five cells a side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Mark>>,
    turn: Mark,
    finished: bool,
}

impl Board {
    pub fn new(size: usize) -> Self {
        let size = size.clamp(3, 5);
        Self {
            size,
            cells: vec![None; size * size],
            turn: Mark::Cross,
            finished: false,
        }
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn play(&mut self, row: usize, col: usize) -> Result<MoveResult, MoveError> {
        if self.finished {
            return Err(MoveError::Finished);
        }
        if row >= self.size || col >= self.size {
            return Err(MoveError::OffBoard { row, col });
        }
        let cell = &mut self.cells[row * self.size + col];
        if cell.is_some() {
            return Err(MoveError::Taken { row, col });
        }
        *cell = Some(self.turn);

        let result = if self.completes_line(row, col) {
            MoveResult::Won(self.turn)
        } else if self.cells.iter().all(Option::is_some) {
            MoveResult::Draw
        } else {
            MoveResult::Continue
        };
        self.finished = result != MoveResult::Continue;
        self.turn = self.turn.other();
        Ok(result)
    }

    fn at(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells[row * self.size + col]
    }

    fn full(&self, mut cells: impl Iterator<Item = (usize, usize)>, mark: Option<Mark>) -> bool {
        cells.all(|(r, c)| self.at(r, c) == mark)
    }

    fn completes_line(&self, row: usize, col: usize) -> bool {
        let mark = self.at(row, col);
        let n = self.size;

        self.full((0..n).map(|c| (row, c)), mark)
            || self.full((0..n).map(|r| (r, col)), mark)
            || (row == col && self.full((0..n).map(|i| (i, i)), mark))
            || (row + col == n - 1 && self.full((0..n).map(|i| (i, n - 1 - i)), mark))
    }

    pub fn render(&self) -> Vec<String> {
        self.cells
            .chunks(self.size)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or('.', Mark::symbol).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

/// Plays one game between the logged-in players.
pub struct TicTacToe {
    console: Console,
    players: Players,
    events: mpsc::UnboundedSender<GameEvent>,
    board: Arc<Mutex<Board>>,
}

impl Interactor for TicTacToe {
    type View = TextView;

    fn on_attach(&mut self, cx: &InteractorContext, saved: Option<&Bundle>) {
        let size = usize::try_from(cx.directory().number_or("size", DEFAULT_SIZE as i64))
            .unwrap_or(DEFAULT_SIZE);
        let board = match saved.map(|saved| saved.get::<Board>(KEY_BOARD)) {
            Some(Ok(Some(board))) => board,
            Some(Err(error)) => {
                log::warn!("Discarding saved board: {error}");
                Board::new(size)
            }
            _ => Board::new(size),
        };
        *self.board.lock().unwrap_or_else(PoisonError::into_inner) = board;

        let mut input = self.console.subscribe();
        let board = self.board.clone();
        let players = self.players.clone();
        let events = self.events.clone();
        cx.spawn(async move {
            while let Some(command) = next_command(&mut input).await {
                let Command::Move { row, col } = command else {
                    continue;
                };
                let (result, rows, turn) = {
                    let mut board = board.lock().unwrap_or_else(PoisonError::into_inner);
                    let result = board.play(row, col);
                    (result, board.render(), board.turn())
                };
                match result {
                    Ok(result) => {
                        for line in rows {
                            println!("  {line}");
                        }
                        let outcome = match result {
                            MoveResult::Continue => {
                                println!("{} to move", players.name(turn));
                                continue;
                            }
                            MoveResult::Won(mark) => Outcome::Won(players.name(mark).to_string()),
                            MoveResult::Draw => Outcome::Draw,
                        };
                        let _ = events.send(GameEvent::Finished(outcome));
                    }
                    Err(error) => println!("{error}"),
                }
            }
        });
    }

    fn on_view_created(&mut self, view: &mut TextView, _cx: &InteractorContext) {
        let board = self.board.lock().unwrap_or_else(PoisonError::into_inner);
        for line in board.render() {
            view.push_line(line);
        }
        view.push_line(format!("{} to move", self.players.name(board.turn())));
        view.show();
    }

    fn handle_back_press(&mut self, _cx: &InteractorContext) -> bool {
        println!("Game abandoned");
        false
    }

    fn on_save_instance_state(&mut self, out: &mut Bundle) {
        let board = self.board.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = out.put(KEY_BOARD, &*board) {
            log::warn!("Could not save board: {error}");
        }
    }
}

pub struct TicTacToeBuilder {
    pub console: Console,
    pub players: Players,
    pub events: mpsc::UnboundedSender<GameEvent>,
}

impl Builder for TicTacToeBuilder {
    fn build(&self, cx: &BuildContext) -> Node {
        let interactor = TicTacToe {
            console: self.console.clone(),
            players: self.players.clone(),
            events: self.events.clone(),
            board: Arc::new(Mutex::new(Board::new(DEFAULT_SIZE))),
        };
        Node::builder(cx, "tic_tac_toe", interactor)
            .view_factory(|_: &ContainerRef| TextView::new("tic tac toe", &[]))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_win() {
        let mut board = Board::new(3);
        assert_eq!(board.play(0, 0), Ok(MoveResult::Continue));
        assert_eq!(board.play(1, 0), Ok(MoveResult::Continue));
        assert_eq!(board.play(0, 1), Ok(MoveResult::Continue));
        assert_eq!(board.play(1, 1), Ok(MoveResult::Continue));
        assert_eq!(board.play(0, 2), Ok(MoveResult::Won(Mark::Cross)));
        assert_eq!(board.play(2, 2), Err(MoveError::Finished));
    }

    #[test]
    fn test_anti_diagonal_win() {
        let mut board = Board::new(3);
        for (row, col) in [(0, 2), (0, 0), (1, 1), (0, 1)] {
            assert_eq!(board.play(row, col), Ok(MoveResult::Continue));
        }
        assert_eq!(board.play(2, 0), Ok(MoveResult::Won(Mark::Cross)));
    }

    #[test]
    fn test_draw() {
        let mut board = Board::new(3);
        let moves = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0)];
        for (row, col) in moves {
            assert_eq!(board.play(row, col), Ok(MoveResult::Continue));
        }
        assert_eq!(board.play(2, 2), Ok(MoveResult::Draw));
    }

    #[test]
    fn test_invalid_moves() {
        let mut board = Board::new(3);
        assert_eq!(board.play(3, 0), Err(MoveError::OffBoard { row: 3, col: 0 }));
        board.play(1, 1).unwrap();
        assert_eq!(board.play(1, 1), Err(MoveError::Taken { row: 1, col: 1 }));
        assert_eq!(board.turn(), Mark::Nought);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(Board::new(1).render().len(), 3);
        assert_eq!(Board::new(9).render().len(), 5);
    }
}
