//! Deep link into a game: log the players in and open a board.

use ribs_workflow::{NoValue, Step, Workflow, WorkflowSteps};

use crate::game::Players;
use crate::logged_in::LoggedInItem;
use crate::root::RootItem;

pub struct StartGame {
    players: Players,
}

impl StartGame {
    pub fn new(players: Players) -> Self {
        Self { players }
    }
}

impl Workflow<RootItem> for StartGame {
    type Output = Players;

    fn steps(&self, root: RootItem) -> WorkflowSteps<Players> {
        let players = self.players.clone();
        Step::ready(NoValue, root)
            .then(move |_, root: RootItem| root.wait_for_login(players))
            .then(|_, session: LoggedInItem| session.start_game())
            .into()
    }
}
