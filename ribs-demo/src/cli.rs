use clap::Parser;

use crate::game::Players;

#[derive(Debug, Parser)]
#[command(name = "ribs-demo")]
#[command(about = "Tic tac toe on a rib tree, played from the console")]
#[command(version)]
pub struct Cli {
    /// Ignore the saved state
    #[arg(long)]
    pub fresh: bool,

    /// Log two players in and start a game right away
    #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"])]
    pub play: Option<Vec<String>>,
}

impl Cli {
    pub fn players(&self) -> Option<Players> {
        match self.play.as_deref() {
            Some([first, second]) => Some(Players::new(first.as_str(), second.as_str())),
            _ => None,
        }
    }
}
