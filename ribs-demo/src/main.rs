mod cli;
mod console;
mod error;
mod game;
mod logged_in;
mod logged_out;
mod off_game;
mod paths;
mod root;
mod start_game;

use std::fs::{self, File};
use std::io::ErrorKind;
use std::sync::Arc;

use clap::Parser;
use ribs::prelude::*;
use ribs::{RibEvent, RibEventKind, WorkerBinderInfo};
use ribs_workflow::Workflow;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::console::{Command, Console, ConsoleContainer, HELP};
use crate::error::DemoError;
use crate::paths::{DemoDirs, KEPT_LOGS};
use crate::root::RootBuilder;
use crate::start_game::StartGame;

fn init_logging(dirs: &DemoDirs) -> Result<(), DemoError> {
    dirs.rotate_logs(KEPT_LOGS)?;
    let file = File::create(dirs.log_file())?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)?;
    Ok(())
}

fn tree_config() -> RibsConfig {
    let directory = CustomisationDirectory::new()
        .with("greeting", "Welcome to tic tac toe")
        .with(
            "tic_tac_toe",
            CustomisationDirectory::new().with("size", 3i64),
        );

    RibsConfig::new()
        .directory(directory)
        .on_error(|error: &RibError| {
            if error.is_cleanup_failure() {
                log::error!("{error}");
            } else {
                log::warn!("{error}");
            }
        })
        .worker_listener(|info: &WorkerBinderInfo| {
            log::debug!(
                "{} {:?} on {} for {} took {:?}",
                info.worker,
                info.event,
                info.thread,
                info.rib,
                info.duration
            );
        })
}

fn load_state(dirs: &DemoDirs) -> Option<Bundle> {
    let path = dirs.state_file();
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => return None,
        Err(error) => {
            log::warn!("Could not read {}: {error}", path.display());
            return None;
        }
    };
    match Bundle::from_bytes(&bytes) {
        Ok(bundle) => Some(bundle),
        Err(error) => {
            log::warn!("Starting fresh, saved state is unreadable: {error}");
            None
        }
    }
}

fn save_state(tree: &mut RibTree, dirs: Option<&DemoDirs>) -> Result<(), DemoError> {
    let Some(path) = dirs.map(DemoDirs::state_file) else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, tree.save_instance_state().to_bytes()?)?;
    log::info!("Saved state to {}", path.display());
    Ok(())
}

fn print_help() {
    for line in HELP {
        println!("  {line}");
    }
}

/// Log lifecycle events until the tree goes away.
fn trace_events(mut events: broadcast::Receiver<RibEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let parent = event.parent.as_ref().map_or("-", |parent| parent.name());
                    let kind = match event.kind {
                        RibEventKind::Attached => "attached",
                        RibEventKind::Detached => "detached",
                        RibEventKind::ViewAttached => "view attached",
                        RibEventKind::ViewDetached => "view detached",
                    };
                    log::debug!("{} {kind} (parent {parent})", event.rib);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::debug!("Missed {missed} lifecycle events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn run(cli: Cli, dirs: Option<DemoDirs>) -> Result<(), DemoError> {
    let saved = match &dirs {
        Some(dirs) if !cli.fresh => load_state(dirs),
        _ => None,
    };

    let console = Console::new();
    let root = RootBuilder::new(console.clone());
    let mut tree = RibTree::new(tree_config());
    trace_events(tree.events());

    tree.attach_root(&root, saved);
    let container = Arc::new(ConsoleContainer::default());
    tree.attach_to_view(container.clone());
    tree.start();

    if let Some(players) = cli.players()
        && let Some(item) = root.root_item()
    {
        let scope = item.scope();
        let game = StartGame::new(players).create(item).spawn(scope);
        tokio::spawn(async move {
            match game.outcome().await {
                Ok(Some(players)) => {
                    log::info!("Started a game for {} and {}", players.first, players.second);
                }
                Ok(None) => log::info!("Start game workflow ended early"),
                Err(error) => log::warn!("{error}"),
            }
        });
    }

    let shutdown = CancellationToken::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tree.run(shutdown.clone()) => break,
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => print_help(),
            Ok(Command::Back) => {
                if !tree.handle_back_press() {
                    println!("Nothing to go back to, type quit to exit");
                }
            }
            Ok(Command::Save) => {
                save_state(&mut tree, dirs.as_ref())?;
                println!("Saved");
            }
            Ok(command) => console.send(command),
            Err(error) => println!("{error}"),
        }
        log::debug!("On screen: {}", container.breadcrumbs());
    }

    save_state(&mut tree, dirs.as_ref())?;
    tree.stop();
    tree.detach_from_view();
    tree.detach_root();
    tree.settle().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let dirs = DemoDirs::locate();
    match &dirs {
        Some(dirs) => {
            if let Err(error) = init_logging(dirs) {
                eprintln!("Logging disabled: {error}");
            }
        }
        None => eprintln!("Logging disabled: no home directory"),
    }

    if let Err(error) = run(cli, dirs).await {
        log::error!("{error}");
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
