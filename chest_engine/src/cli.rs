use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Replays scripted menu sessions against a chest menu layout",
    version
)]
pub struct Args {
    /// Menu layout JSON (title, rows and `Position-x-y` keyed items)
    #[arg(long)]
    pub layout: PathBuf,

    /// Session script JSON to replay; without it the layout is only inspected
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Optional engine config JSON (tick length, proxy channel, title flushing)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to write the recorded host events as JSON (requires --session)
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Print every recorded host event after the replay
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum Command {
    Replay(ReplayArgs),
    Inspect(InspectArgs),
}

#[derive(Debug)]
pub struct ReplayArgs {
    pub layout: PathBuf,
    pub session: PathBuf,
    pub config: Option<PathBuf>,
    pub event_log_json: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct InspectArgs {
    pub layout: PathBuf,
    pub config: Option<PathBuf>,
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    fn into_command(self) -> Result<Command> {
        match self.session {
            Some(session) => Ok(Command::Replay(ReplayArgs {
                layout: self.layout,
                session,
                config: self.config,
                event_log_json: self.event_log_json,
                verbose: self.verbose,
            })),
            None => {
                if self.event_log_json.is_some() {
                    bail!("--event-log-json requires --session");
                }
                Ok(Command::Inspect(InspectArgs {
                    layout: self.layout,
                    config: self.config,
                }))
            }
        }
    }
}
