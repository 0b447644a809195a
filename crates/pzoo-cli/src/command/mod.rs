use clap::{Parser, Subcommand};

use self::{generate::GenerateArg, play::PlayArg, replay::ReplayArg, train::TrainArg};

mod generate;
mod play;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve agents with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Replay a saved agent in the world it was recorded in
    Replay(#[clap(flatten)] ReplayArg),
    /// Play a level from scripted action lines
    Play(#[clap(flatten)] PlayArg),
    /// Print a generated level
    Generate(#[clap(flatten)] GenerateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Generate(arg) => generate::run(&arg)?,
    }
    Ok(())
}
