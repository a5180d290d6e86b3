use clap::{Parser, Subcommand};

use self::{inspect_set::InspectSetArg, train::TrainArg};

mod inspect_set;
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
    /// Evolve feature weights against an evaluation set
    Train(#[clap(flatten)] TrainArg),
    /// Summarize an evaluation set as a data sanity check
    InspectSet(#[clap(flatten)] InspectSetArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::InspectSet(arg) => inspect_set::run(&arg)?,
    }
    Ok(())
}
