mod add_free;
mod baseline_days;
mod catalog;
mod evaluate;
mod octopus;
mod output;
mod progress;

use clap::{Parser, Subcommand};

use crate::{
    cli::{
        add_free::AddFreeArgs,
        baseline_days::BaselineDaysArgs,
        evaluate::{FreeArgs, SavingArgs},
    },
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn run(self) -> Result {
        match self.command {
            Command::Saving(args) => args.run(),
            Command::Free(args) => args.run(),
            Command::AddFree(args) => args.run(),
            Command::BaselineDays(args) => args.run(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate the saving sessions from the catalog.
    #[clap(name = "saving")]
    Saving(Box<SavingArgs>),

    /// Evaluate the free electricity sessions from the catalog.
    #[clap(name = "free")]
    Free(Box<FreeArgs>),

    /// Add a free electricity session to the catalog.
    #[clap(name = "add-free")]
    AddFree(AddFreeArgs),

    /// Show the baseline days of the catalog sessions without fetching any readings.
    #[clap(name = "baseline-days")]
    BaselineDays(BaselineDaysArgs),
}
