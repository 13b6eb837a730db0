use crate::commands::ntr::NtrCommands;
use clap::{Parser, Subcommand};

pub mod ntr;

/// CLI for inspecting and extracting Nintendo DS ROMs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(subcommand)]
    Ntr(NtrCommands),
}
