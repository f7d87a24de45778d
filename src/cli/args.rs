//! Defines the command-line arguments and subcommands for the gbnf CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "gbnf",
    version,
    about = "Compile GBNF grammars and exercise them against input text."
)]
pub struct GbnfArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a grammar file and report whether it is valid.
    Check {
        /// The path to the grammar file to compile.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Compile a grammar file and dump its lowered rule table as JSON.
    Rules {
        /// The path to the grammar file to inspect.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Compile a grammar file and test whether text matches from 'root'.
    Match {
        /// The path to the grammar file to compile.
        #[arg(required = true)]
        file: PathBuf,
        /// The input text to match against the grammar.
        #[arg(required = true)]
        text: String,
    },
}
