//! The gbnf command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! core library functions: compile a grammar, dump its rule table, or match
//! input text against it.

use std::path::Path;
use std::{fs, process};

use clap::Parser;
use serde::Serialize;

use crate::builder::compile;
use crate::cli::args::{Command, GbnfArgs};
use crate::errors::{print_error, SourceContext};
use crate::grammar::RuleElement;
use crate::syntax::parser;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = GbnfArgs::parse();

    let succeeded = match args.command {
        Command::Check { file } => handle_check(&file),
        Command::Rules { file } => handle_rules(&file),
        Command::Match { file, text } => handle_match(&file, &text),
    };

    if !succeeded {
        process::exit(1);
    }
}

/// One rule table entry in the `rules` JSON dump.
#[derive(Debug, Serialize)]
struct RuleSummary {
    id: usize,
    name: String,
    elements: Vec<RuleElement>,
}

fn read_grammar(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(error) => {
            eprintln!("Error: cannot read {}: {}", path.display(), error);
            None
        }
    }
}

/// Handles the `check` subcommand.
fn handle_check(path: &Path) -> bool {
    let Some(text) = read_grammar(path) else {
        return false;
    };
    match compile(&text) {
        Ok(engine) => {
            println!("{}: ok ({} rules)", path.display(), engine.rule_count());
            true
        }
        Err(error) => {
            print_error(error);
            false
        }
    }
}

/// Handles the `rules` subcommand. Dumps the lowered table without
/// requiring a `root` rule, so partial grammars can be inspected.
fn handle_rules(path: &Path) -> bool {
    let Some(text) = read_grammar(path) else {
        return false;
    };
    let source = SourceContext::from_text(path.display().to_string(), text.clone());
    let state = match parser::parse(&text, source) {
        Ok(state) => state,
        Err(error) => {
            print_error(error);
            return false;
        }
    };

    let views = state.rule_views();
    let table: Vec<RuleSummary> = (0..state.rule_count())
        .map(|id| RuleSummary {
            id,
            name: state.name_of(id).to_string(),
            elements: views[id].to_vec(),
        })
        .collect();

    match serde_json::to_string_pretty(&table) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(error) => {
            eprintln!("Error: cannot serialize rule table: {error}");
            false
        }
    }
}

/// Handles the `match` subcommand. Exit status reports the verdict, so the
/// command composes in scripts.
fn handle_match(path: &Path, input: &str) -> bool {
    let Some(text) = read_grammar(path) else {
        return false;
    };
    let engine = match compile(&text) {
        Ok(engine) => engine,
        Err(error) => {
            print_error(error);
            return false;
        }
    };

    if engine.recognizes(input) {
        println!("match");
        true
    } else {
        println!("no match");
        false
    }
}
