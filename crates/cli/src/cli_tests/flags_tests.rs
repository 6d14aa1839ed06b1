// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::CommandFactory;
use std::path::Path;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn global_flags_default_to_none() {
    let cli = parse(&["larder", "run"]).unwrap();
    assert!(cli.config.is_none());
    assert!(cli.log_file.is_none());
    assert!(matches!(cli.command, Command::Run));
}

#[parameterized(
    before_command = { &["larder", "--config", "c.toml", "--log-file", "l.log", "run"] },
    after_command = { &["larder", "run", "--config", "c.toml", "--log-file", "l.log"] },
)]
fn global_flags_anywhere(args: &[&str]) {
    let cli = parse(args).unwrap();
    assert_eq!(cli.config.as_deref(), Some(Path::new("c.toml")));
    assert_eq!(cli.log_file.as_deref(), Some(Path::new("l.log")));
}

#[parameterized(
    default = { &["larder", "status"], OutputFormat::Text },
    short = { &["larder", "status", "-o", "json"], OutputFormat::Json },
    long = { &["larder", "status", "--output", "text"], OutputFormat::Text },
)]
fn status_output(args: &[&str], expected: OutputFormat) {
    match parse(args).unwrap().command {
        Command::Status { output } => assert_eq!(output.output, expected),
        _ => panic!("Expected Status command"),
    }
}

#[test]
fn sync_accepts_output() {
    let cli = parse(&["larder", "sync", "-o", "json"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Sync {
            output: OutputArgs {
                output: OutputFormat::Json
            }
        }
    ));
}

#[test]
fn unknown_output_format_rejected() {
    assert!(parse(&["larder", "status", "-o", "yaml"]).is_err());
}

#[test]
fn command_required() {
    assert!(parse(&["larder"]).is_err());
}
