// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn offline_store() {
    let cli = parse(&["larder", "offline", "store", "notes", "n1", "{}"]).unwrap();
    match cli.command {
        Command::Offline(OfflineCommand::Store { doc, payload }) => {
            assert_eq!(doc.collection, "notes");
            assert_eq!(doc.id, "n1");
            assert_eq!(payload, "{}");
        }
        _ => panic!("Expected offline store"),
    }
}

#[test]
fn offline_get_requires_id() {
    assert!(parse(&["larder", "offline", "get", "notes"]).is_err());
}

#[test]
fn offline_download_defaults() {
    let cli = parse(&["larder", "offline", "download", "expenses"]).unwrap();
    match cli.command {
        Command::Offline(OfflineCommand::Download {
            collection,
            filters,
            limit,
            output,
        }) => {
            assert_eq!(collection, "expenses");
            assert!(filters.is_empty());
            assert_eq!(limit, None);
            assert_eq!(output.output, OutputFormat::Text);
        }
        _ => panic!("Expected offline download"),
    }
}

#[test]
fn offline_download_repeated_filters() {
    let cli = parse(&[
        "larder",
        "offline",
        "download",
        "expenses",
        "--where",
        "amount >= 10",
        "-w",
        "category = food",
        "-n",
        "5",
    ])
    .unwrap();
    match cli.command {
        Command::Offline(OfflineCommand::Download { filters, limit, .. }) => {
            assert_eq!(filters, vec!["amount >= 10", "category = food"]);
            assert_eq!(limit, Some(5));
        }
        _ => panic!("Expected offline download"),
    }
}

#[test]
fn offline_list_and_clear() {
    let cli = parse(&["larder", "offline", "list", "notes", "-o", "json"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Offline(OfflineCommand::List { .. })
    ));
    let cli = parse(&["larder", "offline", "clear"]).unwrap();
    assert!(matches!(cli.command, Command::Offline(OfflineCommand::Clear)));
}
