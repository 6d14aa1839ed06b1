// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ld_core::{Mutation, SyncQueueItem};

use crate::cli::{DocArgs, OutputFormat, QueueCommand};
use crate::error::{Error, Result};

use super::{parse_object, parse_payload, print_json, Context};

pub fn run(ctx: &Context, command: QueueCommand) -> Result<()> {
    match command {
        QueueCommand::Create { doc, payload } => {
            let mutation = Mutation::Create(parse_payload(&payload)?);
            report(enqueue(ctx, &doc, mutation)?);
            Ok(())
        }
        QueueCommand::Update { doc, payload } => {
            let mutation = Mutation::Update(parse_object(&payload)?);
            report(enqueue(ctx, &doc, mutation)?);
            Ok(())
        }
        QueueCommand::Delete { doc } => {
            report(enqueue(ctx, &doc, Mutation::Delete)?);
            Ok(())
        }
        QueueCommand::List { output } => {
            let items = ctx.engine.queued_mutations();
            match output.output {
                OutputFormat::Json => print_json(&items),
                OutputFormat::Text => {
                    print!("{}", format_items(&items));
                    Ok(())
                }
            }
        }
    }
}

pub(crate) fn enqueue(ctx: &Context, doc: &DocArgs, mutation: Mutation) -> Result<SyncQueueItem> {
    ctx.engine
        .enqueue(mutation, &doc.collection, &doc.id)
        .ok_or_else(|| {
            Error::StorageUnavailable(format!(
                "could not queue mutation for {}/{}",
                doc.collection, doc.id
            ))
        })
}

fn report(item: SyncQueueItem) {
    println!(
        "queued #{} {} {}/{}",
        item.id,
        item.operation(),
        item.collection,
        item.doc_id
    );
}

pub(crate) fn format_items(items: &[SyncQueueItem]) -> String {
    if items.is_empty() {
        return "(queue empty)\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&format!(
            "#{:<4} {:<6} {}/{}",
            item.id,
            item.operation().as_str(),
            item.collection,
            item.doc_id
        ));
        if item.retry_count > 0 {
            out.push_str(&format!("  retries={}", item.retry_count));
        }
        if let Some(error) = &item.last_error {
            out.push_str(&format!("  last error: {error}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
