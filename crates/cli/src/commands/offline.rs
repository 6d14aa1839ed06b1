// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ld_core::Document;

use crate::cli::{DocArgs, OfflineCommand, OutputFormat};
use crate::error::{Error, Result};
use crate::filter::parse_filter;

use super::{parse_payload, print_json, Context};

pub async fn run(ctx: &Context, command: OfflineCommand) -> Result<()> {
    match command {
        OfflineCommand::Store { doc, payload } => store(ctx, &doc, &payload),
        OfflineCommand::Get { doc } => {
            match ctx.engine.get_offline_data(&doc.collection, &doc.id) {
                Some(payload) => println!("{}", serde_json::to_string(&payload)?),
                None => println!("(not available offline)"),
            }
            Ok(())
        }
        OfflineCommand::List { collection, output } => {
            let docs = ctx.engine.get_all_offline_data(&collection);
            output_documents(&docs, output.output)
        }
        OfflineCommand::Download {
            collection,
            filters,
            limit,
            output,
        } => {
            let docs = download(ctx, &collection, &filters, limit).await?;
            match output.output {
                OutputFormat::Json => print_json(&docs),
                OutputFormat::Text => {
                    println!("downloaded {} document(s) from {collection}", docs.len());
                    Ok(())
                }
            }
        }
        OfflineCommand::Clear => {
            if !ctx.engine.clear_all_offline_data() {
                return Err(Error::StorageUnavailable(
                    "could not clear offline data".to_string(),
                ));
            }
            println!("cleared offline documents and queued mutations");
            Ok(())
        }
    }
}

pub(crate) fn store(ctx: &Context, doc: &DocArgs, payload: &str) -> Result<()> {
    let payload = parse_payload(payload)?;
    if !ctx
        .engine
        .store_offline_data(&doc.collection, &doc.id, payload)
    {
        return Err(Error::StorageUnavailable(format!(
            "could not store {}/{}",
            doc.collection, doc.id
        )));
    }
    Ok(())
}

/// Parses the filters before touching the network, then downloads.
pub(crate) async fn download(
    ctx: &Context,
    collection: &str,
    filters: &[String],
    limit: Option<usize>,
) -> Result<Vec<Document>> {
    let filter = parse_filter(filters, limit)?;
    ctx.check_connectivity().await;
    ctx.engine.download_for_offline(collection, &filter).await
}

fn output_documents(docs: &[Document], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(docs),
        OutputFormat::Text => {
            print!("{}", format_documents(docs)?);
            Ok(())
        }
    }
}

pub(crate) fn format_documents(docs: &[Document]) -> Result<String> {
    let mut out = String::new();
    for doc in docs {
        out.push_str(&format!("{}  {}\n", doc.id, serde_json::to_string(&doc.payload)?));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;
