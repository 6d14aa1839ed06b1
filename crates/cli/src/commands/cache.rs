// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::CacheCommand;
use crate::error::{Error, Result};
use crate::filter::parse_duration;

use super::{parse_payload, Context};

pub fn run(ctx: &Context, command: CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Put { key, data, ttl } => put(ctx, &key, &data, ttl.as_deref()),
        CacheCommand::Get { key } => {
            match get(ctx, &key)? {
                Some(data) => println!("{data}"),
                None => println!("(not cached)"),
            }
            Ok(())
        }
        CacheCommand::Sweep => {
            let removed = ctx.engine.clear_expired_cache();
            println!("removed {removed} expired entr{}", if removed == 1 { "y" } else { "ies" });
            Ok(())
        }
    }
}

pub(crate) fn put(ctx: &Context, key: &str, data: &str, ttl: Option<&str>) -> Result<()> {
    let data = parse_payload(data)?;
    let ttl = ttl.map(parse_duration).transpose()?;
    if !ctx.engine.cache_data(key, data, ttl) {
        return Err(Error::StorageUnavailable(format!(
            "could not cache '{key}'"
        )));
    }
    Ok(())
}

pub(crate) fn get(ctx: &Context, key: &str) -> Result<Option<String>> {
    ctx.engine
        .get_cached_data(key)
        .map(|data| serde_json::to_string(&data))
        .transpose()
        .map_err(Error::from)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
