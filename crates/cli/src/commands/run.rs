// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wq run [options] -- <command>...` - Run a shell command per item

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use wq_adapters::ShellHandler;
use wq_core::{Clock, RunStatistics, StatsTracker, SystemClock};
use wq_engine::{Pool, PoolError, PoolHooks};

use crate::exit_error::ExitError;
use crate::input::read_items;
use crate::settings::{EnvOverrides, PoolArgs};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub pool: PoolArgs,

    /// File with one item per line; `-` or absent reads stdin
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Command to run; `{}` is replaced by the item
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    let config = args.pool.resolve(EnvOverrides::from_env())?;
    let items = read_items(args.input.as_deref())?;
    let handler = ShellHandler::new(&args.command.join(" "));
    tracing::debug!(script = handler.script(), items = items.len(), "prepared run");

    let hooks = PoolHooks::new(handler).setup(move |run| {
        run.set_work_list(items);
        run.set_item_handler(|item, detail| {
            tracing::debug!(%item, %detail, "item complete");
        });
    });
    let pool = Pool::new(config, hooks).map_err(fatal)?;
    tracing::info!(run_id = %pool.run_id(), "starting run");

    let stats = pool.run().await.map_err(fatal)?;
    println!("{}", report(stats));

    if stats.failed > 0 {
        return Err(ExitError::new(1, String::new()).into());
    }
    Ok(())
}

/// Final statistics block as printed on stdout.
pub fn report(stats: RunStatistics) -> String {
    StatsTracker::from(stats)
        .snapshot(SystemClock.epoch_ms())
        .to_string()
}

fn fatal(e: PoolError) -> anyhow::Error {
    ExitError::new(2, e.to_string()).into()
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
