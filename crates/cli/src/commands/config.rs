// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wq config` - Print the effective configuration

use anyhow::{Context, Result};
use clap::Args;

use crate::settings::{EnvOverrides, PoolArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub pool: PoolArgs,
}

pub fn handle(args: ConfigArgs) -> Result<()> {
    let config = args.pool.resolve(EnvOverrides::from_env())?;
    let toml = config
        .to_toml_string()
        .context("failed to render configuration")?;
    print!("{}", toml);
    Ok(())
}
