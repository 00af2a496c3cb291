/*
 * Nox Fluence Peer
 *
 * Copyright (C) 2024 Fluence DAO
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation version 3 of the
 * License.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

#![warn(rust_2018_idioms)]
#![deny(
    dead_code,
    nonstandard_style,
    unused_imports,
    unused_mut,
    unused_variables,
    unused_unsafe,
    unreachable_patterns
)]

use clap::Parser;
use eyre::WrapErr;

use chain_config::load_config;

use crate::cli::Cli;
use crate::commands::Renctl;

mod cli;
mod commands;

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).wrap_err("error loading config")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tokio")
        .build()
        .wrap_err("could not make tokio runtime")?
        .block_on(async {
            log_utils::enable_logs();
            tracing::debug!(
                target: "renctl",
                "Using {} (network {}), contracts: {:?}",
                config.http_endpoint,
                config.network_id,
                config.contracts
            );

            let renctl = Renctl::new(config)?;
            let output = renctl.execute(cli.command).await?;
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        })
}
