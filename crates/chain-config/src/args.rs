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

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[arg(
        short('c'),
        long("config"),
        value_name = "PATH",
        help = "TOML config files, later files override earlier ones",
        help_heading = "Chain config",
        value_delimiter = ','
    )]
    pub config: Vec<PathBuf>,

    #[arg(
        long,
        value_name = "URL",
        help = "JSON-RPC HTTP endpoint",
        help_heading = "Chain config"
    )]
    pub http_endpoint: Option<String>,

    #[arg(
        long,
        value_name = "URL",
        help = "JSON-RPC websocket endpoint, used to watch events",
        help_heading = "Chain config"
    )]
    pub ws_endpoint: Option<String>,

    #[arg(long, help = "Chain id", help_heading = "Chain config")]
    pub network_id: Option<u64>,

    #[arg(
        long,
        value_name = "HEX",
        help = "Private key to sign transactions with",
        help_heading = "Chain config",
        env = "RENCTL_WALLET_KEY",
        hide_env_values = true
    )]
    pub wallet_key: Option<String>,
}

impl ConfigArgs {
    /// (config key, value) pairs for every argument that was set
    pub(crate) fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = vec![];
        if let Some(endpoint) = &self.http_endpoint {
            overrides.push(("http_endpoint", endpoint.clone()));
        }
        if let Some(endpoint) = &self.ws_endpoint {
            overrides.push(("ws_endpoint", endpoint.clone()));
        }
        if let Some(network_id) = self.network_id {
            overrides.push(("network_id", network_id.to_string()));
        }
        if let Some(key) = &self.wallet_key {
            overrides.push(("wallet_key", key.clone()));
        }
        overrides
    }
}
