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

use std::time::Duration;

pub const CONFIG_FILE: &str = "Config.toml";
pub const CONFIG_ENV: &str = "RENCTL_CONFIG";
pub const ENV_PREFIX: &str = "RENCTL";

pub fn default_network_id() -> u64 {
    1
}

pub fn default_receipt_timeout() -> Duration {
    Duration::from_secs(120)
}

pub fn default_http_endpoint() -> String {
    "http://127.0.0.1:8545".to_string()
}
