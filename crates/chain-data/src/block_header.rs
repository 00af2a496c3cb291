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

use alloy_primitives::{B256, U256, U64};
use alloy_serde_macro::{U256_from_String, U64_from_String};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct BlockHeader {
    #[serde(deserialize_with = "U64_from_String")]
    pub number: U64,
    #[serde(deserialize_with = "U256_from_String")]
    pub timestamp: U256,
    #[serde(default)]
    pub hash: Option<B256>,
}

impl BlockHeader {
    pub fn from_json(json: Value) -> eyre::Result<Self> {
        serde_json::from_value(json.clone())
            .map_err(|err| eyre::eyre!("failed to parse header {err}; got {json}"))
    }

    pub fn number(&self) -> u64 {
        self.number.to::<u64>()
    }
}
