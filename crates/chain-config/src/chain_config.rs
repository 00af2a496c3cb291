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

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use clarity::PrivateKey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::defaults::{default_http_endpoint, default_network_id, default_receipt_timeout};

#[serde_as]
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct ChainConfig {
    #[serde(default = "default_http_endpoint")]
    pub http_endpoint: String,
    #[serde(default)]
    pub ws_endpoint: Option<String>,
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    /// Key transactions are signed with, read-only usage doesn't need it
    #[serde_as(deserialize_as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing)]
    pub wallet_key: Option<PrivateKey>,
    #[serde(default)]
    pub contracts: ContractAddresses,
    #[serde(with = "humantime_serde", default = "default_receipt_timeout")]
    pub receipt_timeout: Duration,
    /// Fallback for eth_maxPriorityFeePerGas, in wei
    #[serde(default)]
    pub default_priority_fee: Option<u128>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            http_endpoint: default_http_endpoint(),
            ws_endpoint: None,
            network_id: default_network_id(),
            wallet_key: None,
            contracts: ContractAddresses::default(),
            receipt_timeout: default_receipt_timeout(),
            default_priority_fee: None,
        }
    }
}

impl ChainConfig {
    pub fn wallet_address(&self) -> Option<Address> {
        let key = self.wallet_key.as_ref()?;
        Address::from_str(&key.to_address().to_string()).ok()
    }
}

#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq)]
pub struct ContractAddresses {
    pub republic_token: Option<Address>,
    pub darknode_registry: Option<Address>,
    pub orderbook: Option<Address>,
    pub darknode_slasher: Option<Address>,
    pub settlement_registry: Option<Address>,
}
