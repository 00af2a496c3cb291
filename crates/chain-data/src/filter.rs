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

use std::fmt::{Display, Formatter};

use alloy_primitives::{Address, FixedBytes, B256, U256};
use alloy_sol_types::SolEvent;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Block tag or number as accepted by eth_call, eth_getLogs and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockNumber {
    #[default]
    Latest,
    Earliest,
    Pending,
    Number(u64),
}

impl Display for BlockNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockNumber::Latest => write!(f, "latest"),
            BlockNumber::Earliest => write!(f, "earliest"),
            BlockNumber::Pending => write!(f, "pending"),
            BlockNumber::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

impl Serialize for BlockNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<u64> for BlockNumber {
    fn from(n: u64) -> Self {
        BlockNumber::Number(n)
    }
}

pub fn topic<E: SolEvent>() -> B256 {
    E::SIGNATURE_HASH
}

pub fn address_topic(address: Address) -> B256 {
    address.into_word()
}

pub fn uint_topic(value: U256) -> B256 {
    B256::from(value)
}

pub fn u64_topic(value: u64) -> B256 {
    uint_topic(U256::from(value))
}

/// bytes20 values are right padded, unlike addresses
pub fn bytes20_topic(value: FixedBytes<20>) -> B256 {
    let mut word = B256::ZERO;
    word[..20].copy_from_slice(value.as_slice());
    word
}

pub fn bytes32_topic(value: B256) -> B256 {
    value
}

/// Log filter for eth_getLogs and eth_subscribe("logs", ..)
///
/// Every topic position holds an OR-list of values, an empty list matches anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub address: Vec<Address>,
    pub topics: [Vec<B256>; 4],
    pub from_block: Option<BlockNumber>,
    pub to_block: Option<BlockNumber>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address.push(address);
        self
    }

    /// Match only logs of event `E`
    pub fn event<E: SolEvent>(mut self) -> Self {
        self.topics[0] = vec![E::SIGNATURE_HASH];
        self
    }

    pub fn topic1(mut self, values: impl IntoIterator<Item = B256>) -> Self {
        self.topics[1] = values.into_iter().collect();
        self
    }

    pub fn topic2(mut self, values: impl IntoIterator<Item = B256>) -> Self {
        self.topics[2] = values.into_iter().collect();
        self
    }

    pub fn topic3(mut self, values: impl IntoIterator<Item = B256>) -> Self {
        self.topics[3] = values.into_iter().collect();
        self
    }

    pub fn from_block(mut self, block: impl Into<BlockNumber>) -> Self {
        self.from_block = Some(block.into());
        self
    }

    pub fn to_block(mut self, block: impl Into<BlockNumber>) -> Self {
        self.to_block = Some(block.into());
        self
    }

    /// Same filter without the block range, subscriptions don't accept it
    pub fn without_range(mut self) -> Self {
        self.from_block = None;
        self.to_block = None;
        self
    }

    fn topics_json(&self) -> Vec<Value> {
        let mut topics: Vec<Value> = self
            .topics
            .iter()
            .map(|values| match values.as_slice() {
                [] => Value::Null,
                [single] => json!(single),
                many => json!(many),
            })
            .collect();

        while topics.last() == Some(&Value::Null) {
            topics.pop();
        }

        topics
    }

    pub fn to_json(&self) -> Value {
        let mut filter = serde_json::Map::new();
        match self.address.as_slice() {
            [] => {}
            [single] => {
                filter.insert("address".to_string(), json!(single));
            }
            many => {
                filter.insert("address".to_string(), json!(many));
            }
        }
        filter.insert("topics".to_string(), Value::Array(self.topics_json()));
        if let Some(from) = self.from_block {
            filter.insert("fromBlock".to_string(), json!(from));
        }
        if let Some(to) = self.to_block {
            filter.insert("toBlock".to_string(), json!(to));
        }

        Value::Object(filter)
    }
}

impl Serialize for LogFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
