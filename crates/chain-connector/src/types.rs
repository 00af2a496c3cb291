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

use alloy_primitives::{Address, B256, U256, U64};
use alloy_sol_types::SolEvent;
use serde::Deserialize;

use chain_data::{parse_event_log, BlockNumber, EventLog, Log, LogFilter};

/// Options of read-only contract calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOpts {
    /// Account the call is made from, matters for `msg.sender` dependent views
    pub from: Option<Address>,
    pub block: BlockNumber,
}

impl CallOpts {
    pub fn at_block(block: impl Into<BlockNumber>) -> Self {
        Self {
            from: None,
            block: block.into(),
        }
    }
}

/// Options of state-changing transactions, unset fields are asked from the node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactOpts {
    pub nonce: Option<u64>,
    pub gas_limit: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    /// Wei attached to the transaction
    pub value: U256,
}

/// Block range of historical log queries
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterOpts {
    pub start: u64,
    /// `None` means up to the latest block
    pub end: Option<u64>,
}

impl FilterOpts {
    pub fn range(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub(crate) fn apply(&self, filter: LogFilter) -> LogFilter {
        let filter = filter.from_block(self.start);
        match self.end {
            Some(end) => filter.to_block(end),
            None => filter.to_block(BlockNumber::Latest),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: B256,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// 1 on success, 0 when reverted
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |status| !status.is_zero())
    }

    /// Events of type `E` emitted by the transaction, other logs are ignored
    pub fn events<E: SolEvent>(&self) -> Vec<EventLog<E>> {
        self.logs
            .iter()
            .filter(|log| log.topics.first() == Some(&E::SIGNATURE_HASH))
            .filter_map(|log| parse_event_log::<E>(log.clone()).ok())
            .collect()
    }
}
