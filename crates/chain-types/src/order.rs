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
use std::str::FromStr;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::ChainTypesError;

const OPEN_ORDER_PREFIX: &[u8] = b"Republic Protocol: open: ";
const CANCEL_ORDER_PREFIX: &[u8] = b"Republic Protocol: cancel: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub B256);

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ChainTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Self)
            .map_err(|_| ChainTypesError::InvalidOrderId(s.to_string()))
    }
}

impl From<B256> for OrderId {
    fn from(id: B256) -> Self {
        Self(id)
    }
}

/// Settlement layer an order is submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(pub u64);

impl SettlementId {
    pub const RENEX: SettlementId = SettlementId(1);
    pub const RENEX_ATOMIC: SettlementId = SettlementId(2);
}

/// Orderbook order state, stored on chain as uint8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Undefined,
    Open,
    Confirmed,
    Canceled,
}

impl TryFrom<u8> for OrderState {
    type Error = ChainTypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderState::Undefined),
            1 => Ok(OrderState::Open),
            2 => Ok(OrderState::Confirmed),
            3 => Ok(OrderState::Canceled),
            other => Err(ChainTypesError::UnknownOrderState(other)),
        }
    }
}

impl From<OrderState> for u8 {
    fn from(state: OrderState) -> Self {
        state as u8
    }
}

/// Row of Orderbook.getOrders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderEntry {
    pub id: OrderId,
    pub trader: Address,
    pub state: OrderState,
}

/// Everything the Orderbook stores about a single order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderInfo {
    pub id: OrderId,
    pub state: OrderState,
    pub trader: Address,
    pub confirmer: Address,
    /// Counterpart order, zero until the order is confirmed
    pub matched: OrderId,
    pub priority: U256,
    pub block_number: U256,
    pub depth: U256,
}

/// Order fields as they are hashed by the Orderbook and submitted to the slasher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub details: Bytes,
    pub settlement_id: SettlementId,
    pub tokens: u64,
    pub price: U256,
    pub volume: U256,
    pub minimum_volume: U256,
}

impl Order {
    /// keccak256(abi.encodePacked(details, settlementID, tokens, price, volume, minimumVolume))
    pub fn id(&self) -> OrderId {
        let mut packed = Vec::with_capacity(self.details.len() + 8 + 8 + 32 * 3);
        packed.extend_from_slice(&self.details);
        packed.extend_from_slice(&self.settlement_id.0.to_be_bytes());
        packed.extend_from_slice(&self.tokens.to_be_bytes());
        packed.extend_from_slice(&self.price.to_be_bytes::<32>());
        packed.extend_from_slice(&self.volume.to_be_bytes::<32>());
        packed.extend_from_slice(&self.minimum_volume.to_be_bytes::<32>());

        OrderId(keccak256(packed))
    }
}

/// Message the trader signs to open an order
pub fn open_order_message(id: &OrderId) -> Vec<u8> {
    [OPEN_ORDER_PREFIX, id.0.as_slice()].concat()
}

/// Message the trader signs to cancel an order
pub fn cancel_order_message(id: &OrderId) -> Vec<u8> {
    [CANCEL_ORDER_PREFIX, id.0.as_slice()].concat()
}
