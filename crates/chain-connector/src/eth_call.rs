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
use alloy_primitives::Address;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use hex_utils::encode_hex_0x;

/// Transaction object of `eth_call` and `eth_estimateGas`
#[derive(Debug)]
pub struct EthCall<'a> {
    data: &'a [u8],
    to: Option<Address>,
    from: Option<Address>,
}

impl<'a> EthCall<'a> {
    pub fn to(data: &'a [u8], to: Address) -> Self {
        Self {
            data,
            to: Some(to),
            from: None,
        }
    }

    /// Contract creation, there's no recipient
    pub fn create(data: &'a [u8]) -> Self {
        Self {
            data,
            to: None,
            from: None,
        }
    }

    pub fn from(mut self, from: Option<Address>) -> Self {
        self.from = from;
        self
    }
}

impl<'a> Serialize for EthCall<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = 1 + self.to.is_some() as usize + self.from.is_some() as usize;
        let mut eth_call = serializer.serialize_struct("EthCall", fields)?;
        eth_call.serialize_field("data", &encode_hex_0x(self.data))?;
        if let Some(to) = &self.to {
            eth_call.serialize_field("to", to)?;
        }
        if let Some(from) = &self.from {
            eth_call.serialize_field("from", from)?;
        }

        eth_call.end()
    }
}
