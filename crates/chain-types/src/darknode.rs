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

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ChainTypesError;

/// Darknodes are identified on chain by a 20-byte address derived from their key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DarknodeId(pub Address);

impl DarknodeId {
    pub fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Address::ZERO
    }
}

impl From<Address> for DarknodeId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl Display for DarknodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

impl FromStr for DarknodeId {
    type Err = ChainTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_str(s)
            .map(Self)
            .map_err(|_| ChainTypesError::InvalidDarknodeId(s.to_string()))
    }
}

/// Registration lifecycle of a darknode as reported by the registry flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DarknodeStatus {
    Unregistered,
    PendingRegistration,
    Registered,
    PendingDeregistration,
    Deregistered,
    Refundable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DarknodeFlags {
    pub pending_registration: bool,
    pub registered: bool,
    pub pending_deregistration: bool,
    pub deregistered: bool,
    pub refundable: bool,
}

impl DarknodeFlags {
    // Flags overlap on chain: a node pending deregistration is still registered,
    // a refundable node is also deregistered.
    pub fn status(&self) -> DarknodeStatus {
        if self.refundable {
            DarknodeStatus::Refundable
        } else if self.pending_deregistration {
            DarknodeStatus::PendingDeregistration
        } else if self.deregistered {
            DarknodeStatus::Deregistered
        } else if self.registered {
            DarknodeStatus::Registered
        } else if self.pending_registration {
            DarknodeStatus::PendingRegistration
        } else {
            DarknodeStatus::Unregistered
        }
    }
}
