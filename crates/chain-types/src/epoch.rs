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

use alloy_primitives::{Address, U256};
use serde::Serialize;

/// Registry epoch, as returned by currentEpoch() and previousEpoch()
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Epoch {
    pub hash: U256,
    pub block_number: U256,
}

impl Epoch {
    pub fn new(hash: U256, block_number: U256) -> Self {
        Self { hash, block_number }
    }

    /// Block number starting from which `epoch()` will be accepted by the registry
    pub fn next_epoch_block(&self, minimum_interval: U256) -> U256 {
        self.block_number.saturating_add(minimum_interval)
    }

    /// Whether the registry accepts `epoch()` at `current_block`
    pub fn is_due(&self, current_block: U256, minimum_interval: U256) -> bool {
        current_block >= self.next_epoch_block(minimum_interval)
    }
}

/// Darknode registry state at a single block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub current_epoch: Epoch,
    pub previous_epoch: Epoch,
    pub num_darknodes: U256,
    pub num_darknodes_next_epoch: U256,
    pub num_darknodes_previous_epoch: U256,
    pub minimum_bond: U256,
    pub minimum_pod_size: U256,
    pub minimum_epoch_interval: U256,
    pub slasher: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_due_after_interval() {
        let epoch = Epoch::new(U256::from(42), U256::from(100));
        let interval = U256::from(10);

        assert!(!epoch.is_due(U256::from(100), interval));
        assert!(!epoch.is_due(U256::from(109), interval));
        assert!(epoch.is_due(U256::from(110), interval));
        assert!(epoch.is_due(U256::from(111), interval));
        assert_eq!(epoch.next_epoch_block(interval), U256::from(110));
    }

    #[test]
    fn epoch_interval_saturates() {
        let epoch = Epoch::new(U256::ZERO, U256::MAX);
        assert_eq!(epoch.next_epoch_block(U256::from(1)), U256::MAX);
        assert!(epoch.is_due(U256::MAX, U256::from(1)));
    }
}
