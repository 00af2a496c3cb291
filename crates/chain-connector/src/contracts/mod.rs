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

//! Typed bindings of the Republic Protocol contracts.
//!
//! Every binding wraps a [BoundContract](crate::BoundContract): views return decoded values,
//! state-changing methods return the transaction hash, `filter_*` methods query historical
//! events. Bindings are cheap to clone, `with_call_opts` / `with_transact_opts` give a copy
//! with different call or transaction options.

/// Binding struct with constructor, address and options accessors
macro_rules! bind_contract {
    ($(#[$meta:meta])* $binding:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $binding {
            contract: $crate::BoundContract,
        }

        impl $binding {
            pub fn new(
                connector: std::sync::Arc<$crate::ChainConnector>,
                address: alloy_primitives::Address,
            ) -> Self {
                Self {
                    contract: $crate::BoundContract::new(connector, address),
                }
            }

            pub fn address(&self) -> alloy_primitives::Address {
                self.contract.address()
            }

            pub fn bound(&self) -> &$crate::BoundContract {
                &self.contract
            }

            pub fn with_call_opts(self, opts: $crate::CallOpts) -> Self {
                Self {
                    contract: self.contract.with_call_opts(opts),
                }
            }

            pub fn with_transact_opts(self, opts: $crate::TransactOpts) -> Self {
                Self {
                    contract: self.contract.with_transact_opts(opts),
                }
            }
        }
    };
}

mod broker_verifier;
mod darknode_registry;
mod darknode_slasher;
mod orderbook;
mod republic_token;
mod settlement;
mod settlement_registry;

pub use broker_verifier::{BrokerVerifier, BrokerVerifierContract};
pub use darknode_registry::{DarknodeRegistry, DarknodeRegistryContract, DEFAULT_PAGE_SIZE};
pub use darknode_slasher::{DarknodeSlasher, DarknodeSlasherContract};
pub use orderbook::{Orderbook, OrderbookContract};
pub use republic_token::{RepublicToken, RepublicTokenContract};
pub use settlement::{Settlement, SettlementContract};
pub use settlement_registry::{SettlementRegistry, SettlementRegistryContract};
