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

#![warn(rust_2018_idioms)]
#![deny(
    dead_code,
    nonstandard_style,
    unused_imports,
    unused_mut,
    unused_variables,
    unused_unsafe,
    unreachable_patterns
)]

mod artifact;
mod bound;
mod connector;
mod contracts;
mod error;
mod eth_call;
mod types;

#[cfg(test)]
mod test_utils;

pub use artifact::{ArtifactError, ContractArtifact};
pub use bound::BoundContract;
pub use connector::ChainConnector;
pub use contracts::*;
pub use error::{process_response, ConnectorError};
pub use types::{CallOpts, Deployment, FilterOpts, TransactOpts, TxReceipt};
