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

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::{SolCall, SolEvent};

use chain_data::{EventLog, LogFilter};

use crate::error::ConnectorError;
use crate::types::{CallOpts, FilterOpts, TransactOpts};
use crate::ChainConnector;

/// Contract address bound to a connector, together with the options every call and
/// transaction of the binding is made with
#[derive(Clone)]
pub struct BoundContract {
    connector: Arc<ChainConnector>,
    address: Address,
    call_opts: CallOpts,
    transact_opts: TransactOpts,
}

impl BoundContract {
    pub fn new(connector: Arc<ChainConnector>, address: Address) -> Self {
        Self {
            connector,
            address,
            call_opts: CallOpts::default(),
            transact_opts: TransactOpts::default(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn connector(&self) -> &Arc<ChainConnector> {
        &self.connector
    }

    pub fn call_opts(&self) -> &CallOpts {
        &self.call_opts
    }

    pub fn transact_opts(&self) -> &TransactOpts {
        &self.transact_opts
    }

    pub fn with_call_opts(mut self, opts: CallOpts) -> Self {
        self.call_opts = opts;
        self
    }

    pub fn with_transact_opts(mut self, opts: TransactOpts) -> Self {
        self.transact_opts = opts;
        self
    }

    pub async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ConnectorError> {
        self.connector
            .call(self.address, &call, &self.call_opts)
            .await
    }

    pub async fn transact<C: SolCall>(&self, call: C) -> Result<B256, ConnectorError> {
        self.connector
            .transact(self.address, &call, &self.transact_opts)
            .await
    }

    /// Batch of calls to this contract, results are raw return data in the order of `calls`
    pub async fn batch(&self, calls: Vec<Vec<u8>>) -> Result<Vec<Bytes>, ConnectorError> {
        let calls: Vec<_> = calls.into_iter().map(|data| (self.address, data)).collect();
        self.connector.batch_call(&calls, &self.call_opts).await
    }

    /// Filter matching event `E` emitted by this contract, narrow it with `topic1..3`
    pub fn event_filter<E: SolEvent>(&self) -> LogFilter {
        LogFilter::new().address(self.address).event::<E>()
    }

    pub async fn filter<E: SolEvent>(
        &self,
        opts: &FilterOpts,
        filter: LogFilter,
    ) -> Result<Vec<EventLog<E>>, ConnectorError> {
        self.connector.filter_logs::<E>(&opts.apply(filter)).await
    }

    /// All events `E` of this contract within the block range
    pub async fn events<E: SolEvent>(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<E>>, ConnectorError> {
        self.filter::<E>(opts, self.event_filter::<E>()).await
    }
}

/// Decode the next result of a batch as the return of call `C`
pub(crate) fn next_batched<C: SolCall>(
    results: &mut impl Iterator<Item = Bytes>,
) -> Result<C::Return, ConnectorError> {
    let data = results
        .next()
        .ok_or(ConnectorError::FieldNotFound(C::SIGNATURE))?;
    Ok(C::abi_decode_returns(&data, true)?)
}
