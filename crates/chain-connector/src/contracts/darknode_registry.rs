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

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolConstructor};

use chain_data::{address_topic, BlockNumber, EventLog, LogFilter};
use chain_types::{DarknodeFlags, DarknodeId, DarknodeStatus, Epoch, RegistrySnapshot};

use crate::bound::next_batched;
use crate::{ChainConnector, ConnectorError, ContractArtifact, Deployment, FilterOpts, TransactOpts};

sol! {
    /// Registry of darknodes, their bonds and the epochs darknodes are grouped by
    contract DarknodeRegistry {
        constructor(
            address _token,
            uint256 _minimumBond,
            uint256 _minimumPodSize,
            uint256 _minimumEpochInterval
        );

        event LogDarknodeRegistered(address _darknodeID, uint256 _bond);
        event LogDarknodeDeregistered(address _darknodeID);
        event LogDarknodeOwnerRefunded(address _owner, uint256 _amount);
        event LogNewEpoch();
        event LogMinimumBondUpdated(uint256 previousMinimumBond, uint256 nextMinimumBond);
        event LogMinimumPodSizeUpdated(uint256 previousMinimumPodSize, uint256 nextMinimumPodSize);
        event LogMinimumEpochIntervalUpdated(uint256 previousMinimumEpochInterval, uint256 nextMinimumEpochInterval);
        event LogSlasherUpdated(address previousSlasher, address nextSlasher);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function register(address _darknodeID, bytes _publicKey, uint256 _bond) external;
        function deregister(address _darknodeID) external;
        function epoch() external;
        function refund(address _darknodeID) external;
        function slash(address _prover, address _challenger1, address _challenger2) external;
        function updateMinimumBond(uint256 _nextMinimumBond) external;
        function updateMinimumPodSize(uint256 _nextMinimumPodSize) external;
        function updateMinimumEpochInterval(uint256 _nextMinimumEpochInterval) external;
        function updateSlasher(address _slasher) external;
        function transferOwnership(address newOwner) external;

        function getDarknodeOwner(address _darknodeID) external view returns (address);
        function getDarknodeBond(address _darknodeID) external view returns (uint256);
        function getDarknodePublicKey(address _darknodeID) external view returns (bytes);
        function getDarknodes(address _start, uint256 _count) external view returns (address[]);
        function getPreviousDarknodes(address _start, uint256 _count) external view returns (address[]);
        function isPendingRegistration(address _darknodeID) external view returns (bool);
        function isPendingDeregistration(address _darknodeID) external view returns (bool);
        function isDeregistered(address _darknodeID) external view returns (bool);
        function isDeregisterable(address _darknodeID) external view returns (bool);
        function isRefunded(address _darknodeID) external view returns (bool);
        function isRefundable(address _darknodeID) external view returns (bool);
        function isRegistered(address _darknodeID) external view returns (bool);
        function isRegisteredInPreviousEpoch(address _darknodeID) external view returns (bool);
        function currentEpoch() external view returns (uint256 epochhash, uint256 blocknumber);
        function previousEpoch() external view returns (uint256 epochhash, uint256 blocknumber);
        function numDarknodes() external view returns (uint256);
        function numDarknodesNextEpoch() external view returns (uint256);
        function numDarknodesPreviousEpoch() external view returns (uint256);
        function minimumBond() external view returns (uint256);
        function minimumPodSize() external view returns (uint256);
        function minimumEpochInterval() external view returns (uint256);
        function nextMinimumBond() external view returns (uint256);
        function nextMinimumPodSize() external view returns (uint256);
        function nextMinimumEpochInterval() external view returns (uint256);
        function slasher() external view returns (address);
        function nextSlasher() external view returns (address);
        function ren() external view returns (address);
        function owner() external view returns (address);
    }
}

use DarknodeRegistry::*;

/// Page size of [DarknodeRegistryContract::all_darknodes] when none is given
pub const DEFAULT_PAGE_SIZE: u64 = 50;

bind_contract!(
    /// Binding of the [DarknodeRegistry] contract
    DarknodeRegistryContract
);

impl DarknodeRegistryContract {
    pub async fn deploy(
        connector: Arc<ChainConnector>,
        artifact: &ContractArtifact,
        token: Address,
        minimum_bond: U256,
        minimum_pod_size: U256,
        minimum_epoch_interval: U256,
        opts: &TransactOpts,
    ) -> Result<(Deployment, Self), ConnectorError> {
        let args = constructorCall {
            _token: token,
            _minimumBond: minimum_bond,
            _minimumPodSize: minimum_pod_size,
            _minimumEpochInterval: minimum_epoch_interval,
        }
        .abi_encode();
        let deployment = connector.deploy(artifact, &args, opts).await?;
        let registry = Self::new(connector, deployment.address);
        Ok((deployment, registry))
    }

    /// Register a darknode, `bond` REN must be approved to the registry beforehand
    pub async fn register(
        &self,
        darknode: DarknodeId,
        public_key: Bytes,
        bond: U256,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(registerCall {
                _darknodeID: darknode.0,
                _publicKey: public_key,
                _bond: bond,
            })
            .await
    }

    pub async fn deregister(&self, darknode: DarknodeId) -> Result<B256, ConnectorError> {
        self.contract
            .transact(deregisterCall {
                _darknodeID: darknode.0,
            })
            .await
    }

    /// Start a new epoch, reverts until `minimumEpochInterval` blocks passed since the current one
    pub async fn epoch(&self) -> Result<B256, ConnectorError> {
        self.contract.transact(epochCall {}).await
    }

    pub async fn refund(&self, darknode: DarknodeId) -> Result<B256, ConnectorError> {
        self.contract
            .transact(refundCall {
                _darknodeID: darknode.0,
            })
            .await
    }

    /// Slasher only: slash the bond of `prover`, rewarding both challengers
    pub async fn slash(
        &self,
        prover: DarknodeId,
        challenger1: DarknodeId,
        challenger2: DarknodeId,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(slashCall {
                _prover: prover.0,
                _challenger1: challenger1.0,
                _challenger2: challenger2.0,
            })
            .await
    }

    pub async fn update_minimum_bond(&self, next: U256) -> Result<B256, ConnectorError> {
        self.contract
            .transact(updateMinimumBondCall {
                _nextMinimumBond: next,
            })
            .await
    }

    pub async fn update_minimum_pod_size(&self, next: U256) -> Result<B256, ConnectorError> {
        self.contract
            .transact(updateMinimumPodSizeCall {
                _nextMinimumPodSize: next,
            })
            .await
    }

    pub async fn update_minimum_epoch_interval(&self, next: U256) -> Result<B256, ConnectorError> {
        self.contract
            .transact(updateMinimumEpochIntervalCall {
                _nextMinimumEpochInterval: next,
            })
            .await
    }

    pub async fn update_slasher(&self, slasher: Address) -> Result<B256, ConnectorError> {
        self.contract
            .transact(updateSlasherCall { _slasher: slasher })
            .await
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<B256, ConnectorError> {
        self.contract
            .transact(transferOwnershipCall {
                newOwner: new_owner,
            })
            .await
    }

    pub async fn get_darknode_owner(&self, darknode: DarknodeId) -> Result<Address, ConnectorError> {
        let call = getDarknodeOwnerCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn get_darknode_bond(&self, darknode: DarknodeId) -> Result<U256, ConnectorError> {
        let call = getDarknodeBondCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn get_darknode_public_key(
        &self,
        darknode: DarknodeId,
    ) -> Result<Bytes, ConnectorError> {
        let call = getDarknodePublicKeyCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    /// Up to `count` darknodes of the current epoch starting from `start` (inclusive),
    /// zero `start` means from the beginning. The registry pads short pages with zero addresses.
    pub async fn get_darknodes(
        &self,
        start: Address,
        count: U256,
    ) -> Result<Vec<DarknodeId>, ConnectorError> {
        let call = getDarknodesCall {
            _start: start,
            _count: count,
        };
        let ids = self.contract.call(call).await?._0;
        Ok(ids.into_iter().map(DarknodeId).collect())
    }

    /// Same as [Self::get_darknodes] for the previous epoch
    pub async fn get_previous_darknodes(
        &self,
        start: Address,
        count: U256,
    ) -> Result<Vec<DarknodeId>, ConnectorError> {
        let call = getPreviousDarknodesCall {
            _start: start,
            _count: count,
        };
        let ids = self.contract.call(call).await?._0;
        Ok(ids.into_iter().map(DarknodeId).collect())
    }

    /// Every darknode of the current epoch, fetched `page_size` at a time
    pub async fn all_darknodes(&self, page_size: u64) -> Result<Vec<DarknodeId>, ConnectorError> {
        collect_pages(page_size, move |start, count| {
            self.get_darknodes(start, count)
        })
        .await
    }

    /// Every darknode of the previous epoch, fetched `page_size` at a time
    pub async fn all_previous_darknodes(
        &self,
        page_size: u64,
    ) -> Result<Vec<DarknodeId>, ConnectorError> {
        collect_pages(page_size, move |start, count| {
            self.get_previous_darknodes(start, count)
        })
        .await
    }

    pub async fn is_pending_registration(&self, darknode: DarknodeId) -> Result<bool, ConnectorError> {
        let call = isPendingRegistrationCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_pending_deregistration(
        &self,
        darknode: DarknodeId,
    ) -> Result<bool, ConnectorError> {
        let call = isPendingDeregistrationCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_deregistered(&self, darknode: DarknodeId) -> Result<bool, ConnectorError> {
        let call = isDeregisteredCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_deregisterable(&self, darknode: DarknodeId) -> Result<bool, ConnectorError> {
        let call = isDeregisterableCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_refunded(&self, darknode: DarknodeId) -> Result<bool, ConnectorError> {
        let call = isRefundedCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_refundable(&self, darknode: DarknodeId) -> Result<bool, ConnectorError> {
        let call = isRefundableCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_registered(&self, darknode: DarknodeId) -> Result<bool, ConnectorError> {
        let call = isRegisteredCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn is_registered_in_previous_epoch(
        &self,
        darknode: DarknodeId,
    ) -> Result<bool, ConnectorError> {
        let call = isRegisteredInPreviousEpochCall {
            _darknodeID: darknode.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    /// Lifecycle flags of a darknode, fetched in a single batch
    pub async fn darknode_flags(&self, darknode: DarknodeId) -> Result<DarknodeFlags, ConnectorError> {
        let id = darknode.0;
        let calls = vec![
            isPendingRegistrationCall { _darknodeID: id }.abi_encode(),
            isRegisteredCall { _darknodeID: id }.abi_encode(),
            isPendingDeregistrationCall { _darknodeID: id }.abi_encode(),
            isDeregisteredCall { _darknodeID: id }.abi_encode(),
            isRefundableCall { _darknodeID: id }.abi_encode(),
        ];
        let mut results = self.contract.batch(calls).await?.into_iter();

        Ok(DarknodeFlags {
            pending_registration: next_batched::<isPendingRegistrationCall>(&mut results)?._0,
            registered: next_batched::<isRegisteredCall>(&mut results)?._0,
            pending_deregistration: next_batched::<isPendingDeregistrationCall>(&mut results)?._0,
            deregistered: next_batched::<isDeregisteredCall>(&mut results)?._0,
            refundable: next_batched::<isRefundableCall>(&mut results)?._0,
        })
    }

    pub async fn darknode_status(
        &self,
        darknode: DarknodeId,
    ) -> Result<DarknodeStatus, ConnectorError> {
        Ok(self.darknode_flags(darknode).await?.status())
    }

    pub async fn current_epoch(&self) -> Result<Epoch, ConnectorError> {
        let epoch = self.contract.call(currentEpochCall {}).await?;
        Ok(Epoch::new(epoch.epochhash, epoch.blocknumber))
    }

    pub async fn previous_epoch(&self) -> Result<Epoch, ConnectorError> {
        let epoch = self.contract.call(previousEpochCall {}).await?;
        Ok(Epoch::new(epoch.epochhash, epoch.blocknumber))
    }

    pub async fn num_darknodes(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(numDarknodesCall {}).await?._0)
    }

    pub async fn num_darknodes_next_epoch(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(numDarknodesNextEpochCall {}).await?._0)
    }

    pub async fn num_darknodes_previous_epoch(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(numDarknodesPreviousEpochCall {}).await?._0)
    }

    pub async fn minimum_bond(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(minimumBondCall {}).await?._0)
    }

    pub async fn minimum_pod_size(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(minimumPodSizeCall {}).await?._0)
    }

    pub async fn minimum_epoch_interval(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(minimumEpochIntervalCall {}).await?._0)
    }

    pub async fn next_minimum_bond(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(nextMinimumBondCall {}).await?._0)
    }

    pub async fn next_minimum_pod_size(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(nextMinimumPodSizeCall {}).await?._0)
    }

    pub async fn next_minimum_epoch_interval(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(nextMinimumEpochIntervalCall {}).await?._0)
    }

    pub async fn slasher(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(slasherCall {}).await?._0)
    }

    pub async fn next_slasher(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(nextSlasherCall {}).await?._0)
    }

    /// Address of the REN token bonds are paid in
    pub async fn ren(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(renCall {}).await?._0)
    }

    pub async fn owner(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(ownerCall {}).await?._0)
    }

    /// Epochs, darknode counts and minimums in a single batch, all read at the same block
    pub async fn snapshot(&self) -> Result<RegistrySnapshot, ConnectorError> {
        let calls = vec![
            currentEpochCall {}.abi_encode(),
            previousEpochCall {}.abi_encode(),
            numDarknodesCall {}.abi_encode(),
            numDarknodesNextEpochCall {}.abi_encode(),
            numDarknodesPreviousEpochCall {}.abi_encode(),
            minimumBondCall {}.abi_encode(),
            minimumPodSizeCall {}.abi_encode(),
            minimumEpochIntervalCall {}.abi_encode(),
            slasherCall {}.abi_encode(),
        ];

        // without a fixed block the batch could straddle two blocks
        let contract = match self.contract.call_opts().block {
            BlockNumber::Latest | BlockNumber::Pending => {
                let block = self.contract.connector().block_number().await?;
                let mut opts = self.contract.call_opts().clone();
                opts.block = BlockNumber::Number(block);
                self.contract.clone().with_call_opts(opts)
            }
            _ => self.contract.clone(),
        };
        let mut results = contract.batch(calls).await?.into_iter();

        let current = next_batched::<currentEpochCall>(&mut results)?;
        let previous = next_batched::<previousEpochCall>(&mut results)?;
        Ok(RegistrySnapshot {
            current_epoch: Epoch::new(current.epochhash, current.blocknumber),
            previous_epoch: Epoch::new(previous.epochhash, previous.blocknumber),
            num_darknodes: next_batched::<numDarknodesCall>(&mut results)?._0,
            num_darknodes_next_epoch: next_batched::<numDarknodesNextEpochCall>(&mut results)?._0,
            num_darknodes_previous_epoch: next_batched::<numDarknodesPreviousEpochCall>(
                &mut results,
            )?
            ._0,
            minimum_bond: next_batched::<minimumBondCall>(&mut results)?._0,
            minimum_pod_size: next_batched::<minimumPodSizeCall>(&mut results)?._0,
            minimum_epoch_interval: next_batched::<minimumEpochIntervalCall>(&mut results)?._0,
            slasher: next_batched::<slasherCall>(&mut results)?._0,
        })
    }

    /// Whether `epoch()` would be accepted at the latest block
    pub async fn epoch_due(&self) -> Result<bool, ConnectorError> {
        let block = self.contract.connector().block_number().await?;
        let mut opts = self.contract.call_opts().clone();
        opts.block = BlockNumber::Number(block);
        let contract = self.contract.clone().with_call_opts(opts);

        let calls = vec![
            currentEpochCall {}.abi_encode(),
            minimumEpochIntervalCall {}.abi_encode(),
        ];
        let mut results = contract.batch(calls).await?.into_iter();
        let current = next_batched::<currentEpochCall>(&mut results)?;
        let interval = next_batched::<minimumEpochIntervalCall>(&mut results)?._0;

        let epoch = Epoch::new(current.epochhash, current.blocknumber);
        Ok(epoch.is_due(U256::from(block), interval))
    }

    pub async fn filter_darknode_registered(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogDarknodeRegistered>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_darknode_deregistered(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogDarknodeDeregistered>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_darknode_owner_refunded(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogDarknodeOwnerRefunded>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_new_epoch(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogNewEpoch>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_minimum_bond_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogMinimumBondUpdated>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_minimum_pod_size_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogMinimumPodSizeUpdated>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_minimum_epoch_interval_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogMinimumEpochIntervalUpdated>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_slasher_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogSlasherUpdated>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub fn ownership_transferred_filter(
        &self,
        previous_owner: &[Address],
        new_owner: &[Address],
    ) -> LogFilter {
        self.contract
            .event_filter::<OwnershipTransferred>()
            .topic1(previous_owner.iter().copied().map(address_topic))
            .topic2(new_owner.iter().copied().map(address_topic))
    }

    pub async fn filter_ownership_transferred(
        &self,
        opts: &FilterOpts,
        previous_owner: &[Address],
        new_owner: &[Address],
    ) -> Result<Vec<EventLog<OwnershipTransferred>>, ConnectorError> {
        let filter = self.ownership_transferred_filter(previous_owner, new_owner);
        self.contract.filter(opts, filter).await
    }
}

/// Walk a paginated darknode list.
///
/// The first page starts from the zero address, every next one from the last id seen, which the
/// registry returns again as the first element of the page. Zero addresses pad the last page.
async fn collect_pages<F, Fut>(page_size: u64, fetch: F) -> Result<Vec<DarknodeId>, ConnectorError>
where
    F: Fn(Address, U256) -> Fut,
    Fut: Future<Output = Result<Vec<DarknodeId>, ConnectorError>>,
{
    // a page of one would only repeat its start
    let page_size = page_size.max(2);
    let mut darknodes = vec![];
    let mut start = Address::ZERO;

    loop {
        let page = fetch(start, U256::from(page_size)).await?;
        let full = page.len() as u64 == page_size && page.iter().all(|id| !id.is_zero());

        let mut ids: Vec<DarknodeId> = page.into_iter().filter(|id| !id.is_zero()).collect();
        if !start.is_zero() && ids.first().map(DarknodeId::address) == Some(start) {
            ids.remove(0);
        }

        let Some(last) = ids.last() else {
            break;
        };
        start = last.address();
        darknodes.extend(ids);

        if !full {
            break;
        }
    }

    Ok(darknodes)
}
