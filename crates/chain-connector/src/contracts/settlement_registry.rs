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

use alloy_primitives::{Address, B256};
use alloy_sol_types::sol;

use chain_data::{address_topic, EventLog, LogFilter};
use chain_types::SettlementId;

use crate::contracts::{BrokerVerifierContract, SettlementContract};
use crate::{ChainConnector, ConnectorError, ContractArtifact, Deployment, FilterOpts, TransactOpts};

sol! {
    /// Settlement layers orders can be opened for, with the broker verifiers checking
    /// the traders' signatures
    contract SettlementRegistry {
        event LogSettlementRegistered(uint64 settlementID, address settlementContract, address brokerVerifierContract);
        event LogSettlementUpdated(uint64 settlementID, address settlementContract, address brokerVerifierContract);
        event LogSettlementDeregistered(uint64 settlementID);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function registerSettlement(uint64 _settlementID, address _settlementContract, address _brokerVerifierContract) external;
        function deregisterSettlement(uint64 _settlementID) external;
        function transferOwnership(address newOwner) external;

        function settlementRegistration(uint64 _settlementID) external view returns (bool);
        function settlementContract(uint64 _settlementID) external view returns (address);
        function brokerVerifierContract(uint64 _settlementID) external view returns (address);
        function owner() external view returns (address);
    }
}

use SettlementRegistry::*;

bind_contract!(
    /// Binding of the [SettlementRegistry] contract
    SettlementRegistryContract
);

impl SettlementRegistryContract {
    pub async fn deploy(
        connector: Arc<ChainConnector>,
        artifact: &ContractArtifact,
        opts: &TransactOpts,
    ) -> Result<(Deployment, Self), ConnectorError> {
        let deployment = connector.deploy(artifact, &[], opts).await?;
        let registry = Self::new(connector, deployment.address);
        Ok((deployment, registry))
    }

    /// Register or update a settlement layer
    pub async fn register_settlement(
        &self,
        settlement: SettlementId,
        settlement_contract: Address,
        broker_verifier: Address,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(registerSettlementCall {
                _settlementID: settlement.0,
                _settlementContract: settlement_contract,
                _brokerVerifierContract: broker_verifier,
            })
            .await
    }

    pub async fn deregister_settlement(
        &self,
        settlement: SettlementId,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(deregisterSettlementCall {
                _settlementID: settlement.0,
            })
            .await
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<B256, ConnectorError> {
        self.contract
            .transact(transferOwnershipCall {
                newOwner: new_owner,
            })
            .await
    }

    pub async fn settlement_registration(
        &self,
        settlement: SettlementId,
    ) -> Result<bool, ConnectorError> {
        let call = settlementRegistrationCall {
            _settlementID: settlement.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn settlement_contract(
        &self,
        settlement: SettlementId,
    ) -> Result<Address, ConnectorError> {
        let call = settlementContractCall {
            _settlementID: settlement.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn broker_verifier_contract(
        &self,
        settlement: SettlementId,
    ) -> Result<Address, ConnectorError> {
        let call = brokerVerifierContractCall {
            _settlementID: settlement.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn owner(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(ownerCall {}).await?._0)
    }

    /// Bindings of the settlement and broker verifier contracts of a registered settlement layer
    pub async fn resolve(
        &self,
        settlement: SettlementId,
    ) -> Result<Option<(SettlementContract, BrokerVerifierContract)>, ConnectorError> {
        if !self.settlement_registration(settlement).await? {
            return Ok(None);
        }

        let connector = self.contract.connector().clone();
        let settlement_address = self.settlement_contract(settlement).await?;
        let verifier_address = self.broker_verifier_contract(settlement).await?;
        Ok(Some((
            SettlementContract::new(connector.clone(), settlement_address),
            BrokerVerifierContract::new(connector, verifier_address),
        )))
    }

    pub async fn filter_settlement_registered(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogSettlementRegistered>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_settlement_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogSettlementUpdated>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_settlement_deregistered(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogSettlementDeregistered>>, ConnectorError> {
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
