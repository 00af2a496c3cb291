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
use alloy_sol_types::{sol, SolConstructor};

use chain_types::{Order, OrderId};

use crate::{ChainConnector, ConnectorError, ContractArtifact, Deployment, TransactOpts};

sol! {
    /// Punishes darknodes that confirmed mismatched orders
    contract DarknodeSlasher {
        constructor(address _darknodeRegistry, address _orderbook);

        function submitChallengeOrder(
            bytes details,
            uint64 settlementID,
            uint64 tokens,
            uint256 price,
            uint256 volume,
            uint256 minimumVolume
        ) external;
        function submitChallenge(bytes32 _buyID, bytes32 _sellID) external;

        function challengeSubmitted(bytes32 _buyID, bytes32 _sellID) external view returns (bool);
        function orderSubmitted(bytes32 _orderID) external view returns (bool);
        function trustedDarknodeRegistry() external view returns (address);
        function trustedOrderbook() external view returns (address);
    }
}

use DarknodeSlasher::*;

bind_contract!(
    /// Binding of the [DarknodeSlasher] contract
    DarknodeSlasherContract
);

impl DarknodeSlasherContract {
    pub async fn deploy(
        connector: Arc<ChainConnector>,
        artifact: &ContractArtifact,
        darknode_registry: Address,
        orderbook: Address,
        opts: &TransactOpts,
    ) -> Result<(Deployment, Self), ConnectorError> {
        let args = constructorCall {
            _darknodeRegistry: darknode_registry,
            _orderbook: orderbook,
        }
        .abi_encode();
        let deployment = connector.deploy(artifact, &args, opts).await?;
        let slasher = Self::new(connector, deployment.address);
        Ok((deployment, slasher))
    }

    /// Reveal the fields of an order, the slasher hashes them into the order id
    pub async fn submit_challenge_order(&self, order: &Order) -> Result<B256, ConnectorError> {
        self.contract
            .transact(submitChallengeOrderCall {
                details: order.details.clone(),
                settlementID: order.settlement_id.0,
                tokens: order.tokens,
                price: order.price,
                volume: order.volume,
                minimumVolume: order.minimum_volume,
            })
            .await
    }

    /// Challenge a confirmed match, both orders must have been submitted beforehand
    pub async fn submit_challenge(
        &self,
        buy: OrderId,
        sell: OrderId,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(submitChallengeCall {
                _buyID: buy.0,
                _sellID: sell.0,
            })
            .await
    }

    pub async fn challenge_submitted(
        &self,
        buy: OrderId,
        sell: OrderId,
    ) -> Result<bool, ConnectorError> {
        let call = challengeSubmittedCall {
            _buyID: buy.0,
            _sellID: sell.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn order_submitted(&self, order: OrderId) -> Result<bool, ConnectorError> {
        let call = orderSubmittedCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn trusted_darknode_registry(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(trustedDarknodeRegistryCall {}).await?._0)
    }

    pub async fn trusted_orderbook(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(trustedOrderbookCall {}).await?._0)
    }
}
