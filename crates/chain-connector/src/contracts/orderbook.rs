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

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolConstructor};

use chain_data::{address_topic, EventLog, LogFilter};
use chain_types::{open_order_message, OrderEntry, OrderId, OrderInfo, OrderState, SettlementId};

use crate::bound::next_batched;
use crate::{ChainConnector, ConnectorError, ContractArtifact, Deployment, FilterOpts, TransactOpts};

sol! {
    /// Orderbook traders open and cancel orders in, and darknodes confirm matches in
    contract Orderbook {
        constructor(
            uint256 _fee,
            address _ren,
            address _darknodeRegistry,
            address _settlementRegistry
        );

        event LogFeeUpdated(uint256 previousFee, uint256 nextFee);
        event LogDarknodeRegistryUpdated(address previousDarknodeRegistry, address nextDarknodeRegistry);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function openOrder(uint64 _settlementID, bytes _signature, bytes32 _orderID) external;
        function confirmOrder(bytes32 _orderID, bytes32 _matchedOrderID) external;
        function cancelOrder(bytes32 _orderID) external;
        function updateFee(uint256 _newFee) external;
        function updateDarknodeRegistry(address _newDarknodeRegistry) external;
        function transferOwnership(address newOwner) external;

        function orderState(bytes32 _orderID) external view returns (uint8);
        function orderMatch(bytes32 _orderID) external view returns (bytes32);
        function orderPriority(bytes32 _orderID) external view returns (uint256);
        function orderTrader(bytes32 _orderID) external view returns (address);
        function orderConfirmer(bytes32 _orderID) external view returns (address);
        function orderBlockNumber(bytes32 _orderID) external view returns (uint256);
        function orderDepth(bytes32 _orderID) external view returns (uint256);
        function ordersCount() external view returns (uint256);
        function getOrders(uint256 _offset, uint256 _limit) external view returns (bytes32[], address[], uint8[]);
        function fee() external view returns (uint256);
        function ren() external view returns (address);
        function darknodeRegistry() external view returns (address);
        function settlementRegistry() external view returns (address);
        function owner() external view returns (address);
    }
}

use Orderbook::*;

bind_contract!(
    /// Binding of the [Orderbook] contract
    OrderbookContract
);

impl OrderbookContract {
    pub async fn deploy(
        connector: Arc<ChainConnector>,
        artifact: &ContractArtifact,
        fee: U256,
        ren: Address,
        darknode_registry: Address,
        settlement_registry: Address,
        opts: &TransactOpts,
    ) -> Result<(Deployment, Self), ConnectorError> {
        let args = constructorCall {
            _fee: fee,
            _ren: ren,
            _darknodeRegistry: darknode_registry,
            _settlementRegistry: settlement_registry,
        }
        .abi_encode();
        let deployment = connector.deploy(artifact, &args, opts).await?;
        let orderbook = Self::new(connector, deployment.address);
        Ok((deployment, orderbook))
    }

    /// Open an order, `signature` is the trader's signature of [open_order_message]
    pub async fn open_order(
        &self,
        settlement: SettlementId,
        signature: Bytes,
        order: OrderId,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(openOrderCall {
                _settlementID: settlement.0,
                _signature: signature,
                _orderID: order.0,
            })
            .await
    }

    /// Open an order signed by the wallet key, i.e. the wallet is the trader
    pub async fn open_order_signed(
        &self,
        settlement: SettlementId,
        order: OrderId,
    ) -> Result<B256, ConnectorError> {
        let message = open_order_message(&order);
        let signature = self.contract.connector().sign_message(&message)?;
        self.open_order(settlement, signature, order).await
    }

    /// Darknode confirms that `order` and `matched` were matched
    pub async fn confirm_order(
        &self,
        order: OrderId,
        matched: OrderId,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(confirmOrderCall {
                _orderID: order.0,
                _matchedOrderID: matched.0,
            })
            .await
    }

    pub async fn cancel_order(&self, order: OrderId) -> Result<B256, ConnectorError> {
        self.contract
            .transact(cancelOrderCall { _orderID: order.0 })
            .await
    }

    pub async fn update_fee(&self, fee: U256) -> Result<B256, ConnectorError> {
        self.contract.transact(updateFeeCall { _newFee: fee }).await
    }

    pub async fn update_darknode_registry(
        &self,
        registry: Address,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(updateDarknodeRegistryCall {
                _newDarknodeRegistry: registry,
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

    pub async fn order_state(&self, order: OrderId) -> Result<OrderState, ConnectorError> {
        let state = self
            .contract
            .call(orderStateCall { _orderID: order.0 })
            .await?
            ._0;
        Ok(OrderState::try_from(state)?)
    }

    pub async fn order_match(&self, order: OrderId) -> Result<OrderId, ConnectorError> {
        let matched = self
            .contract
            .call(orderMatchCall { _orderID: order.0 })
            .await?
            ._0;
        Ok(OrderId(matched))
    }

    pub async fn order_priority(&self, order: OrderId) -> Result<U256, ConnectorError> {
        let call = orderPriorityCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn order_trader(&self, order: OrderId) -> Result<Address, ConnectorError> {
        let call = orderTraderCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn order_confirmer(&self, order: OrderId) -> Result<Address, ConnectorError> {
        let call = orderConfirmerCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn order_block_number(&self, order: OrderId) -> Result<U256, ConnectorError> {
        let call = orderBlockNumberCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }

    /// Blocks passed since the order was confirmed, zero for unconfirmed orders
    pub async fn order_depth(&self, order: OrderId) -> Result<U256, ConnectorError> {
        let call = orderDepthCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn orders_count(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(ordersCountCall {}).await?._0)
    }

    /// Page of orders in the order they were opened
    pub async fn get_orders(
        &self,
        offset: U256,
        limit: U256,
    ) -> Result<Vec<OrderEntry>, ConnectorError> {
        let orders = self
            .contract
            .call(getOrdersCall {
                _offset: offset,
                _limit: limit,
            })
            .await?;
        let (ids, traders, states) = (orders._0, orders._1, orders._2);

        if ids.len() != traders.len() || ids.len() != states.len() {
            return Err(ConnectorError::ResponseParseError(format!(
                "getOrders returned {} ids, {} traders and {} states",
                ids.len(),
                traders.len(),
                states.len()
            )));
        }

        ids.into_iter()
            .zip(traders)
            .zip(states)
            .map(|((id, trader), state)| -> Result<OrderEntry, ConnectorError> {
                Ok(OrderEntry {
                    id: OrderId(id),
                    trader,
                    state: OrderState::try_from(state)?,
                })
            })
            .collect()
    }

    /// All stored fields of an order, fetched in a single batch
    pub async fn order_info(&self, order: OrderId) -> Result<OrderInfo, ConnectorError> {
        let id = order.0;
        let calls = vec![
            orderStateCall { _orderID: id }.abi_encode(),
            orderTraderCall { _orderID: id }.abi_encode(),
            orderConfirmerCall { _orderID: id }.abi_encode(),
            orderMatchCall { _orderID: id }.abi_encode(),
            orderPriorityCall { _orderID: id }.abi_encode(),
            orderBlockNumberCall { _orderID: id }.abi_encode(),
            orderDepthCall { _orderID: id }.abi_encode(),
        ];
        let mut results = self.contract.batch(calls).await?.into_iter();

        Ok(OrderInfo {
            id: order,
            state: OrderState::try_from(next_batched::<orderStateCall>(&mut results)?._0)?,
            trader: next_batched::<orderTraderCall>(&mut results)?._0,
            confirmer: next_batched::<orderConfirmerCall>(&mut results)?._0,
            matched: OrderId(next_batched::<orderMatchCall>(&mut results)?._0),
            priority: next_batched::<orderPriorityCall>(&mut results)?._0,
            block_number: next_batched::<orderBlockNumberCall>(&mut results)?._0,
            depth: next_batched::<orderDepthCall>(&mut results)?._0,
        })
    }

    /// Fee in REN paid for opening an order
    pub async fn fee(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(feeCall {}).await?._0)
    }

    pub async fn ren(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(renCall {}).await?._0)
    }

    pub async fn darknode_registry(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(darknodeRegistryCall {}).await?._0)
    }

    pub async fn settlement_registry(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(settlementRegistryCall {}).await?._0)
    }

    pub async fn owner(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(ownerCall {}).await?._0)
    }

    pub async fn filter_fee_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogFeeUpdated>>, ConnectorError> {
        self.contract.events(opts).await
    }

    pub async fn filter_darknode_registry_updated(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<LogDarknodeRegistryUpdated>>, ConnectorError> {
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
