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

use alloy_primitives::{B256, U256};
use alloy_sol_types::sol;

use chain_types::{Order, OrderId};

use crate::ConnectorError;

sol! {
    /// Interface every settlement layer registered in the SettlementRegistry implements
    interface Settlement {
        function submitOrder(
            bytes _details,
            uint64 _settlementID,
            uint64 _tokens,
            uint256 _price,
            uint256 _volume,
            uint256 _minimumVolume
        ) external;
        function submissionGasPriceLimit() external view returns (uint256);
        function settle(bytes32 _buyID, bytes32 _sellID) external;
        function orderStatus(bytes32 _orderID) external view returns (uint8);
    }
}

use Settlement::*;

bind_contract!(
    /// Binding of any [Settlement] implementation
    SettlementContract
);

impl SettlementContract {
    /// Reveal order fields to the settlement layer
    pub async fn submit_order(&self, order: &Order) -> Result<B256, ConnectorError> {
        self.contract
            .transact(submitOrderCall {
                _details: order.details.clone(),
                _settlementID: order.settlement_id.0,
                _tokens: order.tokens,
                _price: order.price,
                _volume: order.volume,
                _minimumVolume: order.minimum_volume,
            })
            .await
    }

    /// Max gas price order submissions are accepted with
    pub async fn submission_gas_price_limit(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(submissionGasPriceLimitCall {}).await?._0)
    }

    pub async fn settle(&self, buy: OrderId, sell: OrderId) -> Result<B256, ConnectorError> {
        self.contract
            .transact(settleCall {
                _buyID: buy.0,
                _sellID: sell.0,
            })
            .await
    }

    /// Settlement specific status code of an order
    pub async fn order_status(&self, order: OrderId) -> Result<u8, ConnectorError> {
        let call = orderStatusCall { _orderID: order.0 };
        Ok(self.contract.call(call).await?._0)
    }
}
