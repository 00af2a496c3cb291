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

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::sol;

use chain_types::OrderId;

use crate::ConnectorError;

sol! {
    /// Checks that an order was opened by a trader approved by the broker
    interface BrokerVerifier {
        function verifyOpenSignature(address _trader, bytes _signature, bytes32 _orderID) external returns (bool);
    }
}

use BrokerVerifier::*;

bind_contract!(
    /// Binding of any [BrokerVerifier] implementation
    BrokerVerifierContract
);

impl BrokerVerifierContract {
    /// Simulate the verification with `eth_call`, nothing is recorded on chain
    pub async fn verify_open_signature(
        &self,
        trader: Address,
        signature: Bytes,
        order: OrderId,
    ) -> Result<bool, ConnectorError> {
        let call = verifyOpenSignatureCall {
            _trader: trader,
            _signature: signature,
            _orderID: order.0,
        };
        Ok(self.contract.call(call).await?._0)
    }

    /// Verification as a transaction, verifiers may record used signatures
    pub async fn verify_open_signature_tx(
        &self,
        trader: Address,
        signature: Bytes,
        order: OrderId,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(verifyOpenSignatureCall {
                _trader: trader,
                _signature: signature,
                _orderID: order.0,
            })
            .await
    }
}
