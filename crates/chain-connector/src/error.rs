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

use alloy_primitives::{Address, B256};
use jsonrpsee::core::client::Error as RPCError;
use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

use chain_data::LogParseError;
use chain_types::ChainTypesError;
use hex_utils::{FromHexError, InvalidQuantity};

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("IPC internal network error: {0}")]
    IpcInternalNetworkError(#[source] ErrorObjectOwned),
    #[error("RPC error: {0}")]
    RpcError(#[from] RPCError),
    #[error("RPC call error: code: {code}, message: {message}, data: {data}")]
    RpcCallError {
        /// Code
        code: i32,
        /// Message
        message: String,
        /// Optional data
        data: String,
    },
    #[error("Failed to decode ABI data: {0}")]
    AbiDecode(#[from] alloy_sol_types::Error),
    #[error("Failed to parse log: {0}")]
    ParseLog(#[from] LogParseError),
    #[error(transparent)]
    ChainTypes(#[from] ChainTypesError),
    #[error("Failed to parse address: {0}")]
    AddressParseError(#[from] clarity::Error),
    #[error("data is not a valid hex: '{0}'")]
    DecodeHex(#[from] FromHexError),
    #[error(transparent)]
    InvalidQuantity(#[from] InvalidQuantity),
    #[error("empty response from eth_call to {0}, is there a contract at this address?")]
    EmptyData(Address),
    #[error("Invalid base fee per gas: {0}")]
    InvalidBaseFeePerGas(String),
    #[error("{0} doesn't fit into u128")]
    ValueOverflow(&'static str),
    #[error("wallet key is not configured, can't send transactions")]
    MissingWalletKey,
    #[error("transaction {0} reverted")]
    TxReverted(B256),
    #[error("no receipt for transaction {0} before timeout")]
    ReceiptTimeout(B256),
    #[error("Failed to parse response: {0}")]
    ResponseParseError(String),
    #[error("Failed to parse response, field {0} not found")]
    FieldNotFound(&'static str),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Errors worth retrying: the node is unreachable or flaky, the request itself is fine
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectorError::IpcInternalNetworkError(_)
                | ConnectorError::RpcError(RPCError::Transport(_))
                | ConnectorError::RpcError(RPCError::RequestTimeout)
                | ConnectorError::RpcError(RPCError::RestartNeeded(_))
        )
    }
}

pub fn process_response<T>(response: Result<T, RPCError>) -> Result<T, ConnectorError> {
    match response {
        Ok(data) => Ok(data),
        Err(err) => match err {
            RPCError::Call(e) => {
                let code = e.code();
                let message = e.message().to_string();
                let data = match e.data() {
                    Some(data) => serde_json::from_str::<String>(data.get())
                        .unwrap_or_else(|_| data.get().to_string()),
                    None => "".to_string(),
                };

                if message.to_lowercase().contains("connection reset by peer") {
                    return Err(ConnectorError::IpcInternalNetworkError(e));
                }

                Err(ConnectorError::RpcCallError {
                    code,
                    message,
                    data,
                })
            }
            _ => Err(ConnectorError::RpcError(err)),
        },
    }
}
