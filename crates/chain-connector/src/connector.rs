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
use alloy_sol_types::{SolCall, SolEvent};
use backoff::future::retry;
use backoff::ExponentialBackoff;
use clarity::{PrivateKey, Transaction};
use jsonrpsee::core::client::{BatchResponse, ClientT, Error as RPCError};
use jsonrpsee::core::params::{ArrayParams, BatchRequestBuilder};
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use chain_config::ChainConfig;
use chain_data::{parse_event_log, BlockHeader, BlockNumber, EventLog, Log, LogFilter};
use hex_utils::{decode_hex, encode_hex_0x, parse_quantity, parse_quantity_u64};

use crate::artifact::ContractArtifact;
use crate::error::{process_response, ConnectorError};
use crate::eth_call::EthCall;
use crate::types::{CallOpts, Deployment, TransactOpts, TxReceipt};

/// Max fee is the pending base fee plus 1/8 of it, which covers one full block of base fee growth
const BASE_FEE_DIVISOR: u128 = 8;

pub struct ChainConnector {
    client: Arc<HttpClient>,
    config: ChainConfig,
    tx_nonce_mutex: Arc<Mutex<()>>,
}

impl ChainConnector {
    pub fn new(config: ChainConfig) -> Result<Arc<Self>, ConnectorError> {
        tracing::info!(target: "chain-connector", "Connecting to chain via {}", config.http_endpoint);

        Ok(Arc::new(Self {
            client: Arc::new(HttpClientBuilder::default().build(&config.http_endpoint)?),
            config,
            tx_nonce_mutex: Arc::new(Default::default()),
        }))
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Account transactions are sent from
    pub fn wallet_address(&self) -> Option<Address> {
        self.config.wallet_address()
    }

    fn wallet(&self) -> Result<(&PrivateKey, Address), ConnectorError> {
        let key = self
            .config
            .wallet_key
            .as_ref()
            .ok_or(ConnectorError::MissingWalletKey)?;
        let address = self
            .wallet_address()
            .ok_or(ConnectorError::MissingWalletKey)?;
        Ok((key, address))
    }

    /// Sign `message` with the wallet key the way `eth_sign` does, i.e. prefixed with
    /// "\x19Ethereum Signed Message:\n" and its length. Returns 65 bytes of r, s and v.
    pub fn sign_message(&self, message: &[u8]) -> Result<Bytes, ConnectorError> {
        let (key, _) = self.wallet()?;
        let signature = key.sign_ethereum_msg(message);
        Ok(signature.to_bytes().to_vec().into())
    }

    fn call_params(to: Address, data: &[u8], opts: &CallOpts) -> ArrayParams {
        rpc_params![EthCall::to(data, to).from(opts.from), opts.block]
    }

    /// Raw `eth_call`, the returned bytes are never empty
    pub async fn eth_call(
        &self,
        to: Address,
        data: &[u8],
        opts: &CallOpts,
    ) -> Result<Bytes, ConnectorError> {
        let resp: String = process_response(
            self.client
                .request("eth_call", Self::call_params(to, data, opts))
                .await,
        )?;
        Self::call_result(to, &resp)
    }

    fn call_result(to: Address, resp: &str) -> Result<Bytes, ConnectorError> {
        let bytes = decode_hex(resp)?;
        if bytes.is_empty() {
            return Err(ConnectorError::EmptyData(to));
        }
        Ok(bytes.into())
    }

    pub async fn call<C: SolCall>(
        &self,
        to: Address,
        call: &C,
        opts: &CallOpts,
    ) -> Result<C::Return, ConnectorError> {
        let data = self.eth_call(to, &call.abi_encode(), opts).await?;
        Ok(C::abi_decode_returns(&data, true)?)
    }

    /// Several `eth_call`s in a single JSON-RPC batch, results come in the order of `calls`
    pub async fn batch_call(
        &self,
        calls: &[(Address, Vec<u8>)],
        opts: &CallOpts,
    ) -> Result<Vec<Bytes>, ConnectorError> {
        let mut batch = BatchRequestBuilder::new();
        for (to, data) in calls {
            batch.insert("eth_call", Self::call_params(*to, data, opts))?;
        }

        let resp: BatchResponse<'_, String> =
            process_response(self.client.batch_request(batch).await)?;
        let results = match resp.into_ok() {
            Ok(results) => results,
            Err(mut errors) => {
                let err = errors.next().map(|err| err.into_owned()).ok_or_else(|| {
                    ConnectorError::ResponseParseError("batch request failed".to_string())
                })?;
                return process_response(Err(RPCError::Call(err)));
            }
        };

        let results: Vec<String> = results.collect();
        if results.len() != calls.len() {
            return Err(ConnectorError::ResponseParseError(format!(
                "expected {} results in a batch, got {}",
                calls.len(),
                results.len()
            )));
        }

        calls
            .iter()
            .zip(results)
            .map(|((to, _), resp)| Self::call_result(*to, &resp))
            .collect()
    }

    async fn get_base_fee_per_gas(&self) -> Result<u128, ConnectorError> {
        let block: Value = process_response(
            self.client
                .request("eth_getBlockByNumber", rpc_params!["pending", false])
                .await,
        )?;

        let fee = block
            .as_object()
            .and_then(|o| o.get("baseFeePerGas"))
            .and_then(Value::as_str)
            .ok_or(ConnectorError::InvalidBaseFeePerGas(block.to_string()))?;

        let base_fee_per_gas = parse_quantity(fee)
            .map_err(|_| ConnectorError::InvalidBaseFeePerGas(fee.to_string()))?;

        to_u128(base_fee_per_gas, "base fee")
    }

    async fn get_tx_nonce(&self, address: Address) -> Result<u64, ConnectorError> {
        let resp: String = process_response(
            self.client
                .request("eth_getTransactionCount", rpc_params![address, "pending"])
                .await,
        )?;

        Ok(parse_quantity_u64(&resp)?)
    }

    async fn max_priority_fee_per_gas(&self) -> Result<u128, ConnectorError> {
        let resp: Result<String, _> = process_response(
            self.client
                .request("eth_maxPriorityFeePerGas", rpc_params![])
                .await,
        );

        match (resp, self.config.default_priority_fee) {
            (Ok(resp), _) => to_u128(parse_quantity(&resp)?, "priority fee"),
            (Err(err), Some(default)) => {
                tracing::warn!(
                    target: "chain-connector",
                    "eth_maxPriorityFeePerGas failed, using default priority fee {default}: {err}"
                );
                Ok(default)
            }
            (Err(err), None) => Err(err),
        }
    }

    async fn estimate_gas_limit(
        &self,
        data: &[u8],
        to: Option<Address>,
        from: Address,
        value: U256,
    ) -> Result<u128, ConnectorError> {
        let call = match to {
            Some(to) => EthCall::to(data, to),
            None => EthCall::create(data),
        };
        let mut tx = serde_json::to_value(call.from(Some(from)))?;
        if !value.is_zero() {
            tx["value"] = json!(value);
        }

        let resp: String = process_response(
            self.client
                .request("eth_estimateGas", rpc_params![tx])
                .await,
        )?;
        to_u128(parse_quantity(&resp)?, "gas limit")
    }

    /// Sign and send an EIP-1559 transaction, `to = None` creates a contract.
    /// Returns the transaction hash.
    pub async fn send_tx(
        &self,
        data: Vec<u8>,
        to: Option<Address>,
        opts: &TransactOpts,
    ) -> Result<B256, ConnectorError> {
        let (tx_hash, _) = self.sign_and_send(data, to, opts).await?;
        Ok(tx_hash)
    }

    async fn sign_and_send(
        &self,
        data: Vec<u8>,
        to: Option<Address>,
        opts: &TransactOpts,
    ) -> Result<(B256, u64), ConnectorError> {
        let (key, from) = self.wallet()?;

        let base_fee_per_gas = self.get_base_fee_per_gas().await?;
        let gas_limit = match opts.gas_limit {
            Some(limit) => limit,
            None => {
                self.estimate_gas_limit(&data, to, from, opts.value)
                    .await?
            }
        };
        let max_priority_fee_per_gas = match opts.max_priority_fee_per_gas {
            Some(fee) => fee,
            None => self.max_priority_fee_per_gas().await?,
        };

        let base_fee = base_fee_per_gas
            .checked_add(base_fee_per_gas / BASE_FEE_DIVISOR)
            .ok_or(ConnectorError::ValueOverflow("base fee"))?;
        // (base fee + priority fee).
        let max_fee_per_gas = base_fee
            .checked_add(max_priority_fee_per_gas)
            .ok_or(ConnectorError::ValueOverflow("max fee per gas"))?;
        let value = to_u128(opts.value, "value")?;

        let to_address = match to {
            Some(to) => to.to_checksum(None).parse()?,
            // zero address is encoded as an empty recipient, i.e. contract creation
            None => clarity::Address::default(),
        };

        // We use this lock no ensure that we don't send two transactions with the same nonce
        let _lock = self.tx_nonce_mutex.lock().await;
        let nonce = match opts.nonce {
            Some(nonce) => nonce,
            None => self.get_tx_nonce(from).await?,
        };

        // Create a new transaction
        let tx = Transaction::Eip1559 {
            chain_id: self.config.network_id.into(),
            nonce: nonce.into(),
            max_priority_fee_per_gas: max_priority_fee_per_gas.into(),
            gas_limit: gas_limit.into(),
            to: to_address,
            value: value.into(),
            data,
            signature: None, // Not signed. Yet.
            max_fee_per_gas: max_fee_per_gas.into(),
            access_list: vec![],
        };

        let tx = tx.sign(key, Some(self.config.network_id)).to_bytes();

        let resp: String = process_response(
            self.client
                .request("eth_sendRawTransaction", rpc_params![encode_hex_0x(tx)])
                .await,
        )?;
        let tx_hash = resp
            .parse::<B256>()
            .map_err(|_| ConnectorError::ResponseParseError(resp.clone()))?;

        tracing::info!(
            target: "chain-connector",
            "Sent tx {tx_hash} from {from} to {} with nonce {nonce}",
            to.map_or("<create>".to_string(), |to| to.to_string())
        );

        Ok((tx_hash, nonce))
    }

    /// Abi-encode `call` and send it as a transaction to `to`
    pub async fn transact<C: SolCall>(
        &self,
        to: Address,
        call: &C,
        opts: &TransactOpts,
    ) -> Result<B256, ConnectorError> {
        self.send_tx(call.abi_encode(), Some(to), opts).await
    }

    /// Send a contract creation transaction with the artifact's bytecode followed by
    /// abi-encoded constructor arguments.
    ///
    /// The address is derived from the sender and nonce, so it's known before the transaction
    /// is mined. Use [ChainConnector::wait_for_receipt] to make sure it actually was.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[u8],
        opts: &TransactOpts,
    ) -> Result<Deployment, ConnectorError> {
        let (_, from) = self.wallet()?;
        let data = artifact.deploy_data(constructor_args);
        let (tx_hash, nonce) = self.sign_and_send(data, None, opts).await?;
        let address = from.create(nonce);

        tracing::info!(
            target: "chain-connector",
            "Deploying {} to {address}, tx {tx_hash}",
            artifact.contract_name
        );

        Ok(Deployment { address, tx_hash })
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ConnectorError> {
        process_response(
            self.client
                .request("eth_getLogs", rpc_params![filter])
                .await,
        )
    }

    /// Historical logs decoded into `E`; logs that can't be decoded are skipped
    pub async fn filter_logs<E: SolEvent>(
        &self,
        filter: &LogFilter,
    ) -> Result<Vec<EventLog<E>>, ConnectorError> {
        let logs = self.get_logs(filter).await?;
        Ok(logs
            .into_iter()
            .filter_map(|log| parse_event_log::<E>(log).ok())
            .collect())
    }

    pub async fn block_number(&self) -> Result<u64, ConnectorError> {
        let resp: String =
            process_response(self.client.request("eth_blockNumber", rpc_params![]).await)?;
        Ok(parse_quantity_u64(&resp)?)
    }

    pub async fn get_block(&self, block: BlockNumber) -> Result<BlockHeader, ConnectorError> {
        let resp: Value = process_response(
            self.client
                .request("eth_getBlockByNumber", rpc_params![block, false])
                .await,
        )?;
        if resp.is_null() {
            return Err(ConnectorError::FieldNotFound("block"));
        }

        BlockHeader::from_json(resp)
            .map_err(|err| ConnectorError::ResponseParseError(err.to_string()))
    }

    /// Receipt of a mined transaction, `None` while it's pending
    pub async fn get_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, ConnectorError> {
        let resp: Value = process_response(
            self.client
                .request("eth_getTransactionReceipt", rpc_params![tx_hash])
                .await,
        )?;
        if resp.is_null() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(resp)?))
    }

    /// Poll the receipt with exponential backoff until the transaction is mined or
    /// `receipt_timeout` passes. Reverted transactions are reported as [ConnectorError::TxReverted].
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ConnectorError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.config.receipt_timeout),
            ..ExponentialBackoff::default()
        };

        let receipt = retry(backoff, || async {
            match self.get_receipt(tx_hash).await {
                Ok(Some(receipt)) => Ok(receipt),
                Ok(None) => Err(backoff::Error::transient(
                    ConnectorError::ReceiptTimeout(tx_hash),
                )),
                Err(err) if err.is_transient() => {
                    tracing::warn!(
                        target: "chain-connector",
                        "Failed to get receipt of {tx_hash}, retrying: {err}"
                    );
                    Err(backoff::Error::transient(err))
                }
                Err(err) => Err(backoff::Error::permanent(err)),
            }
        })
        .await?;

        if !receipt.succeeded() {
            return Err(ConnectorError::TxReverted(tx_hash));
        }

        Ok(receipt)
    }
}

fn to_u128(value: U256, what: &'static str) -> Result<u128, ConnectorError> {
    u128::try_from(value).map_err(|_| ConnectorError::ValueOverflow(what))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use alloy_primitives::{address, b256, Address, B256, U256};
    use alloy_sol_types::{sol, SolCall, SolEvent};
    use clarity::Transaction;
    use serde_json::{json, Value};

    use chain_data::{BlockNumber, LogFilter};

    use crate::test_utils::{block_json, rpc_mock, unsupported};
    use crate::{CallOpts, ConnectorError, ContractArtifact, TransactOpts};

    sol! {
        function balanceOf(address who) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
        event Transfer(address indexed from, address indexed to, uint256 value);
    }

    const TOKEN: Address = address!("0b306bf915c4d645ff596e518faf3f9669b97016");
    const HOLDER: Address = address!("68b1d87f95878fe05b998f19b66f4baba5de1aed");
    const TX_HASH: B256 =
        b256!("55bfec4a4400ca0b09e075e2b517041cd78b10021c51726cb73bcba52213fa05");

    fn encoded(data: Vec<u8>) -> Value {
        json!(hex_utils::encode_hex_0x(data))
    }

    fn tx_methods(method: &str, params: &Value) -> Result<Value, Value> {
        match method {
            "eth_getBlockByNumber" => Ok(block_json(0xa2)),
            "eth_estimateGas" => Ok(json!("0x5208")),
            "eth_maxPriorityFeePerGas" => Ok(json!("0x5208")),
            "eth_getTransactionCount" => Ok(json!("0x20")),
            "eth_sendRawTransaction" => {
                let raw = params[0].as_str().unwrap_or_default();
                // EIP-1559 envelope
                assert!(raw.starts_with("0x02"), "unexpected tx {raw}");
                Ok(json!(TX_HASH))
            }
            method => unsupported(method),
        }
    }

    #[tokio::test]
    async fn call_decodes_return() {
        let mock = rpc_mock(|method, params| match method {
            "eth_call" => {
                assert_eq!(params[0]["to"], json!(TOKEN));
                assert_eq!(params[1], json!("latest"));
                let call = balanceOfCall::abi_decode(
                    &hex_utils::decode_hex(params[0]["data"].as_str().unwrap()).unwrap(),
                    true,
                )
                .unwrap();
                assert_eq!(call.who, HOLDER);
                Ok(encoded(U256::from(1000).to_be_bytes::<32>().to_vec()))
            }
            method => unsupported(method),
        })
        .await;

        let balance = mock
            .connector
            .call(TOKEN, &balanceOfCall { who: HOLDER }, &CallOpts::default())
            .await
            .unwrap();
        assert_eq!(balance._0, U256::from(1000));
    }

    #[tokio::test]
    async fn call_at_block_from_account() {
        let mock = rpc_mock(|method, params| match method {
            "eth_call" => {
                assert_eq!(params[0]["from"], json!(HOLDER));
                assert_eq!(params[1], json!("0x10"));
                Ok(encoded(U256::from(1).to_be_bytes::<32>().to_vec()))
            }
            method => unsupported(method),
        })
        .await;

        let opts = CallOpts {
            from: Some(HOLDER),
            block: BlockNumber::Number(16),
        };
        let balance = mock
            .connector
            .call(TOKEN, &balanceOfCall { who: HOLDER }, &opts)
            .await
            .unwrap();
        assert_eq!(balance._0, U256::from(1));
    }

    #[tokio::test]
    async fn call_without_contract() {
        let mock = rpc_mock(|method, _| match method {
            "eth_call" => Ok(json!("0x")),
            method => unsupported(method),
        })
        .await;

        let result = mock
            .connector
            .call(TOKEN, &balanceOfCall { who: HOLDER }, &CallOpts::default())
            .await;
        assert!(matches!(result, Err(ConnectorError::EmptyData(to)) if to == TOKEN));
    }

    #[tokio::test]
    async fn batch_call_keeps_order() {
        let mock = rpc_mock(|method, params| match method {
            "eth_call" => {
                let data = hex_utils::decode_hex(params[0]["data"].as_str().unwrap()).unwrap();
                let call = balanceOfCall::abi_decode(&data, true).unwrap();
                // balance is the last byte of the holder address
                let balance = U256::from(call.who.0[19]);
                Ok(encoded(balance.to_be_bytes::<32>().to_vec()))
            }
            method => unsupported(method),
        })
        .await;

        let holders = [
            address!("0000000000000000000000000000000000000001"),
            address!("0000000000000000000000000000000000000002"),
            address!("0000000000000000000000000000000000000003"),
        ];
        let calls: Vec<_> = holders
            .iter()
            .map(|who| (TOKEN, balanceOfCall { who: *who }.abi_encode()))
            .collect();

        let results = mock
            .connector
            .batch_call(&calls, &CallOpts::default())
            .await
            .unwrap();

        let balances: Vec<U256> = results
            .iter()
            .map(|data| balanceOfCall::abi_decode_returns(data, true).unwrap()._0)
            .collect();
        assert_eq!(
            balances,
            vec![U256::from(1), U256::from(2), U256::from(3)]
        );
    }

    #[tokio::test]
    async fn transact() {
        let mock = rpc_mock(tx_methods).await;

        let tx_hash = mock
            .connector
            .transact(
                TOKEN,
                &transferCall {
                    to: HOLDER,
                    value: U256::from(5),
                },
                &TransactOpts::default(),
            )
            .await
            .unwrap();

        assert_eq!(tx_hash, TX_HASH);
    }

    #[tokio::test]
    async fn transact_with_fixed_nonce_and_gas() {
        let mock = rpc_mock(|method, params| match method {
            "eth_estimateGas" | "eth_getTransactionCount" => unsupported(method),
            "eth_sendRawTransaction" => {
                let raw = hex_utils::decode_hex(params[0].as_str().unwrap_or_default()).unwrap();
                match Transaction::decode_from_rlp(&mut raw.as_slice()).unwrap() {
                    Transaction::Eip1559 {
                        nonce,
                        gas_limit,
                        data,
                        ..
                    } => {
                        assert_eq!(nonce, clarity::Uint256::from(7u64));
                        assert_eq!(gas_limit, clarity::Uint256::from(100_000u64));
                        assert_eq!(data, vec![1, 2, 3]);
                    }
                    other => panic!("unexpected tx {other:?}"),
                }
                Ok(json!(TX_HASH))
            }
            method => tx_methods(method, params),
        })
        .await;

        let opts = TransactOpts {
            nonce: Some(7),
            gas_limit: Some(100_000),
            ..Default::default()
        };
        let tx_hash = mock
            .connector
            .send_tx(vec![1, 2, 3], Some(TOKEN), &opts)
            .await
            .unwrap();

        assert_eq!(tx_hash, TX_HASH);
    }

    #[tokio::test]
    async fn transact_reverted_on_estimate() {
        let mock = rpc_mock(|method, params| match method {
            "eth_estimateGas" => Err(json!({
                "code": -32000,
                "message": "execution reverted: revert: Pausable: paused",
                "data": "0x08c379a0"
            })),
            method => tx_methods(method, params),
        })
        .await;

        let result = mock
            .connector
            .transact(
                TOKEN,
                &transferCall {
                    to: HOLDER,
                    value: U256::from(5),
                },
                &TransactOpts::default(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ConnectorError::RpcCallError { code: -32000, message, .. }) if message.contains("paused")
        ));
    }

    #[tokio::test]
    async fn priority_fee_fallback() {
        let mock = rpc_mock(|method, params| match method {
            "eth_maxPriorityFeePerGas" => Err(json!({
                "code": -32601,
                "message": "the method eth_maxPriorityFeePerGas does not exist"
            })),
            method => tx_methods(method, params),
        })
        .await;

        let result = mock
            .connector
            .send_tx(vec![1], Some(TOKEN), &TransactOpts::default())
            .await;
        assert!(matches!(
            result,
            Err(ConnectorError::RpcCallError { code: -32601, .. })
        ));

        let mut config = mock.connector.config().clone();
        config.default_priority_fee = Some(1_000_000_000);
        let connector = crate::ChainConnector::new(config).unwrap();
        let tx_hash = connector
            .send_tx(vec![1], Some(TOKEN), &TransactOpts::default())
            .await
            .unwrap();
        assert_eq!(tx_hash, TX_HASH);
    }

    #[tokio::test]
    async fn transact_without_wallet() {
        let mock = rpc_mock(tx_methods).await;
        let mut config = mock.connector.config().clone();
        config.wallet_key = None;
        let connector = crate::ChainConnector::new(config).unwrap();

        let result = connector
            .send_tx(vec![], Some(TOKEN), &TransactOpts::default())
            .await;
        assert!(matches!(result, Err(ConnectorError::MissingWalletKey)));
    }

    #[tokio::test]
    async fn deploy_address_from_nonce() {
        let mock = rpc_mock(|method, params| match method {
            "eth_estimateGas" => {
                assert!(params[0].get("to").is_none());
                assert_eq!(params[0]["data"], json!("0x6080604052aabb"));
                Ok(json!("0x100000"))
            }
            method => tx_methods(method, params),
        })
        .await;

        let artifact = ContractArtifact::from_json(
            r#"{"contractName": "RepublicToken", "abi": [], "bytecode": "0x6080604052"}"#,
        )
        .unwrap();
        let deployment = mock
            .connector
            .deploy(&artifact, &[0xaa, 0xbb], &TransactOpts::default())
            .await
            .unwrap();

        let sender = mock.connector.wallet_address().unwrap();
        assert_eq!(deployment.tx_hash, TX_HASH);
        assert_eq!(deployment.address, sender.create(0x20));
    }

    #[tokio::test]
    async fn filter_logs_skips_foreign_events() {
        let from = address!("0000000000000000000000000000000000000001");
        let event = Transfer {
            from,
            to: HOLDER,
            value: U256::from(42),
        };
        let topics: Vec<B256> = event.encode_topics().into_iter().map(|t| t.0).collect();
        let data = hex_utils::encode_hex_0x(event.encode_data());

        let mock = rpc_mock(move |method, params| match method {
            "eth_getLogs" => {
                assert_eq!(params[0]["address"], json!(TOKEN));
                assert_eq!(params[0]["topics"][0], json!(Transfer::SIGNATURE_HASH));
                assert_eq!(params[0]["fromBlock"], json!("0x1"));
                Ok(json!([
                    {
                        "address": TOKEN,
                        "topics": topics,
                        "data": data,
                        "blockNumber": "0x5",
                        "transactionHash": TX_HASH,
                        "logIndex": "0x0",
                        "removed": false
                    },
                    {
                        "address": TOKEN,
                        "topics": [B256::ZERO],
                        "data": "0x",
                        "blockNumber": "0x6",
                        "logIndex": "0x1",
                        "removed": false
                    }
                ]))
            }
            method => unsupported(method),
        })
        .await;

        let filter = LogFilter::new()
            .address(TOKEN)
            .event::<Transfer>()
            .from_block(1);
        let logs = mock.connector.filter_logs::<Transfer>(&filter).await.unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].event.from, from);
        assert_eq!(logs[0].event.to, HOLDER);
        assert_eq!(logs[0].event.value, U256::from(42));
        assert_eq!(logs[0].block_number, Some(5));
        assert_eq!(logs[0].transaction_hash, Some(TX_HASH));
    }

    #[tokio::test]
    async fn filter_logs_keeps_removed_logs() {
        let event = Transfer {
            from: address!("0000000000000000000000000000000000000001"),
            to: HOLDER,
            value: U256::from(7),
        };
        let topics: Vec<B256> = event.encode_topics().into_iter().map(|t| t.0).collect();
        let data = hex_utils::encode_hex_0x(event.encode_data());

        let mock = rpc_mock(move |method, _params| match method {
            "eth_getLogs" => {
                let log = |block: &str, removed: bool| {
                    json!({
                        "address": TOKEN,
                        "topics": topics,
                        "data": data,
                        "blockNumber": block,
                        "transactionHash": TX_HASH,
                        "logIndex": "0x0",
                        "removed": removed
                    })
                };
                Ok(json!([log("0x8", true), log("0x9", false)]))
            }
            method => unsupported(method),
        })
        .await;

        let filter = LogFilter::new().address(TOKEN).event::<Transfer>();
        let logs = mock.connector.filter_logs::<Transfer>(&filter).await.unwrap();

        assert_eq!(logs.len(), 2);
        assert!(logs[0].removed);
        assert_eq!(logs[0].block_number, Some(8));
        assert_eq!(logs[0].event.value, U256::from(7));
        assert!(!logs[1].removed);
        assert_eq!(logs[1].block_number, Some(9));
    }

    #[tokio::test]
    async fn block_number_and_header() {
        let mock = rpc_mock(|method, params| match method {
            "eth_blockNumber" => Ok(json!("0xa2")),
            "eth_getBlockByNumber" => {
                assert_eq!(params[0], json!("0xa2"));
                assert_eq!(params[1], json!(false));
                Ok(block_json(0xa2))
            }
            method => unsupported(method),
        })
        .await;

        let number = mock.connector.block_number().await.unwrap();
        assert_eq!(number, 0xa2);
        let header = mock
            .connector
            .get_block(BlockNumber::Number(number))
            .await
            .unwrap();
        assert_eq!(header.number(), 0xa2);
    }

    #[tokio::test]
    async fn sign_message_with_wallet_key() {
        let mock = rpc_mock(|method, _| unsupported(method)).await;
        let signature = mock.connector.sign_message(b"Republic Protocol: open: ").unwrap();
        assert_eq!(signature.len(), 65);
        // same key, same message, same signature
        assert_eq!(
            signature,
            mock.connector.sign_message(b"Republic Protocol: open: ").unwrap()
        );
    }

    #[tokio::test]
    async fn wait_for_mined_receipt() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let mock = rpc_mock(move |method, params| match method {
            "eth_getTransactionReceipt" => {
                assert_eq!(params[0], json!(TX_HASH));
                // pending for the first two polls
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "transactionHash": TX_HASH,
                    "blockNumber": "0xa3",
                    "status": "0x1",
                    "gasUsed": "0x5208",
                    "logs": []
                }))
            }
            method => unsupported(method),
        })
        .await;

        let receipt = mock.connector.wait_for_receipt(TX_HASH).await.unwrap();
        assert!(receipt.succeeded());
        assert_eq!(receipt.block_number.map(|n| n.to::<u64>()), Some(0xa3));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn wait_for_reverted_receipt() {
        let mock = rpc_mock(|method, _| match method {
            "eth_getTransactionReceipt" => Ok(json!({
                "transactionHash": TX_HASH,
                "blockNumber": "0xa3",
                "status": "0x0",
                "logs": []
            })),
            method => unsupported(method),
        })
        .await;

        let result = mock.connector.wait_for_receipt(TX_HASH).await;
        assert!(matches!(result, Err(ConnectorError::TxReverted(hash)) if hash == TX_HASH));
    }

    #[tokio::test]
    async fn wait_for_receipt_timeout() {
        let mock = rpc_mock(|method, _| match method {
            "eth_getTransactionReceipt" => Ok(Value::Null),
            method => unsupported(method),
        })
        .await;

        let result = mock.connector.wait_for_receipt(TX_HASH).await;
        assert!(matches!(result, Err(ConnectorError::ReceiptTimeout(hash)) if hash == TX_HASH));
    }
}
