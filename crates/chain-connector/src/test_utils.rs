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

//! JSON-RPC node mock on top of mockito, shared by connector and contract tests

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clarity::PrivateKey;
use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};

use chain_config::ChainConfig;

use crate::ChainConnector;

pub const WALLET_KEY: &str = "0x97a2456e78c4894c62eef6031972d1ca296ed40bf311ab54c231f13db59fc428";

pub struct RpcMock {
    pub connector: Arc<ChainConnector>,
    _mock: Mock,
    _server: ServerGuard,
}

pub fn unsupported(method: &str) -> Result<Value, Value> {
    Err(json!({"code": -32601, "message": format!("'{method}' not supported")}))
}

pub fn block_json(number: u64) -> Value {
    json!({
        "hash": "0xcbe8d90665392babc8098738ec78009193c99d3cc872a6657e306cfe8824bef9",
        "parentHash": "0x15e767118a3e2d7545fee290b545faccd4a9eff849ac1057ce82cab7100c0c52",
        "number": format!("{number:#x}"),
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": "0x65d88f76",
        "baseFeePerGas": "0x7",
        "transactions": [],
    })
}

fn respond<F>(request: &Value, handler: &F) -> Value
where
    F: Fn(&str, &Value) -> Result<Value, Value>,
{
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    match handler(method, &params) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
    }
}

/// Start a mock node answering every request (batches included) with `handler`
pub async fn rpc_mock<F>(handler: F) -> RpcMock
where
    F: Fn(&str, &Value) -> Result<Value, Value> + Send + Sync + 'static,
{
    let mut server = mockito::Server::new_async().await;
    let url = server.url();
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |req| {
            let body = req.body().expect("mock: get request body");
            let body: Value = serde_json::from_slice(body).expect("mock: parse request body");
            let response = match body {
                Value::Array(batch) => {
                    Value::Array(batch.iter().map(|req| respond(req, &handler)).collect())
                }
                request => respond(&request, &handler),
            };
            response.to_string().into()
        })
        .create_async()
        .await;

    let config = ChainConfig {
        http_endpoint: url,
        network_id: 3525067388221321,
        wallet_key: Some(PrivateKey::from_str(WALLET_KEY).expect("valid key")),
        receipt_timeout: Duration::from_secs(5),
        ..Default::default()
    };

    RpcMock {
        connector: ChainConnector::new(config).expect("connector"),
        _mock: mock,
        _server: server,
    }
}
