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
use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use futures::StreamExt;
use hex_utils::encode_hex_0x;
use jsonrpsee::core::SubscriptionResult;
use jsonrpsee::server::ServerHandle;
use jsonrpsee::{RpcModule, SubscriptionMessage};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::broadcast::Sender;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;

struct Context {
    new_heads_sender: Sender<Value>,
    logs_sender: Sender<Value>,
    closed: CancellationToken,
}

/// In-process websocket node serving `eth_subscribe` for `newHeads` and `logs`
pub struct ChainServer {
    address: String,
    _handle: ServerHandle,
    new_heads_sender: Sender<Value>,
    logs_sender: Sender<Value>,
    closed: CancellationToken,
}

impl ChainServer {
    pub async fn new() -> eyre::Result<Self> {
        let server = jsonrpsee::server::Server::builder()
            .set_message_buffer_capacity(10)
            .build("127.0.0.1:0")
            .await?;
        let (new_heads_sender, _) = tokio::sync::broadcast::channel(16);
        let (logs_sender, _) = tokio::sync::broadcast::channel(16);
        let closed = CancellationToken::new();
        let mut module = RpcModule::new(Context {
            new_heads_sender: new_heads_sender.clone(),
            logs_sender: logs_sender.clone(),
            closed: closed.clone(),
        });

        module.register_subscription(
            "eth_subscribe",
            "eth_subscription",
            "eth_unsubscribe",
            |params, pending, ctx, _ext| async move {
                let mut params = params.sequence();
                let Ok(kind) = params.next::<String>() else {
                    return Ok(());
                };
                let filter = params.next::<Value>().ok();
                let receiver = match kind.as_str() {
                    "newHeads" => ctx.new_heads_sender.subscribe(),
                    "logs" => ctx.logs_sender.subscribe(),
                    _ => return Ok(()),
                };
                let Ok(sink) = pending.accept().await else {
                    return Ok(());
                };

                let mut stream = BroadcastStream::new(receiver)
                    .filter_map(|el| {
                        let filter = filter.clone();
                        async move { el.ok().filter(|value| matches_filter(value, filter.as_ref())) }
                    })
                    .boxed();

                loop {
                    let value = tokio::select! {
                        _ = sink.closed() => break,
                        _ = ctx.closed.cancelled() => {
                            let closed: SubscriptionResult = Err("subscription closed by node".into());
                            return closed;
                        }
                        value = stream.next() => value,
                    };
                    let Some(value) = value else {
                        break;
                    };
                    let Ok(message) = SubscriptionMessage::from_json(&value) else {
                        continue;
                    };
                    if sink.send(message).await.is_err() {
                        break;
                    }
                }
                Ok(())
            },
        )?;

        let addr = server.local_addr()?;
        let handle = server.start(module);

        Ok(ChainServer {
            address: addr.to_string(),
            _handle: handle,
            new_heads_sender,
            logs_sender,
            closed,
        })
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.address)
    }

    pub fn new_head(&self, number: u64) {
        let _ = self
            .new_heads_sender
            .send(json!({ "number": format!("{number:#x}") }));
    }

    pub fn log(&self, log: Value) {
        let _ = self.logs_sender.send(log);
    }

    /// Ends every open subscription from the node side
    pub fn close_subscriptions(&self) {
        self.closed.cancel();
    }

    /// Waits until exactly `count` subscriptions are open
    pub async fn wait_subscribers(&self, count: usize) {
        loop {
            let open =
                self.new_heads_sender.receiver_count() + self.logs_sender.receiver_count();
            if open == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

fn matches_filter(log: &Value, filter: Option<&Value>) -> bool {
    let Some(address) = filter.and_then(|f| f.get("address")).and_then(Value::as_str) else {
        return true;
    };

    log.get("address")
        .and_then(Value::as_str)
        .is_some_and(|a| a.eq_ignore_ascii_case(address))
}

pub fn log_json<E: SolEvent>(address: Address, event: &E, block_number: u64) -> Value {
    let topics: Vec<String> = event
        .encode_topics()
        .into_iter()
        .map(|topic| topic.0.to_string())
        .collect();

    json!({
        "address": address,
        "topics": topics,
        "data": encode_hex_0x(event.encode_data()),
        "blockNumber": format!("{block_number:#x}"),
        "transactionHash": format!("0x{:064x}", block_number),
        "logIndex": "0x0",
        "removed": false
    })
}
