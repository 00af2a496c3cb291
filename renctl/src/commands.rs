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
use std::fmt::Write;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use chain_config::ChainConfig;
use chain_connector::{
    ChainConnector, DarknodeRegistry, DarknodeRegistryContract, Orderbook, OrderbookContract,
    RepublicToken, RepublicTokenContract,
};
use chain_data::{EventLog, LogFilter};
use chain_listener::{EventWatcher, WatchItem, WsEventSubscription, WsSubscriptionConfig};
use chain_types::DarknodeId;
use eyre::{eyre, WrapErr};
use futures::stream::{select_all, BoxStream};
use futures::StreamExt;

use crate::cli::{Command, WatchTarget};

pub struct Renctl {
    connector: Arc<ChainConnector>,
}

fn required(address: Option<Address>, contract: &str) -> eyre::Result<Address> {
    address.ok_or_else(|| eyre!("{contract} address is not configured, set contracts.{contract}"))
}

impl Renctl {
    pub fn new(config: ChainConfig) -> eyre::Result<Self> {
        let connector = ChainConnector::new(config).wrap_err("error creating chain connector")?;
        Ok(Self { connector })
    }

    fn config(&self) -> &ChainConfig {
        self.connector.config()
    }

    fn registry(&self) -> eyre::Result<DarknodeRegistryContract> {
        let address = required(
            self.config().contracts.darknode_registry,
            "darknode_registry",
        )?;
        Ok(DarknodeRegistryContract::new(self.connector.clone(), address))
    }

    fn orderbook(&self) -> eyre::Result<OrderbookContract> {
        let address = required(self.config().contracts.orderbook, "orderbook")?;
        Ok(OrderbookContract::new(self.connector.clone(), address))
    }

    fn token(&self) -> eyre::Result<RepublicTokenContract> {
        let address = required(self.config().contracts.republic_token, "republic_token")?;
        Ok(RepublicTokenContract::new(self.connector.clone(), address))
    }

    /// Runs a one-shot command and returns what should be printed
    pub async fn execute(&self, command: Command) -> eyre::Result<String> {
        match command {
            Command::Registry { page_size } => self.registry_report(page_size).await,
            Command::Darknode { id } => self.darknode_report(id).await,
            Command::Order { id } => {
                let info = self.orderbook()?.order_info(id).await?;
                Ok(serde_json::to_string_pretty(&info)?)
            }
            Command::Orders { offset, limit } => {
                let orders = self
                    .orderbook()?
                    .get_orders(U256::from(offset), U256::from(limit))
                    .await?;
                Ok(serde_json::to_string_pretty(&orders)?)
            }
            Command::Balance { address } => {
                let balance = self.token()?.balance_of(address).await?;
                Ok(balance.to_string())
            }
            Command::Transfer { to, amount } => self.transfer(to, amount).await,
            Command::Epoch => self.epoch().await,
            Command::Watch { target } => {
                self.watch(target).await?;
                Ok(String::new())
            }
        }
    }

    async fn registry_report(&self, page_size: u64) -> eyre::Result<String> {
        let registry = self.registry()?;
        let snapshot = registry.snapshot().await?;
        let darknodes = registry.all_darknodes(page_size).await?;

        let mut report = serde_json::to_string_pretty(&snapshot)?;
        writeln!(report)?;
        writeln!(report, "{} darknodes registered:", darknodes.len())?;
        for darknode in darknodes {
            writeln!(report, "  {darknode}")?;
        }
        Ok(report)
    }

    async fn darknode_report(&self, id: DarknodeId) -> eyre::Result<String> {
        let registry = self.registry()?;
        let status = registry.darknode_status(id).await?;
        let owner = registry.get_darknode_owner(id).await?;
        let bond = registry.get_darknode_bond(id).await?;

        let mut report = String::new();
        writeln!(report, "darknode: {id}")?;
        writeln!(report, "status:   {status:?}")?;
        writeln!(report, "owner:    {}", owner.to_checksum(None))?;
        write!(report, "bond:     {bond}")?;
        Ok(report)
    }

    async fn transfer(&self, to: Address, amount: U256) -> eyre::Result<String> {
        let token = self.token()?;
        let tx_hash = token.transfer(to, amount).await?;
        tracing::info!(target: "renctl", "Sent transfer {tx_hash}, waiting for receipt");

        let receipt = self.connector.wait_for_receipt(tx_hash).await?;
        Ok(format!(
            "transferred {amount} to {} in block {}",
            to.to_checksum(None),
            receipt.block_number.unwrap_or_default()
        ))
    }

    async fn epoch(&self) -> eyre::Result<String> {
        let registry = self.registry()?;
        if !registry.epoch_due().await? {
            let epoch = registry.current_epoch().await?;
            let interval = registry.minimum_epoch_interval().await?;
            return Ok(format!(
                "epoch is not due, next epoch at block {}",
                epoch.next_epoch_block(interval)
            ));
        }

        let tx_hash = registry.epoch().await?;
        let receipt = self.connector.wait_for_receipt(tx_hash).await?;
        Ok(format!(
            "new epoch started in block {}",
            receipt.block_number.unwrap_or_default()
        ))
    }

    async fn watch(&self, target: WatchTarget) -> eyre::Result<()> {
        let ws_endpoint = self
            .config()
            .ws_endpoint
            .clone()
            .ok_or_else(|| eyre!("ws_endpoint is not configured, it is required to watch events"))?;
        let subscription = WsEventSubscription::new(WsSubscriptionConfig::new(ws_endpoint)).await?;
        let watcher = EventWatcher::new(subscription);

        let streams = match target {
            WatchTarget::Registry => {
                let registry = self.registry()?.bound().clone();
                vec![
                    printed(
                        &watcher,
                        registry.event_filter::<DarknodeRegistry::LogDarknodeRegistered>(),
                        |e: DarknodeRegistry::LogDarknodeRegistered| {
                            format!("darknode {} registered with bond {}", e._darknodeID, e._bond)
                        },
                    )
                    .await?,
                    printed(
                        &watcher,
                        registry.event_filter::<DarknodeRegistry::LogDarknodeDeregistered>(),
                        |e: DarknodeRegistry::LogDarknodeDeregistered| {
                            format!("darknode {} deregistered", e._darknodeID)
                        },
                    )
                    .await?,
                    printed(
                        &watcher,
                        registry.event_filter::<DarknodeRegistry::LogNewEpoch>(),
                        |_: DarknodeRegistry::LogNewEpoch| "new epoch".to_string(),
                    )
                    .await?,
                ]
            }
            WatchTarget::Token => {
                let token = self.token()?;
                vec![
                    printed(&watcher, token.transfer_filter(&[], &[]), |e: RepublicToken::Transfer| {
                        format!("transfer {} from {} to {}", e.value, e.from, e.to)
                    })
                    .await?,
                    printed(
                        &watcher,
                        token.approval_filter(&[], &[]),
                        |e: RepublicToken::Approval| {
                            format!("approval {} from {} to {}", e.value, e.owner, e.spender)
                        },
                    )
                    .await?,
                ]
            }
            WatchTarget::Orderbook => {
                let orderbook = self.orderbook()?;
                vec![
                    printed(
                        &watcher,
                        orderbook.bound().event_filter::<Orderbook::LogFeeUpdated>(),
                        |e: Orderbook::LogFeeUpdated| format!("fee updated {} -> {}", e.previousFee, e.nextFee),
                    )
                    .await?,
                    printed(
                        &watcher,
                        orderbook.bound().event_filter::<Orderbook::LogDarknodeRegistryUpdated>(),
                        |e: Orderbook::LogDarknodeRegistryUpdated| {
                            format!(
                                "darknode registry updated {} -> {}",
                                e.previousDarknodeRegistry, e.nextDarknodeRegistry
                            )
                        },
                    )
                    .await?,
                ]
            }
        };

        let mut events = select_all(streams);
        println!("Watching {target:?} events, press Ctrl-C to stop");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                next = events.next() => match next {
                    Some(Ok(line)) => println!("{line}"),
                    Some(Err(err)) => return Err(err).wrap_err("event subscription failed"),
                    None => break,
                }
            }
        }

        Ok(())
    }
}

/// Event stream rendered to printable lines
async fn printed<E>(
    watcher: &EventWatcher,
    filter: LogFilter,
    render: impl Fn(E) -> String + Send + 'static,
) -> eyre::Result<BoxStream<'static, Result<String, chain_listener::Error>>>
where
    E: SolEvent + Send + 'static,
{
    let stream = watcher.stream::<E>(&filter).await?;
    Ok(stream
        .map(move |item: WatchItem<E>| item.map(|log| render_log(log, &render)))
        .boxed())
}

fn render_log<E>(log: EventLog<E>, render: &impl Fn(E) -> String) -> String {
    let block = log
        .block_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "pending".to_string());
    let removed = if log.removed { " (removed)" } else { "" };
    format!("[{block}] {}{removed}", render(log.event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolCall;
    use chain_config::ContractAddresses;
    use hex_utils::{decode_hex, encode_hex_0x};
    use mockito::{Mock, ServerGuard};
    use serde_json::{json, Value};

    const REGISTRY: Address = address!("8dc7d48492b9fd2519b65a54816be03758742c60");
    const TOKEN: Address = address!("0000000000000000000000000000000000000a11");

    struct Node {
        renctl: Renctl,
        _mock: Mock,
        _server: ServerGuard,
    }

    /// Answers eth_blockNumber with `block` and eth_call through `call`
    async fn node<F>(block: u64, call: F) -> Node
    where
        F: Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |req| {
                let request: Value = serde_json::from_slice(req.body().unwrap()).unwrap();
                let id = request["id"].clone();
                let result = match request["method"].as_str().unwrap() {
                    "eth_blockNumber" => Some(json!(format!("{block:#x}"))),
                    "eth_call" => {
                        let data = decode_hex(request["params"][0]["data"].as_str().unwrap())
                            .unwrap();
                        call(&data).map(|out| json!(encode_hex_0x(out)))
                    }
                    _ => None,
                };
                let response = match result {
                    Some(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                    None => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": {"code": -32601, "message": "not supported"}
                    }),
                };
                response.to_string().into()
            })
            .create_async()
            .await;

        let config = ChainConfig {
            http_endpoint: url,
            contracts: ContractAddresses {
                darknode_registry: Some(REGISTRY),
                republic_token: Some(TOKEN),
                ..Default::default()
            },
            ..Default::default()
        };

        Node {
            renctl: Renctl::new(config).unwrap(),
            _mock: mock,
            _server: server,
        }
    }

    #[tokio::test]
    async fn missing_contract_address() {
        let renctl = Renctl::new(ChainConfig::default()).unwrap();
        let err = renctl
            .execute(Command::Orders {
                offset: 0,
                limit: 10,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("orderbook address is not configured"));
    }

    #[tokio::test]
    async fn balance_of_address() {
        let holder = address!("00000000000000000000000000000000000000f2");
        let node = node(1, move |data| {
            let call = RepublicToken::balanceOfCall::abi_decode(data, true).ok()?;
            assert_eq!(call._owner, holder);
            Some(RepublicToken::balanceOfCall::abi_encode_returns(&(U256::from(42),)))
        })
        .await;

        let balance = node
            .renctl
            .execute(Command::Balance { address: holder })
            .await
            .unwrap();
        assert_eq!(balance, "42");
    }

    #[tokio::test]
    async fn epoch_is_skipped_until_due() {
        use DarknodeRegistry::{currentEpochCall, minimumEpochIntervalCall};

        let node = node(100, |data| {
            if data.starts_with(&currentEpochCall::SELECTOR) {
                Some(currentEpochCall::abi_encode_returns(&(
                    U256::from(7),
                    U256::from(95),
                )))
            } else if data.starts_with(&minimumEpochIntervalCall::SELECTOR) {
                Some(minimumEpochIntervalCall::abi_encode_returns(&(U256::from(10),)))
            } else {
                None
            }
        })
        .await;

        let report = node.renctl.execute(Command::Epoch).await.unwrap();
        assert_eq!(report, "epoch is not due, next epoch at block 105");
    }

    #[test]
    fn renders_removed_logs() {
        let log = EventLog {
            address: Some(TOKEN),
            block_number: Some(12),
            transaction_hash: None,
            log_index: None,
            removed: true,
            event: 5u8,
        };
        assert_eq!(
            render_log(log, &|n: u8| format!("value {n}")),
            "[12] value 5 (removed)"
        );
    }
}
