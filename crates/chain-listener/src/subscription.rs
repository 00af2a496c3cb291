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
use backoff::future::retry;
use backoff::Error::Permanent;
use backoff::ExponentialBackoff;
use chain_data::LogFilter;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use jsonrpsee::core::client::SubscriptionClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::core::ClientError::RestartNeeded;
use jsonrpsee::core::{async_trait, JsonValue};
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Clone, Debug)]
#[error(transparent)]
pub struct Error(#[from] Arc<jsonrpsee::core::client::Error>);

impl Deref for Error {
    type Target = jsonrpsee::core::client::Error;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl From<jsonrpsee::core::client::Error> for Error {
    fn from(value: jsonrpsee::core::client::Error) -> Self {
        Self(Arc::new(value))
    }
}

pub type Stream<T> = BoxStream<'static, Result<T, Error>>;
pub type SubResult<T> = Result<Stream<T>, Error>;

#[async_trait]
pub trait EventSubscription: Send + Sync {
    /// Raw logs matching `filter`, block range is ignored by `eth_subscribe`
    async fn logs(&self, filter: &LogFilter) -> SubResult<JsonValue>;
    async fn new_heads(&self) -> SubResult<JsonValue>;

    async fn refresh(&mut self) -> Result<(), Error>;
    async fn restart(&mut self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct WsSubscriptionConfig {
    ws_endpoint: String,
}

impl WsSubscriptionConfig {
    pub fn new(ws_endpoint: String) -> Self {
        Self { ws_endpoint }
    }
}

pub struct WsEventSubscription {
    config: WsSubscriptionConfig,
    ws_client: WsClient,
}

impl WsEventSubscription {
    pub async fn new(config: WsSubscriptionConfig) -> Result<Self, Error> {
        let ws_client = Self::create_ws_client(config.ws_endpoint.as_str()).await?;
        Ok(Self { config, ws_client })
    }

    async fn subscribe(
        &self,
        method: &str,
        params: ArrayParams,
    ) -> Result<Stream<JsonValue>, Error> {
        let sub = retry(ExponentialBackoff::default(), || async {
            self.ws_client
                .subscribe("eth_subscribe", params.clone(), "eth_unsubscribe")
                .await
                .map_err(|err| {
                    if let RestartNeeded(_) = err {
                        tracing::error!(target: "chain-listener", "Failed to subscribe to {method}: {err};");
                        Permanent(err)
                    } else {
                        tracing::warn!(target: "chain-listener", "Failed to subscribe to {method}: {err}; Retrying...");
                        backoff::Error::transient(err)
                    }
                })
        })
        .await
        .map_err(Error::from)?;

        Ok(sub
            .map_err(|err| Error::from(jsonrpsee::core::client::Error::from(err)))
            .boxed())
    }

    fn logs_params(filter: &LogFilter) -> ArrayParams {
        rpc_params!["logs", filter.clone().without_range().to_json()]
    }

    async fn create_ws_client(ws_endpoint: &str) -> Result<WsClient, Error> {
        let ws_client = retry(ExponentialBackoff::default(), || async {
            let client = WsClientBuilder::default()
                .build(ws_endpoint)
                .await
                .map_err(|err| {
                    tracing::warn!(
                        target: "chain-listener",
                        "Error connecting to websocket endpoint {}, error: {}; Retrying...",
                        ws_endpoint,
                        err
                    );
                    err
                })?;

            Ok(client)
        })
        .await?;

        tracing::info!(
            target: "chain-listener",
            "Successfully connected to websocket endpoint: {}",
            ws_endpoint
        );

        Ok(ws_client)
    }
}

#[async_trait]
impl EventSubscription for WsEventSubscription {
    async fn logs(&self, filter: &LogFilter) -> SubResult<JsonValue> {
        self.subscribe("logs", Self::logs_params(filter)).await
    }

    async fn new_heads(&self) -> SubResult<JsonValue> {
        self.subscribe("newHeads", rpc_params!["newHeads"]).await
    }

    async fn refresh(&mut self) -> Result<(), Error> {
        if !self.ws_client.is_connected() {
            self.restart().await?
        }
        Ok(())
    }

    async fn restart(&mut self) -> Result<(), Error> {
        self.ws_client = Self::create_ws_client(&self.config.ws_endpoint).await?;
        Ok(())
    }
}
