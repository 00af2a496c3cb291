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
use alloy_sol_types::SolEvent;
use chain_data::{parse_event_log, EventLog, Log, LogFilter};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::subscription::{Error, EventSubscription};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

pub type WatchItem<E> = Result<EventLog<E>, Error>;

/// Turns raw `eth_subscribe` log streams into typed contract events
pub struct EventWatcher {
    subscription: Box<dyn EventSubscription>,
    capacity: usize,
}

impl EventWatcher {
    pub fn new(subscription: impl EventSubscription + 'static) -> Self {
        Self {
            subscription: Box::new(subscription),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn subscription(&self) -> &dyn EventSubscription {
        self.subscription.as_ref()
    }

    /// Reconnects the underlying client if it was dropped. Running watches are not resubscribed.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        self.subscription.refresh().await
    }

    /// Subscribes to logs matching `filter` and forwards the ones decodable as `E`.
    ///
    /// Forwarding runs in a separate task which ends when the handle is dropped or unsubscribed,
    /// when the receiving side is gone, or when the node closes the subscription.
    /// A subscription error is delivered once and ends the watch.
    pub async fn watch<E>(&self, filter: &LogFilter) -> Result<WatchHandle<E>, Error>
    where
        E: SolEvent + Send + 'static,
    {
        let mut logs = self.subscription.logs(filter).await?;
        let (sender, receiver) = mpsc::channel::<WatchItem<E>>(self.capacity);
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = sender.closed() => break,
                    next = logs.next() => next,
                };

                match next {
                    Some(Ok(json)) => {
                        let Some(event) = decode::<E>(json) else {
                            continue;
                        };
                        if sender.send(Ok(event)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        tracing::error!(target: "chain-listener", "{} subscription failed: {err}", E::SIGNATURE);
                        let _ = sender.send(Err(err)).await;
                        break;
                    }
                    None => {
                        tracing::info!(target: "chain-listener", "{} subscription closed by the node", E::SIGNATURE);
                        break;
                    }
                }
            }
        });

        tracing::info!(target: "chain-listener", "Watching {} events", E::SIGNATURE);

        Ok(WatchHandle {
            receiver,
            guard: token.drop_guard(),
        })
    }

    pub async fn stream<E>(&self, filter: &LogFilter) -> Result<BoxStream<'static, WatchItem<E>>, Error>
    where
        E: SolEvent + Send + 'static,
    {
        Ok(self.watch::<E>(filter).await?.into_stream())
    }
}

fn decode<E: SolEvent>(json: serde_json::Value) -> Option<EventLog<E>> {
    let log = match Log::from_json(json) {
        Ok(log) => log,
        Err(err) => {
            tracing::warn!(target: "chain-listener", "Skipping malformed log: {err}");
            return None;
        }
    };

    // parse_event_log logs the reason itself
    parse_event_log::<E>(log).ok()
}

/// Receiving side of [EventWatcher::watch]
pub struct WatchHandle<E> {
    receiver: mpsc::Receiver<WatchItem<E>>,
    guard: DropGuard,
}

impl<E: Send + 'static> WatchHandle<E> {
    /// Next event, `None` once the watch is over
    pub async fn recv(&mut self) -> Option<WatchItem<E>> {
        self.receiver.recv().await
    }

    pub fn into_stream(self) -> BoxStream<'static, WatchItem<E>> {
        let guard = self.guard;
        ReceiverStream::new(self.receiver)
            .map(move |item| {
                let _guard = &guard;
                item
            })
            .boxed()
    }

    pub fn unsubscribe(self) {
        self.guard.disarm().cancel();
    }
}
