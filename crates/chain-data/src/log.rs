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

use alloy_primitives::{Address, Bytes, B256, U64};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    // Contract which emitted the log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    // Log arguments, i.e. non-indexed event fields
    pub data: Bytes,
    // The block number that contains this log, absent for pending logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<U64>,
    // true when the log was removed, due to a chain reorganization. false if its a valid log.
    #[serde(default)]
    pub removed: bool,
    pub topics: Vec<B256>,
}

impl Log {
    pub fn from_json(json: serde_json::Value) -> Result<Self, LogParseError> {
        Ok(serde_json::from_value(json)?)
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}

/// Decoded event together with the position of the log it came from
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog<E> {
    pub address: Option<Address>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
    pub removed: bool,
    pub event: E,
}

impl<E> EventLog<E> {
    pub fn map<T>(self, f: impl FnOnce(E) -> T) -> EventLog<T> {
        EventLog {
            address: self.address,
            block_number: self.block_number,
            transaction_hash: self.transaction_hash,
            log_index: self.log_index,
            removed: self.removed,
            event: f(self.event),
        }
    }
}

#[derive(Debug, Error)]
pub enum LogParseError {
    #[error(transparent)]
    Sol(#[from] alloy_sol_types::Error),
    #[error("log has no topics, anonymous events are not supported")]
    NoTopics,
    #[error("log topic {actual} doesn't match event {event} ({expected})")]
    TopicMismatch {
        event: &'static str,
        expected: B256,
        actual: B256,
    },
    #[error("invalid log json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a raw log into the event `E`.
///
/// Indexed fields live in `log.topics` starting from the 1st topic (the 0th is the event
/// signature hash), non indexed fields are abi-encoded in `log.data`.
pub fn parse_log<E: SolEvent>(log: &Log) -> Result<E, LogParseError> {
    let result = decode_log::<E>(log);

    if let Err(e) = result.as_ref() {
        log::warn!(target: "chain-data",
            "Cannot parse {} log from block {:?}: {}",
            E::SIGNATURE,
            log.block_number(),
            e
        );
    }

    result
}

/// Same as [parse_log], keeping block number, tx hash and reorg flag of the log
pub fn parse_event_log<E: SolEvent>(log: Log) -> Result<EventLog<E>, LogParseError> {
    let event = parse_log::<E>(&log)?;
    Ok(EventLog {
        address: log.address,
        block_number: log.block_number(),
        transaction_hash: log.transaction_hash,
        log_index: log.log_index.map(|i| i.to::<u64>()),
        removed: log.removed,
        event,
    })
}

fn decode_log<E: SolEvent>(log: &Log) -> Result<E, LogParseError> {
    let topic = log.topics.first().ok_or(LogParseError::NoTopics)?;
    if *topic != E::SIGNATURE_HASH {
        return Err(LogParseError::TopicMismatch {
            event: E::SIGNATURE,
            expected: E::SIGNATURE_HASH,
            actual: *topic,
        });
    }

    let event = E::decode_raw_log(log.topics.iter().copied(), &log.data, true)?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, U256};
    use alloy_sol_types::sol;
    use serde_json::json;

    sol! {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Pause();
    }

    fn transfer_log(event: &Transfer) -> Log {
        Log {
            topics: event.encode_topics().into_iter().map(|t| t.0).collect(),
            data: event.encode_data().into(),
            block_number: Some(U64::from(7)),
            ..Default::default()
        }
    }

    #[test]
    fn transfer_topic() {
        assert_eq!(
            Transfer::SIGNATURE_HASH,
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
    }

    #[test]
    fn parse_indexed_and_data_fields() {
        let event = Transfer {
            from: address!("ffa0611a099ab68ad7c3c67b4ca5bbbee7a58b99"),
            to: address!("67b2ad3866429282e16e55b715d12a77f85b7ce8"),
            value: U256::from(1000),
        };
        let log = transfer_log(&event);

        let parsed = parse_event_log::<Transfer>(log).expect("parse transfer");
        assert_eq!(parsed.block_number, Some(7));
        assert!(!parsed.removed);
        assert_eq!(parsed.event.from, event.from);
        assert_eq!(parsed.event.to, event.to);
        assert_eq!(parsed.event.value, U256::from(1000));
    }

    #[test]
    fn parse_event_without_fields() {
        let log = Log {
            topics: vec![Pause::SIGNATURE_HASH],
            ..Default::default()
        };
        assert!(parse_log::<Pause>(&log).is_ok());
    }

    #[test]
    fn wrong_topic_is_rejected() {
        let log = Log {
            topics: vec![Pause::SIGNATURE_HASH],
            ..Default::default()
        };
        assert!(matches!(
            parse_log::<Transfer>(&log),
            Err(LogParseError::TopicMismatch { .. })
        ));

        let log = Log::default();
        assert!(matches!(
            parse_log::<Transfer>(&log),
            Err(LogParseError::NoTopics)
        ));
    }

    #[test]
    fn missing_indexed_topic_is_error() {
        let event = Transfer {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::from(1),
        };
        let mut log = transfer_log(&event);
        log.topics.pop();
        assert!(parse_log::<Transfer>(&log).is_err());
    }

    #[test]
    fn malformed_log_json_is_rejected() {
        let json = json!({
            "data": "0xzz",
            "topics": []
        });
        assert!(matches!(Log::from_json(json), Err(LogParseError::Json(_))));

        let json = json!({ "data": "0x" });
        assert!(matches!(Log::from_json(json), Err(LogParseError::Json(_))));
    }

    #[test]
    fn log_from_rpc_json() {
        let json = json!({
            "address": "0x8dc7d48492b9fd2519b65a54816be03758742c60",
            "blockNumber": "0xa2",
            "transactionHash": "0x55bfec4a4400ca0b09e075e2b517041cd78b10021c51726cb73bcba52213fa05",
            "logIndex": "0x1",
            "data": "0x",
            "topics": [
                "0x6985a02210a168e66602d3235cb6db0e70f92b3ba4d376a33c0f3d9434bff625"
            ]
        });
        let log = Log::from_json(json).expect("parse log json");
        assert_eq!(log.block_number(), Some(162));
        assert_eq!(log.log_index, Some(U64::from(1)));
        assert!(!log.removed);
        assert!(log.data.is_empty());
        assert_eq!(log.topics, vec![Pause::SIGNATURE_HASH]);
    }
}
