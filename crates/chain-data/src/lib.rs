mod block_header;
mod filter;
mod log;

pub use block_header::BlockHeader;
pub use filter::{
    address_topic, bytes20_topic, bytes32_topic, topic, u64_topic, uint_topic, BlockNumber,
    LogFilter,
};
pub use log::{parse_event_log, parse_log, EventLog, Log, LogParseError};
