mod darknode;
mod epoch;
mod error;
mod order;

pub use darknode::{DarknodeFlags, DarknodeId, DarknodeStatus};
pub use epoch::{Epoch, RegistrySnapshot};
pub use error::ChainTypesError;
pub use order::{
    cancel_order_message, open_order_message, Order, OrderEntry, OrderId, OrderInfo, OrderState,
    SettlementId,
};
