//! Trading tables: entity definitions, pushed deltas, and snapshot decoding.

pub mod account;
pub mod client;
pub mod closed_position;
pub mod offer;
pub mod open_position;
pub mod order;
pub mod summary;

pub use account::Account;
pub use closed_position::ClosedPosition;
pub use offer::{InstrumentType, Offer};
pub use open_position::OpenPosition;
pub use order::Order;
pub use summary::Summary;

use crate::domain::mapper::{map_list, MappedEntity, WireRecord};
use crate::error::MappingError;
use crate::shared::{TradingTable, UpdateAction};
use serde_json::Value;

/// Binds an entity type to the table it is a row of.
pub trait TableEntity: MappedEntity + std::fmt::Debug + Send + Sync + 'static {
    const TABLE: TradingTable;
}

impl TableEntity for Offer {
    const TABLE: TradingTable = TradingTable::Offer;
}

impl TableEntity for OpenPosition {
    const TABLE: TradingTable = TradingTable::OpenPosition;
}

impl TableEntity for ClosedPosition {
    const TABLE: TradingTable = TradingTable::ClosedPosition;
}

impl TableEntity for Order {
    const TABLE: TradingTable = TradingTable::Order;
}

impl TableEntity for Account {
    const TABLE: TradingTable = TradingTable::Account;
}

impl TableEntity for Summary {
    const TABLE: TradingTable = TradingTable::Summary;
}

/// One pushed table record: what happened to the row, and the (partial) row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableUpdate<E> {
    pub action: UpdateAction,
    pub entity: E,
}

impl<E: TableEntity> TableUpdate<E> {
    pub fn from_record(record: &WireRecord) -> Result<Self, MappingError> {
        Ok(Self {
            action: parse_action(record)?,
            entity: E::from_record(record)?,
        })
    }
}

/// Reads the `action` code, defaulting to `Update` when omitted.
pub fn parse_action(record: &WireRecord) -> Result<UpdateAction, MappingError> {
    match record.get("action") {
        None | Some(Value::Null) => Ok(UpdateAction::default()),
        Some(Value::String(code)) => {
            UpdateAction::from_code(code).ok_or_else(|| MappingError::UnknownAction(code.clone()))
        }
        Some(other) => Err(MappingError::UnknownAction(other.to_string())),
    }
}

/// Extracts this table's rows from a `get_model` response body.
pub(crate) fn snapshot_rows<E: TableEntity>(body: &Value) -> Result<Vec<E>, MappingError> {
    map_list(body.get(E::TABLE.snapshot_key()))
}
