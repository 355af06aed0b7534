//! Push payload decoding and routing to observer sets.
//!
//! Table topics go through [`TABLE_DISPATCH`], a fixed array indexed by
//! [`TradingTable::index`]. A payload that fails to decode is logged and
//! dropped; it never reaches a callback and never stops the stream.

use super::events::{EventHub, TableObservers};
use crate::domain::price::PriceUpdate;
use crate::domain::table::{
    Account, ClosedPosition, Offer, OpenPosition, Order, Summary, TableUpdate,
};
use crate::error::MappingError;
use crate::shared::TradingTable;
use crate::ws::TopicHandler;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

pub(crate) type TableDispatch = fn(&EventHub, &Value);

/// Decode-and-notify function per table, in [`TradingTable::ALL`] order.
pub(crate) const TABLE_DISPATCH: [TableDispatch; TradingTable::COUNT] = [
    dispatch_table::<Offer>,
    dispatch_table::<OpenPosition>,
    dispatch_table::<ClosedPosition>,
    dispatch_table::<Order>,
    dispatch_table::<Account>,
    dispatch_table::<Summary>,
];

/// Payloads arrive either as a JSON object or as a string holding one.
pub(crate) fn decode_payload(payload: &Value) -> Result<Cow<'_, Value>, MappingError> {
    match payload {
        Value::Object(_) => Ok(Cow::Borrowed(payload)),
        Value::String(text) => serde_json::from_str(text)
            .map(Cow::Owned)
            .map_err(|e| MappingError::Payload(e.to_string())),
        other => Err(MappingError::Payload(format!("unexpected payload: {}", other))),
    }
}

fn decode_table<E: TableObservers>(payload: &Value) -> Result<TableUpdate<E>, MappingError> {
    match decode_payload(payload)?.as_ref() {
        Value::Object(record) => TableUpdate::from_record(record),
        _ => Err(MappingError::NotAnObject),
    }
}

fn dispatch_table<E: TableObservers>(hub: &EventHub, payload: &Value) {
    if !hub.is_delivering() {
        return;
    }
    match decode_table::<E>(payload) {
        Ok(update) => hub.notify_table(&update),
        Err(e) => {
            tracing::warn!(topic = E::TABLE.as_str(), error = %e, "dropping malformed push record")
        }
    }
}

pub(crate) fn dispatch_price(hub: &EventHub, symbol: &str, payload: &Value) {
    if !hub.is_delivering() {
        return;
    }
    let update = decode_payload(payload).and_then(|v| PriceUpdate::from_price_value(&v));
    match update {
        Ok(update) => hub.notify_price(&update),
        Err(e) => tracing::warn!(topic = symbol, error = %e, "dropping malformed push record"),
    }
}

pub(crate) fn price_handler(hub: Arc<EventHub>, symbol: &str) -> TopicHandler {
    let symbol = symbol.to_string();
    Arc::new(move |payload: &Value| dispatch_price(&hub, &symbol, payload))
}

pub(crate) fn table_handler(hub: Arc<EventHub>, table: TradingTable) -> TopicHandler {
    let dispatch = TABLE_DISPATCH[table.index()];
    Arc::new(move |payload: &Value| dispatch(&hub, payload))
}
