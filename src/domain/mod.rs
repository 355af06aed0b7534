//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: domain types as handed to callers
//! - `wire.rs`: raw serde structs matching server responses
//! - `convert.rs`: conversions from wire rows, where they are not trivial
//! - `client.rs`: sub-client with the slice's commands
//!
//! `mapper` holds the presence-flag projection shared by the push-fed slices.

pub mod mapper;

pub mod candle;
pub mod instrument;
pub mod price;
pub mod table;
pub mod trading;
