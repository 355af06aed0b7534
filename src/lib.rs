//! # fxcm-session
//!
//! A stateful client for the FXCM trading API: one [`Session`](session::Session)
//! drives a REST command channel and a Socket.IO push stream.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: shared enums, presence-tracked domain entities, the command
//!    codec, errors and configuration (always available)
//! 2. **Command channel**: the `CommandTransport` seam, `RequestExecutor`,
//!    and a `reqwest` transport behind feature `http`
//! 3. **Push stream**: the `PushTransport` seam, the Engine.IO packet codec,
//!    and a `tokio-tungstenite` transport behind feature `ws-native`
//! 4. **Session**: state machine, subscription registry, resubscription on
//!    reconnect, and typed event callbacks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fxcm_session::prelude::*;
//!
//! let session = Session::builder()
//!     .host(DEMO_HOST)
//!     .access_token(&token)
//!     .build()?;
//! session.connect().await?;
//!
//! session.on_price(|p| println!("{} {} / {}", p.symbol, p.bid, p.ask));
//! session.prices().subscribe("EUR/USD").await?;
//!
//! let offers = session.tables().get_offers().await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared enums and form encoding used across all layers.
pub mod shared;

/// Domain modules (vertical slices): entities, wire types, sub-clients.
pub mod domain;

/// Unified error types.
pub mod error;

/// Hosts and resource paths.
pub mod network;

/// Session and runner configuration.
pub mod config;

/// Traits for consumers of session output.
pub mod downstream;

// ── Layer 2: Command channel ─────────────────────────────────────────────────

/// Request building, envelope decoding, and the HTTP transport.
pub mod http;

// ── Layer 3: Push stream ─────────────────────────────────────────────────────

/// Socket.IO push transport and packet codec.
pub mod ws;

// ── Layer 4: Session ─────────────────────────────────────────────────────────

/// `Session`: the primary entry point.
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared enums
    pub use crate::shared::{SessionState, Timeframe, TradingTable, UpdateAction};

    // Domain types: tables, prices, candles, instruments
    pub use crate::domain::candle::Candle;
    pub use crate::domain::instrument::Instrument;
    pub use crate::domain::price::PriceUpdate;
    pub use crate::domain::table::{
        Account, ClosedPosition, InstrumentType, Offer, OpenPosition, Order, Summary,
        TableEntity, TableUpdate,
    };

    // Domain types: trading commands
    pub use crate::domain::trading::{
        ChangeOrder, ChangeOrderStopLimit, ChangeTradeStopLimit, CloseAllForSymbol, CloseTrade,
        CreateEntryOrder, DeleteOrder, EditOco, OcoLeg, OpenTrade, OrderType, SimpleOco,
        TimeInForce,
    };

    // Errors
    pub use crate::error::{HttpError, MappingError, SdkError, WsError};

    // Config + network
    pub use crate::config::{ReconnectConfig, RunnerParams, SessionConfig};
    pub use crate::network::{DEMO_HOST, REAL_HOST};

    // Transport seams
    pub use crate::http::{CommandTransport, HttpRequest, HttpResponse, Method};
    pub use crate::ws::{LifecycleEvent, PushConnection, PushTransport, TopicHandler};

    #[cfg(feature = "http")]
    pub use crate::http::ReqwestTransport;
    #[cfg(feature = "ws-native")]
    pub use crate::ws::SocketIoTransport;

    // Session + sub-clients
    pub use crate::session::{
        CandlesClient, InstrumentsClient, ObserverId, PricesClient, Session, SessionBuilder,
        StateChange, TablesClient, TradingClient,
    };
}
