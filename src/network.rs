//! Server hosts and command resource paths.

/// Demo (paper trading) REST + Socket.IO host.
pub const DEMO_HOST: &str = "https://api-demo.fxcm.com";

/// Live trading host.
pub const REAL_HOST: &str = "https://api.fxcm.com";

/// Resource paths appended to the host. Trading commands carry their own
/// path on [`TradingCommand::RESOURCE`](crate::domain::trading::TradingCommand::RESOURCE).
pub mod resource {
    pub const SUBSCRIBE: &str = "/subscribe";
    pub const UNSUBSCRIBE: &str = "/unsubscribe";
    pub const TRADING_SUBSCRIBE: &str = "/trading/subscribe";
    pub const TRADING_UNSUBSCRIBE: &str = "/trading/unsubscribe";
    pub const UPDATE_SUBSCRIPTIONS: &str = "/trading/update_subscriptions";
    pub const GET_MODEL: &str = "/trading/get_model";
    pub const GET_INSTRUMENTS: &str = "/trading/get_instruments";
    /// Followed by `/{offerId}/{timeframe}`.
    pub const CANDLES: &str = "/candles";
}
