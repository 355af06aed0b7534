//! Push stream: topic-based event delivery.
//!
//! [`PushTransport`] is the seam the session drives. The native transport
//! speaks Socket.IO over Engine.IO v3 (`engine_io` holds the packet codec)
//! and is compiled in with the `ws-native` feature.

pub mod engine_io;

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-native")]
pub use native::SocketIoTransport;

use crate::error::WsError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Callback run for each event pushed on a topic.
///
/// Runs on the transport's delivery task; it must not block.
pub type TopicHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Connection lifecycle signals emitted after a successful `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The connection dropped and reconnect attempt `attempt` is starting.
    Reconnecting { attempt: u32 },
    /// A reconnect attempt succeeded under a new session id.
    Connected { session_id: String },
    /// Every reconnect attempt failed; the transport has given up.
    ReconnectFailed,
}

/// A live push connection.
#[derive(Debug)]
pub struct PushConnection {
    /// Transport session id; commands authenticate with it.
    pub session_id: String,
    /// Lifecycle signals. Closed when the transport stops for good.
    pub events: mpsc::Receiver<LifecycleEvent>,
}

#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Opens the stream, returning once the server has assigned a session id
    /// or the attempt has failed.
    async fn connect(&self, host: &str, access_token: &str) -> Result<PushConnection, WsError>;

    /// Routes events on `topic` to `handler`, replacing any previous handler.
    async fn on(&self, topic: &str, handler: TopicHandler);

    async fn off(&self, topic: &str);

    /// Best-effort shutdown. No handler runs after this returns.
    async fn close(&self);
}
