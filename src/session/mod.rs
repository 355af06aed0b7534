//! The trading session: connection lifecycle, subscriptions, and the
//! command and event surfaces.
//!
//! One [`async_lock::RwLock`] guards the state, the transport session id,
//! the request executor and the subscription registry together, so no
//! reader ever sees a new session id next to a stale registry or the
//! reverse. Push lifecycle signals are consumed by a background task that
//! holds only a weak reference to the session.
//!
//! Command methods live on sub-clients, one per domain:
//! `session.prices()`, `session.tables()`, `session.trading()`, ...

pub mod builder;
pub(crate) mod dispatch;
pub mod events;
pub mod registry;

pub use builder::SessionBuilder;
pub use events::{EventHub, ObserverId, ObserverSet, StateChange, TableObservers};
pub use registry::SubscriptionRegistry;

use crate::config::SessionConfig;
use crate::domain::candle::client::Candles;
use crate::domain::instrument::client::Instruments;
use crate::domain::price::client::Prices;
use crate::domain::price::PriceUpdate;
use crate::domain::table::client::Tables;
use crate::domain::table::{
    Account, ClosedPosition, Offer, OpenPosition, Order, Summary, TableUpdate,
};
use crate::domain::trading::client::Trading;
use crate::error::SdkError;
use crate::http::{CommandTransport, Method, RequestExecutor};
use crate::network::resource;
use crate::shared::{FormParams, SessionState, TradingTable};
use crate::ws::{LifecycleEvent, PushTransport, TopicHandler};

use async_lock::RwLock;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// Re-export sub-client types for convenience.
pub use crate::domain::candle::client::Candles as CandlesClient;
pub use crate::domain::instrument::client::Instruments as InstrumentsClient;
pub use crate::domain::price::client::Prices as PricesClient;
pub use crate::domain::table::client::Tables as TablesClient;
pub use crate::domain::trading::client::Trading as TradingClient;

/// State that must change together.
#[derive(Debug, Default)]
struct SharedState {
    state: SessionState,
    session_id: String,
    executor: Option<RequestExecutor>,
    registry: SubscriptionRegistry,
    /// Topics taken out for replay after a reconnect and not restored yet.
    pending: SubscriptionRegistry,
}

/// A push topic: a price symbol or a trading table.
#[derive(Debug, Clone, Copy)]
enum Topic<'a> {
    Symbol(&'a str),
    Table(TradingTable),
}

impl Topic<'_> {
    fn name(&self) -> &str {
        match self {
            Topic::Symbol(symbol) => *symbol,
            Topic::Table(table) => table.as_str(),
        }
    }

    fn subscribe_command(&self) -> (&'static str, FormParams) {
        match self {
            Topic::Symbol(symbol) => (resource::SUBSCRIBE, FormParams::new().with("pairs", *symbol)),
            Topic::Table(table) => (
                resource::TRADING_SUBSCRIBE,
                FormParams::new().with("models", table.as_str()),
            ),
        }
    }

    fn handler(&self, hub: &Arc<EventHub>) -> TopicHandler {
        match self {
            Topic::Symbol(symbol) => dispatch::price_handler(Arc::clone(hub), symbol),
            Topic::Table(table) => dispatch::table_handler(Arc::clone(hub), *table),
        }
    }

    fn is_registered(&self, registry: &SubscriptionRegistry) -> bool {
        match self {
            Topic::Symbol(symbol) => registry.contains_symbol(symbol),
            Topic::Table(table) => registry.contains_table(*table),
        }
    }

    fn add_to(&self, registry: &mut SubscriptionRegistry) -> bool {
        match self {
            Topic::Symbol(symbol) => registry.add_symbol(symbol),
            Topic::Table(table) => registry.add_table(*table),
        }
    }

    fn remove_from(&self, registry: &mut SubscriptionRegistry) -> bool {
        match self {
            Topic::Symbol(symbol) => registry.remove_symbol(symbol),
            Topic::Table(table) => registry.remove_table(*table),
        }
    }
}

struct SessionInner {
    config: SessionConfig,
    commands: Arc<dyn CommandTransport>,
    push: Arc<dyn PushTransport>,
    shared: RwLock<SharedState>,
    hub: Arc<EventHub>,
    lifecycle: Mutex<Option<JoinHandle<()>>>,
}

/// A stateful connection to the trading server.
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Creates a disconnected session over the given transports.
    pub fn with_transports(
        config: SessionConfig,
        commands: Arc<dyn CommandTransport>,
        push: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                commands,
                push,
                shared: RwLock::new(SharedState::default()),
                hub: Arc::new(EventHub::new()),
                lifecycle: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn prices(&self) -> Prices<'_> {
        Prices { session: self }
    }

    pub fn tables(&self) -> Tables<'_> {
        Tables { session: self }
    }

    pub fn trading(&self) -> Trading<'_> {
        Trading { session: self }
    }

    pub fn candles(&self) -> Candles<'_> {
        Candles { session: self }
    }

    pub fn instruments(&self) -> Instruments<'_> {
        Instruments { session: self }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Opens the push stream and binds commands to its session id.
    ///
    /// Only legal while `Disconnected`. On failure the session stays
    /// `Disconnected` and the error is `SdkError::TransportConnect`.
    pub async fn connect(&self) -> Result<(), SdkError> {
        let inner = &self.inner;
        let config = &inner.config;
        let mut shared = inner.shared.write().await;
        if shared.state != SessionState::Disconnected {
            return Err(SdkError::InvalidSessionState {
                expected: SessionState::Disconnected,
                actual: shared.state,
            });
        }

        tracing::info!(host = %config.host, "connecting session");
        let attempt = inner.push.connect(&config.host, &config.access_token);
        let connection = match tokio::time::timeout(config.connect_timeout, attempt).await {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "session connect failed");
                return Err(SdkError::TransportConnect(e.to_string()));
            }
            Err(_) => {
                tracing::error!(timeout = ?config.connect_timeout, "session connect timed out");
                inner.push.close().await;
                return Err(SdkError::TransportConnect(format!(
                    "timed out after {:?}",
                    config.connect_timeout
                )));
            }
        };

        if connection.session_id.is_empty() {
            tracing::error!("session connect failed: no session id assigned");
            inner.push.close().await;
            return Err(SdkError::TransportConnect(
                "server assigned no session id".to_string(),
            ));
        }

        shared.executor = Some(inner.executor_for(&connection.session_id));
        shared.session_id = connection.session_id;
        shared.state = SessionState::Connected;
        inner.hub.set_delivering(true);
        tracing::info!(session_id = %shared.session_id, "session connected");
        drop(shared);

        inner
            .hub
            .notify_state(SessionState::Disconnected, SessionState::Connected);

        let task = tokio::spawn(run_lifecycle(Arc::downgrade(inner), connection.events));
        if let Some(previous) = inner.lifecycle_slot().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// Tears the session down. Always ends `Disconnected`; transport errors
    /// are swallowed and no push data is delivered afterwards.
    pub async fn close(&self) {
        let inner = &self.inner;
        let previous = {
            let mut shared = inner.shared.write().await;
            let previous = shared.state;
            shared.state = SessionState::Disconnected;
            shared.executor = None;
            shared.session_id.clear();
            shared.registry.take();
            shared.pending.take();
            inner.hub.set_delivering(false);
            previous
        };

        if let Some(task) = inner.lifecycle_slot().take() {
            task.abort();
        }
        inner.push.close().await;

        if previous != SessionState::Disconnected {
            tracing::info!("session closed");
            inner.hub.notify_state(previous, SessionState::Disconnected);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub async fn state(&self) -> SessionState {
        self.inner.shared.read().await.state
    }

    /// Current transport session id; empty while disconnected.
    pub async fn session_id(&self) -> String {
        self.inner.shared.read().await.session_id.clone()
    }

    pub async fn subscribed_symbols(&self) -> Vec<String> {
        let shared = self.inner.shared.read().await;
        shared.registry.symbols().map(str::to_string).collect()
    }

    pub async fn subscribed_tables(&self) -> Vec<TradingTable> {
        self.inner.shared.read().await.registry.tables().collect()
    }

    pub async fn is_symbol_subscribed(&self, symbol: &str) -> bool {
        self.inner.shared.read().await.registry.contains_symbol(symbol)
    }

    pub async fn is_table_subscribed(&self, table: TradingTable) -> bool {
        self.inner.shared.read().await.registry.contains_table(table)
    }

    // ── Event surface ────────────────────────────────────────────────────

    /// Price updates of every subscribed symbol.
    pub fn on_price<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&PriceUpdate) + Send + Sync + 'static,
    {
        self.inner.hub.on_price(callback)
    }

    /// Pushed records of `E`'s table.
    pub fn on_table<E, F>(&self, callback: F) -> ObserverId
    where
        E: TableObservers,
        F: Fn(&TableUpdate<E>) + Send + Sync + 'static,
    {
        self.inner.hub.on_table::<E, F>(callback)
    }

    pub fn on_offer<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&TableUpdate<Offer>) + Send + Sync + 'static,
    {
        self.on_table::<Offer, F>(callback)
    }

    pub fn on_open_position<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&TableUpdate<OpenPosition>) + Send + Sync + 'static,
    {
        self.on_table::<OpenPosition, F>(callback)
    }

    pub fn on_closed_position<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&TableUpdate<ClosedPosition>) + Send + Sync + 'static,
    {
        self.on_table::<ClosedPosition, F>(callback)
    }

    pub fn on_order<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&TableUpdate<Order>) + Send + Sync + 'static,
    {
        self.on_table::<Order, F>(callback)
    }

    pub fn on_account<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&TableUpdate<Account>) + Send + Sync + 'static,
    {
        self.on_table::<Account, F>(callback)
    }

    pub fn on_summary<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&TableUpdate<Summary>) + Send + Sync + 'static,
    {
        self.on_table::<Summary, F>(callback)
    }

    pub fn on_state_change<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.inner.hub.on_state_change(callback)
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.inner.hub.remove(id)
    }

    // ── Crate-internal command plumbing ──────────────────────────────────

    /// Runs one command and fails unless the server executed it.
    pub(crate) async fn execute(
        &self,
        method: Method,
        resource: &str,
        params: &FormParams,
    ) -> Result<Value, SdkError> {
        let executor = self.inner.connected_executor().await?;
        executor.execute(method, resource, params).await
    }

    /// Runs one command without checking its envelope.
    pub(crate) async fn send(
        &self,
        method: Method,
        resource: &str,
        params: &FormParams,
    ) -> Result<Value, SdkError> {
        let executor = self.inner.connected_executor().await?;
        executor.send(method, resource, params).await
    }

    pub(crate) async fn register_symbol(&self, symbol: &str) {
        self.inner.register(Topic::Symbol(symbol)).await;
    }

    pub(crate) async fn unregister_symbol(&self, symbol: &str) {
        self.inner.unregister(Topic::Symbol(symbol)).await;
    }

    pub(crate) async fn register_table(&self, table: TradingTable) {
        self.inner.register(Topic::Table(table)).await;
    }

    pub(crate) async fn unregister_table(&self, table: TradingTable) {
        self.inner.unregister(Topic::Table(table)).await;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

// ─── Internals ───────────────────────────────────────────────────────────────

impl SessionInner {
    fn executor_for(&self, session_id: &str) -> RequestExecutor {
        RequestExecutor::new(
            Arc::clone(&self.commands),
            &self.config.host,
            session_id,
            &self.config.access_token,
            &self.config.user_agent,
        )
    }

    fn lifecycle_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn connected_executor(&self) -> Result<RequestExecutor, SdkError> {
        let shared = self.shared.read().await;
        match (shared.state, &shared.executor) {
            (SessionState::Connected, Some(executor)) => Ok(executor.clone()),
            (actual, _) => Err(SdkError::InvalidSessionState {
                expected: SessionState::Connected,
                actual,
            }),
        }
    }

    /// Records `topic` and binds its handler, once.
    async fn register(&self, topic: Topic<'_>) {
        let mut shared = self.shared.write().await;
        if shared.state == SessionState::Disconnected {
            return;
        }
        if topic.add_to(&mut shared.registry) {
            self.push.on(topic.name(), topic.handler(&self.hub)).await;
            tracing::debug!(topic = topic.name(), "topic registered");
        }
    }

    /// Forgets `topic`, including a replay of it still in flight.
    async fn unregister(&self, topic: Topic<'_>) {
        let mut shared = self.shared.write().await;
        let registered = topic.remove_from(&mut shared.registry);
        let pending = topic.remove_from(&mut shared.pending);
        if registered || pending {
            self.push.off(topic.name()).await;
            tracing::debug!(topic = topic.name(), "topic unregistered");
        }
    }

    async fn on_reconnecting(&self, attempt: u32) {
        let old = {
            let mut shared = self.shared.write().await;
            let old = shared.state;
            if old == SessionState::Disconnected {
                return;
            }
            shared.state = SessionState::Reconnecting;
            old
        };
        tracing::info!(attempt, "push stream reconnecting");
        self.hub.notify_state(old, SessionState::Reconnecting);
    }

    async fn on_reconnected(&self, session_id: String) {
        if session_id.is_empty() {
            tracing::warn!("reconnect reported without a session id; ignoring");
            return;
        }

        let (executor, previous) = {
            let mut shared = self.shared.write().await;
            if shared.state != SessionState::Reconnecting {
                tracing::debug!(state = %shared.state, "unexpected reconnect signal ignored");
                return;
            }
            let executor = self.executor_for(&session_id);
            shared.executor = Some(executor.clone());
            shared.session_id = session_id.clone();
            shared.state = SessionState::Connected;
            let previous = shared.registry.take();
            shared.pending = previous.clone();
            (executor, previous)
        };

        tracing::info!(session_id = %session_id, "push stream reconnected");
        self.hub
            .notify_state(SessionState::Reconnecting, SessionState::Connected);
        self.resubscribe(&executor, &session_id, previous).await;
    }

    async fn on_reconnect_failed(&self) {
        let old = {
            let mut shared = self.shared.write().await;
            let old = shared.state;
            if old == SessionState::Disconnected {
                return;
            }
            shared.state = SessionState::Disconnected;
            shared.executor = None;
            shared.session_id.clear();
            shared.pending.take();
            self.hub.set_delivering(false);

            let previous = shared.registry.take();
            for symbol in previous.symbols() {
                self.push.off(symbol).await;
            }
            for table in previous.tables() {
                self.push.off(table.as_str()).await;
            }
            old
        };

        tracing::warn!("push stream reconnect failed; session disconnected");
        self.hub.notify_state(old, SessionState::Disconnected);
    }

    /// Replays every topic of `previous`. Items fail independently; a
    /// failed item is left unregistered and its handler unbound.
    async fn resubscribe(
        &self,
        executor: &RequestExecutor,
        session_id: &str,
        previous: SubscriptionRegistry,
    ) {
        let topics = previous
            .symbols()
            .map(Topic::Symbol)
            .chain(previous.tables().map(Topic::Table));

        let (mut restored, mut failed) = (0usize, 0usize);
        for topic in topics {
            let (resource, params) = topic.subscribe_command();
            match executor.execute(Method::Post, resource, &params).await {
                Ok(_) => match self.restore(topic, session_id).await {
                    Some(true) => restored += 1,
                    Some(false) => {
                        tracing::debug!(topic = topic.name(), "unsubscribed during replay")
                    }
                    None => {
                        tracing::debug!(session_id, "session moved on; resubscription abandoned");
                        return;
                    }
                },
                Err(e) => {
                    failed += 1;
                    match topic {
                        Topic::Symbol(symbol) => {
                            tracing::warn!(symbol, error = %e, "symbol resubscription failed")
                        }
                        Topic::Table(table) => {
                            tracing::warn!(table = %table, error = %e, "table resubscription failed")
                        }
                    }
                    if !self.release(topic, session_id).await {
                        tracing::debug!(session_id, "session moved on; resubscription abandoned");
                        return;
                    }
                }
            }
        }
        tracing::info!(restored, failed, "resubscription finished");
    }

    /// Re-registers a replayed topic.
    ///
    /// `None` if the session has since closed or reconnected again,
    /// `Some(false)` if the topic was unsubscribed while its replay ran.
    async fn restore(&self, topic: Topic<'_>, session_id: &str) -> Option<bool> {
        let mut shared = self.shared.write().await;
        if shared.state != SessionState::Connected || shared.session_id != session_id {
            return None;
        }
        if !topic.remove_from(&mut shared.pending) {
            return Some(false);
        }
        if topic.add_to(&mut shared.registry) {
            self.push.on(topic.name(), topic.handler(&self.hub)).await;
        }
        Some(true)
    }

    /// Unbinds a topic whose replay failed, unless it was subscribed anew
    /// in the meantime. Returns `false` if the session moved on.
    async fn release(&self, topic: Topic<'_>, session_id: &str) -> bool {
        let mut shared = self.shared.write().await;
        if shared.state != SessionState::Connected || shared.session_id != session_id {
            return false;
        }
        topic.remove_from(&mut shared.pending);
        if !topic.is_registered(&shared.registry) {
            self.push.off(topic.name()).await;
        }
        true
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(task) = self.lifecycle_slot().take() {
            task.abort();
        }
    }
}

async fn run_lifecycle(inner: Weak<SessionInner>, mut events: mpsc::Receiver<LifecycleEvent>) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        match event {
            LifecycleEvent::Reconnecting { attempt } => inner.on_reconnecting(attempt).await,
            LifecycleEvent::Connected { session_id } => inner.on_reconnected(session_id).await,
            LifecycleEvent::ReconnectFailed => inner.on_reconnect_failed().await,
        }
    }
    tracing::debug!("lifecycle stream ended");
}
