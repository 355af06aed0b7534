//! Caller-registered callbacks and their delivery.
//!
//! Each event kind has an [`ObserverSet`]: a copy-on-write list of
//! callbacks. Delivery iterates a snapshot taken under a short read lock,
//! so adding or removing a callback never waits on, or disturbs, a
//! delivery in progress. A removed callback may still see the event that
//! was being delivered when it was removed.

use crate::domain::price::PriceUpdate;
use crate::domain::table::{
    Account, ClosedPosition, Offer, OpenPosition, Order, Summary, TableEntity, TableUpdate,
};
use crate::shared::SessionState;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Handle returned by every `on_*` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Copy-on-write callback list.
pub struct ObserverSet<T> {
    observers: RwLock<Arc<Vec<(ObserverId, Callback<T>)>>>,
}

impl<T> Default for ObserverSet<T> {
    fn default() -> Self {
        Self {
            observers: RwLock::new(Arc::new(Vec::new())),
        }
    }
}

impl<T> ObserverSet<T> {
    fn add(&self, id: ObserverId, callback: Callback<T>) {
        let mut guard = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push((id, callback));
        *guard = Arc::new(next);
    }

    /// Returns `true` if `id` was registered here.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut guard = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        let next: Vec<_> = guard
            .iter()
            .filter(|(existing, _)| *existing != id)
            .cloned()
            .collect();
        *guard = Arc::new(next);
        true
    }

    pub fn notify(&self, value: &T) {
        let snapshot = Arc::clone(&self.observers.read().unwrap_or_else(PoisonError::into_inner));
        for (_, callback) in snapshot.iter() {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A session state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub old: SessionState,
    pub new: SessionState,
}

// ─── EventHub ────────────────────────────────────────────────────────────────

/// Every observer set of one session.
#[derive(Default)]
pub struct EventHub {
    next_id: AtomicU64,
    /// Push data is only delivered while set; cleared on close.
    delivering: AtomicBool,
    prices: ObserverSet<PriceUpdate>,
    offers: ObserverSet<TableUpdate<Offer>>,
    open_positions: ObserverSet<TableUpdate<OpenPosition>>,
    closed_positions: ObserverSet<TableUpdate<ClosedPosition>>,
    orders: ObserverSet<TableUpdate<Order>>,
    accounts: ObserverSet<TableUpdate<Account>>,
    summaries: ObserverSet<TableUpdate<Summary>>,
    state_changes: ObserverSet<StateChange>,
}

/// Table entities with an observer set in [`EventHub`].
pub trait TableObservers: TableEntity {
    fn observers(hub: &EventHub) -> &ObserverSet<TableUpdate<Self>>;
}

macro_rules! table_observers {
    ($($entity:ty => $field:ident),* $(,)?) => {
        $(
            impl TableObservers for $entity {
                fn observers(hub: &EventHub) -> &ObserverSet<TableUpdate<Self>> {
                    &hub.$field
                }
            }
        )*
    };
}

table_observers! {
    Offer => offers,
    OpenPosition => open_positions,
    ClosedPosition => closed_positions,
    Order => orders,
    Account => accounts,
    Summary => summaries,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ObserverId {
        ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn on_price<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&PriceUpdate) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.prices.add(id, Arc::new(callback));
        id
    }

    pub fn on_table<E, F>(&self, callback: F) -> ObserverId
    where
        E: TableObservers,
        F: Fn(&TableUpdate<E>) + Send + Sync + 'static,
    {
        let id = self.next_id();
        E::observers(self).add(id, Arc::new(callback));
        id
    }

    pub fn on_state_change<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changes.add(id, Arc::new(callback));
        id
    }

    /// Unregisters `id` from whichever set holds it.
    pub fn remove(&self, id: ObserverId) -> bool {
        self.prices.remove(id)
            || self.offers.remove(id)
            || self.open_positions.remove(id)
            || self.closed_positions.remove(id)
            || self.orders.remove(id)
            || self.accounts.remove(id)
            || self.summaries.remove(id)
            || self.state_changes.remove(id)
    }

    pub(crate) fn set_delivering(&self, on: bool) {
        self.delivering.store(on, Ordering::SeqCst);
    }

    pub(crate) fn is_delivering(&self) -> bool {
        self.delivering.load(Ordering::SeqCst)
    }

    pub(crate) fn notify_price(&self, update: &PriceUpdate) {
        self.prices.notify(update);
    }

    pub(crate) fn notify_table<E: TableObservers>(&self, update: &TableUpdate<E>) {
        E::observers(self).notify(update);
    }

    /// No-op when `old == new`.
    pub(crate) fn notify_state(&self, old: SessionState, new: SessionState) {
        if old != new {
            self.state_changes.notify(&StateChange { old, new });
        }
    }
}
