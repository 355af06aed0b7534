//! Bookkeeping of subscribed price symbols and trading tables.

use crate::shared::TradingTable;
use std::collections::BTreeSet;

/// Two idempotent sets: price symbols and trading tables.
///
/// Holds no lock of its own; the session keeps it under the same lock as
/// the state and the session id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionRegistry {
    symbols: BTreeSet<String>,
    tables: BTreeSet<TradingTable>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the symbol was not registered yet.
    pub fn add_symbol(&mut self, symbol: &str) -> bool {
        self.symbols.insert(symbol.to_string())
    }

    /// Returns `true` if the symbol was registered.
    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        self.symbols.remove(symbol)
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn add_table(&mut self, table: TradingTable) -> bool {
        self.tables.insert(table)
    }

    pub fn remove_table(&mut self, table: TradingTable) -> bool {
        self.tables.remove(&table)
    }

    pub fn contains_table(&self, table: TradingTable) -> bool {
        self.tables.contains(&table)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = TradingTable> + '_ {
        self.tables.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len() + self.tables.len()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Moves the contents out, leaving the registry empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}
