//! Per-key memoizing loader.
//!
//! The cache never performs I/O itself. `select` either answers from memory or
//! hands out a [`FetchTicket`]; whoever owns the cache runs the fetch and feeds
//! the outcome back through [`FetchCache::complete`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

/// Claim on a single outstanding fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: String,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    /// Entry already cached, no fetch needed.
    Hit(Arc<V>),
    /// A fetch for this key is already outstanding.
    Pending,
    /// Caller must fetch and report back with this ticket.
    Miss(FetchTicket),
}

#[derive(Debug)]
pub enum Completion<E> {
    Stored,
    Failed(E),
    /// Ticket belongs to a cleared generation; nothing was applied.
    Stale,
}

#[derive(Debug)]
pub struct FetchCache<V> {
    entries: HashMap<String, Arc<V>>,
    in_flight: HashMap<String, u64>,
    generation: u64,
}

impl<V> Default for FetchCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FetchCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            generation: 0,
        }
    }

    pub fn select(&mut self, key: &str) -> CacheLookup<V> {
        if let Some(entry) = self.entries.get(key) {
            trace!(key, "cache hit");
            return CacheLookup::Hit(Arc::clone(entry));
        }

        if self.in_flight.contains_key(key) {
            trace!(key, "fetch already in flight");
            return CacheLookup::Pending;
        }

        self.in_flight.insert(key.to_string(), self.generation);
        debug!(key, generation = self.generation, "cache miss, issuing fetch");

        CacheLookup::Miss(FetchTicket {
            key: key.to_string(),
            generation: self.generation,
        })
    }

    /// Apply the outcome of a fetch. Successful results are written
    /// last-write-wins; failures leave the cache untouched so the next
    /// `select` fetches again.
    pub fn complete<E>(&mut self, ticket: FetchTicket, result: Result<V, E>) -> Completion<E> {
        if ticket.generation != self.generation {
            debug!(
                key = %ticket.key,
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding completion from cleared cache"
            );
            return Completion::Stale;
        }

        self.in_flight.remove(&ticket.key);

        match result {
            Ok(value) => {
                self.entries.insert(ticket.key, Arc::new(value));
                Completion::Stored
            }
            Err(e) => Completion::Failed(e),
        }
    }

    /// Drop every entry and outstanding claim. Tickets issued before this call
    /// complete as [`Completion::Stale`].
    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
        self.generation += 1;
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
