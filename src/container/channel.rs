use std::sync::{Arc, OnceLock};

use indexmap::map::Entry as MapEntry;
use indexmap::IndexMap;
use parking_lot::RwLock;

use super::Provider;
use crate::consumer::ConsumerId;

struct Entry<C, S: ?Sized> {
    provider: Provider<C, S>,
    resolved: OnceLock<Arc<S>>,
}

impl<C, S: ?Sized> Entry<C, S> {
    fn get(&self, container: &C) -> Option<Arc<S>> {
        match &self.provider {
            Provider::Instance(view) => Some(view.clone()),
            Provider::Deferred(factory) => {
                if let Some(view) = self.resolved.get() {
                    return Some(view.clone());
                }
                let view = factory(container)?;
                Some(self.resolved.get_or_init(|| view).clone())
            }
        }
    }
}

/// Set of consumers registered under one capability view, keyed by identity.
pub struct Channel<C, S: ?Sized> {
    entries: RwLock<IndexMap<ConsumerId, Arc<Entry<C, S>>>>,
}

impl<C, S: ?Sized> Channel<C, S> {
    pub fn new() -> Self {
        Self { entries: RwLock::new(IndexMap::new()) }
    }

    pub fn insert_if_absent(&self, id: ConsumerId, provider: Provider<C, S>) -> bool {
        match self.entries.write().entry(id) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(slot) => {
                slot.insert(Arc::new(Entry { provider, resolved: OnceLock::new() }));
                true
            }
        }
    }

    pub fn contains(&self, id: &ConsumerId) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Resolves all entries. Deferred providers run outside the lock so they
    /// may call back into the container.
    pub fn resolve(&self, container: &C) -> Vec<Arc<S>> {
        let entries: Vec<_> = self.entries.read().values().cloned().collect();
        entries.iter().filter_map(|entry| entry.get(container)).collect()
    }
}

impl<C, S: ?Sized> Default for Channel<C, S> {
    fn default() -> Self {
        Self::new()
    }
}
