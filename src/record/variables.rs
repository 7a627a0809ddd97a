//! The transient variable cache of a record
//!
//! Process-local companion of the metadata store: the same key space, but
//! holding deserialized rich objects instead of strings. It is never
//! persisted; a rehydrated record starts with an empty cache and refills it
//! on demand. See [`crate::record::CrawlRecord::get_cached_json`] for the
//! two-tier read/write contract.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Process-local key -> object cache, discarded with the record instance
#[derive(Default)]
pub struct Variables(HashMap<String, Box<dyn Any + Send + Sync>>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached object under `name` if it exists and has type `T`
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.0.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn set<T: 'static + Send + Sync>(&mut self, name: &str, value: T) {
        self.0.insert(name.to_string(), Box::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Removes the object under `name`; returns whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}
