//! Named capability registry.
//!
//! Maps a capability name to a typed handle. Names are unique: registering a
//! name twice is an error and leaves the first registration in place.

use indexmap::IndexMap;

use crate::error::{Result, TinaError};

#[derive(Debug)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Registry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `name`.
    ///
    /// # Errors
    /// Returns [`TinaError::DuplicateCapability`] if `name` is already taken.
    pub fn register(&mut self, name: impl Into<String>, handle: T) -> Result<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(TinaError::DuplicateCapability(name));
        }
        self.entries.insert(name, handle);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
