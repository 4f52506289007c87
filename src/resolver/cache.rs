use std::collections::HashMap;
use std::sync::Arc;

use super::CacheKey;
use super::package::Package;

/// Process-lifetime map of resolved root packages keyed by `CacheKey`.
///
/// Not internally synchronized: the owning suggester guards it with the same
/// lock that serializes the whole suggestion pipeline. Entries are never
/// replaced or evicted; only `clear` (reinitialization) drops them.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    inner: HashMap<CacheKey, Package>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Package> {
        self.inner.get(key).cloned()
    }

    /// Insert unless the key is already present. Returns the stored handle.
    pub fn insert(&mut self, key: CacheKey, package: Package) -> Package {
        Arc::clone(self.inner.entry(key).or_insert(package))
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
