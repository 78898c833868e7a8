//! Ordered map wrapper that never auto-creates entries.
//!
//! `SyncMap` is the backing store of every keyed router table. It is a
//! `BTreeMap` underneath so the table order is total and stable, which is
//! what makes first/next paging work:
//!
//! - `get()` / `get_mut()` return `Option` and never insert
//! - `increment_ref()` / `decrement_ref()` fail on missing keys instead of
//!   creating a zero entry
//! - `page_first()` / `page_after()` copy out a page in key order

use std::collections::BTreeMap;
use std::ops::Bound;
use thiserror::Error;

/// Error type for SyncMap operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncMapError {
    #[error("Key not found")]
    KeyNotFound,

    #[error("Reference count underflow")]
    RefCountUnderflow,
}

/// Trait for table values that other tables reference.
pub trait HasRefCount {
    /// Increments the reference count and returns the new value.
    fn increment_ref(&mut self) -> u32;

    /// Decrements the reference count and returns the new value.
    ///
    /// Returns `None` if the count would underflow.
    fn decrement_ref(&mut self) -> Option<u32>;

    fn ref_count(&self) -> u32;
}

/// An ordered map that never creates entries implicitly.
#[derive(Debug, Clone)]
pub struct SyncMap<K, V> {
    inner: BTreeMap<K, V>,
}

impl<K, V> SyncMap<K, V>
where
    K: Ord,
{
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns `None` if the key is not present. **Never creates entries.**
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    /// Returns `None` if the key is not present. **Never creates entries.**
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    /// Returns the old value if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Keeps only the entries for which `f` returns true.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.inner.retain(f);
    }

    /// Iterates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.inner.values_mut()
    }

    /// Iterates over the entries strictly after `key`, in key order.
    ///
    /// `key` does not have to be present.
    pub fn iter_after<'a>(&'a self, key: &'a K) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.inner.range((Bound::Excluded(key), Bound::Unbounded))
    }
}

impl<K, V> SyncMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    /// Copies out the first `count` entries in key order.
    pub fn page_first(&self, count: usize) -> Vec<(K, V)> {
        self.inner
            .iter()
            .take(count)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copies out up to `count` entries strictly after `after`.
    ///
    /// Paging with the last key of the previous page never repeats or skips
    /// an entry as long as the table is not modified between calls.
    pub fn page_after(&self, after: &K, count: usize) -> Vec<(K, V)> {
        self.iter_after(after)
            .take(count)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K, V> SyncMap<K, V>
where
    K: Ord,
    V: HasRefCount,
{
    /// Increments the reference count for the given key.
    ///
    /// **This never creates entries.**
    pub fn increment_ref(&mut self, key: &K) -> Result<u32, SyncMapError> {
        match self.inner.get_mut(key) {
            Some(entry) => Ok(entry.increment_ref()),
            None => Err(SyncMapError::KeyNotFound),
        }
    }

    /// Decrements the reference count for the given key.
    pub fn decrement_ref(&mut self, key: &K) -> Result<u32, SyncMapError> {
        match self.inner.get_mut(key) {
            Some(entry) => entry
                .decrement_ref()
                .ok_or(SyncMapError::RefCountUnderflow),
            None => Err(SyncMapError::KeyNotFound),
        }
    }

    /// Returns `None` if the key is not found.
    pub fn ref_count(&self, key: &K) -> Option<u32> {
        self.inner.get(key).map(|e| e.ref_count())
    }
}

impl<K, V> Default for SyncMap<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for SyncMap<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct Referenced {
        ref_count: u32,
    }

    impl HasRefCount for Referenced {
        fn increment_ref(&mut self) -> u32 {
            self.ref_count += 1;
            self.ref_count
        }

        fn decrement_ref(&mut self) -> Option<u32> {
            if self.ref_count == 0 {
                None
            } else {
                self.ref_count -= 1;
                Some(self.ref_count)
            }
        }

        fn ref_count(&self) -> u32 {
            self.ref_count
        }
    }

    fn keys(page: &[(u32, u32)]) -> Vec<u32> {
        page.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_get_never_creates() {
        let mut map: SyncMap<u32, u32> = SyncMap::new();
        assert!(map.get(&1).is_none());
        assert!(map.get_mut(&1).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_iteration_is_ordered() {
        let map: SyncMap<u32, u32> = [(30, 0), (10, 0), (20, 0)].into_iter().collect();
        let ordered: Vec<u32> = map.keys().copied().collect();
        assert_eq!(ordered, vec![10, 20, 30]);
    }

    #[test]
    fn test_pages_are_disjoint_and_cover_table() {
        let map: SyncMap<u32, u32> = (0..10).map(|k| (k * 2, k)).collect();

        let mut seen = Vec::new();
        let mut page = map.page_first(3);
        while !page.is_empty() {
            seen.extend(keys(&page));
            let last = page[page.len() - 1].0;
            page = map.page_after(&last, 3);
        }
        assert_eq!(seen, (0..10).map(|k| k * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_page_after_missing_cursor() {
        let map: SyncMap<u32, u32> = [(1, 0), (5, 0), (9, 0)].into_iter().collect();
        assert_eq!(keys(&map.page_after(&4, 10)), vec![5, 9]);
        assert_eq!(keys(&map.page_after(&9, 10)), Vec::<u32>::new());
        assert_eq!(keys(&map.page_after(&0, 1)), vec![1]);
    }

    #[test]
    fn test_ref_counts_require_existing_key() {
        let mut map: SyncMap<u32, Referenced> = SyncMap::new();
        assert_eq!(map.increment_ref(&1), Err(SyncMapError::KeyNotFound));

        map.insert(1, Referenced { ref_count: 0 });
        assert_eq!(map.decrement_ref(&1), Err(SyncMapError::RefCountUnderflow));
        assert_eq!(map.increment_ref(&1), Ok(1));
        assert_eq!(map.increment_ref(&1), Ok(2));
        assert_eq!(map.decrement_ref(&1), Ok(1));
        assert_eq!(map.ref_count(&1), Some(1));
    }

    #[test]
    fn test_retain() {
        let mut map: SyncMap<u32, u32> = (0..6).map(|k| (k, k % 2)).collect();
        map.retain(|_, v| *v == 0);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
    }
}
