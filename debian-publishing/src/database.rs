// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Key-value persistence.

The published-archive registry persists its entities through the narrow
[KeyValueStore] contract. Production deployments plug in their own backend;
[MemoryStore] covers tests and embedding.
*/

use {
    crate::error::Result,
    std::{
        collections::BTreeMap,
        ops::Bound,
        sync::RwLock,
    },
};

/// Minimal key-value persistence contract.
pub trait KeyValueStore {
    /// Fetch the values of all keys beginning with `prefix`.
    fn fetch_by_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>>;

    /// Store a value under a key, overwriting any existing value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn fetch_by_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        (**self).fetch_by_prefix(prefix)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        (**self).delete(key)
    }
}

/// In-memory, sorted-map-based [KeyValueStore].
///
/// Intended for tests and embedding. Entries are held behind a `RwLock` so
/// the store can be shared by reference.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Fetch a single value.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries
            .read()
            .expect("lock poisoned")
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn fetch_by_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        let entries = self.entries.read().expect("lock poisoned");

        entries
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect()
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_vec(), value.to_vec());

        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.entries.write().expect("lock poisoned").remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store = MemoryStore::new();

        store.put(b"Ufoo>>bar", b"value").unwrap();
        assert_eq!(store.get(b"Ufoo>>bar").as_deref(), Some(&b"value"[..]));
        assert_eq!(store.len(), 1);

        store.delete(b"Ufoo>>bar").unwrap();
        assert!(store.is_empty());

        // deleting an absent key is fine
        store.delete(b"Ufoo>>bar").unwrap();
    }

    #[test]
    fn fetch_by_prefix_is_a_range_scan() {
        let store = MemoryStore::new();
        store.put(b"T0", b"other").unwrap();
        store.put(b"Ua>>x", b"1").unwrap();
        store.put(b"Ub>>y", b"2").unwrap();
        store.put(b"V9", b"later").unwrap();

        let values = store.fetch_by_prefix(b"U");
        assert_eq!(values, vec![b"1".to_vec(), b"2".to_vec()]);

        assert!(store.fetch_by_prefix(b"W").is_empty());
    }
}
