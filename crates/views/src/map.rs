//! MapView: associative-map semantics over a remote hash key
//!
//! ## Design
//!
//! MapView is a stateless adapter over a store handle. It holds no cached
//! data: an `Arc` to the store, the key name, and the two codecs. Every
//! read and write is a round trip; the only local buffers are the
//! snapshots backing [`MapView::iter`] and [`MapView::copy_to`].
//!
//! ## Thread Safety
//!
//! MapView is `Send + Sync` when the store is, and clones cheaply.
//! Multiple views over the same key are safe; serialization of concurrent
//! access is delegated entirely to the store's per-command atomicity.

use std::sync::Arc;

use kvlens_core::{Error, HashCommands, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::serializer::{json_codec, string_codec, SharedSerializer};

/// Associative map over a remote hash key
///
/// Field keys are unique; setting an existing key overwrites (last write
/// wins). Insertion order is not preserved.
///
/// # Example
///
/// ```ignore
/// use kvlens_views::MapView;
/// use kvlens_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let map = MapView::strings(store, "session:42");
/// map.set(&"user".to_string(), &"alice".to_string())?;
/// assert_eq!(map.get(&"user".to_string())?, "alice");
/// ```
pub struct MapView<S, K, V> {
    store: Arc<S>,
    key: String,
    key_codec: SharedSerializer<K>,
    value_codec: SharedSerializer<V>,
}

impl<S, K, V> Clone for MapView<S, K, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            key_codec: Arc::clone(&self.key_codec),
            value_codec: Arc::clone(&self.value_codec),
        }
    }
}

impl<S, K, V> MapView<S, K, V> {
    /// Open a map view over `key` with explicit codecs
    pub fn new(
        store: Arc<S>,
        key: impl Into<String>,
        key_codec: SharedSerializer<K>,
        value_codec: SharedSerializer<V>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            key_codec,
            value_codec,
        }
    }

    /// The store key this view addresses
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shared store handle
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S> MapView<S, String, String> {
    /// Open a map view with plain string keys and values
    pub fn strings(store: Arc<S>, key: impl Into<String>) -> Self {
        Self::new(store, key, string_codec(), string_codec())
    }
}

impl<S, K, V> MapView<S, K, V>
where
    K: Serialize + DeserializeOwned + 'static,
    V: Serialize + DeserializeOwned + 'static,
{
    /// Open a map view using the generic JSON codec for both slots
    pub fn json(store: Arc<S>, key: impl Into<String>) -> Self {
        Self::new(store, key, json_codec(), json_codec())
    }
}

impl<S: HashCommands, K, V> MapView<S, K, V> {
    /// Fetch the value stored under `key`
    ///
    /// Fails with `Error::NotFound` when the field is absent. One field-get
    /// command.
    pub fn get(&self, key: &K) -> Result<V> {
        let field = self.key_codec.serialize(key)?;
        match self.store.hash_get(&self.key, &field)? {
            Some(raw) => self.value_codec.deserialize(&raw),
            None => Err(Error::NotFound(format!(
                "field '{field}' in hash '{}'",
                self.key
            ))),
        }
    }

    /// Fetch the value under `key`, or `None` when absent
    ///
    /// Composed from an existence check plus a get: two round trips, not
    /// atomic. A concurrent delete between the two commands yields a
    /// spurious `Ok(None)` rather than an error.
    pub fn try_get(&self, key: &K) -> Result<Option<V>> {
        if !self.contains_key(key)? {
            return Ok(None);
        }
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create or overwrite the value under `key`
    pub fn set(&self, key: &K, value: &V) -> Result<()> {
        let field = self.key_codec.serialize(key)?;
        let raw = self.value_codec.serialize(value)?;
        self.store.hash_set(&self.key, &field, &raw)?;
        Ok(())
    }

    /// Test whether `key` is present. One existence command.
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        let field = self.key_codec.serialize(key)?;
        self.store.hash_exists(&self.key, &field)
    }

    /// Remove `key`. Returns whether a field was actually removed.
    pub fn remove(&self, key: &K) -> Result<bool> {
        let field = self.key_codec.serialize(key)?;
        self.store.hash_delete(&self.key, &field)
    }

    /// All keys, decoded, as a fully materialized vec
    pub fn keys(&self) -> Result<Vec<K>> {
        self.store
            .hash_fields(&self.key)?
            .iter()
            .map(|raw| self.key_codec.deserialize(raw))
            .collect()
    }

    /// All values, decoded, as a fully materialized vec
    pub fn values(&self) -> Result<Vec<V>> {
        self.store
            .hash_values(&self.key)?
            .iter()
            .map(|raw| self.value_codec.deserialize(raw))
            .collect()
    }

    /// All (key, value) pairs, decoded
    pub fn entries(&self) -> Result<Vec<(K, V)>> {
        self.store
            .hash_entries(&self.key)?
            .iter()
            .map(|(f, v)| {
                Ok((
                    self.key_codec.deserialize(f)?,
                    self.value_codec.deserialize(v)?,
                ))
            })
            .collect()
    }

    /// Number of fields in the hash. One length command.
    pub fn len(&self) -> Result<u64> {
        self.store.hash_len(&self.key)
    }

    /// Whether the hash holds no fields
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete the entire store key, removing every field at once
    pub fn clear(&self) -> Result<()> {
        trace!(key = %self.key, "clearing hash key");
        self.store.key_delete(&self.key)?;
        Ok(())
    }

    /// Append every decoded (key, value) pair to `buf`
    pub fn copy_to(&self, buf: &mut Vec<(K, V)>) -> Result<()> {
        buf.extend(self.entries()?);
        Ok(())
    }

    /// Snapshot iterator over decoded (key, value) pairs
    ///
    /// The raw pairs are fetched once, here; decoding happens lazily per
    /// step. Mutations made after this call are invisible to the returned
    /// iterator.
    pub fn iter(&self) -> Result<MapIter<K, V>> {
        let entries = self.store.hash_entries(&self.key)?;
        Ok(MapIter {
            entries: entries.into_iter(),
            key_codec: Arc::clone(&self.key_codec),
            value_codec: Arc::clone(&self.value_codec),
        })
    }
}

impl<S: HashCommands, K, V: PartialEq> MapView<S, K, V> {
    /// Test whether `key` is present with exactly `value`
    ///
    /// Key lookup plus equality on the decoded value.
    pub fn contains_entry(&self, key: &K, value: &V) -> Result<bool> {
        Ok(self.try_get(key)?.is_some_and(|v| &v == value))
    }

    /// Remove `key` only if it currently holds `value`
    ///
    /// Read-then-act: not atomic under concurrent writers to the same
    /// field.
    pub fn remove_entry(&self, key: &K, value: &V) -> Result<bool> {
        if !self.contains_entry(key, value)? {
            return Ok(false);
        }
        self.remove(key)
    }
}

/// Snapshot iterator over a map view's (key, value) pairs
///
/// Items are `Result` because decoding is deferred until each step.
pub struct MapIter<K, V> {
    entries: std::vec::IntoIter<(String, String)>,
    key_codec: SharedSerializer<K>,
    value_codec: SharedSerializer<V>,
}

impl<K, V> Iterator for MapIter<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (field, raw) = self.entries.next()?;
        Some(
            self.key_codec
                .deserialize(&field)
                .and_then(|k| Ok((k, self.value_codec.deserialize(&raw)?))),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}
