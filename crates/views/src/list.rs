//! ListView: indexable-sequence semantics over a remote list key
//!
//! ## Design
//!
//! Same stateless-adapter shape as the map view: an `Arc` to the store,
//! the key name, one codec. Positions are zero-based from the head;
//! duplicate values are permitted.
//!
//! ## Value-addressed mutation
//!
//! The store's insert-before and remove primitives address items by
//! value, not position. [`ListView::insert`], [`ListView::remove`], and
//! [`ListView::remove_at`] therefore resolve a position to its stored
//! value first and are exact only when values are unique or the store
//! tie-breaks on the leftmost occurrence. Each such method documents the
//! caveat.

use std::sync::Arc;

use kvlens_core::{Error, ListCommands, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::serializer::{json_codec, string_codec, SharedSerializer};

/// Indexable sequence over a remote list key
///
/// # Example
///
/// ```ignore
/// use kvlens_views::ListView;
/// use kvlens_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let jobs = ListView::strings(store, "jobs:pending");
/// jobs.push(&"resize".to_string())?;
/// assert_eq!(jobs.get(0)?, "resize");
/// ```
pub struct ListView<S, T> {
    store: Arc<S>,
    key: String,
    codec: SharedSerializer<T>,
}

impl<S, T> Clone for ListView<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<S, T> ListView<S, T> {
    /// Open a list view over `key` with an explicit codec
    pub fn new(store: Arc<S>, key: impl Into<String>, codec: SharedSerializer<T>) -> Self {
        Self {
            store,
            key: key.into(),
            codec,
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

impl<S> ListView<S, String> {
    /// Open a list view of plain strings
    pub fn strings(store: Arc<S>, key: impl Into<String>) -> Self {
        Self::new(store, key, string_codec())
    }
}

impl<S, T> ListView<S, T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Open a list view using the generic JSON codec
    pub fn json(store: Arc<S>, key: impl Into<String>) -> Self {
        Self::new(store, key, json_codec())
    }
}

impl<S: ListCommands, T> ListView<S, T> {
    /// Fetch the item at `index`
    ///
    /// The store yields a null sentinel for an out-of-range index; this
    /// adapter translates it to `Error::NotFound` rather than leaking it.
    pub fn get(&self, index: usize) -> Result<T> {
        match self.store.list_index(&self.key, index as i64)? {
            Some(raw) => self.codec.deserialize(&raw),
            None => Err(Error::NotFound(format!(
                "index {index} in list '{}'",
                self.key
            ))),
        }
    }

    /// Overwrite the item at `index`
    ///
    /// Fails with `Error::NotFound` when the index is out of range.
    pub fn set(&self, index: usize, item: &T) -> Result<()> {
        let raw = self.codec.serialize(item)?;
        self.store.list_set(&self.key, index as i64, &raw)
    }

    /// Append an item to the tail
    pub fn push(&self, item: &T) -> Result<()> {
        let raw = self.codec.serialize(item)?;
        self.store.list_push_back(&self.key, &raw)?;
        Ok(())
    }

    /// Insert an item at `index`, shifting later items toward the tail
    ///
    /// An `index` at or past the end degenerates to an append. Otherwise
    /// the current item at `index` is fetched as a pivot and the store
    /// inserts before its leftmost occurrence; with duplicate values the
    /// insertion point may be an earlier occurrence than `index`.
    /// Read-then-act: a concurrent mutation between the pivot fetch and
    /// the insert can shift the insertion point.
    pub fn insert(&self, index: usize, item: &T) -> Result<()> {
        let raw = self.codec.serialize(item)?;
        if index as u64 >= self.store.list_len(&self.key)? {
            self.store.list_push_back(&self.key, &raw)?;
            return Ok(());
        }
        let pivot = self
            .store
            .list_index(&self.key, index as i64)?
            .ok_or_else(|| Error::NotFound(format!("index {index} in list '{}'", self.key)))?;
        match self.store.list_insert_before(&self.key, &pivot, &raw)? {
            Some(_) => Ok(()),
            // Pivot vanished between the two commands.
            None => Err(Error::NotFound(format!(
                "index {index} in list '{}'",
                self.key
            ))),
        }
    }

    /// Remove the item at `index`
    ///
    /// Fetches the stored value at that position and removes one
    /// occurrence of it by value; with duplicates the removed occurrence
    /// is the leftmost, which may not be the one at `index`.
    pub fn remove_at(&self, index: usize) -> Result<()> {
        let raw = self
            .store
            .list_index(&self.key, index as i64)?
            .ok_or_else(|| Error::NotFound(format!("index {index} in list '{}'", self.key)))?;
        self.store.list_remove(&self.key, 1, &raw)?;
        Ok(())
    }

    /// Number of items in the list. One length command.
    pub fn len(&self) -> Result<u64> {
        self.store.list_len(&self.key)
    }

    /// Whether the list holds no items
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete the entire store key
    pub fn clear(&self) -> Result<()> {
        trace!(key = %self.key, "clearing list key");
        self.store.key_delete(&self.key)?;
        Ok(())
    }

    /// Append every decoded item to `buf`, head first
    pub fn copy_to(&self, buf: &mut Vec<T>) -> Result<()> {
        for raw in self.store.list_range(&self.key, 0, -1)? {
            buf.push(self.codec.deserialize(&raw)?);
        }
        Ok(())
    }

    /// Snapshot iterator over decoded items in positional order
    ///
    /// One bulk range fetch happens here; decoding is lazy per step.
    /// Mutations after this call are invisible to the returned iterator.
    pub fn iter(&self) -> Result<SequenceIter<T>> {
        let values = self.store.list_range(&self.key, 0, -1)?;
        Ok(SequenceIter::new(values, Arc::clone(&self.codec)))
    }
}

impl<S: ListCommands, T: PartialEq> ListView<S, T> {
    /// Position of the first item equal to `item`, by linear scan
    ///
    /// Fully materializes the list and compares decoded values: O(n).
    pub fn index_of(&self, item: &T) -> Result<Option<usize>> {
        for (pos, raw) in self.store.list_range(&self.key, 0, -1)?.iter().enumerate() {
            if &self.codec.deserialize(raw)? == item {
                return Ok(Some(pos));
            }
        }
        Ok(None)
    }

    /// Whether any item equals `item`. O(n) linear scan.
    pub fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.index_of(item)?.is_some())
    }

    /// Remove the first item equal to `item`
    ///
    /// Locates the item by linear scan, then removes the stored value at
    /// that position by value. At most one occurrence is removed; returns
    /// whether anything was.
    pub fn remove(&self, item: &T) -> Result<bool> {
        let Some(index) = self.index_of(item)? else {
            return Ok(false);
        };
        // Remove the raw string actually stored there, not a re-encoding
        // of `item`; codecs need not be byte-stable across equal values.
        let Some(raw) = self.store.list_index(&self.key, index as i64)? else {
            return Ok(false);
        };
        Ok(self.store.list_remove(&self.key, 1, &raw)? > 0)
    }
}

/// Snapshot iterator over a sequence view's items
///
/// Shared by the list and scored-set views: the raw values are captured
/// eagerly at creation and decoded lazily per step, so items are
/// `Result`.
pub struct SequenceIter<T> {
    values: std::vec::IntoIter<String>,
    codec: SharedSerializer<T>,
}

impl<T> SequenceIter<T> {
    pub(crate) fn new(values: Vec<String>, codec: SharedSerializer<T>) -> Self {
        Self {
            values: values.into_iter(),
            codec,
        }
    }
}

impl<T> Iterator for SequenceIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.values.next()?;
        Some(self.codec.deserialize(&raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}
