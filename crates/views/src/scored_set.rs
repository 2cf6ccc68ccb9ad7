//! ScoredSetView: score-ordered sequence over a remote sorted set key
//!
//! ## Score identity
//!
//! Every item carries its own numeric score via the [`Scored`] trait.
//! The score determines both the sort order and, together with the
//! serialized value, the item's identity for update and removal: a value
//! may appear more than once when stored at different scores, and
//! rescoring an item means removing the old (value, score) entry and
//! adding a new one.
//!
//! ## Dual addressing
//!
//! Items can be addressed by rank (zero-based position in ascending score
//! order) for reads and removal, or by score for lookup and replacement.
//! Rank has no stable meaning for insertion into a structure ordered by
//! score, so indexed set and positional insert fail with
//! `Error::Unsupported`; use [`ScoredSetView::add`] or
//! [`ScoredSetView::add_or_replace`].
//!
//! ## Tie order
//!
//! Members sharing an identical score order by the store's own rule for
//! the serialized value. This layer does not specify it; consult the
//! backing store's documentation.

use std::sync::Arc;

use kvlens_core::{Error, Result, SortedSetCommands};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::list::SequenceIter;
use crate::serializer::{json_codec, SharedSerializer};

/// An item that carries its own ordering score
pub trait Scored {
    /// The numeric score that positions this item in the set
    fn score(&self) -> f64;
}

/// Score-ordered sequence over a remote sorted set key
///
/// # Example
///
/// ```ignore
/// use kvlens_views::{Scored, ScoredSetView};
/// use kvlens_store::MemoryStore;
/// use serde::{Deserialize, Serialize};
/// use std::sync::Arc;
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Entry { name: String, priority: f64 }
///
/// impl Scored for Entry {
///     fn score(&self) -> f64 { self.priority }
/// }
///
/// let store = Arc::new(MemoryStore::new());
/// let queue: ScoredSetView<MemoryStore, Entry> = ScoredSetView::json(store, "queue");
/// queue.add(&Entry { name: "first".into(), priority: 1.0 })?;
/// ```
pub struct ScoredSetView<S, T> {
    store: Arc<S>,
    key: String,
    codec: SharedSerializer<T>,
}

impl<S, T> Clone for ScoredSetView<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<S, T> ScoredSetView<S, T> {
    /// Open a scored set view over `key` with an explicit codec
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

impl<S, T> ScoredSetView<S, T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Open a scored set view using the generic JSON codec
    pub fn json(store: Arc<S>, key: impl Into<String>) -> Self {
        Self::new(store, key, json_codec())
    }
}

impl<S: SortedSetCommands, T: Scored> ScoredSetView<S, T> {
    /// Store the item at its own score
    ///
    /// An identical serialized value already stored at a different score
    /// stays; at the same serialized value the store rescores it.
    pub fn add(&self, item: &T) -> Result<()> {
        let raw = self.codec.serialize(item)?;
        self.store.zset_add(&self.key, &raw, item.score())?;
        Ok(())
    }

    /// Remove whatever is stored at exactly the item's score, then add
    ///
    /// Enforces "one item per score". Two commands, not atomic: a
    /// concurrent writer targeting the same score between them can leave
    /// both items present or the wrong one removed.
    pub fn add_or_replace(&self, item: &T) -> Result<()> {
        let score = item.score();
        let evicted = self
            .store
            .zset_remove_range_by_score(&self.key, score, score)?;
        if evicted > 0 {
            trace!(key = %self.key, score, evicted, "replaced items at score");
        }
        self.add(item)
    }

    /// Element-wise [`add`](Self::add); not a single atomic bulk operation
    pub fn add_range<'a>(&self, items: impl IntoIterator<Item = &'a T>) -> Result<()>
    where
        T: 'a,
    {
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// Element-wise [`add_or_replace`](Self::add_or_replace); not atomic
    pub fn add_or_replace_range<'a>(&self, items: impl IntoIterator<Item = &'a T>) -> Result<()>
    where
        T: 'a,
    {
        for item in items {
            self.add_or_replace(item)?;
        }
        Ok(())
    }

    /// Fetch the item at `rank` (ascending score order)
    ///
    /// An out-of-range rank yields `Ok(None)` rather than an error, so
    /// callers can probe boundaries.
    pub fn get(&self, rank: usize) -> Result<Option<T>> {
        let hits = self
            .store
            .zset_range_by_rank(&self.key, rank as i64, rank as i64)?;
        match hits.first() {
            Some((raw, _)) => Ok(Some(self.codec.deserialize(raw)?)),
            None => Ok(None),
        }
    }

    /// Unsupported: a rank has no stable meaning for insertion
    ///
    /// Always fails with `Error::Unsupported`; use [`add`](Self::add) or
    /// [`add_or_replace`](Self::add_or_replace).
    pub fn set(&self, _rank: usize, _item: &T) -> Result<()> {
        Err(Error::Unsupported {
            op: "set by rank",
            target: "scored set",
        })
    }

    /// Unsupported: only score-driven addition is meaningful
    ///
    /// Always fails with `Error::Unsupported`.
    pub fn insert(&self, _rank: usize, _item: &T) -> Result<()> {
        Err(Error::Unsupported {
            op: "insert at rank",
            target: "scored set",
        })
    }

    /// First item stored at exactly `score`, or `None`
    ///
    /// With several items at the score, which one is first follows the
    /// store's tie order.
    pub fn get_by_score(&self, score: f64) -> Result<Option<T>> {
        let hits = self.store.zset_range_by_score(&self.key, score, score)?;
        match hits.first() {
            Some((raw, _)) => Ok(Some(self.codec.deserialize(raw)?)),
            None => Ok(None),
        }
    }

    /// Whether anything is stored at exactly `score`
    pub fn contains_score(&self, score: f64) -> Result<bool> {
        Ok(!self
            .store
            .zset_range_by_score(&self.key, score, score)?
            .is_empty())
    }

    /// Remove whatever occupies `rank` at call time
    ///
    /// One remove-range-by-rank command; returns whether a member was
    /// removed. Not idempotent under concurrent reordering: a mutation
    /// between the caller choosing the rank and this call can change
    /// which item the rank denotes.
    pub fn remove_at(&self, rank: usize) -> Result<bool> {
        let removed = self
            .store
            .zset_remove_range_by_rank(&self.key, rank as i64, rank as i64)?;
        Ok(removed > 0)
    }

    /// Cardinality of the set. One command.
    pub fn len(&self) -> Result<u64> {
        self.store.zset_len(&self.key)
    }

    /// Whether the set holds no items
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete the entire store key
    pub fn clear(&self) -> Result<()> {
        trace!(key = %self.key, "clearing scored set key");
        self.store.key_delete(&self.key)?;
        Ok(())
    }

    /// Append every decoded item to `buf` in ascending score order
    pub fn copy_to(&self, buf: &mut Vec<T>) -> Result<()> {
        for (raw, _) in self.store.zset_range_by_rank(&self.key, 0, -1)? {
            buf.push(self.codec.deserialize(&raw)?);
        }
        Ok(())
    }

    /// Snapshot iterator over decoded items in ascending score order
    ///
    /// One bulk range-by-rank fetch happens here; decoding is lazy per
    /// step. Mutations after this call are invisible to the returned
    /// iterator.
    pub fn iter(&self) -> Result<SequenceIter<T>> {
        let values = self
            .store
            .zset_range_by_rank(&self.key, 0, -1)?
            .into_iter()
            .map(|(raw, _)| raw)
            .collect();
        Ok(SequenceIter::new(values, Arc::clone(&self.codec)))
    }
}

impl<S: SortedSetCommands, T: Scored + PartialEq> ScoredSetView<S, T> {
    /// Whether the item is stored at its own score
    ///
    /// Range query at the item's score, then value equality over the
    /// matches; every value colliding on that score is scanned.
    pub fn contains(&self, item: &T) -> Result<bool> {
        let score = item.score();
        for (raw, _) in self.store.zset_range_by_score(&self.key, score, score)? {
            if &self.codec.deserialize(&raw)? == item {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Rank of the first entry matching both the item's score and its
    /// decoded value, via a full cursor scan
    ///
    /// Positions follow the scan's yield order, which the store defines.
    pub fn index_of(&self, item: &T) -> Result<Option<usize>> {
        let score = item.score();
        let mut pos = 0usize;
        let mut cursor = 0u64;
        loop {
            let (next, batch) = self.store.zset_scan(&self.key, cursor)?;
            for (raw, stored_score) in batch {
                if stored_score == score && &self.codec.deserialize(&raw)? == item {
                    return Ok(Some(pos));
                }
                pos += 1;
            }
            if next == 0 {
                return Ok(None);
            }
            cursor = next;
        }
    }

    /// Remove the entry at the item's score whose decoded value equals it
    ///
    /// Finds the stored member by equality among the score's collisions,
    /// then removes exactly that member. Returns whether removal
    /// occurred. Read-then-act: not atomic.
    pub fn remove(&self, item: &T) -> Result<bool> {
        let score = item.score();
        for (raw, _) in self.store.zset_range_by_score(&self.key, score, score)? {
            if &self.codec.deserialize(&raw)? == item {
                return self.store.zset_remove(&self.key, &raw);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvlens_store::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Task {
        name: String,
        priority: f64,
    }

    impl Task {
        fn new(name: &str, priority: f64) -> Self {
            Self {
                name: name.to_string(),
                priority,
            }
        }
    }

    impl Scored for Task {
        fn score(&self) -> f64 {
            self.priority
        }
    }

    fn setup() -> ScoredSetView<MemoryStore, Task> {
        ScoredSetView::json(Arc::new(MemoryStore::new()), "test:tasks")
    }

    fn names(set: &ScoredSetView<MemoryStore, Task>) -> Vec<String> {
        set.iter()
            .unwrap()
            .map(|r| r.unwrap().name)
            .collect()
    }

    #[test]
    fn test_items_order_by_score_not_insertion() {
        let set = setup();
        set.add(&Task::new("three", 3.0)).unwrap();
        set.add(&Task::new("one", 1.0)).unwrap();
        set.add(&Task::new("two", 2.0)).unwrap();
        assert_eq!(names(&set), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_add_then_contains_score() {
        let set = setup();
        set.add(&Task::new("a", 4.5)).unwrap();
        assert!(set.contains_score(4.5).unwrap());
        assert!(!set.contains_score(4.6).unwrap());
    }

    #[test]
    fn test_get_by_rank_is_forgiving() {
        let set = setup();
        assert_eq!(set.get(0).unwrap(), None);
        set.add(&Task::new("a", 1.0)).unwrap();
        assert_eq!(set.get(0).unwrap().unwrap().name, "a");
        assert_eq!(set.get(10).unwrap(), None);
    }

    #[test]
    fn test_set_by_rank_is_unsupported() {
        let set = setup();
        let err = set.set(0, &Task::new("a", 1.0)).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn test_insert_at_rank_is_unsupported() {
        let set = setup();
        let err = set.insert(0, &Task::new("a", 1.0)).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn test_add_or_replace_leaves_one_item_per_score() {
        let set = setup();
        set.add_or_replace(&Task::new("first", 5.0)).unwrap();
        set.add_or_replace(&Task::new("second", 5.0)).unwrap();

        assert_eq!(set.len().unwrap(), 1);
        assert!(set.contains_score(5.0).unwrap());
        assert_eq!(set.get_by_score(5.0).unwrap().unwrap().name, "second");
    }

    #[test]
    fn test_add_or_replace_evicts_collisions() {
        let set = setup();
        // Two distinct values at the same score via plain add.
        set.add(&Task::new("a", 2.0)).unwrap();
        set.add(&Task::new("b", 2.0)).unwrap();
        assert_eq!(set.len().unwrap(), 2);

        set.add_or_replace(&Task::new("c", 2.0)).unwrap();
        assert_eq!(set.len().unwrap(), 1);
        assert_eq!(set.get_by_score(2.0).unwrap().unwrap().name, "c");
    }

    #[test]
    fn test_same_value_at_two_scores() {
        let set = setup();
        // Score is part of identity: serialized forms differ because the
        // priority field differs, so both entries persist.
        set.add(&Task::new("dup", 1.0)).unwrap();
        set.add(&Task::new("dup", 2.0)).unwrap();
        assert_eq!(set.len().unwrap(), 2);
    }

    #[test]
    fn test_contains_filters_score_collisions() {
        let set = setup();
        set.add(&Task::new("a", 3.0)).unwrap();
        set.add(&Task::new("b", 3.0)).unwrap();

        assert!(set.contains(&Task::new("a", 3.0)).unwrap());
        assert!(set.contains(&Task::new("b", 3.0)).unwrap());
        assert!(!set.contains(&Task::new("c", 3.0)).unwrap());
        assert!(!set.contains(&Task::new("a", 4.0)).unwrap());
    }

    #[test]
    fn test_index_of_matches_score_and_value() {
        let set = setup();
        set.add(&Task::new("low", 1.0)).unwrap();
        set.add(&Task::new("mid", 2.0)).unwrap();
        set.add(&Task::new("high", 3.0)).unwrap();

        assert_eq!(set.index_of(&Task::new("mid", 2.0)).unwrap(), Some(1));
        assert_eq!(set.index_of(&Task::new("mid", 9.0)).unwrap(), None);
        assert_eq!(set.index_of(&Task::new("absent", 2.0)).unwrap(), None);
    }

    #[test]
    fn test_remove_exact_item() {
        let set = setup();
        set.add(&Task::new("a", 3.0)).unwrap();
        set.add(&Task::new("b", 3.0)).unwrap();

        assert!(set.remove(&Task::new("a", 3.0)).unwrap());
        assert_eq!(set.len().unwrap(), 1);
        assert!(set.contains(&Task::new("b", 3.0)).unwrap());

        assert!(!set.remove(&Task::new("a", 3.0)).unwrap());
    }

    #[test]
    fn test_remove_at_rank() {
        let set = setup();
        set.add(&Task::new("one", 1.0)).unwrap();
        set.add(&Task::new("two", 2.0)).unwrap();

        assert!(set.remove_at(0).unwrap());
        assert_eq!(set.len().unwrap(), 1);
        assert_eq!(set.get(0).unwrap().unwrap().name, "two");

        assert!(!set.remove_at(5).unwrap());
    }

    #[test]
    fn test_add_range_and_add_or_replace_range() {
        let set = setup();
        let items = vec![Task::new("a", 1.0), Task::new("b", 2.0)];
        set.add_range(&items).unwrap();
        assert_eq!(set.len().unwrap(), 2);

        let replacements = vec![Task::new("a2", 1.0), Task::new("b2", 2.0)];
        set.add_or_replace_range(&replacements).unwrap();
        assert_eq!(set.len().unwrap(), 2);
        assert_eq!(names(&set), vec!["a2", "b2"]);
    }

    #[test]
    fn test_clear() {
        let set = setup();
        set.add(&Task::new("a", 1.0)).unwrap();
        set.clear().unwrap();
        assert_eq!(set.len().unwrap(), 0);
        assert!(set.is_empty().unwrap());
    }

    #[test]
    fn test_copy_to_ascending() {
        let set = setup();
        set.add(&Task::new("b", 2.0)).unwrap();
        set.add(&Task::new("a", 1.0)).unwrap();

        let mut buf = Vec::new();
        set.copy_to(&mut buf).unwrap();
        assert_eq!(buf[0].name, "a");
        assert_eq!(buf[1].name, "b");
    }

    #[test]
    fn test_iter_is_a_snapshot() {
        let set = setup();
        set.add(&Task::new("a", 1.0)).unwrap();
        set.add(&Task::new("b", 2.0)).unwrap();

        let iter = set.iter().unwrap();
        set.add(&Task::new("c", 0.5)).unwrap();
        set.remove_at(0).unwrap();

        let seen: Vec<String> = iter.map(|r| r.unwrap().name).collect();
        assert_eq!(seen, vec!["a", "b"]);
    }
}
