//! SequenceView: the capability surface shared by both sequence views
//!
//! The list view and the scored set view expose the same family of
//! operations: indexed read, length, add, remove, positional search,
//! snapshot. This trait names that family once so callers can hold either
//! view behind one interface.
//!
//! The scored set cannot honor position-directed writes: its order is a
//! function of item scores. Rather than silently ignoring them, its
//! implementations of [`set`](SequenceView::set) and
//! [`insert`](SequenceView::insert) return `Error::Unsupported`.

use kvlens_core::{ListCommands, Result, SortedSetCommands};

use crate::list::ListView;
use crate::scored_set::{Scored, ScoredSetView};

/// Polymorphic surface over the list and scored-set views
pub trait SequenceView<T> {
    /// Item at `index`, or `None` when out of range
    fn get(&self, index: usize) -> Result<Option<T>>;

    /// Overwrite the item at `index`
    ///
    /// Unsupported on score-ordered structures.
    fn set(&self, index: usize, item: &T) -> Result<()>;

    /// Insert at `index`, shifting later items
    ///
    /// Unsupported on score-ordered structures.
    fn insert(&self, index: usize, item: &T) -> Result<()>;

    /// Add an item at the structure's natural position: the tail of a
    /// list, the score-determined rank of a scored set
    fn add(&self, item: &T) -> Result<()>;

    /// Remove one item equal to `item`. Returns whether anything was
    /// removed.
    fn remove(&self, item: &T) -> Result<bool>;

    /// Remove the item at `index`
    fn remove_at(&self, index: usize) -> Result<()>;

    /// Position of the first item equal to `item`
    fn index_of(&self, item: &T) -> Result<Option<usize>>;

    /// Whether any item equals `item`
    fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.index_of(item)?.is_some())
    }

    /// Number of items
    fn len(&self) -> Result<u64>;

    /// Whether no items are stored
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete the entire store key
    fn clear(&self) -> Result<()>;

    /// Fully materialized, decoded snapshot in the structure's order
    fn snapshot(&self) -> Result<Vec<T>>;
}

impl<S: ListCommands, T: PartialEq> SequenceView<T> for ListView<S, T> {
    fn get(&self, index: usize) -> Result<Option<T>> {
        match ListView::get(self, index) {
            Ok(item) => Ok(Some(item)),
            Err(kvlens_core::Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, index: usize, item: &T) -> Result<()> {
        ListView::set(self, index, item)
    }

    fn insert(&self, index: usize, item: &T) -> Result<()> {
        ListView::insert(self, index, item)
    }

    fn add(&self, item: &T) -> Result<()> {
        self.push(item)
    }

    fn remove(&self, item: &T) -> Result<bool> {
        ListView::remove(self, item)
    }

    fn remove_at(&self, index: usize) -> Result<()> {
        ListView::remove_at(self, index)
    }

    fn index_of(&self, item: &T) -> Result<Option<usize>> {
        ListView::index_of(self, item)
    }

    fn len(&self) -> Result<u64> {
        ListView::len(self)
    }

    fn clear(&self) -> Result<()> {
        ListView::clear(self)
    }

    fn snapshot(&self) -> Result<Vec<T>> {
        let mut buf = Vec::new();
        self.copy_to(&mut buf)?;
        Ok(buf)
    }
}

impl<S: SortedSetCommands, T: Scored + PartialEq> SequenceView<T> for ScoredSetView<S, T> {
    fn get(&self, index: usize) -> Result<Option<T>> {
        ScoredSetView::get(self, index)
    }

    fn set(&self, index: usize, item: &T) -> Result<()> {
        ScoredSetView::set(self, index, item)
    }

    fn insert(&self, index: usize, item: &T) -> Result<()> {
        ScoredSetView::insert(self, index, item)
    }

    fn add(&self, item: &T) -> Result<()> {
        ScoredSetView::add(self, item)
    }

    fn remove(&self, item: &T) -> Result<bool> {
        ScoredSetView::remove(self, item)
    }

    fn remove_at(&self, index: usize) -> Result<()> {
        // Removing an unoccupied rank is a no-op, consistent with the
        // forgiving rank-read policy.
        ScoredSetView::remove_at(self, index)?;
        Ok(())
    }

    fn index_of(&self, item: &T) -> Result<Option<usize>> {
        ScoredSetView::index_of(self, item)
    }

    fn contains(&self, item: &T) -> Result<bool> {
        // Cheaper than the default: bounded to the item's own score.
        ScoredSetView::contains(self, item)
    }

    fn len(&self) -> Result<u64> {
        ScoredSetView::len(self)
    }

    fn clear(&self) -> Result<()> {
        ScoredSetView::clear(self)
    }

    fn snapshot(&self) -> Result<Vec<T>> {
        let mut buf = Vec::new();
        self.copy_to(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::json_codec;
    use kvlens_core::Error;
    use kvlens_store::MemoryStore;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        label: String,
        weight: f64,
    }

    impl Item {
        fn new(label: &str, weight: f64) -> Self {
            Self {
                label: label.to_string(),
                weight,
            }
        }
    }

    impl Scored for Item {
        fn score(&self) -> f64 {
            self.weight
        }
    }

    fn sequences() -> Vec<Box<dyn SequenceView<Item>>> {
        let store = Arc::new(MemoryStore::new());
        vec![
            Box::new(ListView::new(Arc::clone(&store), "seq:list", json_codec())),
            Box::new(ScoredSetView::new(store, "seq:zset", json_codec())),
        ]
    }

    #[test]
    fn test_common_operations_through_the_trait() {
        for seq in sequences() {
            seq.add(&Item::new("a", 1.0)).unwrap();
            seq.add(&Item::new("b", 2.0)).unwrap();

            assert_eq!(seq.len().unwrap(), 2);
            assert!(!seq.is_empty().unwrap());
            assert_eq!(seq.get(0).unwrap().unwrap().label, "a");
            assert_eq!(seq.get(9).unwrap(), None);
            assert_eq!(seq.index_of(&Item::new("b", 2.0)).unwrap(), Some(1));
            assert!(seq.contains(&Item::new("a", 1.0)).unwrap());
            assert!(!seq.contains(&Item::new("zz", 9.0)).unwrap());

            assert!(seq.remove(&Item::new("a", 1.0)).unwrap());
            assert_eq!(seq.len().unwrap(), 1);

            seq.clear().unwrap();
            assert!(seq.is_empty().unwrap());
        }
    }

    #[test]
    fn test_snapshot_preserves_structure_order() {
        let store = Arc::new(MemoryStore::new());
        let list: ListView<MemoryStore, Item> =
            ListView::new(Arc::clone(&store), "s:list", json_codec());
        let zset: ScoredSetView<MemoryStore, Item> =
            ScoredSetView::new(store, "s:zset", json_codec());

        for item in [Item::new("late", 3.0), Item::new("early", 1.0)] {
            SequenceView::add(&list, &item).unwrap();
            SequenceView::add(&zset, &item).unwrap();
        }

        // The list keeps insertion order; the scored set reorders.
        let list_labels: Vec<String> = SequenceView::snapshot(&list)
            .unwrap()
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(list_labels, vec!["late", "early"]);

        let zset_labels: Vec<String> = SequenceView::snapshot(&zset)
            .unwrap()
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(zset_labels, vec!["early", "late"]);
    }

    #[test]
    fn test_position_directed_writes_split_by_capability() {
        let store = Arc::new(MemoryStore::new());
        let list: ListView<MemoryStore, Item> =
            ListView::new(Arc::clone(&store), "c:list", json_codec());
        let zset: ScoredSetView<MemoryStore, Item> =
            ScoredSetView::new(store, "c:zset", json_codec());

        SequenceView::add(&list, &Item::new("a", 1.0)).unwrap();
        SequenceView::add(&zset, &Item::new("a", 1.0)).unwrap();

        // The list honors them.
        SequenceView::set(&list, 0, &Item::new("b", 1.0)).unwrap();
        SequenceView::insert(&list, 0, &Item::new("c", 1.0)).unwrap();

        // The scored set declares the capability violation.
        assert!(matches!(
            SequenceView::set(&zset, 0, &Item::new("b", 1.0)).unwrap_err(),
            Error::Unsupported { .. }
        ));
        assert!(matches!(
            SequenceView::insert(&zset, 0, &Item::new("c", 1.0)).unwrap_err(),
            Error::Unsupported { .. }
        ));
    }

    #[test]
    fn test_trait_is_object_safe() {
        fn _assert_object_safe(_: &dyn SequenceView<Item>) {}
    }
}
