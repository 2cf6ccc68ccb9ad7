//! Store command contract consumed by the views
//!
//! The views never speak a wire protocol. They are written against the
//! traits in this module: a small set of named commands with documented
//! argument/return contracts, each issued as one round trip to the store.
//! Connection management, retries, and clustering belong to the trait
//! implementor, not to this layer.
//!
//! All field and member values are opaque strings; typed values are encoded
//! by the serializer layer before they reach these commands.
//!
//! ## Atomicity
//!
//! Each single command is atomic at the store. No multi-command sequence
//! built on top of these traits is atomic unless the caller makes it so.
//!
//! ## Error contract
//!
//! Implementors surface remote failures as [`Error::Store`] and type
//! mismatches as [`Error::WrongType`]; the views pass both through
//! unchanged.
//!
//! [`Error::Store`]: crate::Error::Store
//! [`Error::WrongType`]: crate::Error::WrongType

use crate::error::Result;

/// Whole-key operations shared by every composite structure
pub trait KeyCommands {
    /// Delete the entire key, whatever structure it holds.
    ///
    /// Returns `true` if the key existed. Deleting a missing key is not an
    /// error.
    fn key_delete(&self, key: &str) -> Result<bool>;
}

/// Commands against a field/value hash key
///
/// The listing commands (`hash_fields`, `hash_values`, `hash_entries`)
/// return full materializations, never cursors. Field order is not
/// significant and not preserved.
pub trait HashCommands: KeyCommands {
    /// Create or overwrite a field. Returns `true` if the field was new.
    fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// Fetch one field's value, or `None` if the field is absent.
    fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Test whether a field exists without fetching its value.
    fn hash_exists(&self, key: &str, field: &str) -> Result<bool>;

    /// Delete one field. Returns `true` if a field was actually removed.
    fn hash_delete(&self, key: &str, field: &str) -> Result<bool>;

    /// All field names in the hash.
    fn hash_fields(&self, key: &str) -> Result<Vec<String>>;

    /// All values in the hash.
    fn hash_values(&self, key: &str) -> Result<Vec<String>>;

    /// All (field, value) pairs in the hash.
    fn hash_entries(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// Number of fields in the hash. A missing key counts as zero.
    fn hash_len(&self, key: &str) -> Result<u64>;
}

/// Commands against an ordered list key
///
/// Indices follow the usual list conventions: zero-based from the head,
/// negative indices count back from the tail (`-1` is the last item).
pub trait ListCommands: KeyCommands {
    /// Append to the tail. Returns the new list length.
    fn list_push_back(&self, key: &str, value: &str) -> Result<u64>;

    /// Fetch the value at a position.
    ///
    /// An out-of-range index yields `Ok(None)`, never an error; adapters
    /// are responsible for translating the sentinel.
    fn list_index(&self, key: &str, index: i64) -> Result<Option<String>>;

    /// Overwrite the value at a position.
    ///
    /// An out-of-range index fails with [`Error::NotFound`].
    ///
    /// [`Error::NotFound`]: crate::Error::NotFound
    fn list_set(&self, key: &str, index: i64, value: &str) -> Result<()>;

    /// Fetch the inclusive range `start..=stop`.
    ///
    /// Out-of-range bounds are clamped; a start past the end, or past the
    /// stop, yields an empty vec. `list_range(key, 0, -1)` is the whole
    /// list.
    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Insert `value` immediately before the first (leftmost) occurrence
    /// of `pivot`.
    ///
    /// Returns the new list length, or `None` when the pivot is not
    /// present. The pivot is addressed by value, not position.
    fn list_insert_before(&self, key: &str, pivot: &str, value: &str) -> Result<Option<u64>>;

    /// Remove occurrences equal to `value`. Returns how many were removed.
    ///
    /// `count > 0` removes up to `count` from head to tail, `count < 0`
    /// up to `|count|` from tail to head, `count == 0` removes all.
    fn list_remove(&self, key: &str, count: i64, value: &str) -> Result<u64>;

    /// Number of items in the list. A missing key counts as zero.
    fn list_len(&self, key: &str) -> Result<u64>;
}

/// Commands against a score-ordered set key
///
/// Members are unique strings, each carrying a numeric score. Ranks are
/// zero-based positions in ascending score order. The order of members
/// sharing an identical score is store-defined; implementors must document
/// whatever deterministic rule their store applies.
pub trait SortedSetCommands: KeyCommands {
    /// Add a member at a score, or update the score of an existing member.
    ///
    /// Returns `true` if the member was newly added, `false` if an
    /// existing member was rescored.
    fn zset_add(&self, key: &str, member: &str, score: f64) -> Result<bool>;

    /// Fetch the inclusive rank range `start..=stop` in ascending score
    /// order. Negative ranks count back from the highest score.
    fn zset_range_by_rank(&self, key: &str, start: i64, stop: i64) -> Result<Vec<(String, f64)>>;

    /// Fetch all members with `min <= score <= max`, ascending.
    fn zset_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<(String, f64)>>;

    /// Remove one member by its stored string. Returns `true` if it was
    /// present.
    fn zset_remove(&self, key: &str, member: &str) -> Result<bool>;

    /// Remove every member in the inclusive rank range. Returns how many
    /// were removed.
    fn zset_remove_range_by_rank(&self, key: &str, start: i64, stop: i64) -> Result<u64>;

    /// Remove every member with `min <= score <= max`. Returns how many
    /// were removed.
    fn zset_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<u64>;

    /// Cardinality of the set. A missing key counts as zero.
    fn zset_len(&self, key: &str) -> Result<u64>;

    /// One step of a cursor scan over (member, score) pairs.
    ///
    /// Start with cursor `0`; a returned cursor of `0` means the scan is
    /// complete. Batch sizes and yield order are store-defined, and
    /// entries written during the scan may or may not be observed.
    fn zset_scan(&self, key: &str, cursor: u64) -> Result<(u64, Vec<(String, f64)>)>;
}

/// Convenience alias for a handle implementing the full command set
pub trait StoreCommands: HashCommands + ListCommands + SortedSetCommands {}

impl<T: HashCommands + ListCommands + SortedSetCommands> StoreCommands for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_object_safe() {
        fn _assert_key(_: &dyn KeyCommands) {}
        fn _assert_hash(_: &dyn HashCommands) {}
        fn _assert_list(_: &dyn ListCommands) {}
        fn _assert_zset(_: &dyn SortedSetCommands) {}
    }
}
