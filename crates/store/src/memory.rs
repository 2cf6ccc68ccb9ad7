//! MemoryStore: in-process backend for the store command contract
//!
//! ## Design
//!
//! One `RwLock`-guarded table maps key names to composite values. Each
//! command takes the lock once, so single commands are atomic exactly as
//! the contract requires, and nothing spanning two commands is.
//!
//! ## Semantics
//!
//! The behaviors the views were designed against:
//!
//! - a missing key reads as an empty composite; the first write creates it
//! - a composite that becomes empty removes its key
//! - a command against a key holding a different composite type fails
//!   with `Error::WrongType`
//! - list indices and rank ranges follow the negative-index conventions
//!   documented on the command traits
//!
//! ## Tie order
//!
//! Sorted set members order by ascending score (`f64::total_cmp`), ties by
//! lexicographic member order. The trait contract leaves tie order
//! store-defined; this is the deterministic rule this store provides.
//!
//! ## Thread Safety
//!
//! `MemoryStore` is `Send + Sync`. Clones share the same key table.

use std::collections::HashMap;
use std::sync::Arc;

use kvlens_core::{
    Error, HashCommands, KeyCommands, ListCommands, Result, SortedSetCommands,
};
use parking_lot::RwLock;
use tracing::trace;

/// The structured value stored at one key
enum Composite {
    Hash(HashMap<String, String>),
    List(Vec<String>),
    // Kept sorted by (score, member) at all times.
    SortedSet(Vec<(String, f64)>),
}

impl Composite {
    fn kind(&self) -> &'static str {
        match self {
            Composite::Hash(_) => "hash",
            Composite::List(_) => "list",
            Composite::SortedSet(_) => "sorted set",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Composite::Hash(h) => h.is_empty(),
            Composite::List(l) => l.is_empty(),
            Composite::SortedSet(z) => z.is_empty(),
        }
    }
}

/// In-process store implementing the full command contract
///
/// Backs every test in the workspace and doubles as a local backend for
/// callers that want view semantics without a remote store. Clones are
/// cheap and share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    keys: Arc<RwLock<HashMap<String, Composite>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held (all composite types)
    pub fn key_count(&self) -> usize {
        self.keys.read().len()
    }
}

/// Normalize an inclusive (start, stop) pair against a length.
///
/// Negative positions count back from the end. Returns `None` when the
/// normalized range is empty.
fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let n = len as i64;
    let s = if start < 0 { (n + start).max(0) } else { start };
    let e = if stop < 0 { n + stop } else { stop.min(n - 1) };
    if s >= n || s > e || e < 0 {
        return None;
    }
    Some((s as usize, e as usize))
}

/// Resolve a possibly negative index against a length.
fn normalize_index(len: usize, index: i64) -> Option<usize> {
    let n = len as i64;
    let i = if index < 0 { n + index } else { index };
    if i < 0 || i >= n {
        None
    } else {
        Some(i as usize)
    }
}

/// Insertion position keeping the member vec sorted by (score, member).
fn zset_insert_pos(members: &[(String, f64)], member: &str, score: f64) -> usize {
    members
        .partition_point(|(m, s)| match s.total_cmp(&score) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => m.as_str() < member,
            std::cmp::Ordering::Greater => false,
        })
}

impl MemoryStore {
    /// Read access to a hash, treating a missing key as empty.
    fn with_hash<T>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&HashMap<String, String>>) -> T,
    ) -> Result<T> {
        let keys = self.keys.read();
        match keys.get(key) {
            None => Ok(f(None)),
            Some(Composite::Hash(h)) => Ok(f(Some(h))),
            Some(other) => Err(Error::WrongType {
                key: key.to_string(),
                actual: other.kind(),
            }),
        }
    }

    fn with_list<T>(&self, key: &str, f: impl FnOnce(Option<&Vec<String>>) -> T) -> Result<T> {
        let keys = self.keys.read();
        match keys.get(key) {
            None => Ok(f(None)),
            Some(Composite::List(l)) => Ok(f(Some(l))),
            Some(other) => Err(Error::WrongType {
                key: key.to_string(),
                actual: other.kind(),
            }),
        }
    }

    fn with_zset<T>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&Vec<(String, f64)>>) -> T,
    ) -> Result<T> {
        let keys = self.keys.read();
        match keys.get(key) {
            None => Ok(f(None)),
            Some(Composite::SortedSet(z)) => Ok(f(Some(z))),
            Some(other) => Err(Error::WrongType {
                key: key.to_string(),
                actual: other.kind(),
            }),
        }
    }

    /// Write access to a hash, creating the composite when absent.
    fn with_hash_mut<T>(
        &self,
        key: &str,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T> {
        let mut keys = self.keys.write();
        let entry = keys
            .entry(key.to_string())
            .or_insert_with(|| Composite::Hash(HashMap::new()));
        let out = match &mut *entry {
            Composite::Hash(h) => f(h),
            other => {
                return Err(Error::WrongType {
                    key: key.to_string(),
                    actual: other.kind(),
                })
            }
        };
        if entry.is_empty() {
            keys.remove(key);
        }
        Ok(out)
    }

    fn with_list_mut<T>(&self, key: &str, f: impl FnOnce(&mut Vec<String>) -> Result<T>) -> Result<T> {
        let mut keys = self.keys.write();
        let entry = keys
            .entry(key.to_string())
            .or_insert_with(|| Composite::List(Vec::new()));
        let out = match &mut *entry {
            Composite::List(l) => f(l),
            other => {
                return Err(Error::WrongType {
                    key: key.to_string(),
                    actual: other.kind(),
                })
            }
        };
        if entry.is_empty() {
            keys.remove(key);
        }
        out
    }

    fn with_zset_mut<T>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Vec<(String, f64)>) -> T,
    ) -> Result<T> {
        let mut keys = self.keys.write();
        let entry = keys
            .entry(key.to_string())
            .or_insert_with(|| Composite::SortedSet(Vec::new()));
        let out = match &mut *entry {
            Composite::SortedSet(z) => f(z),
            other => {
                return Err(Error::WrongType {
                    key: key.to_string(),
                    actual: other.kind(),
                })
            }
        };
        if entry.is_empty() {
            keys.remove(key);
        }
        Ok(out)
    }
}

impl KeyCommands for MemoryStore {
    fn key_delete(&self, key: &str) -> Result<bool> {
        let existed = self.keys.write().remove(key).is_some();
        if existed {
            trace!(key, "deleted key");
        }
        Ok(existed)
    }
}

impl HashCommands for MemoryStore {
    fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        self.with_hash_mut(key, |h| {
            h.insert(field.to_string(), value.to_string()).is_none()
        })
    }

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.with_hash(key, |h| h.and_then(|h| h.get(field).cloned()))
    }

    fn hash_exists(&self, key: &str, field: &str) -> Result<bool> {
        self.with_hash(key, |h| h.is_some_and(|h| h.contains_key(field)))
    }

    fn hash_delete(&self, key: &str, field: &str) -> Result<bool> {
        // Route through the read path first so deleting from a missing
        // key does not create an empty hash.
        if !self.hash_exists(key, field)? {
            return Ok(false);
        }
        self.with_hash_mut(key, |h| h.remove(field).is_some())
    }

    fn hash_fields(&self, key: &str) -> Result<Vec<String>> {
        self.with_hash(key, |h| {
            h.map(|h| h.keys().cloned().collect()).unwrap_or_default()
        })
    }

    fn hash_values(&self, key: &str) -> Result<Vec<String>> {
        self.with_hash(key, |h| {
            h.map(|h| h.values().cloned().collect()).unwrap_or_default()
        })
    }

    fn hash_entries(&self, key: &str) -> Result<Vec<(String, String)>> {
        self.with_hash(key, |h| {
            h.map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
                .unwrap_or_default()
        })
    }

    fn hash_len(&self, key: &str) -> Result<u64> {
        self.with_hash(key, |h| h.map(|h| h.len() as u64).unwrap_or(0))
    }
}

impl ListCommands for MemoryStore {
    fn list_push_back(&self, key: &str, value: &str) -> Result<u64> {
        self.with_list_mut(key, |l| {
            l.push(value.to_string());
            Ok(l.len() as u64)
        })
    }

    fn list_index(&self, key: &str, index: i64) -> Result<Option<String>> {
        self.with_list(key, |l| {
            l.and_then(|l| normalize_index(l.len(), index).map(|i| l[i].clone()))
        })
    }

    fn list_set(&self, key: &str, index: i64, value: &str) -> Result<()> {
        // Setting never creates a list; a missing key is out of range.
        if self.list_len(key)? == 0 {
            return Err(Error::NotFound(format!(
                "index {index} in list '{key}'"
            )));
        }
        self.with_list_mut(key, |l| match normalize_index(l.len(), index) {
            Some(i) => {
                l[i] = value.to_string();
                Ok(())
            }
            None => Err(Error::NotFound(format!("index {index} in list '{key}'"))),
        })
    }

    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.with_list(key, |l| match l {
            None => Vec::new(),
            Some(l) => match normalize_range(l.len(), start, stop) {
                None => Vec::new(),
                Some((s, e)) => l[s..=e].to_vec(),
            },
        })
    }

    fn list_insert_before(&self, key: &str, pivot: &str, value: &str) -> Result<Option<u64>> {
        if self.list_len(key)? == 0 {
            return Ok(None);
        }
        self.with_list_mut(key, |l| {
            match l.iter().position(|v| v == pivot) {
                Some(pos) => {
                    l.insert(pos, value.to_string());
                    Ok(Some(l.len() as u64))
                }
                None => Ok(None),
            }
        })
    }

    fn list_remove(&self, key: &str, count: i64, value: &str) -> Result<u64> {
        if self.list_len(key)? == 0 {
            return Ok(0);
        }
        self.with_list_mut(key, |l| {
            let limit = if count == 0 {
                usize::MAX
            } else {
                count.unsigned_abs() as usize
            };
            let mut removed = 0u64;
            if count >= 0 {
                let mut i = 0;
                while i < l.len() && (removed as usize) < limit {
                    if l[i] == value {
                        l.remove(i);
                        removed += 1;
                    } else {
                        i += 1;
                    }
                }
            } else {
                let mut i = l.len();
                while i > 0 && (removed as usize) < limit {
                    i -= 1;
                    if l[i] == value {
                        l.remove(i);
                        removed += 1;
                    }
                }
            }
            Ok(removed)
        })
    }

    fn list_len(&self, key: &str) -> Result<u64> {
        self.with_list(key, |l| l.map(|l| l.len() as u64).unwrap_or(0))
    }
}

impl SortedSetCommands for MemoryStore {
    fn zset_add(&self, key: &str, member: &str, score: f64) -> Result<bool> {
        self.with_zset_mut(key, |z| {
            let added = match z.iter().position(|(m, _)| m == member) {
                Some(pos) => {
                    z.remove(pos);
                    false
                }
                None => true,
            };
            let pos = zset_insert_pos(z, member, score);
            z.insert(pos, (member.to_string(), score));
            added
        })
    }

    fn zset_range_by_rank(&self, key: &str, start: i64, stop: i64) -> Result<Vec<(String, f64)>> {
        self.with_zset(key, |z| match z {
            None => Vec::new(),
            Some(z) => match normalize_range(z.len(), start, stop) {
                None => Vec::new(),
                Some((s, e)) => z[s..=e].to_vec(),
            },
        })
    }

    fn zset_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<(String, f64)>> {
        self.with_zset(key, |z| match z {
            None => Vec::new(),
            Some(z) => z
                .iter()
                .filter(|(_, s)| *s >= min && *s <= max)
                .cloned()
                .collect(),
        })
    }

    fn zset_remove(&self, key: &str, member: &str) -> Result<bool> {
        if self.zset_len(key)? == 0 {
            return Ok(false);
        }
        self.with_zset_mut(key, |z| match z.iter().position(|(m, _)| m == member) {
            Some(pos) => {
                z.remove(pos);
                true
            }
            None => false,
        })
    }

    fn zset_remove_range_by_rank(&self, key: &str, start: i64, stop: i64) -> Result<u64> {
        if self.zset_len(key)? == 0 {
            return Ok(0);
        }
        self.with_zset_mut(key, |z| match normalize_range(z.len(), start, stop) {
            None => 0,
            Some((s, e)) => {
                z.drain(s..=e);
                (e - s + 1) as u64
            }
        })
    }

    fn zset_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<u64> {
        if self.zset_len(key)? == 0 {
            return Ok(0);
        }
        self.with_zset_mut(key, |z| {
            let before = z.len();
            z.retain(|(_, s)| *s < min || *s > max);
            (before - z.len()) as u64
        })
    }

    fn zset_len(&self, key: &str) -> Result<u64> {
        self.with_zset(key, |z| z.map(|z| z.len() as u64).unwrap_or(0))
    }

    fn zset_scan(&self, key: &str, _cursor: u64) -> Result<(u64, Vec<(String, f64)>)> {
        // Single-batch scan: everything at once, terminal cursor.
        let batch = self.with_zset(key, |z| z.cloned().unwrap_or_default())?;
        Ok((0, batch))
    }
}
