//! kvlens - typed collection views over a remote key-value store
//!
//! kvlens exposes a store's composite value types (a field/value hash, an
//! ordered list, a score-ordered set) through the semantics of three
//! familiar collections: an associative map, an indexable sequence, and a
//! score-ranked sequence. Callers work with a store-backed key the way
//! they would with an in-memory collection; every operation is a round
//! trip to the store.
//!
//! # Quick Start
//!
//! ```ignore
//! use kvlens::{ListView, MapView, MemoryStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! let session = MapView::strings(Arc::clone(&store), "session:42");
//! session.set(&"user".to_string(), &"alice".to_string())?;
//!
//! let jobs = ListView::strings(store, "jobs:pending");
//! jobs.push(&"resize".to_string())?;
//! ```
//!
//! # Architecture
//!
//! Views are written against the command traits in `kvlens-core`; any
//! connected handle implementing them works as a backend. `MemoryStore`
//! is the in-process reference backend.

// Re-export the public API from the member crates
pub use kvlens_core::{
    Error, HashCommands, KeyCommands, ListCommands, Result, SortedSetCommands, StoreCommands,
};
pub use kvlens_store::MemoryStore;
pub use kvlens_views::{
    json_codec, string_codec, JsonSerializer, ListView, MapIter, MapView, Scored, ScoredSetView,
    SequenceIter, SequenceView, Serializer, SharedSerializer, StringSerializer,
};
