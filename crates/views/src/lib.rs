//! Typed collection views over a remote key-value store
//!
//! This crate adapts a store's composite value types to familiar
//! collection surfaces. A view is a stateless handle over one store key:
//! it owns no data, only the shared store handle, the key name, and the
//! codecs for its typed slots. Every read and write is a round trip.
//!
//! - [`MapView`]: a field/value hash as an associative map
//! - [`ListView`]: an ordered list as an indexable sequence
//! - [`ScoredSetView`]: a score-ordered set as a sequence ranked by each
//!   item's own score
//! - [`SequenceView`]: the capability surface the two sequence views
//!   share
//!
//! ## Enumeration
//!
//! Iteration is snapshot-based: `iter()` fetches the whole range once at
//! creation and decodes lazily per step. Mutations made after an iterator
//! exists are invisible to it, and items removed after the snapshot may
//! still be yielded. There is no live cursor.
//!
//! ## Consistency
//!
//! Single commands are atomic at the store; compound view operations
//! (`try_get`, `add_or_replace`, pivot-based `insert`, value-lookup
//! removal) are read-then-act and racy under concurrent writers to the
//! same key. Each such method documents its race.

pub mod list;
pub mod map;
pub mod scored_set;
pub mod sequence;
pub mod serializer;

pub use list::{ListView, SequenceIter};
pub use map::{MapIter, MapView};
pub use scored_set::{Scored, ScoredSetView};
pub use sequence::SequenceView;
pub use serializer::{
    json_codec, string_codec, JsonSerializer, Serializer, SharedSerializer, StringSerializer,
};
