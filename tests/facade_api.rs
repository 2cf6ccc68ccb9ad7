//! Smoke test for the root facade re-exports
//!
//! Everything a caller needs should be reachable from the `kvlens` root:
//! the views, the command traits, the codecs, and the reference store.

use std::sync::Arc;

use kvlens::{
    json_codec, Error, ListView, MapView, MemoryStore, Scored, ScoredSetView, SequenceView,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    name: String,
    rank_score: f64,
}

impl Scored for Entry {
    fn score(&self) -> f64 {
        self.rank_score
    }
}

#[test]
fn test_public_surface_round_trip() {
    let store = Arc::new(MemoryStore::new());

    let map = MapView::strings(Arc::clone(&store), "facade:map");
    map.set(&"k".into(), &"v".into()).unwrap();
    assert_eq!(map.get(&"k".into()).unwrap(), "v");

    let list = ListView::strings(Arc::clone(&store), "facade:list");
    list.push(&"item".into()).unwrap();
    assert_eq!(list.len().unwrap(), 1);

    let set: ScoredSetView<MemoryStore, Entry> =
        ScoredSetView::new(store, "facade:set", json_codec());
    set.add(&Entry {
        name: "e".into(),
        rank_score: 1.0,
    })
    .unwrap();
    assert_eq!(set.len().unwrap(), 1);
}

#[test]
fn test_sequence_trait_reachable_from_root() {
    let store = Arc::new(MemoryStore::new());
    let set: ScoredSetView<MemoryStore, Entry> =
        ScoredSetView::new(store, "facade:seq", json_codec());

    let seq: &dyn SequenceView<Entry> = &set;
    seq.add(&Entry {
        name: "a".into(),
        rank_score: 2.0,
    })
    .unwrap();
    assert_eq!(seq.len().unwrap(), 1);
    assert!(matches!(
        seq.insert(
            0,
            &Entry {
                name: "b".into(),
                rank_score: 1.0
            }
        )
        .unwrap_err(),
        Error::Unsupported { .. }
    ));
}
