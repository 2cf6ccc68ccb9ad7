//! Value serialization for view slots
//!
//! Every typed slot in a view (map key, map value, list item, scored item)
//! carries a codec that turns the typed value into the opaque string the
//! store commands transport, and back.
//!
//! ## Round-trip law
//!
//! For every codec and every legally constructible value `v`,
//! `deserialize(serialize(v)) == v`. Deserializing a malformed or foreign
//! string fails with `Error::Deserialization`; the views hand stored
//! strings to the codec without validating them first.
//!
//! ## Choosing a codec
//!
//! The default is explicit rather than implicit: call [`json_codec`] for
//! the generic serde-based codec, [`string_codec`] for plain string slots,
//! or supply your own [`Serializer`] implementation.

use std::marker::PhantomData;
use std::sync::Arc;

use kvlens_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Two-method codec contract between typed values and stored strings
pub trait Serializer<T> {
    /// Encode a value as a string.
    fn serialize(&self, value: &T) -> Result<String>;

    /// Reconstruct a value from a string previously produced by
    /// [`serialize`](Serializer::serialize).
    fn deserialize(&self, raw: &str) -> Result<T>;
}

/// A codec slot shared between views
///
/// Views own their codecs through an `Arc` so a single instance can serve
/// any number of views concurrently.
pub type SharedSerializer<T> = Arc<dyn Serializer<T> + Send + Sync>;

/// Reflexive codec for plain string slots. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer<String> for StringSerializer {
    fn serialize(&self, value: &String) -> Result<String> {
        Ok(value.clone())
    }

    fn deserialize(&self, raw: &str) -> Result<String> {
        Ok(raw.to_string())
    }
}

/// Generic JSON codec for any serde-capable type
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    /// Create a JSON codec for `T`
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Serializer<T> for JsonSerializer<T> {
    fn serialize(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize(&self, raw: &str) -> Result<T> {
        serde_json::from_str(raw).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Shared handle to the generic JSON codec for `T`
pub fn json_codec<T>() -> SharedSerializer<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    Arc::new(JsonSerializer::<T>::new())
}

/// Shared handle to the reflexive string codec
pub fn string_codec() -> SharedSerializer<String> {
    Arc::new(StringSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Player {
        name: String,
        level: u32,
    }

    proptest! {
        #[test]
        fn prop_string_codec_round_trips(s in ".*") {
            let codec = StringSerializer;
            let raw = codec.serialize(&s).unwrap();
            prop_assert_eq!(codec.deserialize(&raw).unwrap(), s);
        }

        #[test]
        fn prop_json_codec_round_trips_strings(s in ".*") {
            let codec = JsonSerializer::<String>::new();
            let raw = codec.serialize(&s).unwrap();
            prop_assert_eq!(codec.deserialize(&raw).unwrap(), s);
        }

        #[test]
        fn prop_json_codec_round_trips_ints(n in any::<i64>()) {
            let codec = JsonSerializer::<i64>::new();
            let raw = codec.serialize(&n).unwrap();
            prop_assert_eq!(codec.deserialize(&raw).unwrap(), n);
        }

        #[test]
        fn prop_json_codec_round_trips_structs(name in "[a-zA-Z]{0,12}", level in any::<u32>()) {
            let codec = JsonSerializer::<Player>::new();
            let player = Player { name, level };
            let raw = codec.serialize(&player).unwrap();
            prop_assert_eq!(codec.deserialize(&raw).unwrap(), player);
        }
    }

    #[test]
    fn test_string_codec_is_reflexive() {
        let codec = StringSerializer;
        assert_eq!(codec.serialize(&"abc".to_string()).unwrap(), "abc");
        assert_eq!(codec.deserialize("abc").unwrap(), "abc");
    }

    #[test]
    fn test_json_codec_rejects_malformed_input() {
        let codec = JsonSerializer::<Player>::new();
        let err = codec.deserialize("not json at all").unwrap_err();
        assert!(matches!(err, kvlens_core::Error::Deserialization(_)));
    }

    #[test]
    fn test_json_codec_rejects_foreign_shape() {
        let codec = JsonSerializer::<Player>::new();
        let err = codec.deserialize(r#"{"unrelated": true}"#).unwrap_err();
        assert!(matches!(err, kvlens_core::Error::Deserialization(_)));
    }

    #[test]
    fn test_shared_codec_is_reusable_across_slots() {
        let codec: SharedSerializer<i64> = json_codec();
        let a = Arc::clone(&codec);
        let b = Arc::clone(&codec);
        assert_eq!(a.serialize(&7).unwrap(), "7");
        assert_eq!(b.deserialize("7").unwrap(), 7);
    }
}
