//! serde support: containers serialize their sizing, sentinels and live
//! entries, and deserialize by validating the sizing and re-inserting.
//!
//! The strategy is not serialized. Deserialization builds it with
//! `H::default()`.

use crate::config::HashConfig;
use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use crate::strategy::HashingStrategy;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeStruct, Serializer};

struct MapEntries<'a, K, V, H>(&'a HashMap<K, V, H>);

impl<K: Serialize, V: Serialize, H> Serialize for MapEntries<'_, K, V, H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<K, V, H> Serialize for HashMap<K, V, H>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HashMap", 5)?;
        state.serialize_field("capacity", &self.capacity())?;
        state.serialize_field("load_factor", &self.load_factor())?;
        state.serialize_field("no_entry_key", &self.no_entry_key())?;
        state.serialize_field("no_entry_value", self.no_entry_value())?;
        state.serialize_field("entries", &MapEntries(self))?;
        state.end()
    }
}

#[derive(serde::Deserialize)]
#[serde(rename = "HashMap")]
struct MapRepr<K, V> {
    capacity: usize,
    load_factor: f32,
    no_entry_key: Option<K>,
    no_entry_value: V,
    entries: Vec<(K, V)>,
}

impl<'de, K, V, H> Deserialize<'de> for HashMap<K, V, H>
where
    K: Deserialize<'de>,
    V: Deserialize<'de> + Clone,
    H: HashingStrategy<K> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = MapRepr::<K, V>::deserialize(deserializer)?;
        let config = HashConfig::new(repr.capacity, repr.load_factor);
        let mut map =
            HashMap::with_no_entry(config, H::default(), repr.no_entry_key, repr.no_entry_value)
                .map_err(de::Error::custom)?;
        map.extend(repr.entries);
        Ok(map)
    }
}

struct SetElements<'a, K, H>(&'a HashSet<K, H>);

impl<K: Serialize, H> Serialize for SetElements<'_, K, H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<K: Serialize, H> Serialize for HashSet<K, H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HashSet", 3)?;
        state.serialize_field("capacity", &self.capacity())?;
        state.serialize_field("load_factor", &self.load_factor())?;
        state.serialize_field("entries", &SetElements(self))?;
        state.end()
    }
}

#[derive(serde::Deserialize)]
#[serde(rename = "HashSet")]
struct SetRepr<K> {
    capacity: usize,
    load_factor: f32,
    entries: Vec<K>,
}

impl<'de, K, H> Deserialize<'de> for HashSet<K, H>
where
    K: Deserialize<'de>,
    H: HashingStrategy<K> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SetRepr::<K>::deserialize(deserializer)?;
        let config = HashConfig::new(repr.capacity, repr.load_factor);
        let mut set = HashSet::with_config(config, H::default()).map_err(de::Error::custom)?;
        set.extend(repr.entries);
        Ok(set)
    }
}
