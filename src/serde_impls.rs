use crate::CounterMap;
use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt::{self, Formatter};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

struct CounterMapVisitor<K, S> {
    key_marker: PhantomData<K>,
    hash_builder_marker: PhantomData<S>,
}

impl<K, S> Serialize for CounterMap<K, S>
where
    K: Clone + Serialize,
{
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.iter() {
            map.serialize_entry(&key, &value)?;
        }
        map.end()
    }
}

impl<'de, K, S> Deserialize<'de> for CounterMap<K, S>
where
    K: Deserialize<'de> + Hash + Eq,
    S: Default + BuildHasher + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CounterMapVisitor::new())
    }
}

impl<K, S> CounterMapVisitor<K, S> {
    pub(crate) fn new() -> Self {
        Self {
            key_marker: PhantomData,
            hash_builder_marker: PhantomData,
        }
    }
}

impl<'de, K, S> Visitor<'de> for CounterMapVisitor<K, S>
where
    K: Deserialize<'de> + Hash + Eq,
    S: Default + BuildHasher + Clone,
{
    type Value = CounterMap<K, S>;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a map of counters")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let map = match access.size_hint() {
            Some(n) => CounterMap::with_capacity_and_hasher(n, S::default()),
            None => CounterMap::with_hasher(S::default()),
        };

        while let Some((key, value)) = access.next_entry::<K, i64>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(
                    "serialized counter map held two values with the same key",
                ));
            }
            map.put(key, value);
        }

        Ok(map)
    }
}
