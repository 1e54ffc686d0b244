//! Node Attributes
//!
//! Every node carries an attribute map the engine stores but never reads.
//! The map sits behind a shared handle: cloning an [`Attributes`] gives a
//! second handle onto the same map, which is how subgraph nodes see writes
//! made through the source graph and vice versa.

use std::fmt::{self, Debug};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use serde_json::Value;

/// The map stored behind an [`Attributes`] handle. Keys keep insertion order.
pub type AttributeMap = IndexMap<String, Value>;

/// Shared, mutable attribute payload of a node.
#[derive(Clone, Default)]
pub struct Attributes {
    inner: Arc<RwLock<AttributeMap>>,
}

impl Attributes {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a single value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Write a single value, returning the one it replaced.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Remove a value, keeping the order of the remaining keys.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Lock the map for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, AttributeMap> {
        self.inner.read()
    }

    /// Lock the map for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, AttributeMap> {
        self.inner.write()
    }

    /// Copy the current contents out of the lock.
    pub fn to_map(&self) -> AttributeMap {
        self.inner.read().clone()
    }

    /// Whether both handles point at the same map.
    pub fn shares_with(&self, other: &Attributes) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<AttributeMap> for Attributes {
    fn from(map: AttributeMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<AttributeMap>()
            .into()
    }
}

/// Compares contents, not identity. Use [`Attributes::shares_with`] for identity.
impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        if self.shares_with(other) {
            return true;
        }
        *self.inner.read() == *other.inner.read()
    }
}

impl Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.read().iter()).finish()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        AttributeMap::deserialize(deserializer).map(Attributes::from)
    }
}
