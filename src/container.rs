//! Properties whose keys must belong to a base collection.
//!
//! Every single key is checked for membership in the base before it reaches the getter, setter or deleter;
//! absent keys fail with `KeyNotFound`. Length, iteration and `items` are read from the base, so they are only
//! available when the base can provide them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasher;

use indexprop_core::{IndexRange, Key};

use crate::descriptor::IndexedProperty;
use crate::domain::KeyDomain;
use crate::error::{PropertyError, Result};
use crate::proxy::Proxy;

/// Most keys listed in a generated index description.
const MAX_DOCUMENTED_KEYS: usize = 8;

/// A collection that defines the legal keys of a container property.
pub trait KeyBase {
    fn contains_key(&self, key: &Key) -> bool;

    /// Number of keys, if the collection is sized.
    fn key_count(&self) -> Option<usize> {
        None
    }

    /// Iterate the keys, if the collection is iterable. Each call starts a fresh iteration.
    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        None
    }
}

impl KeyBase for Vec<Key> {
    fn contains_key(&self, key: &Key) -> bool {
        self.contains(key)
    }

    fn key_count(&self) -> Option<usize> {
        Some(self.len())
    }

    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        Some(Box::new(self.iter().cloned()))
    }
}

impl KeyBase for BTreeSet<Key> {
    fn contains_key(&self, key: &Key) -> bool {
        self.contains(key)
    }

    fn key_count(&self) -> Option<usize> {
        Some(self.len())
    }

    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        Some(Box::new(self.iter().cloned()))
    }
}

impl<S: BuildHasher> KeyBase for HashSet<Key, S> {
    fn contains_key(&self, key: &Key) -> bool {
        self.contains(key)
    }

    fn key_count(&self) -> Option<usize> {
        Some(self.len())
    }

    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        Some(Box::new(self.iter().cloned()))
    }
}

impl<T> KeyBase for BTreeMap<Key, T> {
    fn contains_key(&self, key: &Key) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn key_count(&self) -> Option<usize> {
        Some(self.len())
    }

    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        Some(Box::new(self.keys().cloned()))
    }
}

impl<T, S: BuildHasher> KeyBase for HashMap<Key, T, S> {
    fn contains_key(&self, key: &Key) -> bool {
        HashMap::contains_key(self, key)
    }

    fn key_count(&self) -> Option<usize> {
        Some(self.len())
    }

    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        Some(Box::new(self.keys().cloned()))
    }
}

impl KeyBase for IndexRange {
    fn contains_key(&self, key: &Key) -> bool {
        key.as_int().is_some_and(|i| self.contains(i))
    }

    fn key_count(&self) -> Option<usize> {
        Some(self.len())
    }

    fn iter_keys(&self) -> Option<Box<dyn Iterator<Item = Key> + '_>> {
        Some(Box::new(self.iter().map(Key::Int)))
    }
}

/// A membership-only base: a predicate with no size and no iteration.
pub struct Membership<F>(pub F);

impl<F: Fn(&Key) -> bool> KeyBase for Membership<F> {
    fn contains_key(&self, key: &Key) -> bool {
        (self.0)(key)
    }
}

impl<F> fmt::Debug for Membership<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Membership(..)")
    }
}

/// The container key domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<B> {
    base: B,
}

impl<B> Container<B> {
    pub fn new(base: B) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<B: KeyBase> KeyDomain for Container<B> {
    type Index = Key;

    const KIND: &'static str = "ContainerProperty";
    const RESERVED: &'static [&'static str] = &["get", "set", "delete", "iterate", "len", "items", "contains"];

    fn mod_index(&self, property: &str, key: Key) -> Result<Key> {
        if self.base.contains_key(&key) {
            Ok(key)
        } else {
            Err(PropertyError::key_not_found(property, key))
        }
    }

    fn describe_indices(&self) -> Option<String> {
        // One key past the limit tells us whether to truncate; the ellipsis takes a slot.
        let mut shown: Vec<String> = self
            .base
            .iter_keys()?
            .take(MAX_DOCUMENTED_KEYS + 1)
            .map(|key| key.to_string())
            .collect();
        if shown.len() > MAX_DOCUMENTED_KEYS {
            shown.truncate(MAX_DOCUMENTED_KEYS - 1);
            shown.push("...".to_string());
        }
        Some(format!("Indices are from {}", shown.join(", ")))
    }
}

/// A property whose keys must be members of `B`.
pub type ContainerProperty<O, V, B = Vec<Key>, E = PropertyError> = IndexedProperty<O, V, E, Container<B>>;

/// A read-only view of a container property.
pub type ContainerProxy<'a, O, V, B = Vec<Key>, E = PropertyError> = Proxy<'a, O, V, E, Container<B>>;

impl<O, V, B: KeyBase, E> IndexedProperty<O, V, E, Container<B>> {
    /// Create an unbound container property; register its getter with [`IndexedProperty::declare`].
    pub fn over(base: B) -> Self {
        Self::in_domain(Container::new(base))
    }

    /// Keys of the base in its iteration order, if the base is iterable.
    pub fn keys(&self) -> Option<Vec<Key>> {
        self.domain().base.iter_keys().map(Iterator::collect)
    }
}

/// Declare a container property over `base` with its getter.
pub fn declare_container_indexed<O, V, E, B, G>(base: B, getter: G) -> ContainerProperty<O, V, B, E>
where
    B: KeyBase,
    G: Fn(&O, Key) -> Result<V, E> + Send + Sync + 'static,
{
    IndexedProperty::over(base).with_getter(Box::new(getter))
}

impl<'a, O, V, E: From<PropertyError>, B: KeyBase> Proxy<'a, O, V, E, Container<B>> {
    fn base(&self) -> &'a B {
        &self.property().domain().base
    }

    /// Number of keys in the base.
    pub fn len(&self) -> Result<usize, E> {
        self.base()
            .key_count()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "len").into())
    }

    pub fn is_empty(&self) -> Result<bool, E> {
        self.len().map(|len| len == 0)
    }

    pub fn contains(&self, key: impl Into<Key>) -> bool {
        self.base().contains_key(&key.into())
    }

    /// Iterate the keys of the base, in its order.
    pub fn iter(&self) -> Result<Box<dyn Iterator<Item = Key> + 'a>, E> {
        self.base()
            .iter_keys()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "iterate").into())
    }

    /// `(key, value)` pairs in the base's order; each value is read on demand.
    pub fn items(&self) -> Result<impl Iterator<Item = Result<(Key, V), E>> + 'a, E> {
        let proxy = *self;
        let keys = self
            .base()
            .iter_keys()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "items"))?;
        Ok(keys.map(move |key| -> Result<(Key, V), E> {
            let value = proxy.property().read_index(proxy.owner(), key.clone())?;
            Ok((key, value))
        }))
    }
}
