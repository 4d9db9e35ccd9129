//! Properties indexed by a half-open integer range.
//!
//! Keys are integers in `[start, stop)`. When `start >= 0`, a negative key counts back from `stop` (so `-1` is
//! the last index). Slices are expanded into the indices they select, with bounds read as absolute keys and
//! clipped to the range, and then broadcast like any other collection key.

use std::iter::Rev;

use indexprop_core::{IndexRange, IndexRangeIter, Key, KeyKind, KindSet};

use crate::descriptor::IndexedProperty;
use crate::domain::KeyDomain;
use crate::error::{PropertyError, Result};
use crate::proxy::Proxy;

/// The `[start, stop)` key domain of a range property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntRange {
    start: i64,
    stop: i64,
}

impl IntRange {
    /// Create the range `[start, stop)`.
    ///
    /// ## Errors
    /// - `ConfigurationError` if `stop < start`.
    pub fn new(start: i64, stop: i64) -> Result<Self> {
        if stop < start {
            return Err(PropertyError::configuration(
                Self::KIND,
                format!("stop {stop} is below start {start}"),
            ));
        }
        Ok(Self { start, stop })
    }

    /// Create the range `[0, stop)`.
    pub fn upto(stop: i64) -> Result<Self> {
        Self::new(0, stop)
    }

    pub const fn start(&self) -> i64 {
        self.start
    }

    pub const fn stop(&self) -> i64 {
        self.stop
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Whether `index` lies in `[start, stop)`, without wraparound.
    pub const fn contains(&self, index: i64) -> bool {
        self.start <= index && index < self.stop
    }

    pub const fn indices(&self) -> IndexRange {
        IndexRange::new(self.start, self.stop)
    }

    fn wrap(&self, index: i64) -> i64 {
        if index < 0 && self.start >= 0 {
            self.stop.saturating_add(index)
        } else {
            index
        }
    }
}

impl KeyDomain for IntRange {
    type Index = i64;

    const KIND: &'static str = "RangeProperty";
    const RESERVED: &'static [&'static str] = &[
        "get",
        "set",
        "delete",
        "iterate",
        "len",
        "items",
        "contains",
        "reverse_iterate",
        "range_bounds",
        "values",
    ];

    fn iterable_kinds(&self) -> KindSet {
        KindSet::SEQUENCES.with(KeyKind::Range)
    }

    fn mod_user_index(&self, property: &str, key: Key) -> Result<Key> {
        match key {
            Key::Slice(slice) => slice
                .within(self.start, self.stop)
                .map(Key::Range)
                .map_err(|err| PropertyError::invalid_key_type(property, Key::Slice(slice), err.message())),
            key => Ok(key),
        }
    }

    fn mod_index(&self, property: &str, key: Key) -> Result<i64> {
        let Some(index) = key.as_int() else {
            return Err(PropertyError::invalid_key_type(property, key, "expected an integer"));
        };
        let wrapped = self.wrap(index);
        if self.contains(wrapped) {
            Ok(wrapped)
        } else {
            Err(PropertyError::index_out_of_range(property, index, self.start, self.stop))
        }
    }

    fn describe_indices(&self) -> Option<String> {
        Some(format!("Index range is {}:{}", self.start, self.stop))
    }
}

/// A property indexed by `[start, stop)`.
pub type RangeProperty<O, V, E = PropertyError> = IndexedProperty<O, V, E, IntRange>;

/// A read-only view of a range property.
pub type RangeProxy<'a, O, V, E = PropertyError> = Proxy<'a, O, V, E, IntRange>;

impl<O, V, E> IndexedProperty<O, V, E, IntRange> {
    /// Create an unbound range property over `[start, stop)`.
    pub fn span(start: i64, stop: i64) -> Result<Self> {
        IntRange::new(start, stop).map(Self::in_domain)
    }

    /// Create an unbound range property over `[0, stop)`.
    pub fn upto(stop: i64) -> Result<Self> {
        Self::span(0, stop)
    }

    pub fn bounds(&self) -> IntRange {
        *self.domain()
    }
}

/// Declare a range property over `bounds` with its getter.
pub fn declare_range_indexed<O, V, E, G>(bounds: IntRange, getter: G) -> RangeProperty<O, V, E>
where
    G: Fn(&O, i64) -> Result<V, E> + Send + Sync + 'static,
{
    IndexedProperty::in_domain(bounds).with_getter(Box::new(getter))
}

impl<'a, O, V, E> Proxy<'a, O, V, E, IntRange> {
    fn bounds(&self) -> IntRange {
        *self.property().domain()
    }

    pub fn len(&self) -> usize {
        self.bounds().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds().is_empty()
    }

    /// Whether `index` is a key of the range (no wraparound).
    pub fn contains(&self, index: i64) -> bool {
        self.bounds().contains(index)
    }

    /// `(start, stop)`.
    pub fn range_bounds(&self) -> (i64, i64) {
        let bounds = self.bounds();
        (bounds.start, bounds.stop)
    }

    /// The keys as a [`IndexRange`].
    pub fn range(&self) -> IndexRange {
        self.bounds().indices()
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> IndexRangeIter {
        self.range().iter()
    }

    /// Keys in descending order.
    pub fn reverse_iterate(&self) -> Rev<IndexRangeIter> {
        self.iter().rev()
    }
}

impl<'a, O, V, E: From<PropertyError>> Proxy<'a, O, V, E, IntRange> {
    /// `(index, value)` pairs in ascending order; each value is read on demand.
    pub fn items(&self) -> impl Iterator<Item = Result<(i64, V), E>> + 'a {
        let proxy = *self;
        self.iter().map(move |index| -> Result<(i64, V), E> {
            let value = proxy.property().read_index(proxy.owner(), index)?;
            Ok((index, value))
        })
    }

    /// Values in ascending index order.
    pub fn values(&self) -> impl Iterator<Item = Result<V, E>> + 'a {
        let proxy = *self;
        self.iter()
            .map(move |index| proxy.property().read_index(proxy.owner(), index))
    }
}

impl<O, V, E> IntoIterator for Proxy<'_, O, V, E, IntRange> {
    type Item = i64;
    type IntoIter = IndexRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<O, V, E> IntoIterator for &Proxy<'_, O, V, E, IntRange> {
    type Item = i64;
    type IntoIter = IndexRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
