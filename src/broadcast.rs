//! Broadcast fan-out and fan-in.
//!
//! Reads of a batch collect one result per key. Writes either replicate one value to every key or zip one value
//! per key; deletes run once per key. Everything is evaluated strictly left to right and stops at the first
//! failure. Writes that already happened are kept.

use indexprop_core::Key;

use crate::error::PropertyError;

/// The result of a read: one value for a single key, a sequence for a broadcast key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indexed<V> {
    Single(V),
    Batch(Vec<V>),
}

impl<V> Indexed<V> {
    /// Return the value of a single-key read, or `None` for a batch.
    pub fn into_single(self) -> Option<V> {
        match self {
            Indexed::Single(value) => Some(value),
            Indexed::Batch(_) => None,
        }
    }

    /// Flatten into a vector; a single value becomes a one-element vector.
    pub fn into_vec(self) -> Vec<V> {
        match self {
            Indexed::Single(value) => vec![value],
            Indexed::Batch(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indexed::Single(_) => 1,
            Indexed::Batch(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Indexed::Batch(_))
    }

    pub fn map<U>(self, mut f: impl FnMut(V) -> U) -> Indexed<U> {
        match self {
            Indexed::Single(value) => Indexed::Single(f(value)),
            Indexed::Batch(values) => Indexed::Batch(values.into_iter().map(f).collect()),
        }
    }
}

/// The value side of a write.
///
/// `Scalar` is written to every key; `Each` supplies exactly one value per key. A string value is an ordinary
/// scalar: nothing is ever split implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assign<V> {
    Scalar(V),
    Each(Vec<V>),
}

pub(crate) fn gather<V, E>(
    keys: impl IntoIterator<Item = Key>,
    mut read: impl FnMut(Key) -> Result<V, E>,
) -> Result<Vec<V>, E> {
    // Grow with the results rather than the key count: a huge range stops at its first bad key.
    let mut values = Vec::new();
    for key in keys {
        values.push(read(key)?);
    }
    Ok(values)
}

pub(crate) fn replicate<V: Clone, E>(
    property: &str,
    keys: impl IntoIterator<Item = Key>,
    value: V,
    mut write: impl FnMut(Key, V) -> Result<(), E>,
) -> Result<(), E> {
    for (written, key) in keys.into_iter().enumerate() {
        if let Err(err) = write(key, value.clone()) {
            tracing::debug!(property, written, "broadcast write aborted");
            return Err(err);
        }
    }
    Ok(())
}

pub(crate) fn zip_each<I, V, E>(
    property: &str,
    keys: I,
    values: Vec<V>,
    mut write: impl FnMut(Key, V) -> Result<(), E>,
) -> Result<(), E>
where
    I: IntoIterator<Item = Key>,
    I::IntoIter: ExactSizeIterator,
    E: From<PropertyError>,
{
    let keys = keys.into_iter();
    if keys.len() != values.len() {
        return Err(PropertyError::broadcast_length_mismatch(property, keys.len(), values.len()).into());
    }
    for (written, (key, value)) in keys.zip(values).enumerate() {
        if let Err(err) = write(key, value) {
            tracing::debug!(property, written, "broadcast write aborted");
            return Err(err);
        }
    }
    Ok(())
}

pub(crate) fn sweep<E>(
    property: &str,
    keys: impl IntoIterator<Item = Key>,
    mut delete: impl FnMut(Key) -> Result<(), E>,
) -> Result<(), E> {
    for (deleted, key) in keys.into_iter().enumerate() {
        if let Err(err) = delete(key) {
            tracing::debug!(property, deleted, "broadcast delete aborted");
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: i64) -> Vec<Key> {
        (0..n).map(Key::Int).collect()
    }

    #[test]
    fn gather_preserves_order() {
        let out: Result<Vec<i64>, PropertyError> = gather(keys(3), |k| Ok(k.as_int().unwrap_or_default() * 10));
        assert_eq!(out.unwrap(), vec![0, 10, 20]);
    }

    #[test]
    fn replicate_writes_every_key() {
        let mut seen = Vec::new();
        replicate::<_, PropertyError>("p", keys(3), "x", |k, v| {
            seen.push((k, v));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![(Key::Int(0), "x"), (Key::Int(1), "x"), (Key::Int(2), "x")]);
    }

    #[test]
    fn zip_checks_length_before_writing() {
        let mut writes = 0;
        let err = zip_each::<_, _, PropertyError>("p", keys(3), vec![1, 2], |_, _| {
            writes += 1;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(writes, 0);
        assert_eq!(err, PropertyError::broadcast_length_mismatch("p", 3, 2));
    }

    #[test]
    fn writes_stop_at_first_failure_and_keep_earlier_writes() {
        let mut written = Vec::new();
        let err = zip_each("p", keys(4), vec!['a', 'b', 'c', 'd'], |k, v| {
            if k == Key::Int(2) {
                return Err(PropertyError::unsupported("p", "set"));
            }
            written.push(v);
            Ok(())
        })
        .unwrap_err();
        assert_eq!(written, vec!['a', 'b']);
        assert_eq!(err.kind(), indexprop_core::ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn huge_batches_stop_at_the_first_failure() {
        let Ok(keys) = Key::from(indexprop_core::IndexRange::new(0, i64::MAX)).into_elements() else {
            panic!("a range key has elements");
        };
        let mut reads = 0;
        let err = gather(keys.clone(), |key| {
            reads += 1;
            match key.as_int() {
                Some(i) if i < 4 => Ok(i),
                _ => Err(PropertyError::index_out_of_range("p", key.as_int().unwrap_or_default(), 0, 4)),
            }
        })
        .unwrap_err();
        assert_eq!(reads, 5);
        assert_eq!(err, PropertyError::index_out_of_range("p", 4, 0, 4));

        let err = zip_each::<_, _, PropertyError>("p", keys, vec![1, 2], |_, _| Ok(())).unwrap_err();
        let keys = usize::try_from(i64::MAX).unwrap();
        assert_eq!(err, PropertyError::broadcast_length_mismatch("p", keys, 2));
    }

    #[test]
    fn indexed_helpers() {
        assert_eq!(Indexed::Single(3).into_vec(), vec![3]);
        assert_eq!(Indexed::Batch(vec![1, 2]).map(|v| v * 2), Indexed::Batch(vec![2, 4]));
        assert_eq!(Indexed::<i32>::Batch(vec![]).into_single(), None);
        assert!(Indexed::<i32>::Batch(vec![]).is_empty());
    }
}
