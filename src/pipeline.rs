//! The two-stage key pipeline.
//!
//! 1. The user-index stage runs once on the raw key: layered hooks first (most recently layered first), then the
//!    domain's own `mod_user_index`.
//! 2. If the resulting key's kind is in the iterable set, it is split into its element keys; otherwise it stays a
//!    single key.
//! 3. The index stage runs once per single key, in order: layered hooks, then the domain's `mod_index`.
//!
//! Stage 3 is not applied here for batches. Broadcast code pulls keys from the batch one at a time and calls
//! [`KeyPipeline::mod_index`] on each, so validation and dispatch interleave left to right and a range key is never
//! materialized. Every hook sees the owner the property is bound to.

use indexprop_core::{Key, KeyElements, KindSet};

use crate::domain::KeyDomain;
use crate::error::PropertyError;

/// A layered key hook. It receives the bound owner and the key from the stage above it.
pub type KeyHook<O, E> = Box<dyn Fn(&O, Key) -> Result<Key, E> + Send + Sync>;

/// The outcome of the user-index stage and broadcast decision.
#[derive(Debug, Clone)]
pub enum Expanded {
    Single(Key),
    Batch(KeyElements),
}

impl Expanded {
    pub fn len(&self) -> usize {
        match self {
            Expanded::Single(_) => 1,
            Expanded::Batch(keys) => keys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The keys in order; a single key is a one-element batch.
    pub fn into_keys(self) -> KeyElements {
        match self {
            Expanded::Single(key) => KeyElements::one(key),
            Expanded::Batch(keys) => keys,
        }
    }

    /// Collect every key. Only for batches known to be small.
    pub fn into_vec(self) -> Vec<Key> {
        self.into_keys().collect()
    }
}

pub(crate) struct KeyPipeline<O, E> {
    iterable: KindSet,
    user_hooks: Vec<KeyHook<O, E>>,
    index_hooks: Vec<KeyHook<O, E>>,
}

impl<O, E> KeyPipeline<O, E> {
    pub(crate) fn new(iterable: KindSet) -> Self {
        Self {
            iterable,
            user_hooks: Vec::new(),
            index_hooks: Vec::new(),
        }
    }

    pub(crate) fn iterable(&self) -> KindSet {
        self.iterable
    }

    pub(crate) fn set_iterable(&mut self, kinds: KindSet) {
        self.iterable = kinds;
    }

    pub(crate) fn push_user_hook(&mut self, hook: KeyHook<O, E>) {
        self.user_hooks.push(hook);
    }

    pub(crate) fn push_index_hook(&mut self, hook: KeyHook<O, E>) {
        self.index_hooks.push(hook);
    }

    pub(crate) fn hook_counts(&self) -> (usize, usize) {
        (self.user_hooks.len(), self.index_hooks.len())
    }
}

impl<O, E: From<PropertyError>> KeyPipeline<O, E> {
    /// Run the user-index stage and decide between a single key and a broadcast batch.
    pub(crate) fn expand<D: KeyDomain>(&self, domain: &D, property: &str, owner: &O, key: Key) -> Result<Expanded, E> {
        let mut key = key;
        for hook in self.user_hooks.iter().rev() {
            key = hook(owner, key)?;
        }
        let key = domain.mod_user_index(property, key)?;

        if !self.iterable.contains(key.kind()) {
            return Ok(Expanded::Single(key));
        }
        key.into_elements().map(Expanded::Batch).map_err(|key| {
            let reason = format!("a {} key cannot be expanded here", key.kind());
            PropertyError::invalid_key_type(property, key, reason).into()
        })
    }

    /// Run the index stage on one single key.
    pub(crate) fn mod_index<D: KeyDomain>(&self, domain: &D, property: &str, owner: &O, key: Key) -> Result<D::Index, E> {
        let mut key = key;
        for hook in self.index_hooks.iter().rev() {
            key = hook(owner, key)?;
        }
        Ok(domain.mod_index(property, key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Unchecked;
    use indexprop_core::{IndexRange, KeyKind};

    fn pipeline() -> KeyPipeline<(), PropertyError> {
        KeyPipeline::new(KindSet::SEQUENCES)
    }

    fn expand(p: &KeyPipeline<(), PropertyError>, key: impl Into<Key>) -> Result<Expanded, PropertyError> {
        p.expand(&Unchecked, "p", &(), key.into())
    }

    #[test]
    fn scalar_keys_stay_single() {
        let expanded = expand(&pipeline(), "a").unwrap();
        assert!(matches!(expanded, Expanded::Single(ref key) if key == &Key::from("a")));
    }

    #[test]
    fn sequences_broadcast_in_order() {
        let expanded = expand(&pipeline(), Key::tuple([3, 1, 2])).unwrap();
        assert_eq!(expanded.into_vec(), vec![Key::Int(3), Key::Int(1), Key::Int(2)]);
    }

    #[test]
    fn kinds_outside_the_iterable_set_are_single() {
        let key = Key::from(IndexRange::new(0, 3));
        let expanded = expand(&pipeline(), key.clone()).unwrap();
        assert!(matches!(expanded, Expanded::Single(ref single) if single == &key));
    }

    #[test]
    fn range_batches_stay_lazy() {
        let mut p = pipeline();
        p.set_iterable(KindSet::SEQUENCES.with(KeyKind::Range));
        let expanded = expand(&p, IndexRange::new(0, i64::MAX)).unwrap();
        assert_eq!(expanded.len(), usize::try_from(i64::MAX).unwrap());
        assert_eq!(expanded.into_keys().take(2).collect::<Vec<_>>(), vec![Key::Int(0), Key::Int(1)]);
    }

    #[test]
    fn iterable_slice_without_bounds_is_rejected() {
        let mut p = pipeline();
        p.set_iterable(KindSet::SEQUENCES.with(KeyKind::Slice));
        let err = expand(&p, ..3).unwrap_err();
        assert_eq!(err.kind(), indexprop_core::ErrorKind::InvalidKeyType);
    }

    #[test]
    fn latest_hook_runs_first() {
        let mut p = pipeline();
        for tag in ["first", "second"] {
            p.push_index_hook(Box::new(move |_: &(), key: Key| -> Result<Key, PropertyError> {
                Ok(Key::str(format!("{}-{tag}", key.as_str().unwrap_or_default())))
            }));
        }
        let key = p.mod_index(&Unchecked, "p", &(), Key::from("k")).unwrap();
        assert_eq!(key, Key::from("k-second-first"));
    }

    #[test]
    fn user_hooks_run_before_expansion() {
        let mut p = pipeline();
        p.push_user_hook(Box::new(|_: &(), key: Key| -> Result<Key, PropertyError> { Ok(Key::list([key])) }));
        let expanded = expand(&p, 7).unwrap();
        assert!(matches!(expanded, Expanded::Batch(_)));
        assert_eq!(expanded.into_vec(), vec![Key::Int(7)]);
    }

    #[test]
    fn hooks_see_the_owner() {
        let mut p: KeyPipeline<i64, PropertyError> = KeyPipeline::new(KindSet::SEQUENCES);
        p.push_index_hook(Box::new(|offset: &i64, key: Key| -> Result<Key, PropertyError> {
            Ok(Key::Int(key.as_int().unwrap_or_default() + offset))
        }));
        assert_eq!(p.mod_index(&Unchecked, "p", &10, Key::from(3)), Ok(Key::Int(13)));
    }
}
