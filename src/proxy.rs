//! Owner-bound views of an indexed property.
//!
//! A [`Proxy`] borrows a property and an owner for reading; a [`ProxyMut`] borrows the owner mutably and also
//! writes and deletes. Both are created on demand by [`IndexedProperty::bind`] / [`IndexedProperty::bind_mut`],
//! carry no state of their own, and cannot outlive the owner they borrow.
//!
//! Domain-specific operations (`len`, `contains`, `items`, ...) live in `impl` blocks next to each domain.

use indexprop_core::Key;

use crate::broadcast::{Assign, Indexed};
use crate::capability::{Access, unpack_output};
use crate::descriptor::IndexedProperty;
use crate::domain::{KeyDomain, Unchecked};
use crate::error::{PropertyError, Result};

/// A read-only view of a property on one owner.
pub struct Proxy<'a, O, V, E = PropertyError, D: KeyDomain = Unchecked> {
    property: &'a IndexedProperty<O, V, E, D>,
    owner: &'a O,
}

// Manual impls: a proxy is two shared references regardless of `O` and `V`.
impl<O, V, E, D: KeyDomain> Clone for Proxy<'_, O, V, E, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, V, E, D: KeyDomain> Copy for Proxy<'_, O, V, E, D> {}

impl<'a, O, V, E, D: KeyDomain> Proxy<'a, O, V, E, D> {
    pub(crate) fn new(property: &'a IndexedProperty<O, V, E, D>, owner: &'a O) -> Self {
        Self { property, owner }
    }

    pub fn owner(&self) -> &'a O {
        self.owner
    }

    pub fn property(&self) -> &'a IndexedProperty<O, V, E, D> {
        self.property
    }

    pub fn name(&self) -> &'a str {
        self.property.name()
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.property.has_capability(name)
    }
}

impl<'a, O, V, E: From<PropertyError>, D: KeyDomain> Proxy<'a, O, V, E, D> {
    /// Read one key, or every key of a broadcast key in order.
    #[tracing::instrument(level = "trace", skip_all, fields(property = %self.name()))]
    pub fn get(&self, key: impl Into<Key>) -> Result<Indexed<V>, E> {
        self.property.read(self.owner, key.into())
    }

    /// Invoke a named read-only extension.
    ///
    /// ## Errors
    /// - `UnsupportedOperation` if no extension has that name, or it needs mutable access.
    /// - `CapabilitySignature` if `A` or `R` differ from the registered types.
    #[tracing::instrument(level = "trace", skip_all, fields(property = %self.name(), capability = name))]
    pub fn invoke<A: 'static, R: 'static>(&self, name: &str, args: A) -> Result<R, E> {
        let property = self.name();
        let capability = self
            .property
            .capabilities()
            .extra(name)
            .ok_or_else(|| PropertyError::unsupported(property, name))?;
        capability.check::<A, R>(property, name)?;
        match &capability.access {
            Access::Read(f) => unpack_output::<A, R, E>(property, name, f(self, Box::new(args))?),
            Access::Write(_) => {
                Err(PropertyError::unsupported(property, format!("{name} (needs a mutable binding)")).into())
            }
        }
    }
}

impl<'a, O, V, E: From<PropertyError>> Proxy<'a, O, V, E, Unchecked> {
    /// Keys produced by the registered iterator.
    ///
    /// ## Errors
    /// - `UnsupportedOperation` if no iterator is registered.
    pub fn iter(&self) -> Result<std::vec::IntoIter<Key>, E> {
        let keys = self
            .property
            .capabilities()
            .iterator
            .as_ref()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "iterate"))?;
        Ok(keys(self.owner).into_iter())
    }
}

/// A read-write view of a property on one owner.
pub struct ProxyMut<'a, O, V, E = PropertyError, D: KeyDomain = Unchecked> {
    property: &'a IndexedProperty<O, V, E, D>,
    owner: &'a mut O,
}

impl<'a, O, V, E, D: KeyDomain> ProxyMut<'a, O, V, E, D> {
    pub(crate) fn new(property: &'a IndexedProperty<O, V, E, D>, owner: &'a mut O) -> Self {
        Self { property, owner }
    }

    /// Reborrow as a read-only proxy.
    pub fn as_proxy(&self) -> Proxy<'_, O, V, E, D> {
        Proxy::new(self.property, self.owner)
    }

    pub fn owner(&self) -> &O {
        self.owner
    }

    pub fn owner_mut(&mut self) -> &mut O {
        self.owner
    }

    pub fn property(&self) -> &'a IndexedProperty<O, V, E, D> {
        self.property
    }

    pub fn name(&self) -> &'a str {
        self.property.name()
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.property.has_capability(name)
    }
}

impl<'a, O, V, E: From<PropertyError>, D: KeyDomain> ProxyMut<'a, O, V, E, D> {
    pub fn get(&self, key: impl Into<Key>) -> Result<Indexed<V>, E> {
        self.as_proxy().get(key)
    }

    /// Write `value` to the key; a broadcast key receives a copy at every element.
    #[tracing::instrument(level = "trace", skip_all, fields(property = %self.name()))]
    pub fn set(&mut self, key: impl Into<Key>, value: V) -> Result<(), E>
    where
        V: Clone,
    {
        self.property.write(self.owner, key.into(), value)
    }

    /// Write one value per key, pairwise. The number of values must equal the number of keys.
    #[tracing::instrument(level = "trace", skip_all, fields(property = %self.name(), values = values.len()))]
    pub fn set_each(&mut self, key: impl Into<Key>, values: Vec<V>) -> Result<(), E> {
        self.property.write_each(self.owner, key.into(), values)
    }

    pub fn assign(&mut self, key: impl Into<Key>, value: Assign<V>) -> Result<(), E>
    where
        V: Clone,
    {
        match value {
            Assign::Scalar(value) => self.set(key, value),
            Assign::Each(values) => self.set_each(key, values),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(property = %self.name()))]
    pub fn delete(&mut self, key: impl Into<Key>) -> Result<(), E> {
        self.property.remove(self.owner, key.into())
    }

    /// Invoke a named extension, read-only or mutable.
    ///
    /// ## Errors
    /// - `UnsupportedOperation` if no extension has that name.
    /// - `CapabilitySignature` if `A` or `R` differ from the registered types.
    #[tracing::instrument(level = "trace", skip_all, fields(property = %self.name(), capability = name))]
    pub fn invoke<A: 'static, R: 'static>(&mut self, name: &str, args: A) -> Result<R, E> {
        let property = self.property;
        let label = property.name();
        let capability = property
            .capabilities()
            .extra(name)
            .ok_or_else(|| PropertyError::unsupported(label, name))?;
        capability.check::<A, R>(label, name)?;
        let out = match &capability.access {
            Access::Read(f) => f(&self.as_proxy(), Box::new(args))?,
            Access::Write(f) => f(self, Box::new(args))?,
        };
        unpack_output::<A, R, E>(label, name, out)
    }
}
