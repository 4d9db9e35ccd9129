//! The capability table of one property.
//!
//! The four built-in slots (getter, setter, deleter, key iterator) are stored as typed closures. User extensions
//! are stored by name behind a type-erased signature and checked against the argument and result types they were
//! registered with when invoked.

use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;
use std::fmt;

use indexprop_core::Key;

use crate::domain::KeyDomain;
use crate::error::{PropertyError, Result};
use crate::proxy::{Proxy, ProxyMut};

pub(crate) type Getter<O, V, E, I> = Box<dyn Fn(&O, I) -> Result<V, E> + Send + Sync>;
pub(crate) type Setter<O, V, E, I> = Box<dyn Fn(&mut O, I, V) -> Result<(), E> + Send + Sync>;
pub(crate) type Deleter<O, E, I> = Box<dyn Fn(&mut O, I) -> Result<(), E> + Send + Sync>;
pub(crate) type KeyLister<O> = Box<dyn Fn(&O) -> Vec<Key> + Send + Sync>;

type Erased = Box<dyn Any>;

pub(crate) type ReadFn<O, V, E, D> =
    Box<dyn for<'p> Fn(&Proxy<'p, O, V, E, D>, Erased) -> Result<Erased, E> + Send + Sync>;
pub(crate) type WriteFn<O, V, E, D> =
    Box<dyn for<'p> Fn(&mut ProxyMut<'p, O, V, E, D>, Erased) -> Result<Erased, E> + Send + Sync>;

pub(crate) enum Access<O, V, E, D: KeyDomain> {
    Read(ReadFn<O, V, E, D>),
    Write(WriteFn<O, V, E, D>),
}

/// One named user extension.
pub(crate) struct Capability<O, V, E, D: KeyDomain> {
    pub(crate) access: Access<O, V, E, D>,
    args: TypeId,
    args_name: &'static str,
    output: TypeId,
    output_name: &'static str,
}

// The helpers pin the closure signatures so the higher-ranked proxy lifetime is inferred.
fn erase_read<O, V, E, D: KeyDomain, F>(f: F) -> ReadFn<O, V, E, D>
where
    F: for<'p> Fn(&Proxy<'p, O, V, E, D>, Erased) -> Result<Erased, E> + Send + Sync + 'static,
{
    Box::new(f)
}

fn erase_write<O, V, E, D: KeyDomain, F>(f: F) -> WriteFn<O, V, E, D>
where
    F: for<'p> Fn(&mut ProxyMut<'p, O, V, E, D>, Erased) -> Result<Erased, E> + Send + Sync + 'static,
{
    Box::new(f)
}

fn unpack<A: 'static, R: 'static, E: From<PropertyError>>(property: &str, name: &str, args: Erased) -> Result<A, E> {
    args.downcast::<A>()
        .map(|args| *args)
        .map_err(|_| PropertyError::capability_signature(property, name, type_name::<A>(), type_name::<R>()).into())
}

impl<O, V, E, D> Capability<O, V, E, D>
where
    O: 'static,
    V: 'static,
    E: From<PropertyError> + 'static,
    D: KeyDomain + 'static,
{
    pub(crate) fn read<A, R, F>(name: &str, f: F) -> Self
    where
        A: 'static,
        R: 'static,
        F: for<'p> Fn(&Proxy<'p, O, V, E, D>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        let name = name.to_string();
        let erased = erase_read::<O, V, E, D, _>(move |proxy, args| {
            let args = unpack::<A, R, E>(proxy.name(), &name, args)?;
            f(proxy, args).map(|out| Box::new(out) as Erased)
        });
        Self::typed::<A, R>(Access::Read(erased))
    }

    pub(crate) fn write<A, R, F>(name: &str, f: F) -> Self
    where
        A: 'static,
        R: 'static,
        F: for<'p> Fn(&mut ProxyMut<'p, O, V, E, D>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        let name = name.to_string();
        let erased = erase_write::<O, V, E, D, _>(move |proxy, args| {
            let args = unpack::<A, R, E>(proxy.name(), &name, args)?;
            f(proxy, args).map(|out| Box::new(out) as Erased)
        });
        Self::typed::<A, R>(Access::Write(erased))
    }

    fn typed<A: 'static, R: 'static>(access: Access<O, V, E, D>) -> Self {
        Self {
            access,
            args: TypeId::of::<A>(),
            args_name: type_name::<A>(),
            output: TypeId::of::<R>(),
            output_name: type_name::<R>(),
        }
    }
}

impl<O, V, E, D: KeyDomain> Capability<O, V, E, D> {
    /// Check that a call site uses the registered argument and result types.
    pub(crate) fn check<A: 'static, R: 'static>(&self, property: &str, name: &str) -> Result<()> {
        if self.args == TypeId::of::<A>() && self.output == TypeId::of::<R>() {
            Ok(())
        } else {
            Err(PropertyError::capability_signature(
                property,
                name,
                self.args_name,
                self.output_name,
            ))
        }
    }
}

/// Recover a typed result from an erased capability call.
pub(crate) fn unpack_output<A: 'static, R: 'static, E: From<PropertyError>>(
    property: &str,
    name: &str,
    out: Erased,
) -> Result<R, E> {
    out.downcast::<R>()
        .map(|out| *out)
        .map_err(|_| PropertyError::capability_signature(property, name, type_name::<A>(), type_name::<R>()).into())
}

pub(crate) struct CapabilitySet<O, V, E, D: KeyDomain> {
    pub(crate) getter: Option<Getter<O, V, E, D::Index>>,
    pub(crate) setter: Option<Setter<O, V, E, D::Index>>,
    pub(crate) deleter: Option<Deleter<O, E, D::Index>>,
    pub(crate) iterator: Option<KeyLister<O>>,
    extras: BTreeMap<String, Capability<O, V, E, D>>,
}

impl<O, V, E, D: KeyDomain> CapabilitySet<O, V, E, D> {
    pub(crate) fn new() -> Self {
        Self {
            getter: None,
            setter: None,
            deleter: None,
            iterator: None,
            extras: BTreeMap::new(),
        }
    }

    pub(crate) fn extra(&self, name: &str) -> Option<&Capability<O, V, E, D>> {
        self.extras.get(name)
    }

    /// Insert or replace a named extension; returns true if a previous one was replaced.
    pub(crate) fn insert_extra(&mut self, name: &str, capability: Capability<O, V, E, D>) -> bool {
        self.extras.insert(name.to_string(), capability).is_some()
    }

    /// Names of every registered operation, built-in slots first.
    pub(crate) fn names(&self) -> Vec<&str> {
        let slots = [
            ("get", self.getter.is_some()),
            ("set", self.setter.is_some()),
            ("delete", self.deleter.is_some()),
            ("iterate", self.iterator.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .chain(self.extras.keys().map(String::as_str))
            .collect()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

impl<O, V, E, D: KeyDomain> fmt::Debug for CapabilitySet<O, V, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("names", &self.names())
            .finish()
    }
}
