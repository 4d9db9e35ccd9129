//! The per-declaration record of one indexed property.
//!
//! An [`IndexedProperty`] is created once per declared attribute (typically in a `static`), configured with a
//! getter and any number of further operations, and then bound to owners with [`IndexedProperty::bind`] or
//! [`IndexedProperty::bind_mut`]. The descriptor itself is the unbound handle.
//!
//! ## Examples
//! ```rust
//! use indexprop::{Key, PropertyError, declare_indexed};
//!
//! struct Greeter;
//!
//! let shout = declare_indexed(|_: &Greeter, key: Key| Ok::<_, PropertyError>(key.to_string().to_uppercase()));
//! let greeter = Greeter;
//! let loud = shout.bind(&greeter).get("hi").unwrap().into_single();
//! assert_eq!(loud.as_deref(), Some("'HI'"));
//! ```

use std::fmt;

use indexprop_core::{Key, KindSet};

use crate::broadcast::{self, Indexed};
use crate::capability::{Capability, CapabilitySet, Getter, Setter};
use crate::domain::{KeyDomain, Unchecked};
use crate::error::{PropertyError, Result};
use crate::pipeline::{Expanded, KeyPipeline};
use crate::proxy::{Proxy, ProxyMut};

/// A named indexed attribute: key pipeline, capability table and documentation.
pub struct IndexedProperty<O, V, E = PropertyError, D: KeyDomain = Unchecked> {
    name: Option<String>,
    doc: Option<String>,
    document_indices: bool,
    domain: D,
    pipeline: KeyPipeline<O, E>,
    capabilities: CapabilitySet<O, V, E, D>,
}

/// Declare a base indexed property whose getter receives keys unchanged.
pub fn declare_indexed<O, V, E, G>(getter: G) -> IndexedProperty<O, V, E>
where
    G: Fn(&O, Key) -> Result<V, E> + Send + Sync + 'static,
{
    IndexedProperty::new().with_getter(Box::new(getter))
}

impl<O, V, E> IndexedProperty<O, V, E, Unchecked> {
    /// Create an unbound base property with no getter yet.
    pub fn new() -> Self {
        Self::in_domain(Unchecked)
    }

    /// Register the key iterator behind `iterate`.
    pub fn set_iterator<F>(&mut self, keys: F)
    where
        F: Fn(&O) -> Vec<Key> + Send + Sync + 'static,
    {
        tracing::debug!(property = self.name(), "registered iterator");
        self.capabilities.iterator = Some(Box::new(keys));
    }

    #[must_use]
    pub fn with_iterator<F>(mut self, keys: F) -> Self
    where
        F: Fn(&O) -> Vec<Key> + Send + Sync + 'static,
    {
        self.set_iterator(keys);
        self
    }
}

impl<O, V, E> Default for IndexedProperty<O, V, E, Unchecked> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, V, E, D: KeyDomain> IndexedProperty<O, V, E, D> {
    /// Create an unbound property over a custom key domain.
    pub fn in_domain(domain: D) -> Self {
        let iterable = domain.iterable_kinds();
        Self {
            name: None,
            doc: None,
            document_indices: true,
            domain,
            pipeline: KeyPipeline::new(iterable),
            capabilities: CapabilitySet::new(),
        }
    }

    /// Install the getter of a freshly built property.
    pub(crate) fn with_getter(mut self, getter: Getter<O, V, E, D::Index>) -> Self {
        self.capabilities.getter = Some(getter);
        self
    }

    // ---- identity & documentation ----

    /// Name used in messages and logs; defaults to the domain's kind name.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(D::KIND)
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Toggle the generated index description in [`IndexedProperty::doc`] (on by default).
    #[must_use]
    pub fn with_document_indices(mut self, enabled: bool) -> Self {
        self.document_indices = enabled;
        self
    }

    /// The documentation string, followed by the domain's index description when enabled.
    pub fn doc(&self) -> Option<String> {
        let indices = if self.document_indices {
            self.domain.describe_indices()
        } else {
            None
        };
        match (self.doc.as_deref(), indices) {
            (Some(doc), Some(indices)) if !doc.is_empty() => Some(format!("{doc}\n{indices}")),
            (Some(doc), None) => Some(doc.to_string()),
            (_, indices) => indices,
        }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    // ---- registration ----

    /// Register the getter of an unbound property.
    ///
    /// ## Errors
    /// - `ConfigurationError` if a getter is already registered.
    pub fn declare<G>(&mut self, getter: G) -> Result<()>
    where
        G: Fn(&O, D::Index) -> Result<V, E> + Send + Sync + 'static,
    {
        if self.capabilities.getter.is_some() {
            return Err(PropertyError::configuration(self.name(), "getter is already declared"));
        }
        tracing::debug!(property = self.name(), "declared getter");
        self.capabilities.getter = Some(Box::new(getter) as Getter<O, V, E, D::Index>);
        Ok(())
    }

    /// Register (or replace) the setter.
    pub fn set_setter<S>(&mut self, setter: S)
    where
        S: Fn(&mut O, D::Index, V) -> Result<(), E> + Send + Sync + 'static,
    {
        tracing::debug!(property = self.name(), replaced = self.capabilities.setter.is_some(), "registered setter");
        self.capabilities.setter = Some(Box::new(setter) as Setter<O, V, E, D::Index>);
    }

    #[must_use]
    pub fn with_setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&mut O, D::Index, V) -> Result<(), E> + Send + Sync + 'static,
    {
        self.set_setter(setter);
        self
    }

    /// Register (or replace) the deleter.
    pub fn set_deleter<F>(&mut self, deleter: F)
    where
        F: Fn(&mut O, D::Index) -> Result<(), E> + Send + Sync + 'static,
    {
        tracing::debug!(property = self.name(), replaced = self.capabilities.deleter.is_some(), "registered deleter");
        self.capabilities.deleter = Some(Box::new(deleter));
    }

    #[must_use]
    pub fn with_deleter<F>(mut self, deleter: F) -> Self
    where
        F: Fn(&mut O, D::Index) -> Result<(), E> + Send + Sync + 'static,
    {
        self.set_deleter(deleter);
        self
    }

    /// Replace the set of key kinds that broadcast.
    pub fn set_iterable_key_types(&mut self, kinds: KindSet) {
        tracing::debug!(property = self.name(), ?kinds, "replaced iterable key types");
        self.pipeline.set_iterable(kinds);
    }

    #[must_use]
    pub fn with_iterable_key_types(mut self, kinds: KindSet) -> Self {
        self.set_iterable_key_types(kinds);
        self
    }

    pub fn iterable_key_types(&self) -> KindSet {
        self.pipeline.iterable()
    }

    /// Layer a hook over the user-index stage. It runs before every hook layered earlier and before the domain.
    ///
    /// The hook receives the bound owner, so it can accept or rewrite keys based on per-instance state.
    pub fn override_user_index<F>(&mut self, hook: F)
    where
        F: Fn(&O, Key) -> Result<Key, E> + Send + Sync + 'static,
    {
        self.pipeline.push_user_hook(Box::new(hook));
        tracing::debug!(property = self.name(), hooks = self.pipeline.hook_counts().0, "layered user-index hook");
    }

    #[must_use]
    pub fn with_user_index_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&O, Key) -> Result<Key, E> + Send + Sync + 'static,
    {
        self.override_user_index(hook);
        self
    }

    /// Layer a hook over the single-key stage. It runs before every hook layered earlier and before the domain's
    /// own validation.
    pub fn override_index<F>(&mut self, hook: F)
    where
        F: Fn(&O, Key) -> Result<Key, E> + Send + Sync + 'static,
    {
        self.pipeline.push_index_hook(Box::new(hook));
        tracing::debug!(property = self.name(), hooks = self.pipeline.hook_counts().1, "layered index hook");
    }

    #[must_use]
    pub fn with_index_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&O, Key) -> Result<Key, E> + Send + Sync + 'static,
    {
        self.override_index(hook);
        self
    }

    /// Names of every registered operation, built-in slots first.
    pub fn capability_names(&self) -> Vec<&str> {
        self.capabilities.names()
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    fn check_reserved(&self, name: &str) -> Result<()> {
        if D::RESERVED.contains(&name) {
            return Err(PropertyError::configuration(
                self.name(),
                format!("`{name}` is reserved by {}", D::KIND),
            ));
        }
        Ok(())
    }

    // ---- binding ----

    /// Bind to an owner for reading.
    pub fn bind<'a>(&'a self, owner: &'a O) -> Proxy<'a, O, V, E, D> {
        Proxy::new(self, owner)
    }

    /// Bind to an owner for reading and writing.
    pub fn bind_mut<'a>(&'a self, owner: &'a mut O) -> ProxyMut<'a, O, V, E, D> {
        ProxyMut::new(self, owner)
    }
}

impl<O, V, E, D> IndexedProperty<O, V, E, D>
where
    O: 'static,
    V: 'static,
    E: From<PropertyError> + 'static,
    D: KeyDomain + 'static,
{
    /// Register a named read-only extension, invoked as `proxy.invoke::<A, R>(name, args)`.
    ///
    /// Registering a name twice replaces the earlier extension.
    ///
    /// ## Errors
    /// - `ConfigurationError` if `name` is reserved by this kind of property.
    pub fn add_capability<A, R, F>(&mut self, name: &str, f: F) -> Result<()>
    where
        A: 'static,
        R: 'static,
        F: for<'p> Fn(&Proxy<'p, O, V, E, D>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.check_reserved(name)?;
        let replaced = self.capabilities.insert_extra(name, Capability::read(name, f));
        tracing::debug!(property = self.name(), capability = name, replaced, "registered capability");
        Ok(())
    }

    pub fn with_capability<A, R, F>(mut self, name: &str, f: F) -> Result<Self>
    where
        A: 'static,
        R: 'static,
        F: for<'p> Fn(&Proxy<'p, O, V, E, D>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.add_capability(name, f)?;
        Ok(self)
    }

    /// Register a named extension that needs mutable access to the owner.
    ///
    /// ## Errors
    /// - `ConfigurationError` if `name` is reserved by this kind of property.
    pub fn add_capability_mut<A, R, F>(&mut self, name: &str, f: F) -> Result<()>
    where
        A: 'static,
        R: 'static,
        F: for<'p> Fn(&mut ProxyMut<'p, O, V, E, D>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.check_reserved(name)?;
        let replaced = self.capabilities.insert_extra(name, Capability::write(name, f));
        tracing::debug!(property = self.name(), capability = name, replaced, "registered mutable capability");
        Ok(())
    }

    pub fn with_capability_mut<A, R, F>(mut self, name: &str, f: F) -> Result<Self>
    where
        A: 'static,
        R: 'static,
        F: for<'p> Fn(&mut ProxyMut<'p, O, V, E, D>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.add_capability_mut(name, f)?;
        Ok(self)
    }
}

// ---- dispatch (used by the proxies) ----

impl<O, V, E: From<PropertyError>, D: KeyDomain> IndexedProperty<O, V, E, D> {
    pub(crate) fn capabilities(&self) -> &CapabilitySet<O, V, E, D> {
        &self.capabilities
    }

    fn expand(&self, owner: &O, key: Key) -> Result<Expanded, E> {
        self.pipeline.expand(&self.domain, self.name(), owner, key)
    }

    fn resolve(&self, owner: &O, key: Key) -> Result<D::Index, E> {
        self.pipeline.mod_index(&self.domain, self.name(), owner, key)
    }

    fn getter(&self) -> Result<&Getter<O, V, E, D::Index>> {
        self.capabilities
            .getter
            .as_ref()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "get"))
    }

    fn setter(&self) -> Result<&Setter<O, V, E, D::Index>> {
        self.capabilities
            .setter
            .as_ref()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "set"))
    }

    pub(crate) fn read(&self, owner: &O, key: Key) -> Result<Indexed<V>, E> {
        let getter = self.getter()?;
        match self.expand(owner, key)? {
            Expanded::Single(key) => getter(owner, self.resolve(owner, key)?).map(Indexed::Single),
            Expanded::Batch(keys) => {
                broadcast::gather(keys, |key| getter(owner, self.resolve(owner, key)?)).map(Indexed::Batch)
            }
        }
    }

    /// Call the getter on an index that is already validated.
    pub(crate) fn read_index(&self, owner: &O, index: D::Index) -> Result<V, E> {
        let getter = self.getter()?;
        getter(owner, index)
    }

    pub(crate) fn write(&self, owner: &mut O, key: Key, value: V) -> Result<(), E>
    where
        V: Clone,
    {
        let setter = self.setter()?;
        match self.expand(owner, key)? {
            Expanded::Single(key) => {
                let index = self.resolve(owner, key)?;
                setter(owner, index, value)
            }
            Expanded::Batch(keys) => broadcast::replicate(self.name(), keys, value, |key, value| {
                let index = self.resolve(owner, key)?;
                setter(owner, index, value)
            }),
        }
    }

    /// Write one value per key. A single key takes exactly one value.
    pub(crate) fn write_each(&self, owner: &mut O, key: Key, values: Vec<V>) -> Result<(), E> {
        let setter = self.setter()?;
        let keys = self.expand(owner, key)?.into_keys();
        broadcast::zip_each(self.name(), keys, values, |key, value| {
            let index = self.resolve(owner, key)?;
            setter(owner, index, value)
        })
    }

    pub(crate) fn remove(&self, owner: &mut O, key: Key) -> Result<(), E> {
        let deleter = self
            .capabilities
            .deleter
            .as_ref()
            .ok_or_else(|| PropertyError::unsupported(self.name(), "delete"))?;
        let keys = self.expand(owner, key)?.into_keys();
        broadcast::sweep(self.name(), keys, |key| {
            let index = self.resolve(owner, key)?;
            deleter(owner, index)
        })
    }
}

impl<O, V, E, D: KeyDomain> fmt::Debug for IndexedProperty<O, V, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (user_hooks, index_hooks) = self.pipeline.hook_counts();
        f.debug_struct("IndexedProperty")
            .field("name", &self.name())
            .field("kind", &D::KIND)
            .field("iterable", &self.pipeline.iterable())
            .field("user_hooks", &user_hooks)
            .field("index_hooks", &index_hooks)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
