//! Key domains: what a property accepts as a key, and what its callbacks receive.
//!
//! A domain supplies the property-specific halves of the key pipeline:
//! - [`KeyDomain::mod_user_index`] runs once on the raw key, before the broadcast decision.
//! - [`KeyDomain::mod_index`] runs once per single key and turns it into the domain's `Index` type, or fails.
//!
//! The base property uses [`Unchecked`]; the container and range properties provide their own domains.

use indexprop_core::{Key, KindSet};

use crate::error::{PropertyError, Result};

/// Capability names every property reserves for its own operations.
pub const BASE_RESERVED: &[&str] = &["get", "set", "delete", "iterate"];

/// The key rules of one kind of indexed property.
pub trait KeyDomain {
    /// The validated key handed to getters, setters and deleters.
    type Index;

    /// Kind name, used as the default property name.
    const KIND: &'static str;

    /// Capability names that user extensions may not claim.
    const RESERVED: &'static [&'static str];

    /// Key kinds that broadcast by default.
    fn iterable_kinds(&self) -> KindSet {
        KindSet::SEQUENCES
    }

    /// Rewrite the raw key before the broadcast decision.
    fn mod_user_index(&self, _property: &str, key: Key) -> Result<Key> {
        Ok(key)
    }

    /// Validate one single key and convert it to the domain's index type.
    fn mod_index(&self, property: &str, key: Key) -> Result<Self::Index>;

    /// Text appended to the property documentation, if the domain can describe its keys.
    fn describe_indices(&self) -> Option<String> {
        None
    }
}

/// The base domain: any key is accepted and passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl KeyDomain for Unchecked {
    type Index = Key;

    const KIND: &'static str = "IndexedProperty";
    const RESERVED: &'static [&'static str] = BASE_RESERVED;

    fn mod_index(&self, _property: &str, key: Key) -> Result<Key> {
        Ok(key)
    }
}
