#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
//! Indexed properties.
//!
//! An indexed property is a named attribute that behaves like a keyed container instead of holding one value.
//! The declaring code supplies the getter (and optionally a setter, deleter and named extensions); this crate
//! supplies the key pipeline, broadcasting over collection keys, and owner-bound proxies.
//!
//! ## Layout
//!
//! - [`descriptor`]: the per-declaration [`IndexedProperty`] and its registration API.
//! - [`proxy`]: [`Proxy`] / [`ProxyMut`], the owner-bound views produced by `bind` / `bind_mut`.
//! - [`pipeline`] and [`broadcast`]: key transformation and fan-out/fan-in.
//! - [`container`] and [`range`]: the membership-checked and integer-range specializations.
//! - [`cli`]: a small command-line driver used for demos and manual checks.
//!
//! Key values, slices and the error-kind vocabulary come from `indexprop_core` and are re-exported here.
//!
//! ## Panic Policy
//!
//! Library code returns `Result` and never unwraps (`#![deny(clippy::unwrap_used)]`). User callbacks return their
//! own error type `E: From<PropertyError>`; their errors propagate unchanged.
//!
//! ## Examples
//! ```rust
//! use std::sync::LazyLock;
//!
//! use indexprop::{IntRange, PropertyError, RangeProperty, declare_range_indexed};
//!
//! struct Register {
//!     cells: Vec<i64>,
//! }
//!
//! static CELLS: LazyLock<RangeProperty<Register, i64>> = LazyLock::new(|| {
//!     let bounds = IntRange::upto(4).unwrap_or_else(|err| panic!("{err}"));
//!     declare_range_indexed(bounds, |r: &Register, i: i64| Ok::<_, PropertyError>(r.cells[i as usize]))
//!         .with_setter(|r: &mut Register, i: i64, v: i64| {
//!             r.cells[i as usize] = v;
//!             Ok(())
//!         })
//! });
//!
//! let mut register = Register { cells: vec![0; 4] };
//! CELLS.bind_mut(&mut register).set(1..3, 7).unwrap();
//! assert_eq!(CELLS.bind(&register).get(..).unwrap().into_vec(), vec![0, 7, 7, 0]);
//! ```

pub mod broadcast;
mod capability;
pub mod cli;
pub mod container;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod proxy;
pub mod range;
pub mod version;

pub use indexprop_core::{ErrorKind, IndexRange, Key, KeyElements, KeyKind, KeyParseError, KindSet, Slice};

pub use broadcast::{Assign, Indexed};
pub use container::{
    Container, ContainerProperty, ContainerProxy, KeyBase, Membership, declare_container_indexed,
};
pub use descriptor::{IndexedProperty, declare_indexed};
pub use domain::{KeyDomain, Unchecked};
pub use error::PropertyError;
pub use pipeline::{Expanded, KeyHook};
pub use proxy::{Proxy, ProxyMut};
pub use range::{IntRange, RangeProperty, RangeProxy, declare_range_indexed};
