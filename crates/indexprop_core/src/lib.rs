//! Provide the shared, pure key vocabulary for `indexprop`.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that both:
//! - the indexed-property engine uses to classify, expand and validate keys, and
//! - tooling (the CLI, fuzz targets, docs) uses to parse and render keys the same way.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no logging, no global state, and no engine types.
//! - Current scope: the dynamic [`Key`] value and its kinds, Python-like slice/range semantics, and the canonical
//!   error-kind registry that keeps engine errors and tooling output aligned.

pub mod errors;
pub mod key;
pub mod slice;

pub use errors::ErrorKind;
pub use key::{Key, KeyElements, KeyKind, KeyParseError, KindSet};
pub use slice::{IndexRange, IndexRangeIter, Slice, SliceError};
