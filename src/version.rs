//! indexprop version information.
//!
//! The CLI reports this value; it is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The indexprop version string (for example, `0.1.0-alpha.1`).
pub const INDEXPROP_VERSION: &str = env!("CARGO_PKG_VERSION");
