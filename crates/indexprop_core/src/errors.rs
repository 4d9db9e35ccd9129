//! Error-kind vocabulary shared by the engine and its tooling.
//!
//! The engine (`indexprop`) owns the concrete error type; this registry owns the canonical spelling, the
//! diagnostic code and the user-facing description of every kind so messages stay aligned everywhere.

/// Stable identifier for an error kind.
///
/// The discriminant doubles as the position of the kind in [`ERROR_KINDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    KeyNotFound,
    IndexOutOfRange,
    UnsupportedOperation,
    BroadcastLengthMismatch,
    InvalidKeyType,
    Configuration,
    CapabilitySignature,
}

/// Metadata for one error kind.
///
/// ## Notes
/// - `canonical` is the prefix used in every rendered message (`Kind: message`).
/// - `aliases` are the closest Python exception names, accepted by [`from_str`].
/// - `code` matches the `miette` diagnostic code on the engine's error type.
#[derive(Debug, Clone, Copy)]
pub struct ErrorKindInfo {
    pub id: ErrorKind,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub code: &'static str,
    pub description: &'static str,
}

/// Registry of error kinds, ordered by [`ErrorKind`] discriminant.
pub const ERROR_KINDS: &[ErrorKindInfo] = &[
    info(
        ErrorKind::KeyNotFound,
        "KeyNotFound",
        &["KeyError"],
        "indexprop::key_not_found",
        "Raised when a container-bound property receives a key that is absent from its base collection.",
    ),
    info(
        ErrorKind::IndexOutOfRange,
        "IndexOutOfRange",
        &["IndexError"],
        "indexprop::index_out_of_range",
        "Raised when a range-bound property receives an integer outside its half-open bounds.",
    ),
    info(
        ErrorKind::UnsupportedOperation,
        "UnsupportedOperation",
        &["NotImplementedError"],
        "indexprop::unsupported_operation",
        "Raised when an operation was never registered, or the key domain cannot provide it.",
    ),
    info(
        ErrorKind::BroadcastLengthMismatch,
        "BroadcastLengthMismatch",
        &["ValueError"],
        "indexprop::broadcast_length_mismatch",
        "Raised when a zipped broadcast write supplies a different number of values than keys.",
    ),
    info(
        ErrorKind::InvalidKeyType,
        "InvalidKeyType",
        &["TypeError"],
        "indexprop::invalid_key_type",
        "Raised when a key has a shape the property's key pipeline cannot interpret.",
    ),
    info(
        ErrorKind::Configuration,
        "ConfigurationError",
        &["AttributeError"],
        "indexprop::configuration",
        "Raised when a property is declared or extended inconsistently.",
    ),
    info(
        ErrorKind::CapabilitySignature,
        "CapabilitySignature",
        &[],
        "indexprop::capability_signature",
        "Raised when a named capability is invoked with argument or result types it was not registered with.",
    ),
];

/// Return the canonical spelling for an error kind (e.g. `"KeyNotFound"`).
#[inline]
pub const fn as_str(kind: ErrorKind) -> &'static str {
    info_for(kind).canonical
}

/// Return the diagnostic code for an error kind.
#[inline]
pub const fn code(kind: ErrorKind) -> &'static str {
    info_for(kind).code
}

/// Return the user-facing description for an error kind.
#[inline]
pub const fn description(kind: ErrorKind) -> &'static str {
    info_for(kind).description
}

/// Resolve a spelling (canonical or alias) to an error kind.
///
/// Matching is case-sensitive.
pub fn from_str(name: &str) -> Option<ErrorKind> {
    if let Some(e) = ERROR_KINDS.iter().find(|e| e.canonical == name) {
        return Some(e.id);
    }
    ERROR_KINDS.iter().find(|e| e.aliases.contains(&name)).map(|e| e.id)
}

/// Return full metadata for an error kind.
#[inline]
pub const fn info_for(kind: ErrorKind) -> &'static ErrorKindInfo {
    &ERROR_KINDS[kind as usize]
}

const fn info(
    id: ErrorKind,
    canonical: &'static str,
    aliases: &'static [&'static str],
    code: &'static str,
    description: &'static str,
) -> ErrorKindInfo {
    ErrorKindInfo {
        id,
        canonical,
        aliases,
        code,
        description,
    }
}
