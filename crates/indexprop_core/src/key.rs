//! The dynamic key value accepted by every indexed property.
//!
//! A [`Key`] is what a caller writes between the brackets: a scalar (`3`, `'a'`), a collection of keys that
//! broadcasts (`[1, 2]`, `(1, 2)`, `range(1, 11)`), or a [`Slice`] that a range-bound property expands.
//!
//! ## Notes
//! - `Display` renders keys the way Python's `repr` would, so error messages read naturally.
//! - [`Key::from_str`](core::str::FromStr) accepts the same notation back (minus escapes), which is what the CLI and
//!   the fuzz target use.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};
use core::str::FromStr;

use thiserror::Error;

use crate::slice::{IndexRange, IndexRangeIter, Slice};

/// Shape of a [`Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    Int,
    Str,
    List,
    Tuple,
    Range,
    Slice,
}

impl KeyKind {
    /// Every kind, in declaration order.
    pub const ALL: [KeyKind; 6] = [
        KeyKind::Int,
        KeyKind::Str,
        KeyKind::List,
        KeyKind::Tuple,
        KeyKind::Range,
        KeyKind::Slice,
    ];

    /// Return the Python type name for this kind (e.g. `"tuple"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyKind::Int => "int",
            KeyKind::Str => "str",
            KeyKind::List => "list",
            KeyKind::Tuple => "tuple",
            KeyKind::Range => "range",
            KeyKind::Slice => "slice",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A small set of [`KeyKind`]s, used to mark which key shapes broadcast.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    /// Ordered finite sequences (`list` and `tuple`).
    pub const SEQUENCES: KindSet = KindSet::of(&[KeyKind::List, KeyKind::Tuple]);

    /// Build a set from a slice of kinds.
    pub const fn of(kinds: &[KeyKind]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        KindSet(bits)
    }

    pub const fn contains(self, kind: KeyKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Return a copy of this set with `kind` added.
    #[must_use]
    pub const fn with(self, kind: KeyKind) -> Self {
        KindSet(self.0 | kind.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = KeyKind> {
        KeyKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<KeyKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = KeyKind>>(iter: I) -> Self {
        iter.into_iter().fold(KindSet::EMPTY, KindSet::with)
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A key, as supplied to an indexed property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
    List(Vec<Key>),
    Tuple(Vec<Key>),
    Range(IndexRange),
    Slice(Slice),
}

impl Key {
    pub fn str(s: impl Into<String>) -> Self {
        Key::Str(s.into())
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Key>,
    {
        Key::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Key>,
    {
        Key::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub const fn kind(&self) -> KeyKind {
        match self {
            Key::Int(_) => KeyKind::Int,
            Key::Str(_) => KeyKind::Str,
            Key::List(_) => KeyKind::List,
            Key::Tuple(_) => KeyKind::Tuple,
            Key::Range(_) => KeyKind::Range,
            Key::Slice(_) => KeyKind::Slice,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Split a collection key into its element keys.
    ///
    /// Lists and tuples yield their items; ranges yield one `Int` per value, produced on demand. Any other key
    /// (including a `Slice`, which has no elements until it is placed in a domain) is handed back unchanged as the
    /// error.
    pub fn into_elements(self) -> Result<KeyElements, Key> {
        match self {
            Key::List(items) | Key::Tuple(items) => Ok(KeyElements::Items(items.into_iter())),
            Key::Range(range) => Ok(KeyElements::Range(range.iter())),
            other => Err(other),
        }
    }
}

/// The element keys of a collection key, in order.
///
/// Range elements are never materialized, so `range(0, 2**63 - 1)` costs nothing until it is walked.
#[derive(Debug, Clone)]
pub enum KeyElements {
    Items(std::vec::IntoIter<Key>),
    Range(IndexRangeIter),
}

impl KeyElements {
    /// The elements of a single key: the key itself.
    pub fn one(key: Key) -> Self {
        KeyElements::Items(vec![key].into_iter())
    }
}

impl Iterator for KeyElements {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        match self {
            KeyElements::Items(items) => items.next(),
            KeyElements::Range(range) => range.next().map(Key::Int),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            KeyElements::Items(items) => items.size_hint(),
            KeyElements::Range(range) => range.size_hint(),
        }
    }
}

impl ExactSizeIterator for KeyElements {}

impl FusedIterator for KeyElements {}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => write_quoted(f, s),
            Key::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            Key::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Key::Range(range) => write!(f, "{range}"),
            Key::Slice(slice) => write!(f, "{slice}"),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Key]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if s.contains('\'') && !s.contains('"') {
        return write!(f, "\"{s}\"");
    }
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

// ---- conversions ----

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<Slice> for Key {
    fn from(value: Slice) -> Self {
        Key::Slice(value)
    }
}

impl From<IndexRange> for Key {
    fn from(value: IndexRange) -> Self {
        Key::Range(value)
    }
}

impl<T: Into<Key>> From<Vec<T>> for Key {
    fn from(value: Vec<T>) -> Self {
        Key::list(value)
    }
}

impl<T: Into<Key>, const N: usize> From<[T; N]> for Key {
    fn from(value: [T; N]) -> Self {
        Key::list(value)
    }
}

impl From<RangeFull> for Key {
    fn from(_: RangeFull) -> Self {
        Key::Slice(Slice::FULL)
    }
}

/// Rust range syntax maps onto slices: `a..b` is `a:b`, `a..=b` is `a:b+1`.
macro_rules! slice_from_range_syntax {
    ($($int:ty),*) => {$(
        impl From<Range<$int>> for Key {
            fn from(r: Range<$int>) -> Self {
                Key::Slice(Slice::new(Some(i64::from(r.start)), Some(i64::from(r.end)), None))
            }
        }

        impl From<RangeFrom<$int>> for Key {
            fn from(r: RangeFrom<$int>) -> Self {
                Key::Slice(Slice::new(Some(i64::from(r.start)), None, None))
            }
        }

        impl From<RangeTo<$int>> for Key {
            fn from(r: RangeTo<$int>) -> Self {
                Key::Slice(Slice::new(None, Some(i64::from(r.end)), None))
            }
        }

        impl From<RangeInclusive<$int>> for Key {
            fn from(r: RangeInclusive<$int>) -> Self {
                let stop = i64::from(*r.end()).saturating_add(1);
                Key::Slice(Slice::new(Some(i64::from(*r.start())), Some(stop), None))
            }
        }
    )*};
}

slice_from_range_syntax!(i32, i64);

// ---- textual grammar ----

/// Failure to read a key from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key")]
    Empty,
    #[error("unbalanced brackets in `{0}`")]
    Unbalanced(String),
    #[error("integer out of range: `{0}`")]
    InvalidInt(String),
    #[error("malformed slice `{0}` (expected start:stop[:step] with integer or empty fields)")]
    MalformedSlice(String),
    #[error("malformed range `{0}` (expected range(start, stop[, step]) with a non-zero step)")]
    MalformedRange(String),
    #[error("unterminated string in `{0}`")]
    UnterminatedString(String),
    #[error("unexpected input `{0}`")]
    Unexpected(String),
}

impl FromStr for Key {
    type Err = KeyParseError;

    /// Parse the Python-like key notation.
    ///
    /// ## Examples
    /// ```rust
    /// use indexprop_core::{Key, Slice};
    ///
    /// assert_eq!("-1".parse::<Key>().unwrap(), Key::Int(-1));
    /// assert_eq!("'a', 'b'".parse::<Key>().unwrap(), Key::tuple(["a", "b"]));
    /// assert_eq!("15:7:-1".parse::<Key>().unwrap(), Key::Slice(Slice::new(Some(15), Some(7), Some(-1))));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s)
    }
}

fn parse_key(src: &str) -> Result<Key, KeyParseError> {
    let text = src.trim();
    if text.is_empty() {
        return Err(KeyParseError::Empty);
    }

    let parts = split_top_level(text, ',')?;
    if parts.len() > 1 {
        return parse_items(&parts).map(Key::Tuple);
    }

    if split_top_level(text, ':')?.len() > 1 {
        return parse_slice(text);
    }

    let first = text.chars().next().unwrap_or_default();
    match first {
        '\'' | '"' => parse_quoted(text, first),
        '[' => {
            let inner = enclosed(text, '[', ']')?;
            if inner.trim().is_empty() {
                return Ok(Key::List(Vec::new()));
            }
            parse_items(&split_top_level(inner, ',')?).map(Key::List)
        }
        '(' => {
            let inner = enclosed(text, '(', ')')?;
            if inner.trim().is_empty() {
                return Ok(Key::Tuple(Vec::new()));
            }
            let parts = split_top_level(inner, ',')?;
            if parts.len() == 1 {
                parse_key(inner)
            } else {
                parse_items(&parts).map(Key::Tuple)
            }
        }
        _ if text.starts_with("range(") => parse_range(text),
        _ if looks_numeric(text) => text
            .parse::<i64>()
            .map(Key::Int)
            .map_err(|_| KeyParseError::InvalidInt(text.to_string())),
        _ if text.chars().any(|c| "[]()'\",:".contains(c)) => Err(KeyParseError::Unexpected(text.to_string())),
        _ => Ok(Key::Str(text.to_string())),
    }
}

/// Parse comma-separated parts; a single trailing empty part (trailing comma) is allowed.
fn parse_items(parts: &[&str]) -> Result<Vec<Key>, KeyParseError> {
    let last = parts.len().saturating_sub(1);
    let mut items = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        if i == last && i > 0 && part.trim().is_empty() {
            break;
        }
        items.push(parse_key(part)?);
    }
    Ok(items)
}

fn parse_quoted(text: &str, quote: char) -> Result<Key, KeyParseError> {
    let rest = &text[quote.len_utf8()..];
    match rest.find(quote) {
        None => Err(KeyParseError::UnterminatedString(text.to_string())),
        Some(end) if end + quote.len_utf8() == rest.len() => Ok(Key::Str(rest[..end].to_string())),
        Some(_) => Err(KeyParseError::Unexpected(text.to_string())),
    }
}

fn parse_slice(text: &str) -> Result<Key, KeyParseError> {
    let malformed = || KeyParseError::MalformedSlice(text.to_string());
    let parts = split_top_level(text, ':')?;
    if parts.len() > 3 {
        return Err(malformed());
    }
    let mut fields = [None; 3];
    for (field, part) in fields.iter_mut().zip(&parts) {
        let part = part.trim();
        if !part.is_empty() {
            *field = Some(part.parse::<i64>().map_err(|_| malformed())?);
        }
    }
    Ok(Key::Slice(Slice::new(fields[0], fields[1], fields[2])))
}

fn parse_range(text: &str) -> Result<Key, KeyParseError> {
    let malformed = || KeyParseError::MalformedRange(text.to_string());
    let inner = enclosed(&text["range".len()..], '(', ')')?;
    let args = split_top_level(inner, ',')?
        .iter()
        .map(|arg| arg.trim().parse::<i64>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>, _>>()?;
    let range = match args.as_slice() {
        [start, stop] => IndexRange::new(*start, *stop),
        [start, stop, step] => IndexRange::with_step(*start, *stop, *step).map_err(|_| malformed())?,
        _ => return Err(malformed()),
    };
    Ok(Key::Range(range))
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Return the text between a leading `open` and a trailing `close`.
fn enclosed(text: &str, open: char, close: char) -> Result<&str, KeyParseError> {
    text.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| KeyParseError::Unexpected(text.to_string()))
}

/// Split `text` on `sep` at bracket depth zero, outside quotes.
fn split_top_level(text: &str, sep: char) -> Result<Vec<&str>, KeyParseError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| KeyParseError::Unbalanced(text.to_string()))?;
            }
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(KeyParseError::UnterminatedString(text.to_string()));
    }
    if depth != 0 {
        return Err(KeyParseError::Unbalanced(text.to_string()));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Key {
        s.parse().unwrap()
    }

    #[test]
    fn kind_set_membership() {
        let set = KindSet::SEQUENCES.with(KeyKind::Range);
        assert!(set.contains(KeyKind::List));
        assert!(set.contains(KeyKind::Range));
        assert!(!set.contains(KeyKind::Slice));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![KeyKind::List, KeyKind::Tuple, KeyKind::Range]);
        assert_eq!(format!("{:?}", KindSet::EMPTY), "{}");
    }

    #[test]
    fn repr_display() {
        assert_eq!(Key::from(3).to_string(), "3");
        assert_eq!(Key::from("Kenny G").to_string(), "'Kenny G'");
        assert_eq!(Key::from("it's").to_string(), "\"it's\"");
        assert_eq!(Key::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Key::tuple([1]).to_string(), "(1,)");
        assert_eq!(Key::tuple(["a", "b"]).to_string(), "('a', 'b')");
        assert_eq!(Key::from(IndexRange::new(1, 11)).to_string(), "range(1, 11)");
        assert_eq!(Key::from(..8).to_string(), "slice(None, 8, None)");
    }

    #[test]
    fn range_syntax_becomes_slices() {
        assert_eq!(Key::from(5..8), Key::Slice(Slice::new(Some(5), Some(8), None)));
        assert_eq!(Key::from(-3..), Key::Slice(Slice::new(Some(-3), None, None)));
        assert_eq!(Key::from(1..=3), Key::Slice(Slice::new(Some(1), Some(4), None)));
        assert_eq!(Key::from(..), Key::Slice(Slice::FULL));
    }

    #[test]
    fn elements_of_collections() {
        let elements = |key: Key| key.into_elements().map(Iterator::collect::<Vec<_>>);
        assert_eq!(elements(Key::from(vec!["a", "b"])), Ok(vec![Key::from("a"), Key::from("b")]));
        assert_eq!(
            elements(Key::from(IndexRange::new(2, 5))),
            Ok(vec![Key::Int(2), Key::Int(3), Key::Int(4)])
        );
        assert_eq!(elements(Key::from(7)), Err(Key::Int(7)));
        assert_eq!(elements(Key::from(..)), Err(Key::Slice(Slice::FULL)));
    }

    #[test]
    fn range_elements_are_produced_on_demand() {
        let Ok(mut elements) = Key::from(IndexRange::new(0, i64::MAX)).into_elements() else {
            panic!("a range key has elements");
        };
        assert_eq!(elements.len(), usize::try_from(i64::MAX).unwrap());
        assert_eq!(elements.next(), Some(Key::Int(0)));
        assert_eq!(elements.nth(30), Some(Key::Int(31)));
        assert_eq!(KeyElements::one(Key::from("a")).collect::<Vec<_>>(), vec![Key::from("a")]);
    }

    #[test]
    fn parse_scalars() {
        assert_eq!(parse("42"), Key::Int(42));
        assert_eq!(parse(" -1 "), Key::Int(-1));
        assert_eq!(parse("'a'"), Key::from("a"));
        assert_eq!(parse("\"it's\""), Key::from("it's"));
        assert_eq!(parse("Kenny G"), Key::from("Kenny G"));
        assert_eq!(parse("range"), Key::from("range"));
    }

    #[test]
    fn parse_collections() {
        assert_eq!(parse("[1, 2, 3]"), Key::from(vec![1, 2, 3]));
        assert_eq!(parse("[]"), Key::List(vec![]));
        assert_eq!(parse("1, 2"), Key::tuple([1, 2]));
        assert_eq!(parse("(1,)"), Key::tuple([1]));
        assert_eq!(parse("(1)"), Key::Int(1));
        assert_eq!(parse("'a',"), Key::tuple(["a"]));
        assert_eq!(parse("[('a', 1), 'b']"), Key::list([Key::tuple([Key::from("a"), Key::from(1)]), Key::from("b")]));
        assert_eq!(parse("range(1, 11)"), Key::Range(IndexRange::new(1, 11)));
    }

    #[test]
    fn parse_slices() {
        assert_eq!(parse(":"), Key::Slice(Slice::FULL));
        assert_eq!(parse(":8"), Key::from(..8));
        assert_eq!(parse("-3:"), Key::from(-3..));
        assert_eq!(parse("15:7:-1"), Key::Slice(Slice::new(Some(15), Some(7), Some(-1))));
        assert_eq!(parse("[1:3, 5]"), Key::list([Key::from(1..3), Key::from(5)]));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Key>(), Err(KeyParseError::Empty));
        assert_eq!(",".parse::<Key>(), Err(KeyParseError::Empty));
        assert!(matches!("[1, 2".parse::<Key>(), Err(KeyParseError::Unbalanced(_))));
        assert!(matches!("1)".parse::<Key>(), Err(KeyParseError::Unbalanced(_))));
        assert!(matches!("'abc".parse::<Key>(), Err(KeyParseError::UnterminatedString(_))));
        assert!(matches!("99999999999999999999".parse::<Key>(), Err(KeyParseError::InvalidInt(_))));
        assert!(matches!("a:b".parse::<Key>(), Err(KeyParseError::MalformedSlice(_))));
        assert!(matches!("1:2:3:4".parse::<Key>(), Err(KeyParseError::MalformedSlice(_))));
        assert!(matches!("range(1)".parse::<Key>(), Err(KeyParseError::MalformedRange(_))));
        assert!(matches!("range(1, 5, 0)".parse::<Key>(), Err(KeyParseError::MalformedRange(_))));
        assert!(matches!("'a' 'b'".parse::<Key>(), Err(KeyParseError::Unexpected(_))));
    }

    #[test]
    fn display_parses_back() {
        for key in [
            Key::from(vec![Key::from(1), Key::from("x")]),
            Key::tuple([Key::from(-4)]),
            Key::from(IndexRange::new(0, 3)),
        ] {
            assert_eq!(key.to_string().parse::<Key>(), Ok(key));
        }
    }
}
