//! The statement language of the demo CLI.
//!
//! One statement per command-line argument:
//!
//! | Statement              | Meaning                                         |
//! |------------------------|-------------------------------------------------|
//! | `get KEY`              | read one key or a broadcast key                 |
//! | `set KEY = VALUE`      | write `VALUE` to every selected key             |
//! | `set KEY = [V, V, ..]` | write one value per selected key                |
//! | `del KEY`              | delete every selected key                       |
//! | `len`, `keys`, `items` | size, keys and `(key, value)` pairs             |
//! | `in KEY`               | membership test                                 |
//! | `doc`                  | documentation with the generated index summary  |
//! | `count VALUE`          | number of cells holding `VALUE`                 |
//! | `lowest`, `highest`    | key and value of the smallest / largest cell    |
//!
//! Keys use the Python-like notation of [`Key`](indexprop_core::Key): `3`, `-1`, `'a'`, `[1, 2]`, `2:8:2`.

use std::str::FromStr;

use indexprop_core::{Key, KeyParseError};
use thiserror::Error;

use crate::broadcast::Assign;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Get(Key),
    Set(Key, Assign<i64>),
    Del(Key),
    Len,
    In(Key),
    Keys,
    Items,
    Doc,
    Count(i64),
    Lowest,
    Highest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    #[error("empty statement")]
    Empty,
    #[error("unknown statement `{0}`")]
    UnknownVerb(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` takes no argument")]
    UnexpectedArgument(&'static str),
    #[error("`set` needs `KEY = VALUE`")]
    MissingValue,
    #[error("invalid value `{0}` (expected an integer or a list of integers)")]
    InvalidValue(String),
    #[error("invalid key: {0}")]
    Key(#[from] KeyParseError),
}

impl FromStr for Statement {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (verb, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let rest = rest.trim();

        let statement = match verb {
            "" => return Err(StatementError::Empty),
            "get" => Statement::Get(key_arg("get", rest)?),
            "del" => Statement::Del(key_arg("del", rest)?),
            "in" => Statement::In(key_arg("in", rest)?),
            "set" => {
                let (key, value) = rest.rsplit_once('=').ok_or(StatementError::MissingValue)?;
                Statement::Set(key_arg("set", key)?, parse_assign(value)?)
            }
            "count" => {
                if rest.is_empty() {
                    return Err(StatementError::MissingArgument("count"));
                }
                Statement::Count(parse_int(rest)?)
            }
            "len" => no_arg("len", rest, Statement::Len)?,
            "keys" => no_arg("keys", rest, Statement::Keys)?,
            "items" => no_arg("items", rest, Statement::Items)?,
            "doc" => no_arg("doc", rest, Statement::Doc)?,
            "lowest" => no_arg("lowest", rest, Statement::Lowest)?,
            "highest" => no_arg("highest", rest, Statement::Highest)?,
            other => return Err(StatementError::UnknownVerb(other.to_string())),
        };
        Ok(statement)
    }
}

fn key_arg(verb: &'static str, rest: &str) -> Result<Key, StatementError> {
    if rest.trim().is_empty() {
        return Err(StatementError::MissingArgument(verb));
    }
    Ok(rest.parse()?)
}

fn no_arg(verb: &'static str, rest: &str, statement: Statement) -> Result<Statement, StatementError> {
    if rest.is_empty() {
        Ok(statement)
    } else {
        Err(StatementError::UnexpectedArgument(verb))
    }
}

fn parse_int(text: &str) -> Result<i64, StatementError> {
    text.trim()
        .parse()
        .map_err(|_| StatementError::InvalidValue(text.trim().to_string()))
}

fn parse_assign(text: &str) -> Result<Assign<i64>, StatementError> {
    let text = text.trim();
    let Some(inner) = text.strip_prefix('[') else {
        return parse_int(text).map(Assign::Scalar);
    };
    let inner = inner
        .strip_suffix(']')
        .ok_or_else(|| StatementError::InvalidValue(text.to_string()))?;
    if inner.trim().is_empty() {
        return Ok(Assign::Each(Vec::new()));
    }
    inner
        .split(',')
        .map(parse_int)
        .collect::<Result<Vec<_>, _>>()
        .map(Assign::Each)
}
