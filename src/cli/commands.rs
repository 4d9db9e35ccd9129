//! CLI command implementations
//!
//! Each subcommand builds a demo owner with one indexed property, runs the statements against it in order and
//! prints one line per statement that produces output. The first failing statement stops the run.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;

use indexprop_core::Key;

use crate::broadcast::{Assign, Indexed};
use crate::container::{ContainerProperty, declare_container_indexed};
use crate::error::PropertyError;
use crate::range::{IntRange, RangeProperty, declare_range_indexed};

use super::statements::Statement;
use super::{CliError, CliResult};

/// Largest range the demo will allocate cells for.
pub const MAX_RANGE_CELLS: usize = 1 << 16;

/// The operations the statement runner needs from a demo property.
pub trait Cells {
    fn get(&self, key: Key) -> Result<Indexed<i64>, PropertyError>;
    fn set(&mut self, key: Key, value: Assign<i64>) -> Result<(), PropertyError>;
    fn delete(&mut self, key: Key) -> Result<(), PropertyError>;
    fn len(&self) -> Result<usize, PropertyError>;
    fn contains(&self, key: &Key) -> bool;
    fn keys(&self) -> Result<Vec<Key>, PropertyError>;
    fn items(&self) -> Result<Vec<(Key, i64)>, PropertyError>;
    fn doc(&self) -> Option<String>;
    fn count(&self, value: i64) -> Result<usize, PropertyError>;
    fn lowest(&self) -> Result<Option<(Key, i64)>, PropertyError>;
    fn highest(&self) -> Result<Option<(Key, i64)>, PropertyError>;
}

// ============================================================================
// Range demo
// ============================================================================

/// A fixed block of integer cells addressed by `[start, stop)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    bounds: IntRange,
    cells: Vec<i64>,
    fill: i64,
}

impl Bank {
    /// Allocate one cell per index.
    ///
    /// ## Errors
    /// - `ConfigurationError` if `bounds` holds more than [`MAX_RANGE_CELLS`] indices.
    pub fn new(bounds: IntRange, fill: i64) -> Result<Self, PropertyError> {
        let cells = bounds.len();
        if cells > MAX_RANGE_CELLS {
            return Err(PropertyError::configuration(
                RangeDemo::NAME,
                format!("{cells} cells requested, at most {MAX_RANGE_CELLS} allowed"),
            ));
        }
        Ok(Self {
            bounds,
            cells: vec![fill; cells],
            fill,
        })
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    fn slot(&self, index: i64) -> Result<usize, PropertyError> {
        index
            .checked_sub(self.bounds.start())
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|&slot| slot < self.cells.len())
            .ok_or_else(|| {
                PropertyError::index_out_of_range(RangeDemo::NAME, index, self.bounds.start(), self.bounds.stop())
            })
    }

    fn read(&self, index: i64) -> Result<i64, PropertyError> {
        let slot = self.slot(index)?;
        Ok(self.cells[slot])
    }

    fn write(&mut self, index: i64, value: i64) -> Result<(), PropertyError> {
        let slot = self.slot(index)?;
        self.cells[slot] = value;
        Ok(())
    }

    fn reset(&mut self, index: i64) -> Result<(), PropertyError> {
        let fill = self.fill;
        self.write(index, fill)
    }
}

/// `cells`, a range property over a [`Bank`].
pub struct RangeDemo {
    property: RangeProperty<Bank, i64>,
    bank: Bank,
}

impl RangeDemo {
    pub const NAME: &'static str = "cells";

    pub fn new(start: i64, stop: i64, fill: i64, doc: Option<String>) -> Result<Self, PropertyError> {
        let bounds = IntRange::new(start, stop)?;
        let bank = Bank::new(bounds, fill)?;
        let mut property = declare_range_indexed(bounds, Bank::read)
            .named(Self::NAME)
            .with_setter(Bank::write)
            .with_deleter(Bank::reset)
            .with_capability::<i64, usize, _>("count", |proxy, value| count_matches(proxy.values(), value))?
            .with_capability::<(), Option<(Key, i64)>, _>("lowest", |proxy, ()| {
                extreme(proxy.items().map(|item| item.map(|(i, v)| (Key::Int(i), v))), Ordering::Less)
            })?
            .with_capability::<(), Option<(Key, i64)>, _>("highest", |proxy, ()| {
                extreme(proxy.items().map(|item| item.map(|(i, v)| (Key::Int(i), v))), Ordering::Greater)
            })?;
        if let Some(doc) = doc {
            property = property.with_doc(doc);
        }
        Ok(Self { property, bank })
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }
}

impl Cells for RangeDemo {
    fn get(&self, key: Key) -> Result<Indexed<i64>, PropertyError> {
        self.property.bind(&self.bank).get(key)
    }

    fn set(&mut self, key: Key, value: Assign<i64>) -> Result<(), PropertyError> {
        self.property.bind_mut(&mut self.bank).assign(key, value)
    }

    fn delete(&mut self, key: Key) -> Result<(), PropertyError> {
        self.property.bind_mut(&mut self.bank).delete(key)
    }

    fn len(&self) -> Result<usize, PropertyError> {
        Ok(self.property.bind(&self.bank).len())
    }

    fn contains(&self, key: &Key) -> bool {
        key.as_int()
            .is_some_and(|index| self.property.bind(&self.bank).contains(index))
    }

    fn keys(&self) -> Result<Vec<Key>, PropertyError> {
        Ok(self.property.bind(&self.bank).iter().map(Key::Int).collect())
    }

    fn items(&self) -> Result<Vec<(Key, i64)>, PropertyError> {
        self.property
            .bind(&self.bank)
            .items()
            .map(|item| item.map(|(index, value)| (Key::Int(index), value)))
            .collect()
    }

    fn doc(&self) -> Option<String> {
        self.property.doc()
    }

    fn count(&self, value: i64) -> Result<usize, PropertyError> {
        self.property.bind(&self.bank).invoke("count", value)
    }

    fn lowest(&self) -> Result<Option<(Key, i64)>, PropertyError> {
        self.property.bind(&self.bank).invoke("lowest", ())
    }

    fn highest(&self) -> Result<Option<(Key, i64)>, PropertyError> {
        self.property.bind(&self.bank).invoke("highest", ())
    }
}

// ============================================================================
// Container demo
// ============================================================================

/// Integer values stored by key; keys outside the property's base never reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    values: HashMap<Key, i64>,
    fill: i64,
}

impl Lineup {
    pub fn new(keys: &[Key], fill: i64) -> Self {
        Self {
            values: keys.iter().map(|key| (key.clone(), fill)).collect(),
            fill,
        }
    }

    pub fn value(&self, key: &Key) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn read(&self, key: Key) -> Result<i64, PropertyError> {
        self.value(&key)
            .ok_or_else(|| PropertyError::key_not_found(ContainerDemo::NAME, key))
    }

    fn write(&mut self, key: Key, value: i64) -> Result<(), PropertyError> {
        self.values.insert(key, value);
        Ok(())
    }

    fn reset(&mut self, key: Key) -> Result<(), PropertyError> {
        self.values.insert(key, self.fill);
        Ok(())
    }
}

/// `slots`, a container property whose base is the `--keys` list.
pub struct ContainerDemo {
    property: ContainerProperty<Lineup, i64>,
    lineup: Lineup,
}

impl ContainerDemo {
    pub const NAME: &'static str = "slots";

    pub fn new(keys: Vec<Key>, fill: i64, doc: Option<String>) -> Result<Self, PropertyError> {
        let lineup = Lineup::new(&keys, fill);
        let mut property = declare_container_indexed(keys, Lineup::read)
            .named(Self::NAME)
            .with_setter(Lineup::write)
            .with_deleter(Lineup::reset)
            .with_capability::<i64, usize, _>("count", |proxy, value| {
                count_matches(proxy.items()?.map(|item| item.map(|(_, v)| v)), value)
            })?
            .with_capability::<(), Option<(Key, i64)>, _>("lowest", |proxy, ()| {
                extreme(proxy.items()?, Ordering::Less)
            })?
            .with_capability::<(), Option<(Key, i64)>, _>("highest", |proxy, ()| {
                extreme(proxy.items()?, Ordering::Greater)
            })?;
        if let Some(doc) = doc {
            property = property.with_doc(doc);
        }
        Ok(Self { property, lineup })
    }

    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }
}

impl Cells for ContainerDemo {
    fn get(&self, key: Key) -> Result<Indexed<i64>, PropertyError> {
        self.property.bind(&self.lineup).get(key)
    }

    fn set(&mut self, key: Key, value: Assign<i64>) -> Result<(), PropertyError> {
        self.property.bind_mut(&mut self.lineup).assign(key, value)
    }

    fn delete(&mut self, key: Key) -> Result<(), PropertyError> {
        self.property.bind_mut(&mut self.lineup).delete(key)
    }

    fn len(&self) -> Result<usize, PropertyError> {
        self.property.bind(&self.lineup).len()
    }

    fn contains(&self, key: &Key) -> bool {
        self.property.bind(&self.lineup).contains(key.clone())
    }

    fn keys(&self) -> Result<Vec<Key>, PropertyError> {
        Ok(self.property.bind(&self.lineup).iter()?.collect())
    }

    fn items(&self) -> Result<Vec<(Key, i64)>, PropertyError> {
        self.property.bind(&self.lineup).items()?.collect()
    }

    fn doc(&self) -> Option<String> {
        self.property.doc()
    }

    fn count(&self, value: i64) -> Result<usize, PropertyError> {
        self.property.bind(&self.lineup).invoke("count", value)
    }

    fn lowest(&self) -> Result<Option<(Key, i64)>, PropertyError> {
        self.property.bind(&self.lineup).invoke("lowest", ())
    }

    fn highest(&self) -> Result<Option<(Key, i64)>, PropertyError> {
        self.property.bind(&self.lineup).invoke("highest", ())
    }
}

fn count_matches(values: impl Iterator<Item = Result<i64, PropertyError>>, target: i64) -> Result<usize, PropertyError> {
    let mut count = 0;
    for value in values {
        if value? == target {
            count += 1;
        }
    }
    Ok(count)
}

/// The first pair whose value compares as `wanted` against every earlier pick.
fn extreme(
    items: impl Iterator<Item = Result<(Key, i64), PropertyError>>,
    wanted: Ordering,
) -> Result<Option<(Key, i64)>, PropertyError> {
    let mut best: Option<(Key, i64)> = None;
    for item in items {
        let (key, value) = item?;
        let better = match &best {
            None => true,
            Some((_, current)) => value.cmp(current) == wanted,
        };
        if better {
            best = Some((key, value));
        }
    }
    Ok(best)
}

// ============================================================================
// Statement runner
// ============================================================================

/// Output of a statement run: the printed lines, and the error that stopped it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
    pub error: Option<PropertyError>,
}

pub fn run_statements(cells: &mut dyn Cells, statements: &[Statement]) -> Transcript {
    let mut transcript = Transcript::default();
    for statement in statements {
        match run_one(cells, statement) {
            Ok(Some(line)) => transcript.lines.push(line),
            Ok(None) => {}
            Err(err) => {
                transcript.error = Some(err);
                break;
            }
        }
    }
    transcript
}

fn run_one(cells: &mut dyn Cells, statement: &Statement) -> Result<Option<String>, PropertyError> {
    let line = match statement {
        Statement::Get(key) => match cells.get(key.clone())? {
            Indexed::Single(value) => value.to_string(),
            Indexed::Batch(values) => list(&values),
        },
        Statement::Set(key, value) => {
            cells.set(key.clone(), value.clone())?;
            return Ok(None);
        }
        Statement::Del(key) => {
            cells.delete(key.clone())?;
            return Ok(None);
        }
        Statement::Len => cells.len()?.to_string(),
        Statement::In(key) => cells.contains(key).to_string(),
        Statement::Keys => list(&cells.keys()?),
        Statement::Items => {
            let pairs: Vec<String> = cells
                .items()?
                .into_iter()
                .map(|(key, value)| format!("({key}, {value})"))
                .collect();
            format!("[{}]", pairs.join(", "))
        }
        Statement::Doc => cells.doc().unwrap_or_else(|| "(no documentation)".to_string()),
        Statement::Count(value) => cells.count(*value)?.to_string(),
        Statement::Lowest => pair(cells.lowest()?),
        Statement::Highest => pair(cells.highest()?),
    };
    Ok(Some(line))
}

fn list<T: Display>(items: &[T]) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn pair(found: Option<(Key, i64)>) -> String {
    match found {
        Some((key, value)) => format!("{key}: {value}"),
        None => "None".to_string(),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// `indexprop range`.
pub fn range(start: i64, stop: i64, fill: i64, doc: Option<String>, statements: &[Statement]) -> CliResult<()> {
    let mut demo = RangeDemo::new(start, stop, fill, doc).map_err(render)?;
    report(run_statements(&mut demo, statements))
}

/// `indexprop container`.
pub fn container(keys: Vec<Key>, fill: i64, doc: Option<String>, statements: &[Statement]) -> CliResult<()> {
    let mut demo = ContainerDemo::new(keys, fill, doc).map_err(render)?;
    report(run_statements(&mut demo, statements))
}

fn report(transcript: Transcript) -> CliResult<()> {
    for line in &transcript.lines {
        println!("{line}");
    }
    match transcript.error {
        Some(err) => Err(render(err)),
        None => Ok(()),
    }
}

fn render(err: PropertyError) -> CliError {
    CliError::new(format!("{:?}", miette::Report::new(err)))
}
