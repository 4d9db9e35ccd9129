//! Property-based tests for indexed properties
//!
//! These tests use proptest to check the read/write contracts across many randomly generated keys and values:
//! round trips, broadcast order, replication, pairwise writes and slice expansion.

use std::collections::BTreeMap;

use indexprop::{
    ContainerProperty, ErrorKind, IndexedProperty, IntRange, Key, PropertyError, RangeProperty, Slice,
    declare_container_indexed, declare_indexed, declare_range_indexed,
};
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct Store {
    values: BTreeMap<Key, i64>,
}

fn store() -> IndexedProperty<Store, i64> {
    declare_indexed(|store: &Store, key: Key| {
        store
            .values
            .get(&key)
            .copied()
            .ok_or_else(|| PropertyError::key_not_found("store", key))
    })
    .named("store")
    .with_setter(|store: &mut Store, key: Key, value: i64| {
        store.values.insert(key, value);
        Ok(())
    })
}

const WIDTH: i64 = 32;

struct Cells {
    cells: Vec<i64>,
}

impl Cells {
    fn new() -> Self {
        Self {
            cells: (0..WIDTH).map(|i| i * 100).collect(),
        }
    }
}

fn slot(index: i64) -> Result<usize, PropertyError> {
    usize::try_from(index).map_err(|_| PropertyError::index_out_of_range("cells", index, 0, WIDTH))
}

fn cells() -> RangeProperty<Cells, i64> {
    declare_range_indexed(IntRange::upto(WIDTH).unwrap(), |owner: &Cells, index: i64| {
        Ok(owner.cells[slot(index)?])
    })
    .named("cells")
    .with_setter(|owner: &mut Cells, index: i64, value: i64| {
        owner.cells[slot(index)?] = value;
        Ok(())
    })
}

fn letters() -> ContainerProperty<Store, i64> {
    let base: Vec<Key> = ["a", "b", "c"].into_iter().map(Key::from).collect();
    declare_container_indexed(base, |store: &Store, key: Key| {
        Ok(store.values.get(&key).copied().unwrap_or_default())
    })
    .named("letters")
    .with_setter(|store: &mut Store, key: Key, value: i64| {
        store.values.insert(key, value);
        Ok(())
    })
}

/// Python's `range(0, WIDTH)[start:stop:step]`, spelled out.
fn reference_slice(start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<i64> {
    let len = WIDTH;
    let norm = |bound: i64| if bound < 0 { bound + len } else { bound };
    let mut out = Vec::new();
    if step > 0 {
        let lo = start.map_or(0, |b| norm(b).clamp(0, len));
        let hi = stop.map_or(len, |b| norm(b).clamp(0, len));
        let mut i = lo;
        while i < hi {
            out.push(i);
            i += step;
        }
    } else {
        let hi = start.map_or(len - 1, |b| norm(b).clamp(-1, len - 1));
        let lo = stop.map_or(-1, |b| norm(b).clamp(-1, len - 1));
        let mut i = hi;
        while i > lo {
            out.push(i);
            i += step;
        }
    }
    out
}

fn scalar_key() -> impl Strategy<Value = Key> {
    prop_oneof![(-50i64..50).prop_map(Key::Int), "[a-z]{1,4}".prop_map(Key::Str)]
}

fn index() -> impl Strategy<Value = i64> {
    -WIDTH..WIDTH
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Property: a written value reads back
    #[test]
    fn set_then_get_round_trips(key in scalar_key(), value in any::<i64>()) {
        let property = store();
        let mut owner = Store::default();
        property.bind_mut(&mut owner).set(key.clone(), value).unwrap();
        prop_assert_eq!(property.bind(&owner).get(key).unwrap().into_single(), Some(value));
    }

    /// Property: a broadcast read equals the single reads, in key order
    #[test]
    fn broadcast_reads_match_single_reads(keys in prop::collection::vec(index(), 0..12)) {
        let property = cells();
        let owner = Cells::new();
        let proxy = property.bind(&owner);
        let batch = proxy.get(keys.clone()).unwrap().into_vec();
        let singles: Vec<i64> = keys
            .iter()
            .map(|&key| proxy.get(key).unwrap().into_single().unwrap())
            .collect();
        prop_assert_eq!(batch, singles);
    }

    /// Property: a scalar written through a broadcast key lands on every element
    #[test]
    fn scalar_writes_replicate(keys in prop::collection::vec(index(), 1..12), value in any::<i64>()) {
        let property = cells();
        let mut owner = Cells::new();
        property.bind_mut(&mut owner).set(keys.clone(), value).unwrap();
        for key in keys {
            prop_assert_eq!(property.bind(&owner).get(key).unwrap().into_single(), Some(value));
        }
    }

    /// Property: pairwise writes assign the i-th value to the i-th key
    #[test]
    fn pairwise_writes_zip(pairs in prop::collection::btree_map(0..WIDTH, any::<i64>(), 1..12)) {
        let property = cells();
        let mut owner = Cells::new();
        let (keys, values): (Vec<i64>, Vec<i64>) = pairs.iter().map(|(k, v)| (*k, *v)).unzip();
        property.bind_mut(&mut owner).set_each(keys, values).unwrap();
        for (key, value) in pairs {
            prop_assert_eq!(property.bind(&owner).get(key).unwrap().into_single(), Some(value));
        }
    }

    /// Property: a length mismatch is rejected before anything is written
    #[test]
    fn length_mismatch_writes_nothing(keys in prop::collection::vec(0..WIDTH, 1..8), extra in 1usize..3) {
        let property = cells();
        let mut owner = Cells::new();
        let values = vec![-1; keys.len() + extra];
        let err = property.bind_mut(&mut owner).set_each(keys.clone(), values).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::BroadcastLengthMismatch);
        prop_assert_eq!(owner.cells, Cells::new().cells);
    }

    /// Property: slices over [0, WIDTH) select what Python's range slicing selects
    #[test]
    fn slices_match_python_range_slicing(
        start in prop::option::of(-40i64..40),
        stop in prop::option::of(-40i64..40),
        step in prop_oneof![-5i64..=-1, 1i64..=5],
    ) {
        let property = cells();
        let owner = Cells::new();
        let slice = Slice::new(start, stop, Some(step));
        let got = property.bind(&owner).get(slice).unwrap().into_vec();
        let expected: Vec<i64> = reference_slice(start, stop, step).into_iter().map(|i| i * 100).collect();
        prop_assert_eq!(got, expected);
    }

    /// Property: negative indices address the same cell as their wrapped counterpart
    #[test]
    fn negative_indices_wrap(index in 1i64..=WIDTH) {
        let property = cells();
        let owner = Cells::new();
        let proxy = property.bind(&owner);
        prop_assert_eq!(proxy.get(-index).unwrap(), proxy.get(WIDTH - index).unwrap());
    }

    /// Property: reverse iteration is forward iteration reversed
    #[test]
    fn reverse_iteration_mirrors_forward(start in -20i64..20, width in 0i64..20) {
        let property = RangeProperty::<Cells, i64>::span(start, start + width).unwrap();
        let owner = Cells::new();
        let proxy = property.bind(&owner);
        let mut forward: Vec<i64> = proxy.iter().collect();
        forward.reverse();
        prop_assert_eq!(proxy.reverse_iterate().collect::<Vec<_>>(), forward);
    }

    /// Property: containers accept exactly their base keys
    #[test]
    fn containers_check_membership(key in "[a-e]", value in any::<i64>()) {
        let property = letters();
        let mut owner = Store::default();
        let result = property.bind_mut(&mut owner).set(key.as_str(), value);
        let member = ["a", "b", "c"].contains(&key.as_str());
        prop_assert_eq!(result.is_ok(), member);
        prop_assert_eq!(property.bind(&owner).contains(key.as_str()), member);
        if !member {
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::KeyNotFound);
        }
    }
}
