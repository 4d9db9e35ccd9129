//! Snapshot tests for user-facing text: error messages and generated documentation.
//!
//! Messages are produced through real property operations rather than built by hand, so a change in the key
//! pipeline that alters what a caller sees shows up here.

use indexprop::{
    ContainerProperty, IndexedProperty, IntRange, Key, PropertyError, Proxy, RangeProperty, Slice,
    declare_container_indexed, declare_indexed, declare_range_indexed,
};

struct Owner;

fn letters() -> ContainerProperty<Owner, Key> {
    let base: Vec<Key> = ["a", "b", "c"].into_iter().map(Key::from).collect();
    declare_container_indexed(base, |_: &Owner, key: Key| Ok(key)).named("letters")
}

fn topten() -> RangeProperty<Owner, i64> {
    declare_range_indexed(IntRange::new(1, 11).unwrap(), |_: &Owner, i: i64| Ok(11 - i)).named("topten")
}

fn message(err: PropertyError) -> String {
    err.to_string()
}

#[test]
fn key_not_found_message() {
    let err = letters().bind(&Owner).get("Kenny G").unwrap_err();
    insta::assert_snapshot!(message(err), @"KeyNotFound: 'Kenny G' is not a key of letters");
}

#[test]
fn index_out_of_range_message() {
    let err = topten().bind(&Owner).get(-11).unwrap_err();
    insta::assert_snapshot!(message(err), @"IndexOutOfRange: topten index -11 is outside 1:11");
}

#[test]
fn unsupported_operation_message() {
    let err = topten().bind_mut(&mut Owner).set(3, 8).unwrap_err();
    insta::assert_snapshot!(message(err), @"UnsupportedOperation: topten does not support `set`");
}

#[test]
fn broadcast_length_mismatch_message() {
    let property = topten().with_setter(|_: &mut Owner, _: i64, _: i64| Ok(()));
    let err = property.bind_mut(&mut Owner).set_each(1..4, vec![1, 2]).unwrap_err();
    insta::assert_snapshot!(message(err), @"BroadcastLengthMismatch: topten got 2 values for 3 keys");
}

#[test]
fn invalid_key_type_messages() {
    let err = topten().bind(&Owner).get(vec![Key::from(1), Key::from("two")]).unwrap_err();
    insta::assert_snapshot!(message(err), @"InvalidKeyType: topten cannot use 'two' as a key (expected an integer)");

    let err = topten().bind(&Owner).get(Slice::new(None, None, Some(0))).unwrap_err();
    insta::assert_snapshot!(message(err), @"InvalidKeyType: topten cannot use slice(None, None, 0) as a key (slice step cannot be zero)");
}

#[test]
fn configuration_messages() {
    let err = IntRange::new(5, 1).unwrap_err();
    insta::assert_snapshot!(message(err), @"ConfigurationError: RangeProperty: stop 1 is below start 5");

    let err = letters()
        .with_capability("len", |_: &Proxy<'_, Owner, Key, PropertyError, _>, (): ()| Ok(()))
        .unwrap_err();
    insta::assert_snapshot!(message(err), @"ConfigurationError: letters: `len` is reserved by ContainerProperty");

    let mut unbound: IndexedProperty<Owner, Key> = declare_indexed(|_: &Owner, key: Key| Ok(key));
    let err = unbound.declare(|_: &Owner, key: Key| Ok(key)).unwrap_err();
    insta::assert_snapshot!(message(err), @"ConfigurationError: IndexedProperty: getter is already declared");
}

#[test]
fn capability_signature_message() {
    let property = topten()
        .with_capability("scale", |_: &Proxy<'_, Owner, i64, PropertyError, _>, factor: i64| Ok(factor * 2))
        .unwrap();
    let err = property.bind(&Owner).invoke::<u8, i64>("scale", 2).unwrap_err();
    insta::assert_snapshot!(message(err), @"CapabilitySignature: `scale` of topten takes i64 and returns i64");
}

#[test]
fn generated_docs() {
    insta::assert_snapshot!(topten().with_doc("Chart positions.").doc().unwrap(), @r"
    Chart positions.
    Index range is 1:11
    ");
    insta::assert_snapshot!(letters().doc().unwrap(), @"Indices are from 'a', 'b', 'c'");

    let many = declare_container_indexed((0..20).map(Key::Int).collect::<Vec<_>>(), |_: &Owner, key: Key| {
        Ok::<_, PropertyError>(key)
    });
    insta::assert_snapshot!(many.doc().unwrap(), @"Indices are from 0, 1, 2, 3, 4, 5, 6, ...");
}

#[test]
fn debug_summary() {
    let property = topten().with_setter(|_: &mut Owner, _: i64, _: i64| Ok(()));
    insta::assert_snapshot!(format!("{property:?}"), @r#"IndexedProperty { name: "topten", kind: "RangeProperty", iterable: {List, Tuple, Range}, user_hooks: 0, index_hooks: 0, capabilities: CapabilitySet { names: ["get", "set"] } }"#);
}
