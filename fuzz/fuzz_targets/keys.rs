#![no_main]

use indexprop::{IntRange, Key, PropertyError, declare_range_indexed};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // The key grammar must reject bad input with an error, never a panic
    let Ok(key) = s.parse::<Key>() else {
        return;
    };
    // Rendering and re-parsing must not panic either
    let _ = key.to_string().parse::<Key>();

    // Expand the key against a few domains, including ones at the edges of i64
    for (start, stop) in [(0, 32), (1, 11), (-8, 8), (i64::MAX - 4, i64::MAX), (i64::MIN, i64::MIN + 4)] {
        let Ok(bounds) = IntRange::new(start, stop) else {
            continue;
        };
        let property = declare_range_indexed(bounds, |_: &(), index: i64| Ok::<_, PropertyError>(index));
        if let Ok(values) = property.bind(&()).get(key.clone()) {
            for index in values.into_vec() {
                assert!(bounds.contains(index), "{index} escaped {start}:{stop}");
            }
        }
    }
});
