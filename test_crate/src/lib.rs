//! Shared fixtures for the integration tests.

use std::path::PathBuf;

use jproperties::PropertyTable;

/// Path of a file in `tests/`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
}

/// Every entry of `tests/complex.properties`, as `java.util.Properties` reads it.
pub const COMPLEX: [(&str, &str); 23] = [
    ("Key00", "Value00"),
    ("Key01", "Value01"),
    ("Key02", "Value02"),
    ("Key03", "Value03"),
    ("Key04", "Value04"),
    ("Key05", "Value05a, Value05b, Value05c"),
    ("Key06", "Value06a, Value06b, Value06c"),
    ("Key07", "Value07b"),
    (
        "Key08",
        "Value08a, Value08b, Value08c, Value08d, Value08e, Value08f",
    ),
    (
        "Key09",
        "Value09a, Value09b, Value09c, Value09d, Value09e, Value09f",
    ),
    ("Key10", "Value10"),
    ("Key11", ""),
    ("Key12", "Value12a, Value12b, Value12c"),
    ("Key13", "Value13 With Spaces"),
    ("Key14", "Value14 With Spaces"),
    ("Key15", "Value15 With Spaces"),
    ("Key16 With Spaces", "Value16"),
    ("Key17 With Spaces", "Value17"),
    ("Key18", "Value18 # Not a comment."),
    ("Key19", "Value19 ! Not a comment."),
    ("Key20=WithEquals", "Value20"),
    ("Key21:WithColon", "Value21"),
    ("Key22", "Value22"),
];

/// Asserts that `props` holds exactly the entries of [`COMPLEX`].
pub fn assert_complex(props: &PropertyTable) {
    for (key, value) in COMPLEX {
        assert_eq!(props.get(key), Some(value), "{key}");
    }
    assert_eq!(props.len(), COMPLEX.len());
}
