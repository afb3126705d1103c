#![allow(dead_code)]

use cmdexpand::{Environment, ExpandErrorKind, expand};

pub const BIG_VAR: &str = "_ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz12345678990";

/// Environment with plain, recursive, whitespace, quoted and cyclic
/// definitions.
pub fn fixture_env() -> Environment {
    [
        ("ABC", "123"),
        ("XYZ", "456"),
        ("AtoZ", "$ABC$XYZ"),
        ("VAR1", "$VAR2"),
        ("VAR2", "$VAR3"),
        ("VAR3", "$AtoZ"),
        ("SPACE_VAR1", "a b"),
        (BIG_VAR, "78910"),
        ("WRONGVAR1", "$WRONGVAR2"),
        ("WRONGVAR2", "$WRONGVAR1"),
        ("SINGLE_QUOTE_VAR1", "'a b'"),
        ("SINGLE_QUOTE_VAR2", "'a \" b' \"$ABC\""),
        ("DOUBLE_QUOTE_VAR1", "\"a b\""),
        ("DOUBLE_QUOTE_VAR2", "\"$SPACE_VAR1\""),
    ]
    .into_iter()
    .collect()
}

pub fn assert_expand(input: &str, expected: &[&str]) {
    let words = expand(input, &fixture_env())
        .unwrap_or_else(|e| panic!("expand failed for {input:?}: {e}"));
    assert_eq!(words, expected, "input: {input:?}");
}

pub fn expand_err(input: &str) -> ExpandErrorKind {
    match expand(input, &fixture_env()) {
        Ok(words) => panic!("expected failure for {input:?}, got {words:?}"),
        Err(e) => e.kind,
    }
}
