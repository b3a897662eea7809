use jproperties::{
    parse_bytes, parse_str, parse_str_to_doc, parse_str_to_vec, Charset, Element, Position,
    PropertiesError, PropertyTable,
};
use std::fs::File;
use test_crate::{assert_complex, fixture};

fn single(text: &str) -> (String, String) {
    let mut entries = parse_str_to_vec(text).expect("Failed to parse");
    assert_eq!(entries.len(), 1, "{entries:?}");
    entries.remove(0)
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

#[test]
pub fn complex_file() {
    let file = File::open(fixture("complex.properties")).expect("Failed to open file");
    let mut props = PropertyTable::new();
    props.load(file).expect("Failed to parse file");
    assert_complex(&props);
}

#[test]
pub fn complex_bytes() {
    let binary = std::fs::read(fixture("complex.properties")).expect("Failed to read file");

    let mut latin1 = PropertyTable::new();
    latin1.load_bytes(&binary, Charset::Latin1).expect("Failed to parse file");
    assert_complex(&latin1);

    let mut utf8 = PropertyTable::new();
    utf8.load_bytes(&binary, Charset::Utf8).expect("Failed to parse file");
    assert_eq!(latin1, utf8);
}

#[test]
pub fn complex_str() {
    let text = std::fs::read_to_string(fixture("complex.properties")).expect("Failed to read file");
    let mut props = PropertyTable::new();
    props.load_str(&text).expect("Failed to parse file");
    assert_complex(&props);
}

#[test]
pub fn separators_are_equivalent() {
    for text in [
        "key=value",
        "key:value",
        "key value",
        "key = value",
        "key\t:\tvalue",
        "key\x0C value",
        "   key    value",
    ] {
        assert_eq!(single(text), pair("key", "value"), "{text:?}");
    }
}

#[test]
pub fn only_first_separator_splits() {
    assert_eq!(single("key = =value"), pair("key", "=value"));
    assert_eq!(single("key==value"), pair("key", "=value"));
    assert_eq!(single("key : a:b=c"), pair("key", "a:b=c"));
    assert_eq!(single("key  value with  spaces"), pair("key", "value with  spaces"));
    assert_eq!(single("=value"), pair("", "value"));
}

#[test]
pub fn trailing_whitespace_is_kept_in_values() {
    assert_eq!(single("key=value  "), pair("key", "value  "));
}

#[test]
pub fn comments_never_produce_entries() {
    let entries = parse_str_to_vec("# a=b\n! c=d\n   #e=f\n\t!g\n\x0C# h").expect("Failed to parse");
    assert!(entries.is_empty(), "{entries:?}");
}

#[test]
pub fn comment_ending_in_backslash_is_not_continued() {
    let entries = parse_str_to_vec("# comment \\\nkey=value").expect("Failed to parse");
    assert_eq!(entries, vec![pair("key", "value")]);
}

#[test]
pub fn document_elements() {
    let doc = parse_str_to_doc("#c\n\nk=v\n").expect("Failed to parse");
    assert_eq!(
        doc,
        vec![
            Element::Comment("#c".to_string()),
            Element::BlankLine,
            Element::Entry("k".to_string(), "v".to_string()),
            Element::BlankLine,
        ]
    );
}

#[test]
pub fn escaped_comment_markers_start_keys() {
    assert_eq!(single("\\#key=v"), pair("#key", "v"));
    assert_eq!(single("\\!key=v"), pair("!key", "v"));
}

#[test]
pub fn escaped_separators_belong_to_the_key() {
    assert_eq!(single("Key20\\=WithEquals=Value20"), pair("Key20=WithEquals", "Value20"));
    assert_eq!(single("Key21\\:WithColon=Value21"), pair("Key21:WithColon", "Value21"));
    assert_eq!(single("my\\ key = v"), pair("my key", "v"));
}

#[test]
pub fn reference_scenarios() {
    assert_eq!(single("Key00=Value00\n"), pair("Key00", "Value00"));
    assert_eq!(
        single("Key05 = Value05a, \\\n    Value05b, \\\n    Value05c"),
        pair("Key05", "Value05a, Value05b, Value05c")
    );
    assert_eq!(
        single("Key18=Value18 \\# Not a comment."),
        pair("Key18", "Value18 # Not a comment.")
    );
    assert_eq!(single("Key11="), pair("Key11", ""));
    assert_eq!(single("Key11"), pair("Key11", ""));
}

#[test]
pub fn continuation_joins_trimmed_lines() {
    assert_eq!(single("ke\\\n   y=v"), pair("key", "v"));
    assert_eq!(single("key=a\\\n  #b"), pair("key", "a#b"));
    assert_eq!(single("key = \\\n   value"), pair("key", "value"));
    assert_eq!(single("key=a\\\n\t\x0C b\\\n c"), pair("key", "abc"));
}

#[test]
pub fn continuation_across_line_terminators() {
    let crlf = parse_str_to_vec("key=a\\\r\n   b\r\nk2=c").expect("Failed to parse");
    assert_eq!(crlf, vec![pair("key", "ab"), pair("k2", "c")]);

    let cr = parse_str_to_vec("key=a\\\r   b\rk2=c").expect("Failed to parse");
    assert_eq!(cr, vec![pair("key", "ab"), pair("k2", "c")]);
}

#[test]
pub fn continuation_inside_separator() {
    assert_eq!(single("key \\\n   =value"), pair("key", "value"));
    assert_eq!(single("key :\\\n  v"), pair("key", "v"));
    assert_eq!(single("key\\\n = v"), pair("key", "v"));
    assert_eq!(single("key \\\r\n  : v"), pair("key", "v"));
    assert_eq!(single("key \\\n   value"), pair("key", "value"));
    assert_eq!(single("key = \\\n  = x"), pair("key", "= x"));
    assert_eq!(single("key \\\n"), pair("key", ""));
}

#[test]
pub fn continuation_inside_unicode_escape() {
    assert_eq!(single("k=\\u00\\\n    41"), pair("k", "A"));
    assert_eq!(single("k=\\u\\\r\n0041"), pair("k", "A"));
    assert_eq!(single("\\u00\\\n 4\\\r 1=v"), pair("A", "v"));
    assert_eq!(single("k=\\uD835\\\n    \\uDD4A"), pair("k", "𝕊"));
    assert_eq!(single("k=\\uD835\\\n\\uDD\\\n  4A"), pair("k", "𝕊"));
    assert_eq!(single("k=\\uD835\\u\\\n DD4A"), pair("k", "𝕊"));
}

#[test]
pub fn backslash_inside_unicode_escape_must_end_the_line() {
    let err = parse_str_to_vec("k=\\u00\\41").expect_err("Parsing should fail");
    assert!(
        matches!(err, PropertiesError::MalformedUnicodeEscape { found: '\\', .. }),
        "{err:?}"
    );

    let err = parse_str_to_vec("k=\\u00\\\n").expect_err("Parsing should fail");
    assert!(matches!(err, PropertiesError::TruncatedUnicodeEscape { .. }), "{err:?}");

    let err = parse_str_to_vec("k=\\uD835\\\n").expect_err("Parsing should fail");
    assert!(
        matches!(err, PropertiesError::UnpairedSurrogate { value: 0xD835, .. }),
        "{err:?}"
    );
}

#[test]
pub fn escaped_backslash_does_not_continue() {
    let entries = parse_str_to_vec("key=a\\\\\nk2=b").expect("Failed to parse");
    assert_eq!(entries, vec![pair("key", "a\\"), pair("k2", "b")]);

    let entries = parse_str_to_vec("key=a\\\\\\\nb").expect("Failed to parse");
    assert_eq!(entries, vec![pair("key", "a\\b")]);
}

#[test]
pub fn continuation_into_blank_line_ends_entry() {
    let entries = parse_str_to_vec("key=a\\\n\nk2=b").expect("Failed to parse");
    assert_eq!(entries, vec![pair("key", "a"), pair("k2", "b")]);
}

#[test]
pub fn mixed_line_terminators() {
    let entries = parse_str_to_vec("a=1\rb=2\r\nc=3\nd=4").expect("Failed to parse");
    assert_eq!(
        entries,
        vec![pair("a", "1"), pair("b", "2"), pair("c", "3"), pair("d", "4")]
    );
}

#[test]
pub fn control_escapes() {
    assert_eq!(single("k=\\t\\n\\r\\f\\\\"), pair("k", "\t\n\r\x0C\\"));
    assert_eq!(single("k\\tx=v"), pair("k\tx", "v"));
}

#[test]
pub fn unknown_escapes_drop_the_backslash() {
    assert_eq!(single("k=\\q\\b\\\""), pair("k", "qb\""));
    assert_eq!(single("\\k\\e\\y=v"), pair("key", "v"));
}

#[test]
pub fn unicode_escapes() {
    assert_eq!(single("k=\\u0041\\u00e9\\u20AC"), pair("k", "Aé€"));
    assert_eq!(single("\\u0041BC=1"), pair("ABC", "1"));
    assert_eq!(single("k=\\uD835\\uDD4A"), pair("k", "𝕊"));
    assert_eq!(single("k=\\u0000"), pair("k", "\0"));
}

#[test]
pub fn malformed_unicode_escape() {
    let err = parse_str_to_vec("k=\\u00G1").expect_err("Parsing should fail");
    assert!(err.is_format_error());
    assert!(
        matches!(err, PropertiesError::MalformedUnicodeEscape { found: 'G', .. }),
        "{err:?}"
    );

    let err = parse_str_to_vec("k=\\u004\nx=y").expect_err("Parsing should fail");
    assert!(matches!(
        err,
        PropertiesError::MalformedUnicodeEscape { found: '\n', .. }
    ));
}

#[test]
pub fn truncated_unicode_escape() {
    let err = parse_str_to_vec("k=\\u004").expect_err("Parsing should fail");
    assert!(err.is_format_error());
    assert!(matches!(err, PropertiesError::TruncatedUnicodeEscape { .. }), "{err:?}");
}

#[test]
pub fn unpaired_surrogates() {
    let err = parse_str_to_vec("k=\\uD835x").expect_err("Parsing should fail");
    assert!(matches!(
        err,
        PropertiesError::UnpairedSurrogate { value: 0xD835, .. }
    ));

    let err = parse_str_to_vec("k=\\uDD4A").expect_err("Parsing should fail");
    assert!(matches!(
        err,
        PropertiesError::UnpairedSurrogate { value: 0xDD4A, .. }
    ));

    let err = parse_str_to_vec("k=\\uD835\\u0041").expect_err("Parsing should fail");
    assert!(matches!(
        err,
        PropertiesError::InvalidSurrogatePair {
            high: 0xD835,
            low: 0x0041,
            ..
        }
    ));

    let err = parse_str_to_vec("k=\\uD835").expect_err("Parsing should fail");
    assert!(err.is_format_error());
}

#[test]
pub fn error_position() {
    let err = parse_str_to_vec("a=1\nb=\\u12x4").expect_err("Parsing should fail");
    let position = err.position().expect("Format errors carry a position");
    assert_eq!(position.line, 1);
    assert_eq!(position.character_in_line, 7);
    assert_eq!(position.to_string(), "line 2 column 7");
}

#[test]
pub fn trailing_backslash_at_end_of_input_is_dropped() {
    assert_eq!(single("key=value\\"), pair("key", "value"));
    assert_eq!(single("key\\"), pair("key", ""));
    assert_eq!(single("key=value\\\n"), pair("key", "value"));
}

#[test]
pub fn empty_and_blank_input() {
    assert!(parse_str_to_vec("").expect("Failed to parse").is_empty());
    assert!(parse_str_to_vec("  \n\t\n\x0C\r\n").expect("Failed to parse").is_empty());
}

#[test]
pub fn latin1_maps_every_byte() {
    let mut props = PropertyTable::new();
    props
        .load_bytes(b"k=\xE9\xFF\x85", Charset::Latin1)
        .expect("Failed to parse");
    assert_eq!(props.get("k"), Some("éÿ\u{85}"));

    let mut props = PropertyTable::new();
    props
        .load_bytes("k=é".as_bytes(), Charset::Latin1)
        .expect("Failed to parse");
    assert_eq!(props.get("k"), Some("Ã©"));
}

#[test]
pub fn utf8_input() {
    let mut props = PropertyTable::new();
    props
        .load_with("k=é𝕊\\u00e9".as_bytes(), Charset::Utf8)
        .expect("Failed to parse");
    assert_eq!(props.get("k"), Some("é𝕊é"));
}

#[test]
pub fn invalid_utf8_input() {
    let mut ignore = |_: &Position, _: Element| true;

    let err = parse_bytes(b"k=\xFF", Charset::Utf8, &mut ignore).expect_err("Parsing should fail");
    assert!(matches!(err, PropertiesError::InvalidInput(_)), "{err:?}");

    let err = parse_bytes(b"k=\xC3", Charset::Utf8, &mut ignore).expect_err("Parsing should fail");
    assert!(matches!(err, PropertiesError::UnexpectedEof(_)), "{err:?}");
}

#[test]
pub fn failed_load_keeps_earlier_entries() {
    let mut props = PropertyTable::new();
    let err = props
        .load_str("a=1\nb=2\nc=\\uZZZZ\nd=4")
        .expect_err("Parsing should fail");
    assert!(err.is_format_error());
    assert_eq!(props.get("a"), Some("1"));
    assert_eq!(props.get("b"), Some("2"));
    assert!(!props.contains_key("c"));
    assert!(!props.contains_key("d"));
}

#[test]
pub fn handler_can_stop_parsing() {
    let mut keys = Vec::new();
    let mut handler = |_: &Position, element: Element| {
        if let Element::Entry(key, _) = element {
            keys.push(key);
            return false;
        }
        true
    };

    let position = parse_str("# c\na=1\nb=2\n", &mut handler).expect("Failed to parse");
    assert_eq!(keys, vec!["a".to_string()]);
    assert_eq!(position.line, 2);
}
