/// Contract tests for the streaming JSON-text reader.
///
/// The reader must report kinds without consuming, resume parents correctly
/// when nested sequences are dropped early, and turn every syntax error or
/// type mismatch into the sticky failure flag.
use std::io::{self, BufReader, Read};

use jsonscope_core::{Error, InputNode, JsonReader, ValueKind, DEFAULT_MAX_DEPTH};

// ============================================================================
// Scalars and kinds
// ============================================================================

#[test]
fn top_level_kinds_in_order() {
    let mut reader = JsonReader::from_text(r#"null true 1 -2.5 1e3 "s" [] {}"#);
    let mut root = reader.root();
    let mut kinds = Vec::new();
    while !root.at_end() {
        kinds.push(root.kind());
        assert!(root.ignore());
    }
    assert_eq!(
        kinds,
        vec![
            ValueKind::Null,
            ValueKind::Bool,
            ValueKind::Integer,
            ValueKind::Float,
            ValueKind::Float,
            ValueKind::String,
            ValueKind::Array,
            ValueKind::Object,
        ]
    );
    assert!(!root.fail());
}

#[test]
fn kind_does_not_consume() {
    let mut reader = JsonReader::from_text("42");
    let mut root = reader.root();
    assert_eq!(root.kind(), ValueKind::Integer);
    assert_eq!(root.kind(), ValueKind::Integer);
    assert_eq!(root.get::<i64>(), Some(42));
    assert!(root.at_end());
}

#[test]
fn read_full_unsigned_range() {
    let mut reader = JsonReader::from_text("18446744073709551615 -9223372036854775808");
    let mut root = reader.root();
    assert_eq!(root.kind(), ValueKind::Integer);
    assert_eq!(root.get::<u64>(), Some(u64::MAX));
    assert_eq!(root.get::<i64>(), Some(i64::MIN));
    assert!(!root.fail());
}

#[test]
fn read_integer_covers_both_signs() {
    let mut reader = JsonReader::from_text("-5 18446744073709551615");
    let mut root = reader.root();
    assert_eq!(root.read_integer(), Some(-5));
    assert_eq!(root.read_integer(), Some(i128::from(u64::MAX)));
}

#[test]
fn read_f64_accepts_integer_text() {
    let mut reader = JsonReader::from_text("3");
    let mut root = reader.root();
    assert_eq!(root.get::<f64>(), Some(3.0));
}

#[test]
fn read_f32_parses_text_directly() {
    let mut reader = JsonReader::from_text("0.1");
    let mut root = reader.root();
    assert_eq!(root.get::<f32>(), Some(0.1f32));
}

#[test]
fn read_i64_rejects_float_text() {
    let mut reader = JsonReader::from_text("1.0");
    let mut root = reader.root();
    assert_eq!(root.get::<i64>(), None);
    assert!(root.fail());
}

#[test]
fn narrowing_overflow_sets_failure() {
    let mut reader = JsonReader::from_text("3000000000");
    let mut root = reader.root();
    let mut dest = 0i32;
    assert!(!root.read(&mut dest));
    assert!(root.fail());
}

#[test]
fn optional_values_read_null_as_none() {
    let mut reader = JsonReader::from_text("[null, 3]");
    let mut root = reader.root();
    let mut arr = root.begin_array();
    assert_eq!(arr.get::<Option<i64>>(), Some(None));
    assert_eq!(arr.get::<Option<i64>>(), Some(Some(3)));
    assert!(arr.at_end());
}

#[test]
fn string_escapes_decode() {
    let mut reader = JsonReader::from_text(r#""a\u00e9\ud83d\ude00\n\/\"\\\t""#);
    let mut root = reader.root();
    assert_eq!(
        root.get::<String>().as_deref(),
        Some("a\u{e9}\u{1f600}\n/\"\\\t")
    );
}

#[test]
fn raw_utf8_passes_through() {
    let mut reader = JsonReader::from_text("\"caf\u{e9}\"");
    let mut root = reader.root();
    assert_eq!(root.get::<String>().as_deref(), Some("caf\u{e9}"));
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn object_members_with_keys() {
    let mut reader = JsonReader::from_text(r#"{"a": 1, "b": "two", "c": false}"#);
    let mut root = reader.root();
    let mut obj = root.begin_object();
    let mut seen = Vec::new();
    while !obj.at_end() {
        let key = obj.key().to_string();
        let kind = obj.kind();
        obj.ignore();
        seen.push((key, kind));
    }
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), ValueKind::Integer),
            ("b".to_string(), ValueKind::String),
            ("c".to_string(), ValueKind::Bool),
        ]
    );
}

#[test]
fn dropping_a_nested_sequence_resumes_the_parent() {
    let mut reader = JsonReader::from_text(r#"{"a":[1,[2,3],4],"b":5}"#);
    let mut root = reader.root();
    let mut obj = root.begin_object();
    assert_eq!(obj.key(), "a");
    {
        let mut arr = obj.begin_array();
        assert_eq!(arr.get::<i64>(), Some(1));
    }
    assert_eq!(obj.key(), "b");
    assert_eq!(obj.get::<i64>(), Some(5));
    assert!(obj.at_end());
    drop(obj);
    assert!(root.at_end());
    assert!(!root.fail());
}

#[test]
fn ignore_skips_nested_structure() {
    let mut reader = JsonReader::from_text(r#"[{"x":[1,{"y":null}],"z":"}"}, 5]"#);
    let mut root = reader.root();
    let mut arr = root.begin_array();
    assert!(arr.ignore());
    assert_eq!(arr.get::<i64>(), Some(5));
    assert!(arr.at_end());
}

#[test]
fn empty_containers_are_at_end() {
    let mut reader = JsonReader::from_text("[] {}");
    let mut root = reader.root();
    {
        let arr = root.begin_array();
        assert!(arr.at_end());
        assert!(!arr.fail());
    }
    {
        let obj = root.begin_object();
        assert!(obj.at_end());
        assert!(!obj.fail());
    }
    assert!(root.at_end());
}

#[test]
fn empty_input_has_no_values() {
    for text in ["", "  \n\t "] {
        let mut reader = JsonReader::from_text(text);
        let root = reader.root();
        assert!(root.at_end());
        assert!(!root.fail());
    }
}

#[test]
fn lined_input_reads_one_value_per_line() {
    let mut reader = JsonReader::from_text("{\"n\":1}\n{\"n\":2}\n");
    let mut root = reader.root();
    let mut total = 0;
    while !root.at_end() {
        let mut obj = root.begin_object();
        assert_eq!(obj.key(), "n");
        total += obj.get::<i64>().unwrap_or_default();
    }
    assert_eq!(total, 3);
    drop(root);
    assert!(reader.finish().is_ok());
}

// ============================================================================
// Failure
// ============================================================================

#[test]
fn descent_on_wrong_kind_returns_failed_null_sequence() {
    let mut reader = JsonReader::from_text("5");
    let mut root = reader.root();
    let arr = root.begin_array();
    assert!(arr.at_end());
    assert!(arr.fail());
    drop(arr);
    assert!(root.fail());
}

#[test]
fn read_past_end_fails() {
    let mut reader = JsonReader::from_text("[]");
    let mut root = reader.root();
    let mut arr = root.begin_array();
    assert_eq!(arr.get::<i64>(), None);
    assert!(arr.fail());
}

#[test_log::test]
fn trailing_comma_is_malformed() {
    let mut reader = JsonReader::from_text("[1,]");
    {
        let mut root = reader.root();
        let mut arr = root.begin_array();
        assert_eq!(arr.get::<i64>(), Some(1));
        assert!(arr.fail());
    }
    assert!(reader.reason().is_some_and(|r| r.contains("byte")));
    assert!(matches!(reader.finish(), Err(Error::Malformed(_))));
}

#[test]
fn unterminated_array_is_malformed() {
    let mut reader = JsonReader::from_text("[1");
    let mut root = reader.root();
    let mut arr = root.begin_array();
    arr.get::<i64>();
    assert!(arr.fail());
}

#[test]
fn invalid_tokens_are_rejected() {
    for text in ["01", "tru", "truex", "-", "1.", "1e", "nul", "'a'", "\"\\x\"", "\"\\ud800\""] {
        let mut reader = JsonReader::from_text(text);
        let mut root = reader.root();
        root.ignore();
        assert!(root.fail(), "{text:?} should fail");
    }
}

#[test]
fn raw_control_character_in_string_is_rejected() {
    let mut reader = JsonReader::from_text("\"a\nb\"");
    let mut root = reader.root();
    assert_eq!(root.get::<String>(), None);
    assert!(root.fail());
}

#[test]
fn invalid_utf8_is_rejected() {
    let mut reader = JsonReader::from_slice(b"\"\xff\"");
    let root = reader.root();
    assert!(root.fail());
}

#[test]
fn missing_colon_is_rejected() {
    let mut reader = JsonReader::from_text(r#"{"a" 1}"#);
    let mut root = reader.root();
    let obj = root.begin_object();
    assert!(obj.fail());
}

#[test]
fn failure_is_sticky() {
    let mut reader = JsonReader::from_text(r#"["x", 2, 3]"#);
    let mut root = reader.root();
    let mut arr = root.begin_array();
    assert_eq!(arr.get::<i64>(), None);
    assert!(arr.fail());
    assert_eq!(arr.kind(), ValueKind::Null);
    assert_eq!(arr.get::<String>(), None);
    assert!(!arr.ignore());
    let nested = arr.begin_object();
    assert!(nested.at_end());
    assert!(nested.fail());
}

#[test]
fn caller_can_fail_the_stream() {
    let mut reader = JsonReader::from_text("[1, 2]");
    {
        let mut root = reader.root();
        let mut arr = root.begin_array();
        arr.set_fail();
        assert!(arr.at_end());
    }
    assert!(reader.fail());
    assert!(matches!(reader.finish(), Err(Error::Malformed(_))));
}

struct FailingSource;

impl Read for FailingSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk gone"))
    }
}

#[test]
fn source_error_fails_the_stream() {
    let mut reader = JsonReader::new(BufReader::new(FailingSource));
    {
        let root = reader.root();
        assert!(root.fail());
        assert!(root.at_end());
    }
    assert!(reader.error().is_some());
    assert!(matches!(reader.finish(), Err(Error::Io(_))));
}

#[test]
fn offset_counts_consumed_bytes() {
    let mut reader = JsonReader::from_text("[1, 2]  ");
    {
        let mut root = reader.root();
        assert!(root.ignore());
        assert!(root.at_end());
    }
    assert_eq!(reader.offset(), 8);
}

// ============================================================================
// Limits
// ============================================================================

fn nested_arrays(depth: usize) -> String {
    format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

#[test_log::test]
fn deep_nesting_fails_instead_of_overflowing() {
    let text = nested_arrays(20_000);
    let mut reader = JsonReader::from_text(&text);
    {
        let mut root = reader.root();
        assert!(!root.ignore());
        assert!(root.fail());
    }
    assert!(reader.reason().is_some_and(|r| r.contains("nesting too deep")));
    assert!(matches!(reader.finish(), Err(Error::Malformed(_))));
}

#[test]
fn default_depth_limit_is_inclusive() {
    let text = nested_arrays(DEFAULT_MAX_DEPTH);
    let mut reader = JsonReader::from_text(&text);
    {
        let mut root = reader.root();
        assert!(root.ignore());
        assert!(root.at_end());
    }
    assert!(reader.finish().is_ok());

    let text = nested_arrays(DEFAULT_MAX_DEPTH + 1);
    let mut reader = JsonReader::from_text(&text);
    let mut root = reader.root();
    assert!(!root.ignore());
}

#[test]
fn custom_depth_limit_applies_to_descents() {
    let mut reader = JsonReader::from_text("[[[1]]]").with_max_depth(2);
    {
        let mut root = reader.root();
        let mut outer = root.begin_array();
        let mut inner = outer.begin_array();
        assert!(!inner.fail());
        let innermost = inner.begin_array();
        assert!(innermost.at_end());
        assert!(innermost.fail());
    }
    assert!(reader.reason().is_some_and(|r| r.contains("nesting too deep")));
}

// ============================================================================
// Top-level separation
// ============================================================================

#[test]
fn glued_top_level_values_are_malformed() {
    for text in ["[1]2", "{}{}", "[][]", "\"a\"1", "1[]"] {
        let mut reader = JsonReader::from_text(text);
        {
            let mut root = reader.root();
            root.ignore();
            root.ignore();
            assert!(root.fail(), "{text:?} should fail");
        }
        assert!(matches!(reader.finish(), Err(Error::Malformed(_))), "{text:?}");
    }
}

#[test]
fn whitespace_separates_top_level_values() {
    let mut reader = JsonReader::from_text(" [1]\t2\r\n{}");
    let mut root = reader.root();
    assert!(root.ignore());
    assert_eq!(root.get::<i64>(), Some(2));
    assert!(root.ignore());
    assert!(root.at_end());
    assert!(!root.fail());
}
