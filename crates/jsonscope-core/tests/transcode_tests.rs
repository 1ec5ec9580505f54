/// Tests for backend-to-backend copying and `reformat`.
use jsonscope_core::{
    copy, reformat, render, Error, JsonOptions, JsonReader, RootMode, TreeReader, TreeWriter,
};
use serde_json::json;

#[test]
fn reformat_compact_strips_whitespace() {
    let text = reformat("{ \"a\" : [ 1 , 2.5 , \"x\" ] , \"b\" : null }", JsonOptions::compact())
        .unwrap();
    assert_eq!(text, r#"{"a":[1,2.5,"x"],"b":null}"#);
}

#[test]
fn reformat_pretty_lays_out_every_container() {
    let text = reformat(r#"{"a":[1,2],"b":{}}"#, JsonOptions::pretty()).unwrap();
    assert_eq!(text, "{\n\t\"a\":[\n\t\t1,\n\t\t2\n\t],\n\t\"b\":{}\n}");
}

#[test]
fn reformat_lined_keeps_one_value_per_line() {
    let text = reformat("1\n[2]\n{\"A\":[\"B\",\"C\"]}", JsonOptions::lined()).unwrap();
    assert_eq!(text, "1\n[2]\n{\"A\":[\"B\",\"C\"]}\n");
}

#[test]
fn reformat_custom_delimiter() {
    let options = JsonOptions::compact().with_root(RootMode::Lined(','));
    let text = reformat("1 2", options).unwrap();
    assert_eq!(text, "1,\n2,\n");
}

#[test]
fn reformat_preserves_large_unsigned_integers() {
    let text = reformat("[18446744073709551615,-1]", JsonOptions::compact()).unwrap();
    assert_eq!(text, "[18446744073709551615,-1]");
}

#[test]
fn reformat_reescapes_strings() {
    let text = reformat(r#"["A\té"]"#, JsonOptions::compact()).unwrap();
    assert_eq!(text, r#"["A\u0009\u00C3\u00A9"]"#);
}

#[test_log::test]
fn reformat_reports_malformed_input() {
    let err = reformat("[1, 2", JsonOptions::compact()).unwrap_err();
    assert!(matches!(err, Error::Malformed(_)));
}

#[test]
fn reformat_rejects_nesting_beyond_the_limit() {
    let text = format!("{}{}", "[".repeat(20_000), "]".repeat(20_000));
    let err = reformat(&text, JsonOptions::compact()).unwrap_err();
    assert!(matches!(err, Error::Malformed(ref reason) if reason.contains("nesting too deep")));
}

#[test]
fn reformat_rejects_glued_top_level_values() {
    let err = reformat("[1]2{}{}", JsonOptions::lined()).unwrap_err();
    assert!(matches!(err, Error::Malformed(_)));
}

#[test]
fn copy_text_into_tree() {
    let mut reader = JsonReader::from_text(r#"{"k":[true,{"n":-3}],"f":0.5}"#);
    let mut writer = TreeWriter::new();
    {
        let mut input = reader.root();
        let mut output = writer.root();
        assert!(copy(&mut *input, &mut *output));
        assert!(input.at_end());
    }
    assert_eq!(
        writer.into_value().unwrap(),
        json!({"k": [true, {"n": -3}], "f": 0.5})
    );
}

#[test]
fn copy_tree_into_text() {
    let value = json!({"list": [1, "two", [null]], "empty": {}});
    let mut reader = TreeReader::from_value(&value);
    let text = render(JsonOptions::compact(), |out| {
        let mut input = reader.root();
        assert!(copy(&mut *input, &mut **out));
    })
    .unwrap();
    assert_eq!(text, r#"{"list":[1,"two",[null]],"empty":{}}"#);
}

#[test]
fn copy_at_terminator_fails() {
    let mut reader = JsonReader::from_text("");
    let mut writer = TreeWriter::new();
    let mut input = reader.root();
    let mut output = writer.root();
    assert!(!copy(&mut *input, &mut *output));
    assert!(input.fail());
}

#[test]
fn copy_stops_at_the_first_input_error() {
    let mut reader = JsonReader::from_text(r#"[1, 2, oops, 4]"#);
    let mut writer = TreeWriter::new();
    {
        let mut input = reader.root();
        let mut output = writer.root();
        assert!(!copy(&mut *input, &mut *output));
    }
    // The partial array is still closed on the output side.
    assert_eq!(writer.into_value().unwrap(), json!([1, 2]));
}
