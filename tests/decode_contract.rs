//! Purpose: Lock decoder contract expectations with corpus + differential coverage.
//! Exports: Integration tests only (no runtime exports).
//! Role: Catch semantic drift between the streaming decoder and a serde_json baseline.
//! Invariants: Differential checks assert parity where behavior should match today.
//! Notes: Order and duplicate-key preservation are asserted directly, since the
//! baseline map type does not observe either.

use json2md::core::decode::decode_array;
use json2md::core::table::{Table, Value as Cell};
use json2md::core::token::TokenStream;
use serde_json::Value;

fn decode(input: &str) -> Result<Table, String> {
    let mut stream = TokenStream::new(input.as_bytes());
    decode_array(&mut stream).map_err(|err| err.to_string())
}

fn assert_cell_eq(cell: &Cell, expected: &Value) {
    match (cell, expected) {
        (Cell::Str(a), Value::String(b)) => assert_eq!(a, b),
        (Cell::Number(a), Value::Number(b)) => assert_eq!(*a, b.as_f64().expect("f64")),
        (Cell::Bool(a), Value::Bool(b)) => assert_eq!(a, b),
        (Cell::Null, Value::Null) => {}
        (cell, expected) => panic!("cell mismatch: {cell:?} vs {expected:?}"),
    }
}

// Valid for corpus entries with unique keys per object only.
fn assert_matches_baseline(input: &str) {
    let table = decode(input).expect("decode");
    let baseline: Value = serde_json::from_str(input).expect("baseline");
    let rows = baseline.as_array().expect("array");

    assert_eq!(table.len(), rows.len(), "record count mismatch");
    for (record, row) in table.records.iter().zip(rows) {
        let object = row.as_object().expect("object");
        assert_eq!(record.pairs.len(), object.len(), "pair count mismatch");
        for pair in &record.pairs {
            let expected = object.get(&pair.key).expect("key present in baseline");
            assert_cell_eq(&pair.value, expected);
        }
    }
}

#[test]
fn corpus_valid_payloads_match_serde() {
    let corpus = [
        r#"[{"a":1,"b":"ok"}]"#,
        r#"[{"name":"John","age":30},{"name":"ssss","age":10,"hoge":"fuga"},{"name":"ssss","age":10}]"#,
        r#"[{"t":true,"f":false,"z":null}]"#,
        r#"[{"n":-1.5e2,"m":0.25}]"#,
        r#"[{"unicode":"☃","quoted":"a\"b"}]"#,
        r#"[{}]"#,
        "[]",
    ];

    for case in corpus {
        assert_matches_baseline(case);
    }
}

#[test]
fn corpus_malformed_inputs_rejected_by_both() {
    let corpus = [
        r#"[{"a":}]"#,
        r#"[{"a":01}]"#,
        r#"[{a:1}]"#,
        r#"[{"a":1,}]"#,
        r#"[{"a" 1}]"#,
        r#"[{"a":1},]"#,
        r#"[{"a":1}"#,
        r#"["#,
        "",
    ];

    for case in corpus {
        assert!(decode(case).is_err(), "decoder accepted {case:?}");
        assert!(
            serde_json::from_str::<Value>(case).is_err(),
            "baseline accepted {case:?}"
        );
    }
}

#[test]
fn key_order_is_encounter_order_not_sorted() {
    let table = decode(r#"[{"b":1,"a":2,"c":3}]"#).expect("decode");
    let keys: Vec<&str> = table.records[0].keys().collect();
    assert_eq!(keys, ["b", "a", "c"]);
}

#[test]
fn duplicate_keys_are_kept_where_the_baseline_collapses_them() {
    let input = r#"[{"name":"John","name":"John2"}]"#;

    let table = decode(input).expect("decode");
    assert_eq!(table.records[0].pairs.len(), 2);
    assert_eq!(table.records[0].pairs[0].value, Cell::Str("John".to_string()));
    assert_eq!(
        table.records[0].pairs[1].value,
        Cell::Str("John2".to_string())
    );

    let baseline: Value = serde_json::from_str(input).expect("baseline");
    let object = baseline[0].as_object().expect("object");
    assert_eq!(object.len(), 1, "baseline map collapses duplicates");
}
