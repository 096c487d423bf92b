use combu_core::{CombuError, Record};
use serde::Deserialize;
use serde_json::{json, Value};

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct Args {
    v1: i64,
    v2: String,
}

#[test]
fn bind_produces_typed_arguments() {
    let rec = record(&[("v1", json!(3)), ("v2", json!("x"))]);
    let args: Args = rec.bind().expect("bind");
    assert_eq!(
        args,
        Args {
            v1: 3,
            v2: "x".to_string()
        }
    );
}

#[test]
fn bind_rejects_missing_and_unexpected_names() {
    let missing = record(&[("v1", json!(3))]);
    let err = missing.bind::<Args>().unwrap_err();
    assert!(matches!(err, CombuError::Argument(_)));
    assert!(err.info().message.contains("v2"));

    let extra = record(&[("v1", json!(3)), ("v2", json!("x")), ("v3", json!(0))]);
    let err = extra.bind::<Args>().unwrap_err();
    assert!(matches!(err, CombuError::Argument(_)));
    assert!(err.info().message.contains("v3"));
}

#[test]
fn require_and_expect_only_report_names() {
    let rec = record(&[("v1", json!(1)), ("v3", json!(2))]);
    assert_eq!(rec.require("v1").expect("present"), &json!(1));
    let err = rec.require("v2").unwrap_err();
    assert_eq!(err.info().code, "missing-argument");

    let err = rec.expect_only(&["v1", "v2"]).unwrap_err();
    assert_eq!(err.info().code, "unexpected-argument");
    assert_eq!(err.info().context["name"], "v3");
    assert!(rec.expect_only(&["v1", "v3"]).is_ok());
}

#[test]
fn equality_and_digest_ignore_name_order() {
    let a = record(&[("v1", json!("a")), ("v2", json!("A"))]);
    let b = record(&[("v2", json!("A")), ("v1", json!("a"))]);
    assert_eq!(a, b);
    assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    assert_eq!(a.into_value(), json!({"v1": "a", "v2": "A"}));
}
