use combu_core::{Arg, Key, Pack, ParamSpec, Record};
use combu_grid::{combinations, count, traverse};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => panic!("expected object, got {other}"),
    }
}

fn records(spec: &ParamSpec, order: &[Key]) -> Vec<Record> {
    traverse(spec, order).expect("traverse").collect()
}

#[test]
fn default_order_varies_last_key_fastest() {
    let spec = ParamSpec::new().with("v1", ["a", "b"]).with("v2", ["A", "B"]);
    assert_eq!(
        records(&spec, &[]),
        vec![
            record(json!({"v1": "a", "v2": "A"})),
            record(json!({"v1": "a", "v2": "B"})),
            record(json!({"v1": "b", "v2": "A"})),
            record(json!({"v1": "b", "v2": "B"})),
        ]
    );
}

#[test]
fn explicit_order_changes_nesting() {
    let spec = ParamSpec::new().with("v1", ["a", "b"]).with("v2", ["A", "B"]);
    assert_eq!(
        records(&spec, &[Key::from("v2"), Key::from("v1")]),
        vec![
            record(json!({"v1": "a", "v2": "A"})),
            record(json!({"v1": "b", "v2": "A"})),
            record(json!({"v1": "a", "v2": "B"})),
            record(json!({"v1": "b", "v2": "B"})),
        ]
    );
}

#[test]
fn tuple_key_pairs_values_positionally() {
    let spec = ParamSpec::new()
        .with("v1", ["a", "b"])
        .with_tuple(["v2", "v3"], [[0, 0], [1, 1]]);
    let got = records(&spec, &[]);
    assert_eq!(got.len(), 4);
    assert_eq!(
        got,
        vec![
            record(json!({"v1": "a", "v2": 0, "v3": 0})),
            record(json!({"v1": "a", "v2": 1, "v3": 1})),
            record(json!({"v1": "b", "v2": 0, "v3": 0})),
            record(json!({"v1": "b", "v2": 1, "v3": 1})),
        ]
    );
    assert!(!got.contains(&record(json!({"v1": "a", "v2": 0, "v3": 1}))));
}

#[test]
fn pack_unpacks_each_nested_space_in_turn() {
    let spec = ParamSpec::new().with("v1", ["a", "b"]).with_pack(
        Pack::new(["v2", "v3"]),
        [
            ParamSpec::new().with("v2", [0, 1]).with("v3", [0, 1]),
            ParamSpec::new().with("v2", [2, 3]).with("v3", [2, 3]),
        ],
    );
    let got: Vec<(Value, Value, Value)> = records(&spec, &[])
        .into_iter()
        .map(|r| {
            let field = |name: &str| r.get(name).cloned().unwrap_or(Value::Null);
            (field("v1"), field("v2"), field("v3"))
        })
        .collect();
    let mut expected = Vec::new();
    for v1 in ["a", "b"] {
        for (v2, v3) in [(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)] {
            expected.push((json!(v1), json!(v2), json!(v3)));
        }
    }
    assert_eq!(got, expected);
}

#[test]
fn unset_candidate_omits_the_name() {
    let spec = ParamSpec::new()
        .with("v1", [1, 2])
        .with("v2", [Arg::from("a"), Arg::Unset]);
    assert_eq!(
        records(&spec, &[]),
        vec![
            record(json!({"v1": 1, "v2": "a"})),
            record(json!({"v1": 1})),
            record(json!({"v1": 2, "v2": "a"})),
            record(json!({"v1": 2})),
        ]
    );
}

#[test]
fn records_can_feed_another_specification() {
    let inner = ParamSpec::new().with("a", [1, 10]).with("b", [1, 2, 3]);
    let nested: Vec<Record> = traverse(&inner, &[]).expect("inner").collect();
    let spec = ParamSpec::new()
        .with("v", ["a", "b"])
        .with("d", nested);
    let got = records(&spec, &[]);
    assert_eq!(got.len(), 12);
    assert_eq!(got[0], record(json!({"v": "a", "d": {"a": 1, "b": 1}})));
    assert_eq!(got[11], record(json!({"v": "b", "d": {"a": 10, "b": 3}})));
}

#[test]
fn later_keys_win_name_collisions() {
    let spec = ParamSpec::new()
        .with("v1", [1])
        .with_tuple(["v1", "v2"], [[2, 3]]);
    let got = records(&spec, &[]);
    assert_eq!(got, vec![record(json!({"v1": 2, "v2": 3}))]);
    let names: Vec<_> = got[0].keys().cloned().collect();
    assert_eq!(names, vec!["v1".to_string(), "v2".to_string()]);
}

#[test]
fn empty_specs_yield_nothing() {
    let empty = ParamSpec::new();
    assert_eq!(count(&empty).unwrap(), 0);
    assert!(records(&empty, &[]).is_empty());

    let hollow = ParamSpec::new().with("v1", [1]).with("v2", Vec::<i64>::new());
    assert_eq!(count(&hollow).unwrap(), 0);
    assert!(records(&hollow, &[]).is_empty());
}

#[test]
fn indices_are_unique_and_lexicographic() {
    let spec = ParamSpec::new()
        .with("v1", [1, 2])
        .with("v2", [1, 2, 3])
        .with("v3", [1, 2]);
    let order = [Key::from("v3")];
    let positions: Vec<Vec<usize>> = combinations(&spec, &order)
        .expect("combinations")
        .map(|c| c.index.positions().to_vec())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(positions, sorted);
    assert_eq!(positions.len(), 12);
}

#[test]
fn traversal_is_restartable() {
    let spec = ParamSpec::new().with("v1", [1, 2]);
    let first = records(&spec, &[]);
    let second = records(&spec, &[]);
    assert_eq!(first, second);
}
