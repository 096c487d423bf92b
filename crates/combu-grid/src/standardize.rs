use combu_core::{Arg, Candidate, CombuError, ErrorInfo, Key, Pack, ParamSpec};
use indexmap::IndexMap;

use crate::order::resolve_order;
use crate::traverse::{merge_fragments, Odometer};

/// One candidate of one key, flattened to final argument names.
///
/// Omission markers are carried as-is; they are dropped only once all
/// fragments of a combination have been merged.
pub type Fragment = IndexMap<String, Arg>;

/// Normalized candidates of one key, in candidate order.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    key: Key,
    fragments: Vec<Fragment>,
}

impl Axis {
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Number of candidates contributed by this key.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Normalizes every key of `spec` into an [`Axis`], in resolved order.
///
/// Plain keys yield one single-entry fragment per candidate, tuple keys zip
/// their names with each candidate row, and pack keys expand each nested
/// specification into all of its combinations under the pack's name order.
pub fn standardize(spec: &ParamSpec, order: &[Key]) -> Result<Vec<Axis>, CombuError> {
    resolve_order(spec.keys(), order)
        .into_iter()
        .map(|key| {
            let fragments = unpack(&key, spec.require(&key)?)?;
            Ok(Axis { key, fragments })
        })
        .collect()
}

fn unpack(key: &Key, candidates: &[Candidate]) -> Result<Vec<Fragment>, CombuError> {
    match key {
        Key::Name(name) => candidates
            .iter()
            .map(|candidate| match candidate {
                Candidate::Arg(arg) => Ok(Fragment::from([(name.clone(), arg.clone())])),
                other => Err(shape_error(key, other)),
            })
            .collect(),
        Key::Tuple(names) => unpack_tuple(key, names, candidates),
        Key::Pack(pack) => unpack_pack(key, pack, candidates),
    }
}

fn unpack_tuple(
    key: &Key,
    names: &[String],
    candidates: &[Candidate],
) -> Result<Vec<Fragment>, CombuError> {
    candidates
        .iter()
        .map(|candidate| match candidate {
            Candidate::Tuple(values) if values.len() == names.len() => {
                Ok(names.iter().cloned().zip(values.iter().cloned()).collect())
            }
            Candidate::Tuple(values) => Err(CombuError::Type(
                ErrorInfo::new(
                    "tuple-arity",
                    format!(
                        "tuple candidate has {} values but key `{key}` names {}",
                        values.len(),
                        names.len()
                    ),
                )
                .with_context("key", key.to_string())
                .with_context("expected", names.len().to_string())
                .with_context("found", values.len().to_string()),
            )),
            other => Err(shape_error(key, other)),
        })
        .collect()
}

fn unpack_pack(
    key: &Key,
    pack: &Pack,
    candidates: &[Candidate],
) -> Result<Vec<Fragment>, CombuError> {
    let order = pack.keys();
    let mut fragments = Vec::new();
    for candidate in candidates {
        let nested = match candidate {
            Candidate::Nested(nested) => nested,
            other => return Err(shape_error(key, other)),
        };
        let axes = standardize(nested, &order)?;
        let lengths: Vec<usize> = axes.iter().map(Axis::len).collect();
        fragments.extend(Odometer::new(lengths).map(|positions| merge_fragments(&axes, &positions)));
    }
    Ok(fragments)
}

fn shape_error(key: &Key, candidate: &Candidate) -> CombuError {
    CombuError::Type(
        ErrorInfo::new(
            "candidate-shape",
            format!(
                "{} candidate does not fit {} key `{key}`",
                candidate.shape(),
                key.kind()
            ),
        )
        .with_context("key", key.to_string())
        .with_context("shape", candidate.shape()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(pairs: &[(&str, Arg)]) -> Fragment {
        pairs
            .iter()
            .map(|(name, arg)| (name.to_string(), arg.clone()))
            .collect()
    }

    #[test]
    fn plain_key_yields_single_entry_fragments() {
        let spec = ParamSpec::new().with("v1", [1, 2]);
        let axes = standardize(&spec, &[]).unwrap();
        assert_eq!(axes.len(), 1);
        assert_eq!(
            axes[0].fragments(),
            &[
                fragment(&[("v1", Arg::from(1))]),
                fragment(&[("v1", Arg::from(2))])
            ]
        );
    }

    #[test]
    fn tuple_key_zips_names() {
        let spec = ParamSpec::new().with_tuple(["v2", "v3"], [[0, 1]]);
        let axes = standardize(&spec, &[]).unwrap();
        assert_eq!(
            axes[0].fragments(),
            &[fragment(&[("v2", Arg::from(0)), ("v3", Arg::from(1))])]
        );
    }

    #[test]
    fn pack_concatenates_nested_combinations() {
        let spec = ParamSpec::new().with_pack(
            Pack::new(["v1", "v2"]),
            [
                ParamSpec::new().with("v2", ["A", "B"]).with("v1", ["a"]),
                ParamSpec::new().with("v1", ["x"]).with("v2", ["X"]),
            ],
        );
        let axes = standardize(&spec, &[]).unwrap();
        let got: Vec<_> = axes[0]
            .fragments()
            .iter()
            .map(|f| (f["v1"].clone(), f["v2"].clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Arg::from("a"), Arg::from("A")),
                (Arg::from("a"), Arg::from("B")),
                (Arg::from("x"), Arg::from("X")),
            ]
        );
        // Pack names fix the nested order regardless of declaration.
        let names: Vec<_> = axes[0].fragments()[0].keys().cloned().collect();
        assert_eq!(names, vec!["v1".to_string(), "v2".to_string()]);
    }

    #[test]
    fn unset_is_carried_through() {
        let spec = ParamSpec::new().with("v1", [Arg::Unset, Arg::Value(json!(1))]);
        let axes = standardize(&spec, &[]).unwrap();
        assert!(axes[0].fragments()[0]["v1"].is_unset());
    }

    #[test]
    fn arity_mismatch_is_a_type_error() {
        let spec = ParamSpec::new().with_candidates(
            Key::tuple(["v2", "v3"]),
            vec![Candidate::tuple([1, 2, 3])],
        );
        let err = standardize(&spec, &[]).unwrap_err();
        assert!(matches!(err, CombuError::Type(_)));
        assert_eq!(err.info().code, "tuple-arity");
    }

    #[test]
    fn mismatched_shapes_are_type_errors() {
        let plain_with_tuple =
            ParamSpec::new().with_candidates("v1", vec![Candidate::tuple([1, 2])]);
        let pack_with_scalar = ParamSpec::new()
            .with_candidates(Pack::new(["v1"]), vec![Candidate::from(1)]);
        for spec in [plain_with_tuple, pack_with_scalar] {
            let err = standardize(&spec, &[]).unwrap_err();
            assert_eq!(err.info().code, "candidate-shape");
        }
    }

    #[test]
    fn unknown_order_key_is_a_key_error() {
        let spec = ParamSpec::new().with("v1", [1]);
        let err = standardize(&spec, &[Key::from("v9")]).unwrap_err();
        assert!(matches!(err, CombuError::Key(_)));
    }

    #[test]
    fn pack_name_missing_from_nested_spec_is_a_key_error() {
        let spec = ParamSpec::new().with_pack(
            Pack::new(["v1", "v2"]),
            [ParamSpec::new().with("v1", [1])],
        );
        let err = standardize(&spec, &[]).unwrap_err();
        assert!(matches!(err, CombuError::Key(_)));
    }
}
