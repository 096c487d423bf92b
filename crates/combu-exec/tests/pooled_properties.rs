use combu_core::{CombuError, ParamSpec, Record};
use combu_exec::{execute, ExecOptions};
use proptest::prelude::*;

fn width(record: &Record) -> Result<usize, CombuError> {
    Ok(record.len())
}

fn digests(spec: &ParamSpec, options: &ExecOptions) -> Vec<String> {
    let mut digests: Vec<String> = execute(width, spec, options)
        .expect("execute")
        .map(|outcome| outcome.expect("outcome").1.digest().expect("digest"))
        .collect();
    digests.sort();
    digests
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn pool_size_never_changes_the_record_multiset(
        lengths in prop::collection::vec(1usize..4, 1..4),
        workers in 2i64..5,
    ) {
        let spec = lengths
            .iter()
            .enumerate()
            .fold(ParamSpec::new(), |spec, (slot, len)| {
                spec.with(format!("k{slot}"), 0..*len as i64)
            });
        let sequential = digests(&spec, &ExecOptions::default());
        let pooled = digests(&spec, &ExecOptions::default().with_workers(workers));
        prop_assert_eq!(sequential, pooled);
    }
}
