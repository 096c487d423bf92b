// Kept in its own test binary so no other test reseeds the process RNG concurrently.
use combu_core::rng::seed_process_rng;
use combu_core::ParamSpec;
use combu_grid::{shuffle, ShuffleSource};

fn spec() -> ParamSpec {
    ParamSpec::new().with("li", 0..100i64)
}

#[test]
fn process_source_follows_process_seed() {
    seed_process_rng(5);
    let mut first = spec();
    shuffle(&mut first, ShuffleSource::Process);

    seed_process_rng(5);
    let mut second = spec();
    shuffle(&mut second, ShuffleSource::Process);
    assert_eq!(first, second);

    seed_process_rng(6);
    let mut third = spec();
    shuffle(&mut third, ShuffleSource::Process);
    assert_ne!(first, third);

    seed_process_rng(5);
    let mut fresh = spec();
    shuffle(&mut fresh, ShuffleSource::Entropy);
    assert_ne!(first, fresh);
}
