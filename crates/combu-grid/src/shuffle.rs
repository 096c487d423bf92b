use combu_core::rng::{process_rng, RngHandle};
use combu_core::ParamSpec;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Randomness source used by [`shuffle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuffleSource {
    /// The process-wide default RNG, reseedable with `seed_process_rng`.
    #[default]
    Process,
    /// A private RNG seeded by the caller; reproducible across runs.
    Seeded(u64),
    /// A private RNG seeded from entropy, independent of the process RNG.
    Entropy,
}

/// Shuffles every candidate list of `spec` in place.
///
/// Only top-level lists are reordered; nested pack specifications keep their
/// own order. The set of combinations is unchanged.
pub fn shuffle(spec: &mut ParamSpec, source: ShuffleSource) {
    match source {
        ShuffleSource::Process => shuffle_with(spec, &mut *process_rng()),
        ShuffleSource::Seeded(seed) => shuffle_with(spec, &mut RngHandle::from_seed(seed)),
        ShuffleSource::Entropy => shuffle_with(spec, &mut RngHandle::from_entropy()),
    }
}

/// Shuffles every candidate list of `spec` in place with an explicit RNG.
pub fn shuffle_with<R: Rng + ?Sized>(spec: &mut ParamSpec, rng: &mut R) {
    for candidates in spec.candidates_mut() {
        candidates.shuffle(rng);
    }
}
