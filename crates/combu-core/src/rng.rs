//! RNG wrapper and the process-wide default randomness source.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// RNG handle exposed to combu consumers.
///
/// The handle is a thin wrapper around `StdRng`. A handle built with
/// [`RngHandle::from_seed`] replays the same sequence on every platform, so
/// shuffles driven by it are reproducible across runs. [`RngHandle::from_entropy`]
/// draws its seed from the operating system instead.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a new RNG handle seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Returns a mutable reference to the underlying RNG for advanced usage.
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

fn process_slot() -> &'static Mutex<RngHandle> {
    static PROCESS_RNG: OnceLock<Mutex<RngHandle>> = OnceLock::new();
    PROCESS_RNG.get_or_init(|| Mutex::new(RngHandle::from_entropy()))
}

/// Locks the process-wide default RNG.
///
/// The source starts from entropy. Callers wanting reproducible results
/// without threading a handle around may reseed it with [`seed_process_rng`];
/// passing an explicit [`RngHandle`] is always preferred.
pub fn process_rng() -> MutexGuard<'static, RngHandle> {
    process_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Reseeds the process-wide default RNG.
pub fn seed_process_rng(seed: u64) {
    *process_rng() = RngHandle::from_seed(seed);
}
