#![deny(missing_docs)]
#![doc = "Parameter data model, structured errors and randomness handles shared by the combu crates."]

pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
pub mod params;
pub mod record;
pub mod rng;
/// Canonical JSON and YAML serde helpers.
pub mod serde;

pub use errors::{CombuError, ErrorInfo};
pub use hash::stable_hash_string;
pub use params::{Arg, Candidate, Key, Pack, ParamSpec};
pub use record::Record;
pub use rng::{process_rng, seed_process_rng, RngHandle};
pub use serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
