//! Deterministic in-process prediction engines.
//!
//! These are the default backend: no network, no model weights, but stable
//! output for a given snapshot. Scores are derived by hashing snapshot
//! fields into the unit interval, so the same patient and drug selection
//! always produces the same report while different inputs fan out across
//! the score range.

mod adverse_events;
mod discovery;
mod monitoring;
mod response;
mod rwe;

pub use adverse_events::SyntheticAdverseEventModel;
pub use discovery::SyntheticDiscoveryModel;
pub use monitoring::SyntheticMonitoringModel;
pub use response::SyntheticResponseModel;
pub use rwe::SyntheticRweModel;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash a seed string into [0, 1). Deterministic for a given seed within a
/// build, which keeps synthetic reports reproducible for equal inputs. The
/// exact values may shift across Rust releases; nothing persists them.
pub(crate) fn unit_score(seed: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    (hasher.finish() % 10_000) as f64 / 10_000.0
}

/// Pick one of `choices` by seed hash.
pub(crate) fn pick<'a>(seed: &str, choices: &[&'a str]) -> &'a str {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    choices[(hasher.finish() % choices.len() as u64) as usize]
}
