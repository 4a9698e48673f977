//! Prediction subsystem backends.
//!
//! Two providers implement the core call contract: a deterministic
//! in-process synthetic backend (the default, useful offline and in tests)
//! and a remote HTTP backend speaking the prediction-service API. The
//! factory assembles the full task set from configuration.

pub mod factory;
pub mod remote;
pub mod synthetic;
