//! Core of the oncopanel prediction aggregator.
//!
//! Given a set of selected drugs and a patient biomarker snapshot, this crate
//! invokes several independent, slow, and individually unreliable prediction
//! subsystems concurrently and assembles one aggregate report in which the
//! failure of any single subsystem does not prevent the others from being
//! reported.
//!
//! The prediction subsystems themselves are external collaborators: the core
//! depends only on the [`orchestrator::PredictionSubsystem`] call signature
//! and settlement contract, never on their internals.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prediction;
pub mod snapshot;
