//! # Inference Module: Forward Chaining with Certainty Factors
//!
//! The only part of the system with a non-trivial algorithm.
//!
//! | Sub-module | Responsibility |
//! |------------|----------------|
//! | [`certainty`] | pure CF combination law (`combine`) |
//! | [`engine`] | rule evaluation loop, per-pest folding, ranking |
//!
//! ## Example
//!
//! ```text
//! Session: hopper_burn 0.9, yellowing_drying 0.9, circular_patches 0.9
//! R1 fires → Brown Planthopper 0.855
//! ```
//!
//! See [`InferenceEngine`] for details.

pub mod certainty;
pub mod engine;

pub use certainty::combine;
pub use engine::{Diagnosis, FiredRule, InferenceEngine, InferenceOutcome};
