//! # Forward-Chaining Engine
//!
//! The [`InferenceEngine`] evaluates every rule of the catalog against the
//! current [`SessionState`] in a single pass and accumulates a combined
//! certainty factor per pest.
//!
//! ## Algorithm
//!
//! ```text
//! diagnoses = {}
//! for rule in catalog (in order):
//!     if any required symptom is not present: skip          (no partial credit)
//!     symptom_cf = mean(cf of required symptoms)           (equal weights)
//!     fired_cf   = symptom_cf × rule.confidence
//!     diagnoses[pest] = combine(diagnoses[pest], fired_cf)  or insert fired_cf
//!     trace.push((rule.id, pest, fired_cf))
//! rank diagnoses: CF descending, ties by first firing rule
//! ```
//!
//! ## Worked Example
//!
//! ```text
//! hopper_burn 0.9, yellowing_drying 0.9, circular_patches 0.9, plant_base_insects 0.9
//!
//! R1 fires: mean 0.9 × 0.95 = 0.855            → BPH = 0.855
//! R3 fires: mean 0.9 × 0.85 = 0.765            → BPH = 0.855 + 0.765 × (1 − 0.855)
//!                                                    = 0.965925
//! ```
//!
//! ## Guarantees
//!
//! - The result is recomputed from scratch on every call; nothing is cached,
//!   so nothing stale can survive a session reset.
//! - Contributions are folded strictly in catalog order.
//! - A pest whose rules never fire is absent from the result (not `0.0`).
//! - The engine is stateless and never mutates the session: sharing one
//!   knowledge base across threads is safe.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::certainty::combine;
use crate::core::{Rule, SessionState};

/// One entry of the fired-rule trace.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FiredRule {
    pub rule_id: String,
    pub pest_name: String,
    /// Contribution of this rule alone: `mean(symptom CFs) × rule CF`.
    pub confidence: f64,
}

/// Combined belief in one pest.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnosis {
    pub pest_name: String,
    pub confidence: f64,
}

/// Result of one forward-chaining run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InferenceOutcome {
    /// Rules that fired, in catalog order.
    pub fired_rules: Vec<FiredRule>,
    /// Diagnoses ranked by descending confidence.
    pub diagnoses: Vec<Diagnosis>,
}

impl InferenceOutcome {
    /// `true` when no pest could be identified.
    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty()
    }

    /// Highest ranked diagnosis, if any.
    pub fn top(&self) -> Option<&Diagnosis> {
        self.diagnoses.first()
    }

    /// Combined confidence for `pest_name`, if it was diagnosed.
    pub fn confidence_for(&self, pest_name: &str) -> Option<f64> {
        self.diagnoses
            .iter()
            .find(|d| d.pest_name == pest_name)
            .map(|d| d.confidence)
    }
}

/// Stateless forward-chaining engine.
pub struct InferenceEngine;

impl InferenceEngine {
    /// Runs the rule catalog against the session.
    ///
    /// See the module docs for the algorithm. Complexity is
    /// O(rules × required symptoms), with no I/O and no allocation beyond
    /// the result itself.
    pub fn forward_chain(rules: &[Rule], session: &SessionState) -> InferenceOutcome {
        let mut fired_rules = Vec::new();
        // Insertion order = catalog order of the first rule that fired per pest.
        let mut diagnoses: Vec<Diagnosis> = Vec::new();
        let mut by_pest: HashMap<&str, usize> = HashMap::new();

        for rule in rules {
            let Some(symptom_cf) = Self::rule_symptom_confidence(rule, session) else {
                continue;
            };
            let fired_cf = symptom_cf * rule.confidence;

            match by_pest.get(rule.pest_name.as_str()) {
                Some(&i) => {
                    let entry = &mut diagnoses[i];
                    entry.confidence = combine(entry.confidence, fired_cf);
                }
                None => {
                    by_pest.insert(rule.pest_name.as_str(), diagnoses.len());
                    diagnoses.push(Diagnosis {
                        pest_name: rule.pest_name.clone(),
                        confidence: fired_cf,
                    });
                }
            }

            tracing::debug!(
                rule = %rule.id,
                pest = %rule.pest_name,
                symptom_cf,
                fired_cf,
                "rule fired"
            );
            fired_rules.push(FiredRule {
                rule_id: rule.id.clone(),
                pest_name: rule.pest_name.clone(),
                confidence: fired_cf,
            });
        }

        // Stable sort: equal confidences keep first-firing order.
        diagnoses.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        InferenceOutcome {
            fired_rules,
            diagnoses,
        }
    }

    /// Mean confidence of the rule's required symptoms.
    ///
    /// `None` when any required symptom is absent, unknown or missing from
    /// the session, and for a rule with no requirements at all.
    pub fn rule_symptom_confidence(rule: &Rule, session: &SessionState) -> Option<f64> {
        if rule.required_symptoms.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for name in &rule.required_symptoms {
            let observation = session.observation(name).filter(|o| o.is_present())?;
            sum += observation.confidence;
        }
        Some(sum / rule.required_symptoms.len() as f64)
    }
}
