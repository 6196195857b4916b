//! # Rule: Symptom Combination → Pest
//!
//! A [`Rule`] says "if **all** of these symptoms are present, suspect this
//! pest with this prior confidence". There is no partial credit: one missing
//! (or merely unknown) symptom blocks the rule entirely.
//!
//! ```text
//! R1: hopper_burn ∧ yellowing_drying ∧ circular_patches  ⇒  Brown Planthopper  (0.95)
//! R3: hopper_burn ∧ plant_base_insects                   ⇒  Brown Planthopper  (0.85)
//! ```
//!
//! Several rules may conclude the same pest; the engine merges them with the
//! certainty factor combination law (see [`crate::inference::certainty`]).

use serde::{Deserialize, Serialize};

/// Immutable inference rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier (`R1`, `R2`, ...).
    pub id: String,
    /// Pest concluded when the rule fires.
    pub pest_name: String,
    /// Required symptom names. Order does not affect the result.
    pub required_symptoms: Vec<String>,
    /// Author's prior trust in this combination, in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl Rule {
    pub fn new(id: &str, pest_name: &str, required_symptoms: &[&str], confidence: f64) -> Self {
        Self {
            id: id.to_string(),
            pest_name: pest_name.to_string(),
            required_symptoms: required_symptoms.iter().map(|s| s.to_string()).collect(),
            confidence,
        }
    }

    /// `true` when the rule mentions the symptom.
    pub fn requires(&self, symptom: &str) -> bool {
        self.required_symptoms.iter().any(|s| s == symptom)
    }
}
