//! # Consultation: One Diagnostic Session
//!
//! A [`Consultation`] is the public face of the expert system. It owns one
//! [`SessionState`], shares the read-only [`KnowledgeBase`] through an `Arc`,
//! and exposes the four core operations:
//!
//! | Operation | Result |
//! |-----------|--------|
//! | [`assert_symptom`](Consultation::assert_symptom) | `Err(UnknownSymptom)` for names outside the catalog |
//! | [`reset`](Consultation::reset) | observations and last outcome cleared |
//! | [`run_inference`](Consultation::run_inference) | fired-rule trace + ranked diagnoses |
//! | [`recommendations_for`](Consultation::recommendations_for) | IPM plan grouped by category |
//!
//! ## Lifecycle
//!
//! ```text
//! Consultation::new(kb)
//!   ├── assert_symptom(...) × n
//!   ├── run_inference()          → InferenceOutcome (also kept as last_outcome)
//!   ├── report()                 → ConsultationReport (pest cards + plans)
//!   └── reset()                  → ready for the next field
//! ```
//!
//! Several consultations may run at the same time on different threads as
//! long as each owns its own `Consultation`; nothing here is locked.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{ExpertResult, KnowledgeBase, Pest, Presence, SessionState};
use crate::inference::{FiredRule, InferenceEngine, InferenceOutcome};
use crate::observation::ParsedObservation;
use crate::recommendations::{self, RecommendationPlan};

/// One consultation over a shared knowledge base.
pub struct Consultation {
    id: Uuid,
    started_at: DateTime<Utc>,
    kb: Arc<KnowledgeBase>,
    session: SessionState,
    last_outcome: Option<InferenceOutcome>,
}

impl Consultation {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        let session = SessionState::new(&kb);
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            kb,
            session,
            last_outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Records an observation. Confidence is clamped into `[0, 1]`.
    pub fn assert_symptom(&mut self, name: &str, present: bool, confidence: f64) -> ExpertResult<()> {
        self.session.set_symptom(name, present, confidence)
    }

    /// Records a three-valued observation (`yes | no | unknown`).
    pub fn assert_presence(
        &mut self,
        name: &str,
        presence: Presence,
        confidence: f64,
    ) -> ExpertResult<()> {
        self.session.set_presence(name, presence, confidence)
    }

    /// Asserts every parsed token as present.
    ///
    /// Stops at the first unknown symptom; tokens before it stay asserted.
    pub fn observe_all(&mut self, observations: &[ParsedObservation]) -> ExpertResult<()> {
        for obs in observations {
            let name = obs.symptom_name(&self.kb)?;
            self.session.set_symptom(&name, true, obs.confidence)?;
        }
        Ok(())
    }

    /// Clears every observation and the last outcome.
    pub fn reset(&mut self) {
        self.session.reset();
        self.last_outcome = None;
        tracing::debug!(consultation = %self.id, "consultation reset");
    }

    /// Runs forward chaining over the current observations.
    pub fn run_inference(&mut self) -> &InferenceOutcome {
        let outcome = InferenceEngine::forward_chain(self.kb.rules(), &self.session);
        tracing::info!(
            consultation = %self.id,
            observed = self.session.present_symptoms().len(),
            fired = outcome.fired_rules.len(),
            diagnosed = outcome.diagnoses.len(),
            top = outcome.top().map(|d| d.pest_name.as_str()).unwrap_or("none"),
            "inference complete"
        );
        self.last_outcome.insert(outcome)
    }

    /// Outcome of the most recent run, cleared by [`reset`](Self::reset).
    pub fn last_outcome(&self) -> Option<&InferenceOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn recommendations_for(&self, pest_name: &str) -> RecommendationPlan {
        recommendations::recommendations_for(&self.kb, pest_name)
    }

    /// Runs inference and joins every diagnosis with its pest record and plan.
    pub fn report(&mut self) -> ConsultationReport {
        let outcome = self.run_inference().clone();
        let findings = outcome
            .diagnoses
            .iter()
            .map(|d| Finding {
                pest_name: d.pest_name.clone(),
                confidence: d.confidence,
                pest: self.kb.pest(&d.pest_name).cloned(),
                recommendations: self.recommendations_for(&d.pest_name),
            })
            .collect();

        ConsultationReport {
            consultation_id: self.id,
            started_at: self.started_at,
            generated_at: Utc::now(),
            observed_symptoms: self
                .session
                .present_symptoms()
                .into_iter()
                .map(str::to_string)
                .collect(),
            fired_rules: outcome.fired_rules,
            findings,
        }
    }
}

/// One diagnosed pest with everything a report shows about it.
#[derive(Clone, Debug, Serialize)]
pub struct Finding {
    pub pest_name: String,
    pub confidence: f64,
    /// `None` only if a custom knowledge base lacks the pest record.
    pub pest: Option<Pest>,
    pub recommendations: RecommendationPlan,
}

/// Full result of a consultation, ready to render or serialize.
#[derive(Clone, Debug, Serialize)]
pub struct ConsultationReport {
    pub consultation_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub observed_symptoms: Vec<String>,
    pub fired_rules: Vec<FiredRule>,
    /// Ranked by descending confidence.
    pub findings: Vec<Finding>,
}

impl ConsultationReport {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{BROWN_PLANTHOPPER, YELLOW_STEM_BORER};
    use crate::core::ExpertError;
    use crate::observation::ObservationParser;

    fn consultation() -> Consultation {
        Consultation::new(Arc::new(KnowledgeBase::malaysian_rice()))
    }

    #[test]
    fn core_api_round() {
        let mut c = consultation();
        for s in ["hopper_burn", "yellowing_drying", "circular_patches"] {
            c.assert_symptom(s, true, 0.9).unwrap();
        }
        let outcome = c.run_inference();
        assert_eq!(outcome.top().unwrap().pest_name, BROWN_PLANTHOPPER);
        assert!(c.last_outcome().is_some());

        let plan = c.recommendations_for(BROWN_PLANTHOPPER);
        assert_eq!(plan.categories_covered(), 4);
    }

    #[test]
    fn unknown_symptom_surfaces_error() {
        let mut c = consultation();
        let err = c.assert_symptom("blue_leaves", true, 0.5).unwrap_err();
        assert!(matches!(err, ExpertError::UnknownSymptom(_)));
        assert!(c.run_inference().is_empty());
    }

    #[test]
    fn reset_between_consultations() {
        let mut c = consultation();
        c.assert_symptom("white_head", true, 0.9).unwrap();
        c.assert_symptom("empty_panicles", true, 0.9).unwrap();
        assert!(!c.run_inference().is_empty());

        c.reset();
        assert!(c.last_outcome().is_none());
        assert!(c.run_inference().is_empty());
    }

    #[test]
    fn report_joins_pest_and_plan() {
        let mut c = consultation();
        let parser = ObservationParser::new(0.8);
        let obs = parser.parse_list("dead_heart=0.9,stem-bore-holes=90%").unwrap();
        c.observe_all(&obs).unwrap();

        let report = c.report();
        assert_eq!(report.fired_rules.len(), 1);
        assert_eq!(report.fired_rules[0].rule_id, "R7");
        let finding = &report.findings[0];
        assert_eq!(finding.pest_name, YELLOW_STEM_BORER);
        assert_eq!(
            finding.pest.as_ref().map(|p| p.scientific_name.as_str()),
            Some("Scirpophaga incertulas")
        );
        assert_eq!(finding.recommendations.total(), 6);
        assert_eq!(report.observed_symptoms, vec!["dead_heart", "stem_bore_holes"]);
    }

    #[test]
    fn independent_consultations_share_one_base() {
        let kb = Arc::new(KnowledgeBase::malaysian_rice());
        let handles: Vec<_> = ["foul_smell", "silver_shoot"]
            .into_iter()
            .map(|first| {
                let kb = Arc::clone(&kb);
                std::thread::spawn(move || {
                    let mut c = Consultation::new(kb);
                    c.assert_symptom(first, true, 0.9).unwrap();
                    c.run_inference().diagnoses.len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 0);
        }
    }
}
