//! # SessionState: What the Farmer Saw
//!
//! The only mutable entity of the system. A [`SessionState`] records, for each
//! symptom of a [`KnowledgeBase`], whether it was observed and how confident
//! the observer is. One state belongs to one consultation; independent
//! consultations own independent states and share only the read-only
//! knowledge base.
//!
//! ## Contract
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | [`set_symptom`](SessionState::set_symptom) | unknown name → `UnknownSymptom`, state untouched; otherwise clamp CF to `[0, 1]`, last write wins |
//! | [`set_presence`](SessionState::set_presence) | same, with a three-valued [`Presence`] |
//! | [`reset`](SessionState::reset) | every symptom back to `Unknown` / `0.0` |
//!
//! The engine never resets a session on its own: call `reset` between
//! consultations.

use std::collections::HashMap;

use serde::Serialize;

use super::error::{ExpertError, ExpertResult};
use super::knowledge_base::KnowledgeBase;
use super::symptom::{canonical_name, Observation, Presence};

/// Per-consultation observations, keyed by canonical symptom name.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionState {
    observations: HashMap<String, Observation>,
}

impl SessionState {
    /// Creates a state with one default observation per catalog symptom.
    pub fn new(kb: &KnowledgeBase) -> Self {
        let observations = kb
            .symptoms()
            .iter()
            .map(|s| (s.name.clone(), Observation::default()))
            .collect();
        Self { observations }
    }

    /// Records a boolean observation for `name`.
    ///
    /// `confidence` is clamped into `[0.0, 1.0]`; `NaN` is read as `0.0`.
    pub fn set_symptom(&mut self, name: &str, present: bool, confidence: f64) -> ExpertResult<()> {
        self.set_presence(name, Presence::from(present), confidence)
    }

    /// Records a three-valued observation for `name`.
    pub fn set_presence(
        &mut self,
        name: &str,
        presence: Presence,
        confidence: f64,
    ) -> ExpertResult<()> {
        let key = canonical_name(name);
        let Some(slot) = self.observations.get_mut(&key) else {
            tracing::warn!(symptom = %name, "rejected observation for unknown symptom");
            return Err(ExpertError::UnknownSymptom(name.to_string()));
        };
        let confidence = clamp_unit(confidence);
        if confidence != slot.confidence || presence != slot.presence {
            tracing::debug!(symptom = %key, presence = %presence, confidence, "observation recorded");
        }
        *slot = Observation {
            presence,
            confidence,
        };
        Ok(())
    }

    /// Current observation for `name`, if the symptom exists.
    pub fn observation(&self, name: &str) -> Option<&Observation> {
        self.observations.get(&canonical_name(name))
    }

    /// `true` when `name` exists and is marked present.
    pub fn is_present(&self, name: &str) -> bool {
        self.observation(name).is_some_and(Observation::is_present)
    }

    /// Names of the symptoms currently marked present (sorted).
    pub fn present_symptoms(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .observations
            .iter()
            .filter(|(_, o)| o.is_present())
            .map(|(n, _)| n.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Back to "nothing observed". Symptom slots are kept, only zeroed.
    pub fn reset(&mut self) {
        for o in self.observations.values_mut() {
            *o = Observation::default();
        }
    }
}

/// Clamps a confidence into `[0.0, 1.0]`, mapping `NaN` to `0.0`.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::new(&KnowledgeBase::malaysian_rice())
    }

    #[test]
    fn unknown_symptom_is_rejected_without_mutation() {
        let mut s = state();
        let before = s.present_symptoms().len();
        let err = s.set_symptom("purple_rain", true, 0.9).unwrap_err();
        assert_eq!(err, ExpertError::UnknownSymptom("purple_rain".to_string()));
        assert_eq!(s.present_symptoms().len(), before);
    }

    #[test]
    fn confidence_is_clamped() {
        let mut s = state();
        s.set_symptom("hopper_burn", true, 1.7).unwrap();
        assert_eq!(s.observation("hopper_burn").unwrap().confidence, 1.0);
        s.set_symptom("hopper_burn", true, -0.3).unwrap();
        assert_eq!(s.observation("hopper_burn").unwrap().confidence, 0.0);
        s.set_symptom("hopper_burn", true, f64::NAN).unwrap();
        assert_eq!(s.observation("hopper_burn").unwrap().confidence, 0.0);
    }

    #[test]
    fn last_write_wins() {
        let mut s = state();
        s.set_symptom("dead_heart", true, 0.4).unwrap();
        s.set_symptom("dead_heart", false, 0.9).unwrap();
        let o = s.observation("dead_heart").unwrap();
        assert_eq!(o.presence, Presence::No);
        assert_eq!(o.confidence, 0.9);
        assert!(!s.is_present("dead_heart"));
    }

    #[test]
    fn hyphenated_name_hits_the_same_slot() {
        let mut s = state();
        s.set_symptom("stem-bore-holes", true, 0.6).unwrap();
        assert!(s.is_present("stem_bore_holes"));
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut s = state();
        s.set_symptom("foul_smell", true, 0.9).unwrap();
        s.set_presence("empty_grains", Presence::Unknown, 0.5).unwrap();
        s.reset();
        assert!(s.present_symptoms().is_empty());
        assert_eq!(s.observation("foul_smell"), Some(&Observation::default()));
        assert_eq!(s.observation("empty_grains").unwrap().confidence, 0.0);
    }
}
