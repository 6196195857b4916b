//! # Symptom: An Observable Field Sign
//!
//! A [`Symptom`] is a catalog entry: something a farmer can see in the paddy
//! ("plants appear burnt in circular patches", "white empty panicles").
//! The catalog entry is immutable; what changes during a consultation is the
//! [`Observation`] the session keeps for it.
//!
//! ## Catalog vs. Observation
//!
//! | Type | Owner | Mutable? | Fields |
//! |------|-------|----------|--------|
//! | [`Symptom`] | [`KnowledgeBase`](super::KnowledgeBase) | no | name, description, pest hint |
//! | [`Observation`] | [`SessionState`](super::SessionState) | yes | presence, confidence |
//!
//! ## Presence
//!
//! [`Presence`] mirrors the three-valued slot used by rule-engine backends
//! (`yes | no | unknown`). Only [`Presence::Yes`] lets a rule fire; `Unknown`
//! blocks a rule exactly like `No` does.
//!
//! ## Names
//!
//! Canonical names use underscores (`hopper_burn`). Rule-engine fact files
//! spell the same symbol with hyphens (`hopper-burn`); [`canonical_name`]
//! folds both spellings onto one key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog entry for an observable symptom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    /// Stable symbolic name, unique in the knowledge base.
    pub name: String,
    /// Human-readable description shown in checklists.
    pub description: String,
    /// Pest this symptom is usually associated with.
    ///
    /// Informational only: used to group the checklist, never by inference.
    pub pest_hint: String,
}

impl Symptom {
    pub fn new(name: &str, description: &str, pest_hint: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            pest_hint: pest_hint.to_string(),
        }
    }

    /// Hyphenated spelling used by rule-engine fact files.
    pub fn symbol(&self) -> String {
        self.name.replace('_', "-")
    }
}

/// Three-valued presence of a symptom in the current field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Observed in the field.
    Yes,
    /// Checked and not observed.
    No,
    /// Not checked. The default for every symptom.
    #[default]
    Unknown,
}

impl Presence {
    /// Only an explicit `yes` counts towards a rule.
    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Yes)
    }

    /// Symbol used in fact s-expressions.
    pub fn symbol(&self) -> &'static str {
        match self {
            Presence::Yes => "yes",
            Presence::No => "no",
            Presence::Unknown => "unknown",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "yes" => Some(Presence::Yes),
            "no" => Some(Presence::No),
            "unknown" => Some(Presence::Unknown),
            _ => None,
        }
    }
}

impl From<bool> for Presence {
    fn from(present: bool) -> Self {
        if present {
            Presence::Yes
        } else {
            Presence::No
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What the session currently believes about one symptom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub presence: Presence,
    /// Always inside `[0.0, 1.0]`; the session clamps on write.
    pub confidence: f64,
}

impl Observation {
    pub fn is_present(&self) -> bool {
        self.presence.is_present()
    }
}

/// Folds the hyphenated spelling onto the canonical underscore name.
///
/// Also trims and lowercases, so `" Hopper-Burn "` becomes `"hopper_burn"`.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_accepts_both_spellings() {
        assert_eq!(canonical_name("hopper-burn"), "hopper_burn");
        assert_eq!(canonical_name("hopper_burn"), "hopper_burn");
        assert_eq!(canonical_name("  Dead-Heart "), "dead_heart");
    }

    #[test]
    fn only_yes_is_present() {
        assert!(Presence::Yes.is_present());
        assert!(!Presence::No.is_present());
        assert!(!Presence::Unknown.is_present());
        assert_eq!(Presence::default(), Presence::Unknown);
    }

    #[test]
    fn presence_symbols_round_trip() {
        for p in [Presence::Yes, Presence::No, Presence::Unknown] {
            assert_eq!(Presence::from_symbol(p.symbol()), Some(p));
        }
        assert_eq!(Presence::from_symbol("maybe"), None);
    }

    #[test]
    fn symbol_uses_hyphens() {
        let s = Symptom::new("plant_base_insects", "Insects at the base", "Brown Planthopper");
        assert_eq!(s.symbol(), "plant-base-insects");
    }
}
