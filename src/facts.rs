//! # Fact Protocol: Talking to Rule-Engine Backends
//!
//! A production-rule engine (CLIPS-style) sees the world as a list of
//! **facts**, each an s-expression with a template name and named slots.
//! This module defines the three templates the expert system exchanges and an
//! [`InferenceBackend`] trait that any engine speaking them can implement.
//!
//! ## Templates
//!
//! ```text
//! (symptom (name hopper-burn) (present yes) (cf 0.9))                            ← asserted
//! (pest (name "Brown Planthopper") (scientific-name "Nilaparvata lugens")
//!       (cf 0.855) (identified yes))                                             ← derived
//! (control-recommendation (pest-name "Brown Planthopper") (control-type chemical)
//!       (recommendation "Apply Imidacloprid ...") (priority 1))                  ← derived
//! ```
//!
//! | Template | Slot | Type | Default |
//! |----------|------|------|---------|
//! | `symptom` | `name` | symbol | required |
//! | | `present` | `yes \| no \| unknown` | `unknown` |
//! | | `cf` | float | `0.0` |
//! | `pest` | `name`, `scientific-name` | string | required, `""` |
//! | | `cf` | float | `0.0` |
//! | | `identified` | `yes \| no` | `no` |
//! | `control-recommendation` | `pest-name`, `recommendation` | string | required |
//! | | `control-type` | category symbol | required |
//! | | `priority` | integer | required |
//!
//! Symptom names are rendered with hyphens, the spelling rule files use.
//!
//! ## Backends
//!
//! [`NativeBackend`] implements the protocol on top of the in-process
//! [`InferenceEngine`](crate::inference::InferenceEngine): it accepts symptom
//! facts, runs forward chaining, and publishes `pest` and
//! `control-recommendation` facts, so code written against the protocol gets
//! the same answers as code using [`Consultation`] directly.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::consultation::Consultation;
use crate::core::{ControlCategory, ExpertError, ExpertResult, KnowledgeBase, Presence};
use crate::recommendations::{RecommendationItem, RecommendationPlan};

/// Template discriminant, for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FactKind {
    Symptom,
    Pest,
    ControlRecommendation,
}

impl FactKind {
    pub fn template(&self) -> &'static str {
        match self {
            FactKind::Symptom => "symptom",
            FactKind::Pest => "pest",
            FactKind::ControlRecommendation => "control-recommendation",
        }
    }
}

/// One fact, tagged by template.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "template", rename_all = "kebab-case")]
pub enum Fact {
    Symptom {
        name: String,
        present: Presence,
        cf: f64,
    },
    Pest {
        name: String,
        scientific_name: String,
        cf: f64,
        identified: bool,
    },
    ControlRecommendation {
        pest_name: String,
        control_type: ControlCategory,
        recommendation: String,
        priority: u32,
    },
}

impl Fact {
    pub fn kind(&self) -> FactKind {
        match self {
            Fact::Symptom { .. } => FactKind::Symptom,
            Fact::Pest { .. } => FactKind::Pest,
            Fact::ControlRecommendation { .. } => FactKind::ControlRecommendation,
        }
    }

    pub fn symptom(name: &str, present: Presence, cf: f64) -> Self {
        Fact::Symptom {
            name: name.to_string(),
            present,
            cf,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Symptom { name, present, cf } => write!(
                f,
                "(symptom (name {}) (present {}) (cf {}))",
                name.replace('_', "-"),
                present,
                cf
            ),
            Fact::Pest {
                name,
                scientific_name,
                cf,
                identified,
            } => write!(
                f,
                "(pest (name {}) (scientific-name {}) (cf {}) (identified {}))",
                quote(name),
                quote(scientific_name),
                cf,
                if *identified { "yes" } else { "no" }
            ),
            Fact::ControlRecommendation {
                pest_name,
                control_type,
                recommendation,
                priority,
            } => write!(
                f,
                "(control-recommendation (pest-name {}) (control-type {}) (recommendation {}) (priority {}))",
                quote(pest_name),
                control_type,
                quote(recommendation),
                priority
            ),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn unquote(s: &str) -> String {
    match s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => s.to_string(),
    }
}

/// Compiled regexes for the s-expression reader.
struct FactReader {
    outer_re: Regex,
    slot_re: Regex,
}

impl FactReader {
    fn new() -> Self {
        Self {
            outer_re: Regex::new(r"^\s*\(\s*(?P<template>[a-z][a-z\-]*)(?P<body>.*)\)\s*$")
                .expect("fact regex is valid"),
            slot_re: Regex::new(r#"\(\s*(?P<slot>[a-z][a-z\-]*)\s+(?P<value>"(?:[^"\\]|\\.)*"|[^()\s]+)\s*\)"#)
                .expect("slot regex is valid"),
        }
    }

    /// The process-wide reader, compiled on first use.
    fn shared() -> &'static FactReader {
        static READER: OnceLock<FactReader> = OnceLock::new();
        READER.get_or_init(FactReader::new)
    }

    fn read(&self, input: &str) -> ExpertResult<Fact> {
        let err = |reason: String| ExpertError::FactParse {
            input: input.to_string(),
            reason,
        };

        let caps = self
            .outer_re
            .captures(input)
            .ok_or_else(|| err("not an s-expression".to_string()))?;
        let slots: HashMap<&str, String> = self
            .slot_re
            .captures_iter(&caps["body"])
            .filter_map(|c| {
                let slot = c.name("slot")?.as_str();
                let value = c.name("value")?.as_str();
                Some((slot, unquote(value)))
            })
            .collect();

        let required = |slot: &str| {
            slots
                .get(slot)
                .cloned()
                .ok_or_else(|| err(format!("missing slot `{slot}`")))
        };
        let float = |slot: &str| -> ExpertResult<f64> {
            match slots.get(slot) {
                None => Ok(0.0),
                Some(v) => v.parse().map_err(|_| err(format!("slot `{slot}` is not a number"))),
            }
        };

        match &caps["template"] {
            "symptom" => {
                let present = match slots.get("present") {
                    None => Presence::Unknown,
                    Some(v) => Presence::from_symbol(v)
                        .ok_or_else(|| err(format!("bad presence `{v}`")))?,
                };
                Ok(Fact::Symptom {
                    name: required("name")?,
                    present,
                    cf: float("cf")?,
                })
            }
            "pest" => {
                let identified = match slots.get("identified").map(String::as_str) {
                    None | Some("no") => false,
                    Some("yes") => true,
                    Some(v) => return Err(err(format!("bad identified flag `{v}`"))),
                };
                Ok(Fact::Pest {
                    name: required("name")?,
                    scientific_name: slots.get("scientific-name").cloned().unwrap_or_default(),
                    cf: float("cf")?,
                    identified,
                })
            }
            "control-recommendation" => {
                let raw_type = required("control-type")?;
                let control_type = ControlCategory::from_symbol(&raw_type)
                    .ok_or_else(|| err(format!("bad control type `{raw_type}`")))?;
                let priority = required("priority")?
                    .parse()
                    .map_err(|_| err("slot `priority` is not an integer".to_string()))?;
                Ok(Fact::ControlRecommendation {
                    pest_name: required("pest-name")?,
                    control_type,
                    recommendation: required("recommendation")?,
                    priority,
                })
            }
            other => Err(err(format!("unknown template `{other}`"))),
        }
    }
}

impl FromStr for Fact {
    type Err = ExpertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactReader::shared().read(s)
    }
}

/// The assert / run / query protocol of a rule-engine backend.
pub trait InferenceBackend {
    /// Drops every fact, returning to the initial state.
    fn reset(&mut self);

    /// Adds a fact to working memory.
    fn assert_fact(&mut self, fact: Fact) -> ExpertResult<()>;

    /// Runs the engine to quiescence. Returns the number of derived facts.
    fn run(&mut self) -> ExpertResult<usize>;

    /// Working memory, asserted facts first.
    fn facts(&self) -> &[Fact];

    /// Facts of one template, in working-memory order.
    fn facts_of(&self, kind: FactKind) -> Vec<&Fact> {
        self.facts().iter().filter(|f| f.kind() == kind).collect()
    }

    /// `pest` facts with `identified yes`, highest `cf` first.
    fn identified_pests(&self) -> Vec<&Fact> {
        let mut pests: Vec<&Fact> = self
            .facts()
            .iter()
            .filter(|f| matches!(f, Fact::Pest { identified: true, .. }))
            .collect();
        pests.sort_by(|a, b| fact_cf(b).total_cmp(&fact_cf(a)));
        pests
    }

    /// `control-recommendation` facts for one pest, grouped and sorted.
    fn control_recommendations(&self, pest_name: &str) -> RecommendationPlan {
        let mut plan = RecommendationPlan::default();
        for fact in self.facts() {
            if let Fact::ControlRecommendation {
                pest_name: p,
                control_type,
                recommendation,
                priority,
            } = fact
            {
                if p != pest_name {
                    continue;
                }
                let item = RecommendationItem {
                    recommendation: recommendation.clone(),
                    priority: *priority,
                };
                match control_type {
                    ControlCategory::Cultural => plan.cultural.push(item),
                    ControlCategory::Mechanical => plan.mechanical.push(item),
                    ControlCategory::Biological => plan.biological.push(item),
                    ControlCategory::Chemical => plan.chemical.push(item),
                }
            }
        }
        plan.cultural.sort_by_key(|i| i.priority);
        plan.mechanical.sort_by_key(|i| i.priority);
        plan.biological.sort_by_key(|i| i.priority);
        plan.chemical.sort_by_key(|i| i.priority);
        plan
    }
}

fn fact_cf(fact: &Fact) -> f64 {
    match fact {
        Fact::Symptom { cf, .. } | Fact::Pest { cf, .. } => *cf,
        Fact::ControlRecommendation { .. } => 0.0,
    }
}

/// In-process backend built on [`Consultation`].
pub struct NativeBackend {
    consultation: Consultation,
    /// Asserted symptom facts, one per symptom (last assertion wins).
    asserted: Vec<Fact>,
    /// `asserted` followed by the facts derived by the last run.
    memory: Vec<Fact>,
}

impl NativeBackend {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            consultation: Consultation::new(kb),
            asserted: Vec::new(),
            memory: Vec::new(),
        }
    }
}

impl InferenceBackend for NativeBackend {
    fn reset(&mut self) {
        self.consultation.reset();
        self.asserted.clear();
        self.memory.clear();
    }

    fn assert_fact(&mut self, fact: Fact) -> ExpertResult<()> {
        let Fact::Symptom { name, present, cf } = &fact else {
            return Err(ExpertError::FactParse {
                input: fact.to_string(),
                reason: "only symptom facts can be asserted".to_string(),
            });
        };
        self.consultation.assert_presence(name, *present, *cf)?;

        let canonical = crate::core::symptom::canonical_name(name);
        self.asserted.retain(|f| match f {
            Fact::Symptom { name, .. } => crate::core::symptom::canonical_name(name) != canonical,
            _ => true,
        });
        self.asserted.push(fact);
        self.memory = self.asserted.clone();
        Ok(())
    }

    fn run(&mut self) -> ExpertResult<usize> {
        let outcome = self.consultation.run_inference().clone();
        let kb = self.consultation.knowledge_base();
        let mut derived = Vec::new();

        for d in &outcome.diagnoses {
            derived.push(Fact::Pest {
                name: d.pest_name.clone(),
                scientific_name: kb
                    .pest(&d.pest_name)
                    .map(|p| p.scientific_name.clone())
                    .unwrap_or_default(),
                cf: d.confidence,
                identified: true,
            });
        }
        for pest in kb.pests() {
            if outcome.confidence_for(&pest.name).is_none() {
                derived.push(Fact::Pest {
                    name: pest.name.clone(),
                    scientific_name: pest.scientific_name.clone(),
                    cf: 0.0,
                    identified: false,
                });
            }
        }
        for d in &outcome.diagnoses {
            let plan = self.consultation.recommendations_for(&d.pest_name);
            for (category, items) in plan.groups() {
                for item in items {
                    derived.push(Fact::ControlRecommendation {
                        pest_name: d.pest_name.clone(),
                        control_type: category,
                        recommendation: item.recommendation.clone(),
                        priority: item.priority,
                    });
                }
            }
        }

        let count = derived.len();
        self.memory = self.asserted.iter().cloned().chain(derived).collect();
        tracing::debug!(derived = count, "native backend run complete");
        Ok(count)
    }

    fn facts(&self) -> &[Fact] {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{BROWN_PLANTHOPPER, RICE_BUG};

    fn backend() -> NativeBackend {
        NativeBackend::new(Arc::new(KnowledgeBase::malaysian_rice()))
    }

    #[test]
    fn reader_is_shared_across_parses() {
        assert!(std::ptr::eq(FactReader::shared(), FactReader::shared()));
        for line in [
            "(symptom (name hopper-burn) (present yes) (cf 0.9))",
            "(symptom (name white-head))",
            "(pest (name \"Rice Bug\") (cf 0.5) (identified yes))",
        ] {
            assert!(line.parse::<Fact>().is_ok(), "{line}");
        }
        assert!("(weather (rain yes))".parse::<Fact>().is_err());
    }

    #[test]
    fn symptom_fact_renders_with_hyphens() {
        let f = Fact::symptom("hopper_burn", Presence::Yes, 0.9);
        assert_eq!(f.to_string(), "(symptom (name hopper-burn) (present yes) (cf 0.9))");
    }

    #[test]
    fn parses_symptom_with_defaults() {
        let f: Fact = "(symptom (name dead-heart))".parse().unwrap();
        assert_eq!(f, Fact::symptom("dead-heart", Presence::Unknown, 0.0));
    }

    #[test]
    fn parses_quoted_strings_and_escapes() {
        let f: Fact = r#"(control-recommendation (pest-name "Rice Bug") (control-type mechanical) (recommendation "Use \"sweep\" nets") (priority 2))"#
            .parse()
            .unwrap();
        assert_eq!(
            f,
            Fact::ControlRecommendation {
                pest_name: "Rice Bug".to_string(),
                control_type: ControlCategory::Mechanical,
                recommendation: "Use \"sweep\" nets".to_string(),
                priority: 2,
            }
        );
        let again: Fact = f.to_string().parse().unwrap();
        assert_eq!(again, f);
    }

    #[test]
    fn rejects_bad_facts() {
        assert!("symptom name x".parse::<Fact>().is_err());
        assert!("(weather (rain yes))".parse::<Fact>().is_err());
        assert!("(symptom (name x) (present maybe))".parse::<Fact>().is_err());
        assert!("(pest (cf 0.5))".parse::<Fact>().is_err());
    }

    #[test]
    fn native_backend_matches_consultation() {
        let mut b = backend();
        for line in [
            "(symptom (name hopper-burn) (present yes) (cf 0.9))",
            "(symptom (name yellowing-drying) (present yes) (cf 0.9))",
            "(symptom (name circular-patches) (present yes) (cf 0.9))",
            "(symptom (name plant-base-insects) (present yes) (cf 0.9))",
        ] {
            b.assert_fact(line.parse().unwrap()).unwrap();
        }
        b.run().unwrap();

        let identified = b.identified_pests();
        assert_eq!(identified.len(), 1);
        match identified[0] {
            Fact::Pest { name, cf, scientific_name, .. } => {
                assert_eq!(name, BROWN_PLANTHOPPER);
                assert_eq!(scientific_name, "Nilaparvata lugens");
                assert!((cf - 0.965925).abs() < 1e-6);
            }
            other => panic!("unexpected fact {other}"),
        }

        let not_identified = b
            .facts_of(FactKind::Pest)
            .into_iter()
            .filter(|f| matches!(f, Fact::Pest { identified: false, .. }))
            .count();
        assert_eq!(not_identified, 4);

        let plan = b.control_recommendations(BROWN_PLANTHOPPER);
        assert_eq!(plan.total(), 5);
        assert!(b.control_recommendations(RICE_BUG).is_empty());
    }

    #[test]
    fn unknown_presence_never_fires() {
        let mut b = backend();
        b.assert_fact(Fact::symptom("foul-smell", Presence::Yes, 0.9)).unwrap();
        b.assert_fact(Fact::symptom("empty-grains", Presence::Unknown, 0.9)).unwrap();
        b.run().unwrap();
        assert!(b.identified_pests().is_empty());
    }

    #[test]
    fn reassertion_replaces_previous_symptom_fact() {
        let mut b = backend();
        b.assert_fact(Fact::symptom("foul-smell", Presence::Yes, 0.9)).unwrap();
        b.assert_fact(Fact::symptom("foul_smell", Presence::No, 0.1)).unwrap();
        assert_eq!(b.facts_of(FactKind::Symptom).len(), 1);
    }

    #[test]
    fn assert_rejects_unknown_symptoms_and_derived_templates() {
        let mut b = backend();
        assert!(matches!(
            b.assert_fact(Fact::symptom("lava", Presence::Yes, 1.0)),
            Err(ExpertError::UnknownSymptom(_))
        ));
        let pest = Fact::Pest {
            name: RICE_BUG.to_string(),
            scientific_name: String::new(),
            cf: 1.0,
            identified: true,
        };
        assert!(b.assert_fact(pest).is_err());
    }

    #[test]
    fn reset_clears_working_memory() {
        let mut b = backend();
        b.assert_fact(Fact::symptom("silver-shoot", Presence::Yes, 0.9)).unwrap();
        b.assert_fact(Fact::symptom("onion-leaf-gall", Presence::Yes, 0.9)).unwrap();
        assert!(b.run().unwrap() > 0);
        b.reset();
        assert!(b.facts().is_empty());
        b.run().unwrap();
        assert!(b.identified_pests().is_empty());
    }
}
