//! # KnowledgeBase: The Expert's Memory
//!
//! The [`KnowledgeBase`] bundles everything the expert "knows" before a
//! consultation starts: the symptom catalog, the pest descriptions, the rule
//! catalog and the IPM control catalog. It is built once at start-up and is
//! **read-only** afterwards, so a single instance behind an `Arc` can serve
//! any number of independent consultations on any number of threads.
//!
//! ## Storage
//!
//! - **Symptoms / Pests / Rules / Recommendations**: `Vec`s in catalog order.
//!   Rule order matters for the fired-rule trace and for rank tie-breaking.
//! - **Name indexes**: `HashMap<String, usize>` from symptom and pest names to
//!   their positions, for O(1) lookups.
//!
//! The indexes are `#[serde(skip)]` and rebuilt after deserialization via
//! [`rebuild_index()`](KnowledgeBase::rebuild_index).
//!
//! ## Validation
//!
//! A knowledge base coming from a file is checked with
//! [`validate()`](KnowledgeBase::validate) before use:
//!
//! | Check | Why it matters |
//! |-------|----------------|
//! | unique symptom / pest names, unique rule ids | names are join keys |
//! | rule pests and symptoms exist | a dangling rule could never fire |
//! | rule confidence in `[0, 1]` | keeps every CF inside `[0, 1]` |
//! | no empty requirement set | a rule without evidence is meaningless |
//! | recommendation pests exist, priority ≥ 1 | lookup joins by name |
//!
//! ## Example
//!
//! ```text
//! let kb = KnowledgeBase::malaysian_rice();
//! assert!(kb.symptom("hopper-burn").is_some()); // hyphenated alias
//! assert_eq!(kb.rules().len(), 15);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::catalog;
use super::error::{ExpertError, ExpertResult};
use super::pest::{ControlRecommendation, Pest};
use super::rule::Rule;
use super::symptom::{canonical_name, Symptom};

/// Immutable bundle of reference data consumed by the inference engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnowledgeBase {
    symptoms: Vec<Symptom>,
    pests: Vec<Pest>,
    rules: Vec<Rule>,
    recommendations: Vec<ControlRecommendation>,

    /// Symptom name → position in `symptoms`. Not serialized.
    #[serde(skip, default)]
    symptom_index: HashMap<String, usize>,

    /// Pest name → position in `pests`. Not serialized.
    #[serde(skip, default)]
    pest_index: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// Assembles a knowledge base from its four catalogs.
    ///
    /// Does not validate; callers loading untrusted data should call
    /// [`validate()`](KnowledgeBase::validate).
    pub fn new(
        symptoms: Vec<Symptom>,
        pests: Vec<Pest>,
        rules: Vec<Rule>,
        recommendations: Vec<ControlRecommendation>,
    ) -> Self {
        let mut kb = Self {
            symptoms,
            pests,
            rules,
            recommendations,
            symptom_index: HashMap::new(),
            pest_index: HashMap::new(),
        };
        kb.rebuild_index();
        kb
    }

    /// The built-in Malaysian rice pest knowledge base.
    pub fn malaysian_rice() -> Self {
        Self::new(
            catalog::symptoms(),
            catalog::pests(),
            catalog::rules(),
            catalog::recommendations(),
        )
    }

    /// Rebuilds the name indexes from the catalogs.
    ///
    /// **Must be called after deserialization**, since both indexes are
    /// `#[serde(skip)]`. On duplicate names the first entry wins; `validate`
    /// reports duplicates as errors.
    pub fn rebuild_index(&mut self) {
        self.symptom_index.clear();
        for (i, s) in self.symptoms.iter().enumerate() {
            self.symptom_index.entry(canonical_name(&s.name)).or_insert(i);
        }
        self.pest_index.clear();
        for (i, p) in self.pests.iter().enumerate() {
            self.pest_index.entry(p.name.clone()).or_insert(i);
        }
    }

    /// Checks the structural invariants listed in the module docs.
    pub fn validate(&self) -> ExpertResult<()> {
        let invalid = |msg: String| Err(ExpertError::InvalidKnowledgeBase(msg));

        if self.symptom_index.len() != self.symptoms.len() {
            return invalid("duplicate symptom names".to_string());
        }
        if self.pest_index.len() != self.pests.len() {
            return invalid("duplicate pest names".to_string());
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            if !rule_ids.insert(rule.id.as_str()) {
                return invalid(format!("duplicate rule id `{}`", rule.id));
            }
            if !self.pest_index.contains_key(&rule.pest_name) {
                return invalid(format!("rule {} concludes unknown pest `{}`", rule.id, rule.pest_name));
            }
            if rule.required_symptoms.is_empty() {
                return invalid(format!("rule {} requires no symptoms", rule.id));
            }
            if let Some(missing) = rule
                .required_symptoms
                .iter()
                .find(|s| self.symptom(s).is_none())
            {
                return invalid(format!("rule {} requires unknown symptom `{}`", rule.id, missing));
            }
            if !(0.0..=1.0).contains(&rule.confidence) {
                return invalid(format!(
                    "rule {} confidence {} outside [0, 1]",
                    rule.id, rule.confidence
                ));
            }
        }

        for rec in &self.recommendations {
            if !self.pest_index.contains_key(&rec.pest_name) {
                return invalid(format!("recommendation for unknown pest `{}`", rec.pest_name));
            }
            if rec.priority == 0 {
                return invalid(format!("recommendation priority 0 for `{}`", rec.pest_name));
            }
        }

        Ok(())
    }

    /// Looks a symptom up by name, accepting the hyphenated spelling.
    pub fn symptom(&self, name: &str) -> Option<&Symptom> {
        self.symptom_index
            .get(&canonical_name(name))
            .map(|&i| &self.symptoms[i])
    }

    /// Looks a pest up by its exact name.
    pub fn pest(&self, name: &str) -> Option<&Pest> {
        self.pest_index.get(name).map(|&i| &self.pests[i])
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn pests(&self) -> &[Pest] {
        &self.pests
    }

    /// Rules in catalog order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Control recommendations in insertion order.
    pub fn recommendations(&self) -> &[ControlRecommendation] {
        &self.recommendations
    }

    /// Symptoms grouped by pest hint, for checklists.
    ///
    /// Groups are sorted by hint; inside a group the catalog order is kept.
    pub fn symptom_groups(&self) -> BTreeMap<&str, Vec<&Symptom>> {
        let mut groups: BTreeMap<&str, Vec<&Symptom>> = BTreeMap::new();
        for s in &self.symptoms {
            groups.entry(s.pest_hint.as_str()).or_default().push(s);
        }
        groups
    }

    /// Checklist order: symptoms flattened from [`symptom_groups()`](Self::symptom_groups).
    ///
    /// Position `i` here is what a numbered checklist shows as `i + 1`.
    pub fn checklist(&self) -> Vec<&Symptom> {
        self.symptom_groups().into_values().flatten().collect()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
