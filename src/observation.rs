//! # Observation Parsing: `name[=cf]` Tokens
//!
//! The CLI and the web form both accept observations as short text tokens.
//! [`ObservationParser`] turns them into [`ParsedObservation`]s before they
//! reach the session.
//!
//! ## Accepted Forms
//!
//! | Token | Symptom | Confidence |
//! |-------|---------|------------|
//! | `hopper_burn` | `hopper_burn` | configured default (0.8) |
//! | `hopper-burn=0.9` | `hopper_burn` | 0.9 |
//! | `hopper_burn=90%` | `hopper_burn` | 0.9 |
//! | `hopper_burn:90` | `hopper_burn` | 0.9 (values above 1 read as percent) |
//! | `3=75%` | 3rd checklist entry | 0.75 |
//!
//! Numeric names refer to the numbered symptom checklist (1-based), the same
//! numbering the checklist printer shows. Resolution of names against the
//! knowledge base happens later, in the session; this module only checks the
//! shape of the token.

use regex::Regex;

use crate::core::{ExpertError, ExpertResult, KnowledgeBase};

/// Symptom reference as written by the user.
#[derive(Clone, Debug, PartialEq)]
pub enum SymptomRef {
    Name(String),
    /// 1-based position in [`KnowledgeBase::checklist`].
    Index(usize),
}

/// One parsed observation token.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedObservation {
    pub symptom: SymptomRef,
    pub confidence: f64,
}

impl ParsedObservation {
    /// Resolves checklist indexes into symptom names.
    pub fn symptom_name(&self, kb: &KnowledgeBase) -> ExpertResult<String> {
        match &self.symptom {
            SymptomRef::Name(name) => Ok(name.clone()),
            SymptomRef::Index(i) => kb
                .checklist()
                .get(i.wrapping_sub(1))
                .map(|s| s.name.clone())
                .ok_or_else(|| ExpertError::UnknownSymptom(format!("#{i}"))),
        }
    }
}

/// Parser for observation tokens, with its regex compiled once.
pub struct ObservationParser {
    token_re: Regex,
    default_confidence: f64,
}

impl ObservationParser {
    pub fn new(default_confidence: f64) -> Self {
        Self {
            token_re: Regex::new(
                r"^\s*(?P<name>[A-Za-z0-9_\-]+)\s*(?:[=:]\s*(?P<cf>\d+(?:\.\d+)?|\.\d+)\s*(?P<pct>%)?)?\s*$",
            )
            .expect("observation token regex is valid"),
            default_confidence,
        }
    }

    /// Parses one token.
    pub fn parse(&self, input: &str) -> ExpertResult<ParsedObservation> {
        let invalid = |reason: &str| ExpertError::InvalidObservation {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let caps = self
            .token_re
            .captures(input)
            .ok_or_else(|| invalid("expected `name`, `name=cf` or `name=cf%`"))?;
        let name = &caps["name"];

        let confidence = match caps.name("cf") {
            None => self.default_confidence,
            Some(raw) => {
                let value: f64 = raw
                    .as_str()
                    .parse()
                    .map_err(|_| invalid("confidence is not a number"))?;
                if caps.name("pct").is_some() || value > 1.0 {
                    value / 100.0
                } else {
                    value
                }
            }
        };

        let symptom = match name.parse::<usize>() {
            Ok(0) => return Err(invalid("checklist numbers start at 1")),
            Ok(i) => SymptomRef::Index(i),
            Err(_) => SymptomRef::Name(name.to_string()),
        };

        Ok(ParsedObservation {
            symptom,
            confidence,
        })
    }

    /// Parses a comma or whitespace separated list of tokens.
    pub fn parse_list(&self, input: &str) -> ExpertResult<Vec<ParsedObservation>> {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| self.parse(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ObservationParser {
        ObservationParser::new(0.8)
    }

    fn named(name: &str, confidence: f64) -> ParsedObservation {
        ParsedObservation {
            symptom: SymptomRef::Name(name.to_string()),
            confidence,
        }
    }

    #[test]
    fn bare_name_uses_default() {
        assert_eq!(parser().parse("hopper_burn").unwrap(), named("hopper_burn", 0.8));
    }

    #[test]
    fn fraction_and_percent_forms() {
        let p = parser();
        assert_eq!(p.parse("hopper-burn=0.9").unwrap(), named("hopper-burn", 0.9));
        assert_eq!(p.parse("hopper_burn=90%").unwrap(), named("hopper_burn", 0.9));
        assert_eq!(p.parse("hopper_burn:90").unwrap(), named("hopper_burn", 0.9));
        assert_eq!(p.parse("hopper_burn=.5").unwrap(), named("hopper_burn", 0.5));
        assert_eq!(p.parse("hopper_burn=1").unwrap(), named("hopper_burn", 1.0));
    }

    #[test]
    fn numbers_are_checklist_indexes() {
        let obs = parser().parse("3=75%").unwrap();
        assert_eq!(obs.symptom, SymptomRef::Index(3));
        assert!((obs.confidence - 0.75).abs() < 1e-12);

        let kb = KnowledgeBase::malaysian_rice();
        assert_eq!(obs.symptom_name(&kb).unwrap(), "circular_patches");
        let out_of_range = parser().parse("99").unwrap();
        assert!(out_of_range.symptom_name(&kb).is_err());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let p = parser();
        assert!(matches!(p.parse("hopper burn"), Err(ExpertError::InvalidObservation { .. })));
        assert!(p.parse("hopper_burn=high").is_err());
        assert!(p.parse("0").is_err());
    }

    #[test]
    fn list_accepts_commas_and_spaces() {
        let obs = parser().parse_list("foul_smell=0.9, empty_grains  1").unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[2].symptom, SymptomRef::Index(1));
    }
}
