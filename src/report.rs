//! Plain-text rendering for the terminal.
//!
//! [`TextReport`] prints a [`ConsultationReport`] the way a field officer
//! reads it: the fired-rule trace, one card per identified pest, then its IPM
//! plan. [`Checklist`] prints the numbered symptom checklist whose numbers
//! the `diagnose` command accepts.

use std::fmt;

use crate::consultation::ConsultationReport;
use crate::core::KnowledgeBase;
use crate::inference::certainty::percent;

const RULE: &str = "======================================================================";
const THIN: &str = "----------------------------------------------------------------------";
const STARS: &str = "************************************************************";

/// Display adapter for a consultation report.
pub struct TextReport<'a>(pub &'a ConsultationReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        if !report.fired_rules.is_empty() {
            writeln!(f, "Rules Fired:")?;
            for fired in &report.fired_rules {
                writeln!(
                    f,
                    "  - {}: Identified {} (CF: {})",
                    fired.rule_id,
                    fired.pest_name,
                    percent(fired.confidence)
                )?;
            }
        }

        if report.is_empty() {
            writeln!(f)?;
            writeln!(f, "{THIN}")?;
            writeln!(f, "NO PEST COULD BE IDENTIFIED")?;
            writeln!(f, "{THIN}")?;
            writeln!(f, "The symptoms you described do not match any known pest patterns.")?;
            writeln!(f, "Suggestions:")?;
            writeln!(f, "  1. Observe more symptoms and try again")?;
            writeln!(f, "  2. Check if symptoms are due to diseases instead of pests")?;
            writeln!(f, "  3. Consult with local agricultural extension officers")?;
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "DIAGNOSIS RESULTS")?;
        writeln!(f, "{RULE}")?;

        for finding in &report.findings {
            writeln!(f)?;
            writeln!(f, "{STARS}")?;
            writeln!(f, "IDENTIFIED PEST: {}", finding.pest_name)?;
            if let Some(pest) = &finding.pest {
                writeln!(f, "Scientific Name: {}", pest.scientific_name)?;
            }
            writeln!(f, "Confidence Level: {}", percent(finding.confidence))?;
            writeln!(f, "{STARS}")?;

            if let Some(pest) = &finding.pest {
                writeln!(f)?;
                writeln!(f, "Description: {}", pest.description)?;
                writeln!(f, "Damage Type: {}", pest.damage_type)?;
                writeln!(f, "Favorable Conditions: {}", pest.favorable_conditions)?;
                writeln!(f, "Affected Stage: {}", pest.affected_stage)?;
            }

            writeln!(f)?;
            writeln!(f, "--- CONTROL RECOMMENDATIONS (IPM Approach) ---")?;
            for (category, items) in finding.recommendations.groups() {
                writeln!(f)?;
                writeln!(f, "[{} CONTROL]", category.symbol().to_uppercase())?;
                for item in items {
                    writeln!(f, "  Priority {}: {}", item.priority, item.recommendation)?;
                }
            }
        }
        Ok(())
    }
}

/// Display adapter for the numbered symptom checklist.
pub struct Checklist<'a>(pub &'a KnowledgeBase);

impl fmt::Display for Checklist<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "RICE PEST SYMPTOM CHECKLIST")?;
        writeln!(f, "{RULE}")?;

        let mut idx = 1;
        for (hint, symptoms) in self.0.symptom_groups() {
            writeln!(f)?;
            writeln!(f, "--- Symptoms often associated with {hint} ---")?;
            for symptom in symptoms {
                writeln!(f, "  [{idx:2}] {:<22} {}", symptom.name, symptom.description)?;
                idx += 1;
            }
        }
        Ok(())
    }
}
