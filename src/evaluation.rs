//! # Multi-Agent Evaluation
//!
//! Simulates six kinds of users consulting the system over eleven scripted
//! field cases and scores every run against a 1-5 rubric. The harness is the
//! regression check for the knowledge base: a catalog edit that breaks a
//! diagnosis shows up as a drop in accuracy.
//!
//! ## Agents
//!
//! | Agent | Confidence per symptom | Extra behaviour |
//! |-------|------------------------|-----------------|
//! | A1 Novice Farmer | fixed 0.80 | |
//! | A2 Experienced Farmer | uniform 0.85-0.95 | |
//! | A3 Extension Officer | uniform 0.70-0.90 | |
//! | A4 Risk-Averse User | uniform 0.50-0.75 | |
//! | A5 Noisy/Mixed-Symptoms User | uniform 0.60-0.90 | adds one unrelated symptom |
//! | A6 Chemical-First User | uniform 0.80-0.90 | |
//!
//! ## Rubric
//!
//! | Criterion | Score |
//! |-----------|-------|
//! | diagnosis | 5 correct, 2 wrong pest, 1 nothing |
//! | CF reasonableness | depends on the agent's profile, 1 without a CF |
//! | recommendations | 5 for ≥ 4, 4 for ≥ 2, 2 for 1, 1 for none |
//! | IPM completeness | 5/4/3/2/1 for 4/3/2/1/0 categories |
//! | clarity | constant 5 |
//!
//! `overall` is the mean of the five, rounded to two decimals.
//!
//! ## Determinism
//!
//! Agents run in parallel on the rayon pool. Each one draws from its own
//! `StdRng` seeded with `seed + agent index`, so a given seed always produces
//! the same table regardless of scheduling.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::consultation::Consultation;
use crate::core::catalog::{
    BROWN_PLANTHOPPER, RICE_BUG, RICE_GALL_MIDGE, RICE_LEAF_FOLDER, YELLOW_STEM_BORER,
};
use crate::core::symptom::canonical_name;
use crate::core::KnowledgeBase;
use crate::recommendations::RecommendationPlan;

/// Label used when no pest is identified.
pub const NO_PEST: &str = "No pest identified";

pub const DEFAULT_SEED: u64 = 42;

/// How a simulated user reports confidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentProfile {
    Novice,
    Experienced,
    ExtensionOfficer,
    RiskAverse,
    Noisy,
    ChemicalFirst,
}

impl AgentProfile {
    /// Inclusive confidence range; `lo == hi` is a fixed value.
    fn confidence_range(&self) -> (f64, f64) {
        match self {
            AgentProfile::Novice => (0.80, 0.80),
            AgentProfile::Experienced => (0.85, 0.95),
            AgentProfile::ExtensionOfficer => (0.70, 0.90),
            AgentProfile::RiskAverse => (0.50, 0.75),
            AgentProfile::Noisy => (0.60, 0.90),
            AgentProfile::ChemicalFirst => (0.80, 0.90),
        }
    }

    fn sample_confidence<R: Rng>(&self, rng: &mut R) -> f64 {
        let (lo, hi) = self.confidence_range();
        if lo == hi {
            lo
        } else {
            rng.gen_range(lo..=hi).clamp(0.0, 1.0)
        }
    }

    fn adds_noise(&self) -> bool {
        matches!(self, AgentProfile::Noisy)
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub name: &'static str,
    pub profile: AgentProfile,
}

pub fn agents() -> Vec<Agent> {
    vec![
        Agent { name: "A1 Novice Farmer", profile: AgentProfile::Novice },
        Agent { name: "A2 Experienced Farmer", profile: AgentProfile::Experienced },
        Agent { name: "A3 Extension Officer", profile: AgentProfile::ExtensionOfficer },
        Agent { name: "A4 Risk-Averse User", profile: AgentProfile::RiskAverse },
        Agent { name: "A5 Noisy/Mixed-Symptoms User", profile: AgentProfile::Noisy },
        Agent { name: "A6 Chemical-First User", profile: AgentProfile::ChemicalFirst },
    ]
}

#[derive(Clone, Debug)]
pub struct TestCase {
    pub id: &'static str,
    pub name: &'static str,
    pub symptoms: &'static [&'static str],
    pub expected: &'static str,
}

pub fn test_cases() -> Vec<TestCase> {
    vec![
        TestCase { id: "TC-A1", name: "BPH strong", symptoms: &["hopper-burn", "yellowing-drying", "circular-patches"], expected: BROWN_PLANTHOPPER },
        TestCase { id: "TC-A2", name: "BPH moderate", symptoms: &["honeydew-sooty-mold", "plant-base-insects"], expected: BROWN_PLANTHOPPER },
        TestCase { id: "TC-A3", name: "YSB deadheart (veg)", symptoms: &["dead-heart", "central-shoot-withered", "stem-bore-holes"], expected: YELLOW_STEM_BORER },
        TestCase { id: "TC-A4", name: "YSB whitehead (rep)", symptoms: &["white-head", "empty-panicles"], expected: YELLOW_STEM_BORER },
        TestCase { id: "TC-A5", name: "YSB egg/larva signs", symptoms: &["egg-mass-on-leaves", "larval-feeding-marks"], expected: YELLOW_STEM_BORER },
        TestCase { id: "TC-A6", name: "Leaf folder strong", symptoms: &["folded-leaves", "leaf-scraping", "whitish-streaks"], expected: RICE_LEAF_FOLDER },
        TestCase { id: "TC-A7", name: "Leaf folder moderate", symptoms: &["tubular-folded-leaf", "larvae-inside-leaf"], expected: RICE_LEAF_FOLDER },
        TestCase { id: "TC-A8", name: "Gall midge strong", symptoms: &["silver-shoot", "onion-leaf-gall"], expected: RICE_GALL_MIDGE },
        TestCase { id: "TC-A9", name: "Gall midge moderate", symptoms: &["stunted-tillers", "no-panicle-emergence", "elongated-leaf-sheath"], expected: RICE_GALL_MIDGE },
        TestCase { id: "TC-A10", name: "Rice bug strong", symptoms: &["foul-smell", "empty-grains", "discolored-grains"], expected: RICE_BUG },
        TestCase { id: "TC-A11", name: "Negative (mixed, no rule match)", symptoms: &["folded-leaves", "foul-smell"], expected: NO_PEST },
    ]
}

// ============================================================================
// Rubric
// ============================================================================

pub fn score_diagnostic(predicted: &str, expected: &str) -> u8 {
    if predicted == expected {
        5
    } else if !predicted.is_empty() && predicted != NO_PEST {
        2
    } else {
        1
    }
}

pub fn score_cf_reasonableness(cf: Option<f64>, profile: AgentProfile) -> u8 {
    let Some(cf) = cf else { return 1 };
    match profile {
        AgentProfile::RiskAverse => {
            if cf <= 0.75 { 5 } else { 3 }
        }
        AgentProfile::Experienced | AgentProfile::ChemicalFirst => {
            if cf >= 0.70 { 5 } else { 3 }
        }
        _ => {
            if (0.50..=0.90).contains(&cf) { 4 } else { 3 }
        }
    }
}

pub fn score_recommendations(plan: &RecommendationPlan) -> u8 {
    match plan.total() {
        n if n >= 4 => 5,
        n if n >= 2 => 4,
        1 => 2,
        _ => 1,
    }
}

pub fn score_ipm_completeness(plan: &RecommendationPlan) -> u8 {
    match plan.categories_covered() {
        4 => 5,
        3 => 4,
        2 => 3,
        1 => 2,
        _ => 1,
    }
}

pub fn score_clarity() -> u8 {
    5
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ============================================================================
// Runs
// ============================================================================

/// One agent × test case run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunResult {
    pub agent: String,
    pub test_case: String,
    pub expected: String,
    pub predicted: String,
    /// Top pest CF as a percentage, one decimal. `None` when nothing fired.
    pub cf_percent: Option<f64>,
    pub overall: f64,
    pub correct: bool,
}

/// Runs every agent over every test case.
pub struct Evaluator {
    kb: Arc<KnowledgeBase>,
    agents: Vec<Agent>,
    cases: Vec<TestCase>,
}

impl Evaluator {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            kb,
            agents: agents(),
            cases: test_cases(),
        }
    }

    /// Results in agent order, then test-case order.
    pub fn run(&self, seed: u64) -> Vec<RunResult> {
        tracing::info!(
            seed,
            agents = self.agents.len(),
            cases = self.cases.len(),
            "starting multi-agent evaluation"
        );
        let results: Vec<RunResult> = self
            .agents
            .par_iter()
            .enumerate()
            .flat_map_iter(|(i, agent)| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.cases
                    .iter()
                    .map(|case| self.run_case(agent, case, &mut rng))
                    .collect::<Vec<_>>()
            })
            .collect();
        tracing::info!(runs = results.len(), "evaluation complete");
        results
    }

    fn run_case(&self, agent: &Agent, case: &TestCase, rng: &mut StdRng) -> RunResult {
        let mut chosen: Vec<String> = case.symptoms.iter().map(|s| canonical_name(s)).collect();

        if agent.profile.adds_noise() {
            let candidates: Vec<&str> = self
                .kb
                .symptoms()
                .iter()
                .map(|s| s.name.as_str())
                .filter(|name| !chosen.iter().any(|c| c == name))
                .collect();
            if let Some(extra) = candidates.choose(rng) {
                chosen.push(extra.to_string());
            }
        }

        let mut consultation = Consultation::new(Arc::clone(&self.kb));
        for symptom in &chosen {
            let cf = agent.profile.sample_confidence(rng);
            if let Err(e) = consultation.assert_symptom(symptom, true, cf) {
                tracing::warn!(agent = agent.name, case = case.id, error = %e, "symptom rejected");
            }
        }

        let top = consultation.run_inference().top().cloned();
        let (predicted, cf) = match &top {
            Some(d) => (d.pest_name.clone(), Some(d.confidence)),
            None => (NO_PEST.to_string(), None),
        };
        let plan = match &top {
            Some(d) => consultation.recommendations_for(&d.pest_name),
            None => RecommendationPlan::default(),
        };

        let scores = [
            score_diagnostic(&predicted, case.expected),
            score_cf_reasonableness(cf, agent.profile),
            score_recommendations(&plan),
            score_ipm_completeness(&plan),
            score_clarity(),
        ];
        let overall = mean(scores.iter().map(|&s| f64::from(s))).unwrap_or(0.0);

        tracing::debug!(
            agent = agent.name,
            case = case.id,
            symptoms = ?chosen,
            predicted = %predicted,
            "run scored"
        );

        RunResult {
            agent: agent.name.to_string(),
            test_case: case.id.to_string(),
            expected: case.expected.to_string(),
            correct: predicted == case.expected,
            predicted,
            cf_percent: cf.map(|c| round_to(c * 100.0, 1)),
            overall: round_to(overall, 2),
        }
    }
}

// ============================================================================
// Summaries
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub total_runs: usize,
    pub accuracy_all: f64,
    pub accuracy_pest: f64,
    pub negative_correctness: f64,
    pub average_overall: f64,
    /// Mean CF percentage over pest cases that produced a CF.
    pub average_cf_pest: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentSummary {
    pub agent: String,
    pub runs: usize,
    pub accuracy: f64,
    pub average_cf_pest: Option<f64>,
    pub average_overall: f64,
}

fn accuracy(runs: &[&RunResult]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    let correct = runs.iter().filter(|r| r.correct).count();
    round_to(correct as f64 / runs.len() as f64 * 100.0, 1)
}

fn average_cf_pest(runs: &[&RunResult]) -> Option<f64> {
    mean(
        runs.iter()
            .filter(|r| r.expected != NO_PEST)
            .filter_map(|r| r.cf_percent),
    )
    .map(|m| round_to(m, 1))
}

pub fn summarize(results: &[RunResult]) -> Summary {
    let all: Vec<&RunResult> = results.iter().collect();
    let (negative, pest): (Vec<&RunResult>, Vec<&RunResult>) =
        results.iter().partition(|r| r.expected == NO_PEST);

    Summary {
        total_runs: results.len(),
        accuracy_all: accuracy(&all),
        accuracy_pest: accuracy(&pest),
        negative_correctness: accuracy(&negative),
        average_overall: round_to(mean(results.iter().map(|r| r.overall)).unwrap_or(0.0), 2),
        average_cf_pest: average_cf_pest(&all),
    }
}

/// Per-agent summaries, sorted by agent name.
pub fn summarize_by_agent(results: &[RunResult]) -> Vec<AgentSummary> {
    let mut by_agent: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
    for r in results {
        by_agent.entry(r.agent.as_str()).or_default().push(r);
    }
    by_agent
        .into_iter()
        .map(|(agent, runs)| AgentSummary {
            agent: agent.to_string(),
            runs: runs.len(),
            accuracy: accuracy(&runs),
            average_cf_pest: average_cf_pest(&runs),
            average_overall: round_to(mean(runs.iter().map(|r| r.overall)).unwrap_or(0.0), 2),
        })
        .collect()
}

// ============================================================================
// Output
// ============================================================================

const DASH: &str = "—";

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn write_table(f: &mut fmt::Formatter<'_>, headers: &[&str], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header = line(headers.to_vec());
    writeln!(f, "{header}")?;
    writeln!(f, "{}", "-".repeat(header.chars().count()))?;
    for row in rows {
        writeln!(f, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

/// Display adapter printing the detailed, overall and per-agent tables.
pub struct EvaluationTables<'a>(pub &'a [RunResult]);

impl fmt::Display for EvaluationTables<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = self.0;
        let heavy = "=".repeat(90);
        writeln!(f, "{heavy}")?;
        writeln!(f, "MULTI-AGENT SIMULATION EVALUATION RESULTS")?;
        writeln!(f, "{heavy}")?;

        let opt = |v: Option<f64>| v.map_or_else(|| DASH.to_string(), |v| format!("{v:.1}"));

        writeln!(f, "\nDetailed Results Table (All Runs)")?;
        let detailed: Vec<Vec<String>> = results
            .iter()
            .map(|r| {
                vec![
                    truncate(&r.agent, 26),
                    r.test_case.clone(),
                    truncate(&r.expected, 20),
                    truncate(&r.predicted, 22),
                    opt(r.cf_percent),
                    format!("{:.2}", r.overall),
                ]
            })
            .collect();
        write_table(f, &["Agent", "TC", "Expected", "Predicted", "CF%", "Overall"], &detailed)?;

        let s = summarize(results);
        writeln!(f, "\nSummary Table (Overall)")?;
        let overall = vec![
            vec!["Total runs".to_string(), s.total_runs.to_string()],
            vec!["Accuracy (all cases) %".to_string(), format!("{:.1}", s.accuracy_all)],
            vec!["Accuracy (pest cases only) %".to_string(), format!("{:.1}", s.accuracy_pest)],
            vec!["Negative-case correctness %".to_string(), format!("{:.1}", s.negative_correctness)],
            vec!["Average overall score (1-5)".to_string(), format!("{:.2}", s.average_overall)],
            vec!["Average CF % (pest cases)".to_string(), opt(s.average_cf_pest)],
        ];
        write_table(f, &["Metric", "Value"], &overall)?;

        writeln!(f, "\nSummary Table (By Agent)")?;
        let per_agent: Vec<Vec<String>> = summarize_by_agent(results)
            .into_iter()
            .map(|a| {
                vec![
                    a.agent,
                    a.runs.to_string(),
                    format!("{:.1}", a.accuracy),
                    opt(a.average_cf_pest),
                    format!("{:.2}", a.average_overall),
                ]
            })
            .collect();
        write_table(
            f,
            &["Agent", "Runs", "Accuracy %", "Avg CF % (pest)", "Avg Overall"],
            &per_agent,
        )?;
        writeln!(f, "\n{}", "-".repeat(90))
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders results as CSV with a header row.
pub fn to_csv(results: &[RunResult]) -> String {
    let mut out = String::from("agent,test_case,expected,predicted,cf_percent,overall,correct\n");
    for r in results {
        let row = [
            csv_field(&r.agent),
            csv_field(&r.test_case),
            csv_field(&r.expected),
            csv_field(&r.predicted),
            r.cf_percent.map(|v| v.to_string()).unwrap_or_default(),
            r.overall.to_string(),
            r.correct.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn write_csv(results: &[RunResult], path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, to_csv(results))
        .with_context(|| format!("failed to write evaluation CSV to {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = results.len(), "evaluation CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> Evaluator {
        Evaluator::new(Arc::new(KnowledgeBase::malaysian_rice()))
    }

    fn plan_with(kb: &KnowledgeBase, pest: &str) -> RecommendationPlan {
        crate::recommendations::recommendations_for(kb, pest)
    }

    #[test]
    fn diagnostic_scores() {
        assert_eq!(score_diagnostic(RICE_BUG, RICE_BUG), 5);
        assert_eq!(score_diagnostic(NO_PEST, NO_PEST), 5);
        assert_eq!(score_diagnostic(RICE_BUG, BROWN_PLANTHOPPER), 2);
        assert_eq!(score_diagnostic(NO_PEST, BROWN_PLANTHOPPER), 1);
        assert_eq!(score_diagnostic("", BROWN_PLANTHOPPER), 1);
    }

    #[test]
    fn cf_reasonableness_by_profile() {
        assert_eq!(score_cf_reasonableness(None, AgentProfile::Novice), 1);
        assert_eq!(score_cf_reasonableness(Some(0.70), AgentProfile::RiskAverse), 5);
        assert_eq!(score_cf_reasonableness(Some(0.80), AgentProfile::RiskAverse), 3);
        assert_eq!(score_cf_reasonableness(Some(0.70), AgentProfile::Experienced), 5);
        assert_eq!(score_cf_reasonableness(Some(0.60), AgentProfile::ChemicalFirst), 3);
        assert_eq!(score_cf_reasonableness(Some(0.90), AgentProfile::Novice), 4);
        assert_eq!(score_cf_reasonableness(Some(0.95), AgentProfile::Noisy), 3);
    }

    #[test]
    fn recommendation_and_ipm_scores() {
        let kb = KnowledgeBase::malaysian_rice();
        let full = plan_with(&kb, BROWN_PLANTHOPPER);
        assert_eq!(score_recommendations(&full), 5);
        assert_eq!(score_ipm_completeness(&full), 5);

        let empty = RecommendationPlan::default();
        assert_eq!(score_recommendations(&empty), 1);
        assert_eq!(score_ipm_completeness(&empty), 1);

        let mut one = RecommendationPlan::default();
        one.chemical.push(full.chemical[0].clone());
        assert_eq!(score_recommendations(&one), 2);
        assert_eq!(score_ipm_completeness(&one), 2);
    }

    #[test]
    fn full_run_shape() {
        let results = evaluator().run(DEFAULT_SEED);
        assert_eq!(results.len(), 66);
        assert_eq!(results[0].agent, "A1 Novice Farmer");
        assert_eq!(results[0].test_case, "TC-A1");
        assert_eq!(results[65].agent, "A6 Chemical-First User");
        assert_eq!(results[65].test_case, "TC-A11");
    }

    #[test]
    fn same_seed_same_results() {
        let e = evaluator();
        assert_eq!(e.run(7), e.run(7));
    }

    #[test]
    fn novice_scores_are_exact() {
        let results = evaluator().run(DEFAULT_SEED);
        let novice: Vec<&RunResult> = results
            .iter()
            .filter(|r| r.agent == "A1 Novice Farmer")
            .collect();

        // R1 at 0.80: 0.80 × 0.95
        assert_eq!(novice[0].cf_percent, Some(76.0));
        assert_eq!(novice[0].overall, 4.8);

        let negative = novice[10];
        assert_eq!(negative.predicted, NO_PEST);
        assert!(negative.correct);
        assert_eq!(negative.cf_percent, None);
        assert_eq!(negative.overall, 2.6);
    }

    #[test]
    fn agents_without_noise_are_always_correct() {
        let results = evaluator().run(DEFAULT_SEED);
        for r in results.iter().filter(|r| !r.agent.starts_with("A5")) {
            assert!(r.correct, "{} on {} predicted {}", r.agent, r.test_case, r.predicted);
        }
    }

    #[test]
    fn summaries() {
        let results = evaluator().run(DEFAULT_SEED);
        let s = summarize(&results);
        assert_eq!(s.total_runs, 66);
        assert!(s.accuracy_all >= 5.0 / 6.0 * 100.0 - 0.1);
        assert!(s.average_cf_pest.is_some());

        let per_agent = summarize_by_agent(&results);
        assert_eq!(per_agent.len(), 6);
        assert!(per_agent.iter().all(|a| a.runs == 11));
        assert_eq!(per_agent[0].accuracy, 100.0);
    }

    #[test]
    fn tables_render_every_section() {
        let results = evaluator().run(DEFAULT_SEED);
        let text = EvaluationTables(&results).to_string();
        assert!(text.contains("Detailed Results Table (All Runs)"));
        assert!(text.contains("Summary Table (Overall)"));
        assert!(text.contains("Summary Table (By Agent)"));
        assert!(text.contains("A4 Risk-Averse User"));
    }

    #[test]
    fn csv_export() {
        let results = evaluator().run(DEFAULT_SEED);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.csv");
        write_csv(&results, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 67);
        assert_eq!(lines[0], "agent,test_case,expected,predicted,cf_percent,overall,correct");
        assert_eq!(lines[1], "A1 Novice Farmer,TC-A1,Brown Planthopper,Brown Planthopper,76,4.8,true");
        assert!(lines[11].ends_with(",No pest identified,No pest identified,,2.6,true"));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
