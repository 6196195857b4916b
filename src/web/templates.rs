//! # Maud Templates: Server-Side HTML
//!
//! Pages are rendered with the [`maud`](https://maud.lambda.xyz/) macro, so
//! templates are compiled Rust and every interpolated string is escaped.
//!
//! | Function | Page |
//! |----------|------|
//! | [`checklist_page()`] | symptom checklist form, grouped by pest hint |
//! | [`result_page()`] | fired rules, pest cards and IPM plans |
//! | [`error_page()`] | rejected form input |
//!
//! ## Checklist Form Fields
//!
//! ```text
//! sym_<name>=on      checkbox, present only when ticked
//! cf_<name>=80       confidence in percent for that symptom
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::consultation::{ConsultationReport, Finding};
use crate::core::KnowledgeBase;
use crate::inference::certainty::percent;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f4f7f0; color: #1f2a1a; }
.nav-bar { background: #2f5d2a; color: #fff; padding: 0.8rem 1.5rem; }
.nav-bar a { color: #fff; text-decoration: none; font-weight: 600; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1rem; }
fieldset { border: 1px solid #c9d6bf; border-radius: 6px; margin-bottom: 1rem; background: #fff; }
legend { font-weight: 600; }
.symptom-row { display: flex; align-items: center; gap: 0.6rem; padding: 0.2rem 0; }
.symptom-row label { flex: 1; }
.symptom-row input[type=number] { width: 4.5rem; }
.card { background: #fff; border: 1px solid #c9d6bf; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
.cf { font-weight: 700; color: #2f5d2a; }
.empty { background: #fff7e0; border-color: #e5c76b; }
.error { background: #fdecea; border-color: #e39a93; }
button { background: #2f5d2a; color: #fff; border: 0; padding: 0.6rem 1.4rem; border-radius: 4px; cursor: pointer; }
"#;

fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Rice Pest Expert System" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                nav class="nav-bar" {
                    a href="/" { "Rice Pest Expert System" }
                    " · Forward chaining with certainty factors for Malaysian rice"
                }
                main { (content) }
            }
        }
    }
}

/// GET `/`: every symptom with a checkbox and a confidence field.
pub fn checklist_page(kb: &KnowledgeBase, default_confidence: f64) -> Markup {
    let default_percent = (default_confidence * 100.0).round() as u32;
    layout(
        "Symptom checklist",
        html! {
            h1 { "Symptom checklist" }
            p {
                "Tick every symptom you observed in the field and adjust how sure you are (0-100%). "
                "Unticked symptoms are treated as not observed."
            }
            form method="post" action="/diagnose" {
                @for (hint, symptoms) in kb.symptom_groups() {
                    fieldset {
                        legend { "Symptoms often associated with " (hint) }
                        @for symptom in symptoms {
                            div class="symptom-row" {
                                input type="checkbox" id={ "sym_" (symptom.name) } name={ "sym_" (symptom.name) };
                                label for={ "sym_" (symptom.name) } { (symptom.description) }
                                input type="number" name={ "cf_" (symptom.name) }
                                    min="0" max="100" step="1" value=(default_percent);
                                span { "%" }
                            }
                        }
                    }
                }
                button type="submit" { "Diagnose" }
            }
        },
    )
}

fn finding_card(finding: &Finding) -> Markup {
    html! {
        div class="card" {
            h2 { (finding.pest_name) }
            @if let Some(pest) = &finding.pest {
                p { em { (pest.scientific_name) } }
            }
            p { "Confidence: " span class="cf" { (percent(finding.confidence)) } }
            @if let Some(pest) = &finding.pest {
                dl {
                    dt { "Description" } dd { (pest.description) }
                    dt { "Damage type" } dd { (pest.damage_type) }
                    dt { "Favorable conditions" } dd { (pest.favorable_conditions) }
                    dt { "Affected stage" } dd { (pest.affected_stage) }
                }
            }
            h3 { "Control recommendations (IPM)" }
            @for (category, items) in finding.recommendations.groups() {
                h4 { (category.symbol().to_uppercase()) " CONTROL" }
                ol {
                    @for item in items {
                        li { "Priority " (item.priority) ": " (item.recommendation) }
                    }
                }
            }
        }
    }
}

/// POST `/diagnose`: the outcome of one consultation.
pub fn result_page(report: &ConsultationReport) -> Markup {
    layout(
        "Diagnosis",
        html! {
            h1 { "Diagnosis results" }
            p {
                "Observed: "
                @if report.observed_symptoms.is_empty() {
                    "nothing"
                } @else {
                    (report.observed_symptoms.join(", "))
                }
            }
            @if !report.fired_rules.is_empty() {
                h2 { "Rules fired" }
                ul {
                    @for fired in &report.fired_rules {
                        li { (fired.rule_id) ": " (fired.pest_name) " (CF " (percent(fired.confidence)) ")" }
                    }
                }
            }
            @if report.is_empty() {
                div class="card empty" {
                    h2 { "No pest could be identified" }
                    p { "The symptoms you described do not match any known pest patterns." }
                    ol {
                        li { "Observe more symptoms and try again" }
                        li { "Check if symptoms are due to diseases instead of pests" }
                        li { "Consult with local agricultural extension officers" }
                    }
                }
            }
            @for finding in &report.findings {
                (finding_card(finding))
            }
            p { a href="/" { "New consultation" } }
        },
    )
}

pub fn error_page(message: &str) -> Markup {
    layout(
        "Invalid input",
        html! {
            div class="card error" {
                h1 { "Invalid input" }
                p { (message) }
            }
            p { a href="/" { "Back to the checklist" } }
        },
    )
}
