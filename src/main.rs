#![allow(dead_code)]
//! # Rice Pest Expert System
//!
//! Rule-based identification of the major insect pests of Malaysian rice,
//! with Integrated Pest Management (IPM) control recommendations.
//!
//! Observations ("I see hopper burn, 90% sure") are matched against a rule
//! catalog by **forward chaining**; rules concluding the same pest are merged
//! with the MYCIN **certainty factor** combination law.
//!
//! ## Startup
//!
//! ```text
//! main()
//!   ├── tracing subscriber (RUST_LOG, default info)
//!   ├── Settings: RICE_PEST_* env vars, then CLI flags
//!   ├── KnowledgeBase: JSON file or built-in catalog, behind an Arc
//!   └── dispatch:
//!       ├── serve     → axum router on RICE_PEST_ADDR
//!       ├── diagnose  → one consultation, text or JSON report
//!       ├── symptoms  → numbered checklist
//!       ├── evaluate  → multi-agent harness on the blocking pool
//!       └── dump-kb   → knowledge base JSON
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cargo run                                         # web UI on :3000
//! cargo run -- diagnose hopper_burn=0.9 yellowing_drying=90% circular-patches
//! RUST_LOG=debug cargo run -- evaluate --seed 7 --csv eval.csv
//! ```

/// Domain types, catalogs, knowledge base and session state.
mod core;

/// Certainty factor algebra and the forward-chaining engine.
mod inference;

/// One diagnostic session over a shared knowledge base.
mod consultation;

/// `name[=cf]` observation tokens.
mod observation;

/// IPM recommendation lookup.
mod recommendations;

/// S-expression facts and the rule-engine backend trait.
mod facts;

/// Terminal rendering of reports and checklists.
mod report;

/// Multi-agent evaluation harness.
mod evaluation;

/// Runtime settings.
mod config;

/// Knowledge base files.
mod persistence;

/// Command-line arguments.
mod cli;

/// Axum server, handlers and Maud templates.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::consultation::Consultation;
use crate::core::KnowledgeBase;
use crate::evaluation::{EvaluationTables, Evaluator};
use crate::observation::ObservationParser;
use crate::report::{Checklist, TextReport};
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `diagnose --json` and `dump-kb` stay pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let addr_override = match &cli.command {
        Some(Commands::Serve { addr }) => *addr,
        _ => None,
    };
    let settings = Settings::from_env()?.with_overrides(addr_override, cli.default_cf, cli.kb.clone())?;

    let kb = Arc::new(persistence::load_or_builtin(settings.kb_path.as_deref())?);

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { .. } => serve(kb, settings).await,
        Commands::Diagnose { observations, json } => {
            diagnose(kb, &settings, &observations, json)
        }
        Commands::Symptoms => {
            print!("{}", Checklist(&kb));
            Ok(())
        }
        Commands::Evaluate { seed, csv } => {
            let results = tokio::task::spawn_blocking(move || Evaluator::new(kb).run(seed))
                .await
                .context("evaluation task panicked")?;
            print!("{}", EvaluationTables(&results));
            if let Some(path) = csv {
                evaluation::write_csv(&results, &path)?;
                println!("Saved CSV to: {}", path.display());
            }
            Ok(())
        }
        Commands::DumpKb => {
            println!("{}", persistence::to_json(&kb)?);
            Ok(())
        }
    }
}

async fn serve(kb: Arc<KnowledgeBase>, settings: Settings) -> Result<()> {
    tracing::info!(
        symptoms = kb.symptom_count(),
        rules = kb.rule_count(),
        "Rice Pest Expert System starting"
    );
    let addr = settings.addr;
    let app = web::create_router(AppState::new(kb, settings));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running at http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

fn diagnose(
    kb: Arc<KnowledgeBase>,
    settings: &Settings,
    tokens: &[String],
    json: bool,
) -> Result<()> {
    let parser = ObservationParser::new(settings.default_confidence);
    let mut observations = Vec::new();
    for token in tokens {
        observations.extend(parser.parse_list(token)?);
    }

    let mut consultation = Consultation::new(kb);
    consultation.observe_all(&observations)?;
    let report = consultation.report();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        );
    } else {
        print!("{}", TextReport(&report));
    }
    Ok(())
}
