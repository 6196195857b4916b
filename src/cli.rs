//! Command-line arguments.
//!
//! Parsing lives here; `main.rs` only dispatches.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::evaluation::DEFAULT_SEED;

/// Rice pest identification and IPM control recommendations
#[derive(Debug, Parser)]
#[command(name = "rice-pest-expert")]
#[command(about = "Rule-based rice pest expert system (forward chaining with certainty factors)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON knowledge base to use instead of the built-in one (overrides $RICE_PEST_KB_PATH)
    #[arg(long, global = true)]
    pub kb: Option<PathBuf>,

    /// Confidence for observations given without one, in [0, 1] (overrides $RICE_PEST_DEFAULT_CF)
    #[arg(long, global = true)]
    pub default_cf: Option<f64>,

    /// Subcommand (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the web consultation UI and JSON API
    Serve {
        /// Bind address (overrides $RICE_PEST_ADDR)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Run one consultation from `name[=cf]` observations
    ///
    /// Examples: `hopper_burn=0.9`, `hopper-burn=90%`, `3=75` (checklist number)
    Diagnose {
        #[arg(required = true, value_name = "OBSERVATION")]
        observations: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the numbered symptom checklist
    Symptoms,

    /// Run the multi-agent evaluation
    Evaluate {
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Also write every run to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Print the knowledge base as JSON
    DumpKb,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["rice-pest-expert"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn diagnose_collects_observations() {
        let cli = Cli::try_parse_from([
            "rice-pest-expert",
            "diagnose",
            "hopper_burn=0.9",
            "circular-patches",
            "--json",
            "--default-cf",
            "0.7",
        ])
        .unwrap();
        assert_eq!(cli.default_cf, Some(0.7));
        match cli.command {
            Some(Commands::Diagnose { observations, json }) => {
                assert_eq!(observations, vec!["hopper_burn=0.9", "circular-patches"]);
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn diagnose_requires_observations() {
        assert!(Cli::try_parse_from(["rice-pest-expert", "diagnose"]).is_err());
    }

    #[test]
    fn evaluate_defaults_seed() {
        let cli = Cli::try_parse_from(["rice-pest-expert", "evaluate"]).unwrap();
        match cli.command {
            Some(Commands::Evaluate { seed, csv }) => {
                assert_eq!(seed, DEFAULT_SEED);
                assert!(csv.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
