//! Command-line parsing for the `credit` binary.
//!
//! Parsing and dispatch stay separate from the scoring code; handlers live in
//! `crate::app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::TaskKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "credit", version, about = "Credit risk scoring and loan approval with explanations")]
pub struct Cli {
    /// Model store directory (defaults to $CREDIT_MODEL_DIR, then ./models).
    #[arg(long, global = true, value_name = "DIR")]
    pub models: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the applicant's risk score (0-100) and explain it.
    Score(ProfileArgs),
    /// Decide approve/deny for a loan application (requires RiskScore).
    Approve(ProfileArgs),
    /// Score risk, then decide approval using the model's risk score.
    ///
    /// A RiskScore given in the profile is replaced. The attribution export
    /// holds the approval attribution.
    Assess(ProfileArgs),
    /// Print the feature schema of one or both tasks.
    Schema(SchemaArgs),
    /// Summarize the loaded model artifacts.
    Models(ModelsArgs),
}

/// Applicant input and output options.
#[derive(Debug, Args, Clone)]
pub struct ProfileArgs {
    /// JSON object of applicant attributes.
    #[arg(long, value_name = "JSON")]
    pub profile: Option<PathBuf>,

    /// Set or override one attribute (repeatable), e.g. --set CreditScore=600.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Write the full attribution to CSV.
    #[arg(long = "export-attribution", value_name = "CSV")]
    pub export_attribution: Option<PathBuf>,

    /// Override the approval operating threshold, in (0, 1).
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct SchemaArgs {
    /// Only this task (default: both).
    #[arg(long, value_enum)]
    pub task: Option<TaskKind>,
}

#[derive(Debug, Args, Clone)]
pub struct ModelsArgs {
    /// Override the approval operating threshold, in (0, 1).
    #[arg(long)]
    pub threshold: Option<f64>,
}
