//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module is the real main:
//! - parses CLI arguments
//! - resolves and loads the model store
//! - builds applicant profiles
//! - runs the pipeline and prints or exports results

use clap::Parser;
use serde::Serialize;

use crate::cli::{Command, ModelsArgs, ProfileArgs, SchemaArgs};
use crate::domain::{PipelineConfig, TaskKind};
use crate::error::AppError;
use crate::io::{build_profile, resolve_model_dir, write_attribution_csv};

pub mod pipeline;

pub use pipeline::{Pipeline, RISK_SCORE_FIELD};

/// Entry point for the `credit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let models = cli.models.as_deref();

    match cli.command {
        Command::Score(args) => handle_profile(models, args, TaskKind::RiskScoring, false),
        Command::Approve(args) => handle_profile(models, args, TaskKind::LoanApproval, false),
        Command::Assess(args) => handle_profile(models, args, TaskKind::LoanApproval, true),
        Command::Schema(args) => handle_schema(args),
        Command::Models(args) => handle_models(models, args),
    }
}

fn load_pipeline(models: Option<&std::path::Path>, threshold: Option<f64>) -> Result<Pipeline, AppError> {
    let dir = resolve_model_dir(models);
    let config = PipelineConfig {
        operating_threshold: threshold,
        ..PipelineConfig::default()
    };
    Ok(Pipeline::from_dir(&dir, config)?)
}

fn handle_profile(
    models: Option<&std::path::Path>,
    args: ProfileArgs,
    task: TaskKind,
    chained: bool,
) -> Result<(), AppError> {
    let pipeline = load_pipeline(models, args.threshold)?;
    let profile = build_profile(args.profile.as_deref(), &args.set)?;

    // The profile actually fed to `task`'s model, for the export.
    let (task_profile, attribution) = match (task, chained) {
        (TaskKind::RiskScoring, _) => {
            let result = pipeline.score_risk(&profile)?;
            print_result(&result, args.json, crate::report::format_risk_result)?;
            (profile, result.attribution)
        }
        (TaskKind::LoanApproval, false) => {
            let result = pipeline.decide_approval(&profile)?;
            print_result(&result, args.json, crate::report::format_approval_result)?;
            (profile, result.attribution)
        }
        (TaskKind::LoanApproval, true) => {
            let assessment = pipeline.assess(&profile)?;
            print_result(&assessment, args.json, crate::report::format_assessment)?;
            let chained = profile.with_value(RISK_SCORE_FIELD, assessment.risk.score);
            (chained, assessment.approval.attribution)
        }
    };

    if let Some(path) = &args.export_attribution {
        let (encoded, _) = pipeline.prepare(task, &task_profile)?;
        let schema = pipeline.model(task).schema;
        write_attribution_csv(path, schema, &encoded, &attribution)?;
    }
    Ok(())
}

fn print_result<T: Serialize>(value: &T, json: bool, format: fn(&T) -> String) -> Result<(), AppError> {
    if json {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::new(4, format!("Failed to serialize result: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", format(value));
    }
    Ok(())
}

fn handle_schema(args: SchemaArgs) -> Result<(), AppError> {
    let tasks: Vec<TaskKind> = match args.task {
        Some(task) => vec![task],
        None => TaskKind::ALL.to_vec(),
    };
    for task in tasks {
        println!("{}", crate::report::format_schema(crate::schema::FeatureSchema::for_task(task)));
    }
    Ok(())
}

fn handle_models(models: Option<&std::path::Path>, args: ModelsArgs) -> Result<(), AppError> {
    let pipeline = load_pipeline(models, args.threshold)?;
    let loaded = [pipeline.model(TaskKind::RiskScoring), pipeline.model(TaskKind::LoanApproval)];
    println!("{}", crate::report::format_models(&loaded, pipeline.threshold()));
    Ok(())
}
