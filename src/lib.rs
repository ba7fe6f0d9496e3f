//! `credit-scoring` library crate.
//!
//! Credit-risk scoring and loan-approval decisions with additive per-feature
//! explanations. The binary (`credit`) is a thin wrapper around this library so
//! that:
//!
//! - the pipeline is testable without spawning processes
//! - other front-ends (services, dashboards) can reuse it directly
//!
//! Library callers build an [`app::Pipeline`] once from a model store and call
//! `score_risk`, `decide_approval` or `assess` per request.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod explain;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod schema;

pub use app::Pipeline;
pub use domain::{ApplicantProfile, ApprovalResult, Assessment, PipelineConfig, RiskResult, TaskKind};
pub use error::{AppError, PipelineError};
pub use io::ModelStore;
