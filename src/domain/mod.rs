//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - task identifiers (`TaskKind`) and pipeline settings (`PipelineConfig`)
//! - request-scoped values (`ApplicantProfile`, `EncodedVector`, `NormalizedVector`)
//! - outputs (`Attribution`, `RiskResult`, `ApprovalResult`, `Assessment`)

pub mod types;

pub use types::*;
