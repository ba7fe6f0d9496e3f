//! Error types.
//!
//! - `PipelineError` is what the library returns. Every variant is a validation
//!   or configuration failure; none of them is transient.
//! - `AppError` is what the `credit` binary reports, with a process exit code.

use thiserror::Error;

use crate::domain::TaskKind;

/// Failures of the scoring and explanation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Unknown task '{0}' (expected 'risk_scoring' or 'loan_approval').")]
    UnknownTask(String),

    #[error("Missing required field '{field}'.")]
    MissingField { field: String },

    #[error("Invalid value '{value}' for field '{field}' (expected one of: {}).", .allowed.join(", "))]
    InvalidCategoricalValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Field '{field}' expects {expected}.")]
    InvalidFieldType { field: String, expected: &'static str },

    #[error("Value {value} for field '{field}' is outside [{min}, {max}].")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Schema version mismatch: expected '{expected}', found '{found}'.")]
    SchemaVersionMismatch { expected: String, found: String },

    #[error("Model for task '{task}' is unavailable: {reason}")]
    ModelUnavailable { task: TaskKind, reason: String },

    #[error("Explainer '{method}' is not supported for {model} models.")]
    ExplainerUnsupported { method: String, model: String },
}

impl PipelineError {
    /// True for failures caused by a single bad request.
    ///
    /// Everything else means the loaded models, schemas and normalization
    /// parameters are out of sync, which should stop the process at startup.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownTask(_)
                | PipelineError::MissingField { .. }
                | PipelineError::InvalidCategoricalValue { .. }
                | PipelineError::InvalidFieldType { .. }
                | PipelineError::OutOfRange { .. }
        )
    }
}

/// Error reported by the binary.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = if err.is_request_error() { 2 } else { 3 };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
