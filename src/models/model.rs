//! Model adapter: uniform prediction contract over the loaded models.
//!
//! - `ScoringModel` evaluates the raw scalar output (regression value or
//!   positive-class log-odds).
//! - `TaskModel` binds a model to its schema, normalization parameters and the
//!   explainer declared for it.
//! - `RiskRegressor` / `ApprovalClassifier` apply the task-specific output
//!   policy (clamping, operating threshold).
//!
//! Everything here is immutable after construction and safe to share between
//! threads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Attribution, Decision, NormalizedVector, TaskKind};
use crate::error::PipelineError;
use crate::explain::{Explainer, ExplainerSpec};
use crate::math::{sigmoid, NormalizationParams};
use crate::models::linear::LinearModel;
use crate::models::tree::TreeEnsemble;
use crate::schema::FeatureSchema;

/// Risk scores are reported on this closed interval.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// A fitted model, evaluated on normalized feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringModel {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl ScoringModel {
    /// Short name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScoringModel::TreeEnsemble(_) => "tree_ensemble",
            ScoringModel::Linear(_) => "linear",
        }
    }

    pub fn raw_output(&self, x: &[f64]) -> f64 {
        match self {
            ScoringModel::TreeEnsemble(m) => m.raw_output(x),
            ScoringModel::Linear(m) => m.raw_output(x),
        }
    }

    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            ScoringModel::TreeEnsemble(m) => m.validate(n_features),
            ScoringModel::Linear(m) => m.validate(n_features),
        }
    }
}

/// A model registered for one task, with everything needed to score and explain.
#[derive(Debug, Clone)]
pub struct TaskModel {
    pub schema: &'static FeatureSchema,
    pub normalization: NormalizationParams,
    pub model: ScoringModel,
    pub explainer: Explainer,
    pub description: Option<String>,
    pub fitted_on: Option<NaiveDate>,
}

impl TaskModel {
    /// Bind a model to `task`'s schema.
    ///
    /// All pairing checks happen here, once: normalization parameters against
    /// the schema version, model structure against the schema width, and the
    /// declared explainer against the model kind.
    pub fn new(
        task: TaskKind,
        normalization: NormalizationParams,
        model: ScoringModel,
        explainer: &ExplainerSpec,
    ) -> Result<Self, PipelineError> {
        let schema = FeatureSchema::for_task(task);
        normalization.validate(schema.version, schema.width())?;
        model
            .validate(schema.width())
            .map_err(|reason| PipelineError::ModelUnavailable { task, reason })?;
        let explainer = Explainer::register(explainer, &model, schema)?;

        Ok(Self {
            schema,
            normalization,
            model,
            explainer,
            description: None,
            fitted_on: None,
        })
    }

    pub fn task(&self) -> TaskKind {
        self.schema.task
    }

    fn check_vector(&self, vector: &NormalizedVector) -> Result<(), PipelineError> {
        if vector.schema_version() != self.schema.version || vector.len() != self.schema.width() {
            return Err(PipelineError::SchemaVersionMismatch {
                expected: self.schema.version.to_string(),
                found: format!("{} ({} columns)", vector.schema_version(), vector.len()),
            });
        }
        Ok(())
    }

    /// Unclamped model output for `vector`.
    pub fn raw_output(&self, vector: &NormalizedVector) -> Result<f64, PipelineError> {
        self.check_vector(vector)?;
        Ok(self.model.raw_output(vector.values()))
    }

    /// Additive attribution of the raw output for `vector`.
    pub fn explain(&self, vector: &NormalizedVector) -> Result<Attribution, PipelineError> {
        self.check_vector(vector)?;
        self.explainer.explain(&self.model, vector, self.task())
    }
}

/// Regression adapter for the risk score.
#[derive(Debug, Clone)]
pub struct RiskRegressor {
    inner: TaskModel,
}

impl RiskRegressor {
    pub fn new(inner: TaskModel) -> Result<Self, PipelineError> {
        expect_task(&inner, TaskKind::RiskScoring)?;
        Ok(Self { inner })
    }

    pub fn task_model(&self) -> &TaskModel {
        &self.inner
    }

    /// Risk score in `[0, 100]`.
    ///
    /// Outputs outside the range are clipped, not rejected: extrapolated scores
    /// are bounded.
    pub fn predict_score(&self, vector: &NormalizedVector) -> Result<f64, PipelineError> {
        let raw = self.inner.raw_output(vector)?;
        Ok(raw.clamp(SCORE_MIN, SCORE_MAX))
    }
}

/// Binary classification adapter for the approval decision.
#[derive(Debug, Clone)]
pub struct ApprovalClassifier {
    inner: TaskModel,
    threshold: f64,
}

impl ApprovalClassifier {
    pub fn new(inner: TaskModel, threshold: f64) -> Result<Self, PipelineError> {
        expect_task(&inner, TaskKind::LoanApproval)?;
        if !(threshold.is_finite() && threshold > 0.0 && threshold < 1.0) {
            return Err(PipelineError::ModelUnavailable {
                task: TaskKind::LoanApproval,
                reason: format!("operating threshold {threshold} is outside (0, 1)"),
            });
        }
        Ok(Self { inner, threshold })
    }

    pub fn task_model(&self) -> &TaskModel {
        &self.inner
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Positive-class probability and the label at the operating threshold.
    pub fn predict_decision(&self, vector: &NormalizedVector) -> Result<Decision, PipelineError> {
        let margin = self.inner.raw_output(vector)?;
        let probability = sigmoid(margin);
        let label = u8::from(probability >= self.threshold);
        Ok(Decision { label, probability })
    }
}

fn expect_task(model: &TaskModel, task: TaskKind) -> Result<(), PipelineError> {
    if model.task() != task {
        return Err(PipelineError::ModelUnavailable {
            task,
            reason: format!("artifact is registered for '{}'", model.task()),
        });
    }
    Ok(())
}
