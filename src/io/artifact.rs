//! On-disk model artifact format.
//!
//! One JSON document per task bundles the fitted model with the normalization
//! parameters it was trained against and the explainer declared for it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::TaskKind;
use crate::error::PipelineError;
use crate::explain::ExplainerSpec;
use crate::math::NormalizationParams;
use crate::models::{ScoringModel, TaskModel};
use crate::schema::FeatureSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub task: TaskKind,
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitted_on: Option<NaiveDate>,
    pub normalization: NormalizationParams,
    pub model: ScoringModel,
    pub explainer: ExplainerSpec,
    /// Classifier cutoff; only meaningful for `loan_approval`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_threshold: Option<f64>,
}

impl ModelArtifact {
    /// File name of `task`'s artifact inside a model directory.
    pub fn file_name(task: TaskKind) -> &'static str {
        match task {
            TaskKind::RiskScoring => "risk_regressor.json",
            TaskKind::LoanApproval => "approval_classifier.json",
        }
    }

    /// Parse an artifact expected to hold `task`'s model.
    pub fn from_json_str(json: &str, task: TaskKind) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::ModelUnavailable {
            task,
            reason: format!("invalid artifact JSON: {e}"),
        })
    }

    /// Validate against the registry and bind the model to its schema.
    pub fn into_task_model(self, task: TaskKind) -> Result<TaskModel, PipelineError> {
        if self.task != task {
            return Err(PipelineError::ModelUnavailable {
                task,
                reason: format!("artifact is registered for '{}'", self.task),
            });
        }
        let schema = FeatureSchema::for_task(task);
        if self.schema_version != schema.version {
            return Err(PipelineError::SchemaVersionMismatch {
                expected: schema.version.to_string(),
                found: self.schema_version,
            });
        }
        if self.operating_threshold.is_some() && task != TaskKind::LoanApproval {
            log::warn!("{task}: ignoring operating_threshold on a regression artifact");
        }

        let mut model = TaskModel::new(task, self.normalization, self.model, &self.explainer)?;
        model.description = self.description;
        model.fitted_on = self.fitted_on;
        Ok(model)
    }
}
