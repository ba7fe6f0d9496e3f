//! Model store: the two task artifacts, loaded once at startup.
//!
//! A store directory holds `risk_regressor.json` and `approval_classifier.json`.
//! The directory is taken from `--models`, else `CREDIT_MODEL_DIR` (a `.env`
//! file is honoured), else `./models`.

use std::path::{Path, PathBuf};

use crate::domain::TaskKind;
use crate::error::PipelineError;
use crate::io::artifact::ModelArtifact;
use crate::models::TaskModel;

pub const MODEL_DIR_ENV: &str = "CREDIT_MODEL_DIR";
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Pick the model directory: explicit flag, then environment, then default.
pub fn resolve_model_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    dotenvy::dotenv().ok();
    match std::env::var(MODEL_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_MODEL_DIR),
    }
}

/// Both task models plus the classifier threshold declared by the artifact.
#[derive(Debug, Clone)]
pub struct ModelStore {
    risk: TaskModel,
    approval: TaskModel,
    operating_threshold: Option<f64>,
    source: Option<PathBuf>,
}

impl ModelStore {
    pub fn new(
        risk: TaskModel,
        approval: TaskModel,
        operating_threshold: Option<f64>,
    ) -> Result<Self, PipelineError> {
        for (model, task) in [(&risk, TaskKind::RiskScoring), (&approval, TaskKind::LoanApproval)] {
            if model.task() != task {
                return Err(PipelineError::ModelUnavailable {
                    task,
                    reason: format!("artifact is registered for '{}'", model.task()),
                });
            }
        }
        Ok(Self {
            risk,
            approval,
            operating_threshold,
            source: None,
        })
    }

    /// Load and validate both artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        let risk = read_artifact(dir, TaskKind::RiskScoring)?;
        let approval = read_artifact(dir, TaskKind::LoanApproval)?;
        let mut store = Self::from_artifacts(risk, approval)?;
        store.source = Some(dir.to_path_buf());

        log::info!(
            "loaded model store from {} ({} + {})",
            dir.display(),
            store.risk.schema.version,
            store.approval.schema.version
        );
        Ok(store)
    }

    /// Build a store from the two artifact documents.
    pub fn from_json(risk_json: &str, approval_json: &str) -> Result<Self, PipelineError> {
        let risk = ModelArtifact::from_json_str(risk_json, TaskKind::RiskScoring)?;
        let approval = ModelArtifact::from_json_str(approval_json, TaskKind::LoanApproval)?;
        Self::from_artifacts(risk, approval)
    }

    fn from_artifacts(risk: ModelArtifact, approval: ModelArtifact) -> Result<Self, PipelineError> {
        let operating_threshold = approval.operating_threshold;
        let risk = risk.into_task_model(TaskKind::RiskScoring)?;
        let approval = approval.into_task_model(TaskKind::LoanApproval)?;
        Self::new(risk, approval, operating_threshold)
    }

    pub fn risk(&self) -> &TaskModel {
        &self.risk
    }

    pub fn approval(&self) -> &TaskModel {
        &self.approval
    }

    pub fn model(&self, task: TaskKind) -> &TaskModel {
        match task {
            TaskKind::RiskScoring => &self.risk,
            TaskKind::LoanApproval => &self.approval,
        }
    }

    /// Threshold declared by the approval artifact, if any.
    pub fn operating_threshold(&self) -> Option<f64> {
        self.operating_threshold
    }

    /// Directory the store was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// `(risk, approval, operating_threshold)`.
    pub fn into_parts(self) -> (TaskModel, TaskModel, Option<f64>) {
        (self.risk, self.approval, self.operating_threshold)
    }
}

fn read_artifact(dir: &Path, task: TaskKind) -> Result<ModelArtifact, PipelineError> {
    let path = dir.join(ModelArtifact::file_name(task));
    let json = std::fs::read_to_string(&path).map_err(|e| PipelineError::ModelUnavailable {
        task,
        reason: format!("cannot read '{}': {e}", path.display()),
    })?;
    log::debug!("{task}: read artifact {}", path.display());
    ModelArtifact::from_json_str(&json, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::artifact::tests::linear_artifact_json;

    #[test]
    fn explicit_flag_wins() {
        let dir = resolve_model_dir(Some(Path::new("/opt/credit/models")));
        assert_eq!(dir, PathBuf::from("/opt/credit/models"));
    }

    #[test]
    fn missing_directory_is_model_unavailable() {
        let err = ModelStore::load(Path::new("/nonexistent/credit-models")).unwrap_err();
        match err {
            PipelineError::ModelUnavailable { task, reason } => {
                assert_eq!(task, TaskKind::RiskScoring);
                assert!(reason.contains("risk_regressor.json"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_json_builds_both_models() {
        let store = ModelStore::from_json(
            &linear_artifact_json(TaskKind::RiskScoring, "risk-v1", 30.0),
            &linear_artifact_json(TaskKind::LoanApproval, "approval-v1", 0.0),
        )
        .unwrap();
        assert_eq!(store.model(TaskKind::LoanApproval).task(), TaskKind::LoanApproval);
        assert_eq!(store.operating_threshold(), None);
        assert!(store.source().is_none());
    }

    #[test]
    fn swapped_artifacts_are_rejected() {
        let err = ModelStore::from_json(
            &linear_artifact_json(TaskKind::LoanApproval, "approval-v1", 0.0),
            &linear_artifact_json(TaskKind::RiskScoring, "risk-v1", 30.0),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ModelUnavailable { .. }));
    }
}
