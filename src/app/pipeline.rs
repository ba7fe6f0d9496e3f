//! Scoring pipeline shared by the CLI and library callers.
//!
//! Each operation is one synchronous pass over request-scoped data:
//! schema -> encode -> normalize -> predict -> explain -> narrate
//!
//! The loaded models are never mutated after construction, so a `Pipeline` can
//! be shared by reference across threads.

use std::path::Path;

use crate::domain::{
    ApplicantProfile, ApprovalResult, Assessment, DEFAULT_OPERATING_THRESHOLD, EncodedVector, LoanDecision,
    NormalizedVector, PipelineConfig, RiskBand, RiskResult, TaskKind,
};
use crate::error::PipelineError;
use crate::explain::top_drivers;
use crate::io::store::ModelStore;
use crate::math::normalize;
use crate::models::{ApprovalClassifier, RiskRegressor, TaskModel};
use crate::report::narrative::{narrate_approval, narrate_risk};
use crate::schema::encode;

/// Attribute the approval schema reads the risk score from.
pub const RISK_SCORE_FIELD: &str = "RiskScore";

#[derive(Debug, Clone)]
pub struct Pipeline {
    risk: RiskRegressor,
    approval: ApprovalClassifier,
    config: PipelineConfig,
}

impl Pipeline {
    /// Bind the store's models to their task adapters.
    ///
    /// The operating threshold is `config` first, then the approval artifact,
    /// then `DEFAULT_OPERATING_THRESHOLD`.
    pub fn new(store: ModelStore, config: PipelineConfig) -> Result<Self, PipelineError> {
        let (risk, approval, artifact_threshold) = store.into_parts();
        let threshold = config
            .operating_threshold
            .or(artifact_threshold)
            .unwrap_or(DEFAULT_OPERATING_THRESHOLD);

        let pipeline = Self {
            risk: RiskRegressor::new(risk)?,
            approval: ApprovalClassifier::new(approval, threshold)?,
            config,
        };
        log::debug!(
            "pipeline ready: risk explainer={}, approval explainer={}, threshold={threshold}",
            pipeline.risk.task_model().explainer.method(),
            pipeline.approval.task_model().explainer.method()
        );
        Ok(pipeline)
    }

    /// Load the model store from `dir` and build the pipeline.
    pub fn from_dir(dir: &Path, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::new(ModelStore::load(dir)?, config)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model(&self, task: TaskKind) -> &TaskModel {
        match task {
            TaskKind::RiskScoring => self.risk.task_model(),
            TaskKind::LoanApproval => self.approval.task_model(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.approval.threshold()
    }

    /// Encode and normalize `profile` for `task`'s model.
    pub fn prepare(
        &self,
        task: TaskKind,
        profile: &ApplicantProfile,
    ) -> Result<(EncodedVector, NormalizedVector), PipelineError> {
        let model = self.model(task);
        let encoded = encode(profile, model.schema)?;
        log::debug!("{task}: encoded {} columns ({})", encoded.values.len(), encoded.schema_version);
        let normalized = normalize(&encoded, &model.normalization)?;
        Ok((encoded, normalized))
    }

    /// Risk score in `[0, 100]` with its drivers and narrative.
    pub fn score_risk(&self, profile: &ApplicantProfile) -> Result<RiskResult, PipelineError> {
        let task = TaskKind::RiskScoring;
        let (_, normalized) = self.prepare(task, profile)?;

        let score = self.risk.predict_score(&normalized)?;
        let band = RiskBand::from_score(score);
        log::debug!("{task}: score={score:.3} band={}", band.display_name());

        let model = self.risk.task_model();
        let attribution = model.explain(&normalized)?;
        let drivers = top_drivers(&attribution, model.schema, self.config.risk_drivers);
        let narrative = narrate_risk(band, &drivers);

        Ok(RiskResult {
            score,
            band,
            drivers,
            narrative,
            attribution,
        })
    }

    /// Approve/deny decision with its drivers and narrative.
    ///
    /// `profile` must carry `RiskScore`; see `assess` to derive it from the
    /// risk model instead.
    pub fn decide_approval(&self, profile: &ApplicantProfile) -> Result<ApprovalResult, PipelineError> {
        let task = TaskKind::LoanApproval;
        let (_, normalized) = self.prepare(task, profile)?;

        let prediction = self.approval.predict_decision(&normalized)?;
        let decision = LoanDecision::from_label(prediction.label);
        log::debug!(
            "{task}: probability={:.4} threshold={} label={}",
            prediction.probability,
            self.threshold(),
            prediction.label
        );

        let model = self.approval.task_model();
        let attribution = model.explain(&normalized)?;
        let drivers = top_drivers(&attribution, model.schema, self.config.approval_drivers);
        let narrative = narrate_approval(decision, &drivers);

        Ok(ApprovalResult {
            decision,
            label: prediction.label,
            probability: prediction.probability,
            threshold: self.threshold(),
            drivers,
            narrative,
            attribution,
        })
    }

    /// Score risk, then decide approval using that score.
    pub fn assess(&self, profile: &ApplicantProfile) -> Result<Assessment, PipelineError> {
        let risk = self.score_risk(profile)?;
        let chained = chain_risk_score(profile, risk.score);
        let approval = self.decide_approval(&chained)?;
        Ok(Assessment { risk, approval })
    }
}

/// Copy of `profile` with `RiskScore` set to `score`.
pub fn chain_risk_score(profile: &ApplicantProfile, score: f64) -> ApplicantProfile {
    if let Some(supplied) = profile.get(RISK_SCORE_FIELD) {
        log::warn!("replacing supplied {RISK_SCORE_FIELD}={supplied} with model score {score:.3}");
    }
    profile.with_value(RISK_SCORE_FIELD, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawValue;
    use crate::explain::ExplainerSpec;
    use crate::models::model::tests::{constant_linear, identity_params};
    use crate::models::{LinearModel, ScoringModel};
    use crate::schema::FeatureSchema;

    fn profile() -> ApplicantProfile {
        ApplicantProfile::from_pairs([
            ("EmploymentStatus", RawValue::from("Employed")),
            ("MonthlyIncome", RawValue::from(5_000.0)),
            ("NetWorth", RawValue::from(50_000.0)),
            ("DebtToIncomeRatio", RawValue::from(0.5)),
            ("CreditScore", RawValue::from(600.0)),
            ("CreditCardUtilizationRate", RawValue::from(0.3)),
            ("PreviousLoanDefaults", RawValue::from("No")),
            ("BankruptcyHistory", RawValue::from("No")),
            ("LengthOfCreditHistory", RawValue::from(10.0)),
            ("LoanAmount", RawValue::from(10_000.0)),
            ("LoanDurationYears", RawValue::from(3.0)),
            ("InterestRate", RawValue::from(0.4)),
        ])
    }

    /// Approval margin = 0.1 · (50 − RiskScore), so the decision flips at 50.
    fn risk_sensitive_classifier() -> TaskModel {
        let width = FeatureSchema::for_task(TaskKind::LoanApproval).width();
        let mut weights = vec![0.0; width];
        weights[0] = -0.1;
        TaskModel::new(
            TaskKind::LoanApproval,
            identity_params(TaskKind::LoanApproval),
            ScoringModel::Linear(LinearModel { intercept: 5.0, weights }),
            &ExplainerSpec::linear(),
        )
        .unwrap()
    }

    fn pipeline(risk_score: f64, config: PipelineConfig) -> Pipeline {
        let store = ModelStore::new(
            constant_linear(TaskKind::RiskScoring, risk_score),
            risk_sensitive_classifier(),
            None,
        )
        .unwrap();
        Pipeline::new(store, config).unwrap()
    }

    #[test]
    fn score_risk_reports_band_and_two_drivers() {
        let result = pipeline(72.0, PipelineConfig::default()).score_risk(&profile()).unwrap();
        assert_eq!(result.score, 72.0);
        assert_eq!(result.band, RiskBand::High);
        assert_eq!(result.drivers.len(), 2);
        assert!(result.narrative.starts_with("High risk"));
    }

    #[test]
    fn decide_approval_requires_risk_score() {
        let err = pipeline(30.0, PipelineConfig::default())
            .decide_approval(&profile())
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingField {
                field: "RiskScore".to_string()
            }
        );
    }

    #[test]
    fn assess_feeds_model_score_into_approval() {
        let p = pipeline(30.0, PipelineConfig::default());
        // A supplied score that would deny is replaced by the model's 30.
        let assessment = p.assess(&profile().with_value("RiskScore", 95.0)).unwrap();
        assert_eq!(assessment.risk.score, 30.0);
        assert_eq!(assessment.approval.decision, LoanDecision::Approved);
        assert_eq!(assessment.approval.drivers.len(), 3);
        assert_eq!(assessment.approval.drivers[0].feature, "RiskScore");
    }

    #[test]
    fn config_threshold_overrides_default() {
        // margin 0.5 -> p ≈ 0.62
        let p = pipeline(0.0, PipelineConfig {
            operating_threshold: Some(0.7),
            ..PipelineConfig::default()
        });
        let result = p.decide_approval(&profile().with_value("RiskScore", 45.0)).unwrap();
        assert_eq!(result.threshold, 0.7);
        assert_eq!(result.label, 0);
        assert_eq!(result.decision, LoanDecision::Denied);
    }

    #[test]
    fn driver_counts_follow_config() {
        let p = pipeline(50.0, PipelineConfig {
            risk_drivers: 4,
            approval_drivers: 1,
            ..PipelineConfig::default()
        });
        assert_eq!(p.score_risk(&profile()).unwrap().drivers.len(), 4);
        let approval = p.decide_approval(&profile().with_value("RiskScore", 10.0)).unwrap();
        assert_eq!(approval.drivers.len(), 1);
    }

    #[test]
    fn request_errors_leave_pipeline_usable() {
        let p = pipeline(30.0, PipelineConfig::default());
        let bad = profile().with_value("EmploymentStatus", "Retired");
        assert!(matches!(
            p.score_risk(&bad).unwrap_err(),
            PipelineError::InvalidCategoricalValue { .. }
        ));
        assert!(p.score_risk(&profile()).is_ok());
    }
}
