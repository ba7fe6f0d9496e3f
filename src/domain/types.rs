//! Shared domain types.
//!
//! Request-scoped values (profiles, vectors, attributions, results) are created
//! and consumed within one pipeline call. Only the loaded models, schemas and
//! normalization parameters outlive a request.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Default probability cutoff for the approval classifier.
pub const DEFAULT_OPERATING_THRESHOLD: f64 = 0.5;

/// The two fixed prediction tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Regression: numeric risk score in `[0, 100]`.
    RiskScoring,
    /// Binary classification: approve / deny.
    LoanApproval,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::RiskScoring, TaskKind::LoanApproval];

    /// Stable identifier used in artifacts and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::RiskScoring => "risk_scoring",
            TaskKind::LoanApproval => "loan_approval",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            TaskKind::RiskScoring => "Risk scoring",
            TaskKind::LoanApproval => "Loan approval",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| PipelineError::UnknownTask(s.to_string()))
    }
}

/// A raw attribute value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Parse a command-line style value: numbers become `Number`, anything else `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => RawValue::Number(v),
            _ => RawValue::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// An applicant's raw attributes, keyed by attribute name.
///
/// Immutable once built; `with_value` returns a new profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantProfile {
    values: BTreeMap<String, RawValue>,
}

impl ApplicantProfile {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<RawValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    /// Copy of this profile with `name` set to `value`.
    pub fn with_value(&self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        let mut values = self.values.clone();
        values.insert(name.into(), value.into());
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Encoded feature vector in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    pub schema_version: &'static str,
    pub values: Vec<f64>,
}

/// Encoded vector after the fitted affine transform.
///
/// Carries the schema version it was produced for so that models and
/// explainers can refuse vectors from a different schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVector {
    schema_version: &'static str,
    values: Vec<f64>,
}

impl NormalizedVector {
    pub fn new(schema_version: &'static str, values: Vec<f64>) -> Self {
        Self {
            schema_version,
            values,
        }
    }

    pub fn schema_version(&self) -> &'static str {
        self.schema_version
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Additive local explanation of one prediction.
///
/// `baseline + contributions.iter().sum()` reconstructs `raw_output`: the
/// unclamped regression value, or the positive-class margin of a classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub schema_version: &'static str,
    pub baseline: f64,
    pub contributions: Vec<f64>,
    pub raw_output: f64,
}

impl Attribution {
    /// `baseline + Σ contributions`.
    pub fn reconstructed(&self) -> f64 {
        self.baseline + self.contributions.iter().sum::<f64>()
    }

    /// Relative additivity error against the model's raw output.
    pub fn additivity_error(&self) -> f64 {
        let scale = self.raw_output.abs().max(1.0);
        (self.reconstructed() - self.raw_output).abs() / scale
    }
}

/// A ranked contributor to a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    /// Schema column name, e.g. `DebtToIncomeRatio`.
    pub feature: String,
    /// Lower-case, human-readable form used in narratives.
    pub label: String,
    pub contribution: f64,
}

/// Risk score bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Low `< 40`, Medium `[40, 70)`, High `>= 70`.
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            RiskBand::Low
        } else if score < 70.0 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        }
    }
}

/// Approval outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoanDecision {
    Approved,
    Denied,
}

impl LoanDecision {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            LoanDecision::Approved
        } else {
            LoanDecision::Denied
        }
    }
}

/// Classifier output at the operating threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    /// `1` iff `probability >= threshold`.
    pub label: u8,
    /// Probability of the positive (approved) class.
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskResult {
    pub score: f64,
    pub band: RiskBand,
    pub drivers: Vec<Driver>,
    pub narrative: String,
    pub attribution: Attribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalResult {
    pub decision: LoanDecision,
    pub label: u8,
    pub probability: f64,
    pub threshold: f64,
    pub drivers: Vec<Driver>,
    pub narrative: String,
    pub attribution: Attribution,
}

/// Risk score chained into the approval decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub risk: RiskResult,
    pub approval: ApprovalResult,
}

/// Pipeline-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Overrides the classifier's operating threshold when set.
    pub operating_threshold: Option<f64>,
    /// Number of drivers named by the risk narrative.
    pub risk_drivers: usize,
    /// Number of drivers named by the approval narrative.
    pub approval_drivers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            operating_threshold: None,
            risk_drivers: 2,
            approval_drivers: 3,
        }
    }
}
