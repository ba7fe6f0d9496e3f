//! Local explanations: additive per-feature attributions and driver ranking.
//!
//! Every explainer is registered against a concrete model when the model store
//! loads, so an incompatible pairing fails at startup rather than on the first
//! request. All three methods satisfy `baseline + Σ φ = raw_output`.

pub mod linear;
pub mod permutation;
pub mod tree_shap;

use serde::{Deserialize, Serialize};

use crate::domain::{Attribution, Driver, NormalizedVector, TaskKind};
use crate::error::PipelineError;
use crate::models::ScoringModel;
use crate::schema::FeatureSchema;

pub use permutation::PermutationExplainer;

pub const METHOD_TREE_PATH: &str = "tree_path";
pub const METHOD_LINEAR: &str = "linear";
pub const METHOD_PERMUTATION: &str = "permutation";

fn default_permutations() -> usize {
    64
}

/// Explainer declaration as stored next to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerSpec {
    pub method: String,
    /// Linear explainer: reference point in normalized space (defaults to zeros).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_means: Option<Vec<f64>>,
    /// Permutation explainer: reference rows in normalized space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec<Vec<f64>>>,
    #[serde(default = "default_permutations")]
    pub permutations: usize,
    #[serde(default)]
    pub seed: u64,
}

impl ExplainerSpec {
    fn with_method(method: &str) -> Self {
        Self {
            method: method.to_string(),
            feature_means: None,
            background: None,
            permutations: default_permutations(),
            seed: 0,
        }
    }

    pub fn tree_path() -> Self {
        Self::with_method(METHOD_TREE_PATH)
    }

    pub fn linear() -> Self {
        Self::with_method(METHOD_LINEAR)
    }

    pub fn permutation(background: Vec<Vec<f64>>, permutations: usize, seed: u64) -> Self {
        Self {
            background: Some(background),
            permutations,
            seed,
            ..Self::with_method(METHOD_PERMUTATION)
        }
    }
}

/// An explainer bound to a compatible model.
#[derive(Debug, Clone, PartialEq)]
pub enum Explainer {
    /// Exact path-dependent TreeSHAP over training covers.
    TreePath,
    /// Exact linear SHAP around `feature_means`.
    Linear { feature_means: Vec<f64> },
    /// Sampling Shapley values against a background set.
    Permutation(PermutationExplainer),
}

impl Explainer {
    /// Check `spec` against `model` and build the explainer.
    pub fn register(
        spec: &ExplainerSpec,
        model: &ScoringModel,
        schema: &FeatureSchema,
    ) -> Result<Self, PipelineError> {
        let unsupported = || PipelineError::ExplainerUnsupported {
            method: spec.method.clone(),
            model: model.kind_name().to_string(),
        };
        let unavailable = |reason: String| PipelineError::ModelUnavailable {
            task: schema.task,
            reason,
        };
        let width = schema.width();

        match spec.method.as_str() {
            METHOD_TREE_PATH => match model {
                ScoringModel::TreeEnsemble(_) => Ok(Explainer::TreePath),
                _ => Err(unsupported()),
            },
            METHOD_LINEAR => match model {
                ScoringModel::Linear(_) => {
                    let feature_means = spec.feature_means.clone().unwrap_or_else(|| vec![0.0; width]);
                    if feature_means.len() != width || feature_means.iter().any(|m| !m.is_finite()) {
                        return Err(unavailable(format!(
                            "linear explainer needs {width} finite feature means, got {}",
                            feature_means.len()
                        )));
                    }
                    Ok(Explainer::Linear { feature_means })
                }
                _ => Err(unsupported()),
            },
            METHOD_PERMUTATION => {
                let background = spec.background.clone().unwrap_or_default();
                if background.is_empty() {
                    return Err(unavailable("permutation explainer needs a background set".to_string()));
                }
                if let Some(idx) = background
                    .iter()
                    .position(|row| row.len() != width || row.iter().any(|v| !v.is_finite()))
                {
                    return Err(unavailable(format!(
                        "background row {idx} is not {width} finite values"
                    )));
                }
                if spec.permutations == 0 {
                    return Err(unavailable("permutation count must be positive".to_string()));
                }
                Ok(Explainer::Permutation(PermutationExplainer {
                    background,
                    permutations: spec.permutations,
                    seed: spec.seed,
                }))
            }
            _ => Err(unsupported()),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Explainer::TreePath => METHOD_TREE_PATH,
            Explainer::Linear { .. } => METHOD_LINEAR,
            Explainer::Permutation(_) => METHOD_PERMUTATION,
        }
    }

    /// Attribution of `model`'s raw output at `vector`.
    ///
    /// `model` must be the one this explainer was registered with.
    pub fn explain(
        &self,
        model: &ScoringModel,
        vector: &NormalizedVector,
        task: TaskKind,
    ) -> Result<Attribution, PipelineError> {
        let x = vector.values();
        let (baseline, contributions) = match (self, model) {
            (Explainer::TreePath, ScoringModel::TreeEnsemble(ensemble)) => {
                (ensemble.expected_value(), tree_shap::ensemble_shap(ensemble, x))
            }
            (Explainer::Linear { feature_means }, ScoringModel::Linear(linear_model)) => {
                linear::linear_shap(linear_model, feature_means, x)
            }
            (Explainer::Permutation(explainer), model) => explainer.explain(model, x),
            _ => {
                return Err(PipelineError::ExplainerUnsupported {
                    method: self.method().to_string(),
                    model: model.kind_name().to_string(),
                });
            }
        };

        let attribution = Attribution {
            schema_version: vector.schema_version(),
            baseline,
            contributions,
            raw_output: model.raw_output(x),
        };
        log::debug!(
            "{task}: {} attribution baseline={:.4} raw={:.4} additivity_error={:.2e}",
            self.method(),
            attribution.baseline,
            attribution.raw_output,
            attribution.additivity_error()
        );
        Ok(attribution)
    }
}

/// Column indices by descending |contribution|.
///
/// Ties keep schema order, so the ranking is deterministic.
pub fn ranked_columns(attribution: &Attribution) -> Vec<usize> {
    let contributions = &attribution.contributions;
    let mut ranked: Vec<usize> = (0..contributions.len()).collect();
    ranked.sort_by(|&a, &b| contributions[b].abs().total_cmp(&contributions[a].abs()));
    ranked
}

/// The `n` largest contributions by magnitude.
pub fn top_drivers(attribution: &Attribution, schema: &FeatureSchema, n: usize) -> Vec<Driver> {
    ranked_columns(attribution)
        .into_iter()
        .take(n)
        .map(|idx| {
            let column = &schema.columns()[idx];
            Driver {
                feature: column.name.clone(),
                label: column.label.clone(),
                contribution: attribution.contributions[idx],
            }
        })
        .collect()
}
