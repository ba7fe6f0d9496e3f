//! Linear models: `raw(x) = intercept + w · x`.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearModel {
    pub fn raw_output(&self, x: &[f64]) -> f64 {
        let w = DVector::from_column_slice(&self.weights);
        let x = DVector::from_column_slice(x);
        self.intercept + w.dot(&x)
    }

    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.weights.len() != n_features {
            return Err(format!(
                "linear model has {} weights but the schema has {n_features} columns",
                self.weights.len()
            ));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err("linear model has non-finite coefficients".to_string());
        }
        Ok(())
    }
}
