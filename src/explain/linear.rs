//! Exact attribution for linear models under feature independence.
//!
//! ```text
//! φ_i      = w_i · (x_i − μ_i)
//! baseline = intercept + w · μ
//! ```

use nalgebra::DVector;

use crate::models::LinearModel;

/// Returns `(baseline, contributions)`.
pub fn linear_shap(model: &LinearModel, feature_means: &[f64], x: &[f64]) -> (f64, Vec<f64>) {
    let w = DVector::from_column_slice(&model.weights);
    let mu = DVector::from_column_slice(feature_means);
    let x = DVector::from_column_slice(x);

    let phi = w.component_mul(&(x - &mu));
    let baseline = model.intercept + w.dot(&mu);
    (baseline, phi.as_slice().to_vec())
}
