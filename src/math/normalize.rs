//! Pre-fitted per-column affine transform.
//!
//! ```text
//! z_i = (x_i - center_i) / scale_i
//! ```
//!
//! Parameters are bound to a schema version. Pairing them with a vector from a
//! different schema is an error even when the lengths happen to agree.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::{EncodedVector, NormalizedVector};
use crate::error::PipelineError;

/// Fitted normalization parameters (e.g. a standard scaler's mean and std).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub schema_version: String,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

impl NormalizationParams {
    /// Check the parameters against the schema they are about to be paired with.
    pub fn validate(&self, schema_version: &str, width: usize) -> Result<(), PipelineError> {
        if self.schema_version != schema_version {
            return Err(PipelineError::SchemaVersionMismatch {
                expected: schema_version.to_string(),
                found: self.schema_version.clone(),
            });
        }
        if self.center.len() != width || self.scale.len() != width {
            return Err(PipelineError::SchemaVersionMismatch {
                expected: format!("{schema_version} ({width} columns)"),
                found: format!(
                    "{} ({} centers, {} scales)",
                    self.schema_version,
                    self.center.len(),
                    self.scale.len()
                ),
            });
        }
        if let Some(idx) = self.center.iter().position(|c| !c.is_finite()) {
            return Err(PipelineError::SchemaVersionMismatch {
                expected: schema_version.to_string(),
                found: format!("{} (non-finite center at column {idx})", self.schema_version),
            });
        }
        if let Some(idx) = self.scale.iter().position(|s| !(s.is_finite() && *s != 0.0)) {
            return Err(PipelineError::SchemaVersionMismatch {
                expected: schema_version.to_string(),
                found: format!("{} (invalid scale at column {idx})", self.schema_version),
            });
        }
        Ok(())
    }
}

/// Apply `params` to `vector`.
pub fn normalize(vector: &EncodedVector, params: &NormalizationParams) -> Result<NormalizedVector, PipelineError> {
    if params.schema_version != vector.schema_version {
        return Err(PipelineError::SchemaVersionMismatch {
            expected: vector.schema_version.to_string(),
            found: params.schema_version.clone(),
        });
    }
    let n = vector.values.len();
    if params.center.len() != n || params.scale.len() != n {
        return Err(PipelineError::SchemaVersionMismatch {
            expected: format!("{} ({n} columns)", vector.schema_version),
            found: format!("{} ({} columns)", params.schema_version, params.center.len()),
        });
    }

    let x = DVector::from_column_slice(&vector.values);
    let center = DVector::from_column_slice(&params.center);
    let scale = DVector::from_column_slice(&params.scale);
    let z = (x - center).component_div(&scale);

    Ok(NormalizedVector::new(vector.schema_version, z.as_slice().to_vec()))
}
