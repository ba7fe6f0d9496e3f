//! Export a full attribution to CSV.
//!
//! One row per schema column in rank order, followed by `baseline` and
//! `raw_output` rows so the file is self-checking:
//! `baseline + Σ contribution == raw_output`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Attribution, EncodedVector};
use crate::error::AppError;
use crate::explain::ranked_columns;
use crate::schema::FeatureSchema;

/// Write the attribution table to any writer.
pub fn write_attribution<W: Write>(
    writer: W,
    schema: &FeatureSchema,
    encoded: &EncodedVector,
    attribution: &Attribution,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["rank", "feature", "label", "value", "contribution"])?;

    let columns = schema.columns();
    for (rank, idx) in ranked_columns(attribution).into_iter().enumerate() {
        let column = &columns[idx];
        let value = encoded.values[idx];
        wtr.write_record([
            (rank + 1).to_string(),
            column.name.clone(),
            column.label.clone(),
            format!("{value}"),
            format!("{:.10}", attribution.contributions[idx]),
        ])?;
    }

    let baseline = format!("{:.10}", attribution.baseline);
    let raw_output = format!("{:.10}", attribution.raw_output);
    wtr.write_record(["", "baseline", "", "", baseline.as_str()])?;
    wtr.write_record(["", "raw_output", "", "", raw_output.as_str()])?;
    wtr.flush()?;
    Ok(())
}

/// Write the attribution table to a CSV file.
pub fn write_attribution_csv(
    path: &Path,
    schema: &FeatureSchema,
    encoded: &EncodedVector,
    attribution: &Attribution,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_attribution(file, schema, encoded, attribution)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV '{}': {e}", path.display())))?;
    log::info!("wrote attribution to {}", path.display());
    Ok(())
}
