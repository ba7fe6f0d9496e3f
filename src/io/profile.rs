//! Applicant profile input: a JSON object file and/or `Key=Value` overrides.

use std::fs::File;
use std::path::Path;

use crate::domain::{ApplicantProfile, RawValue};
use crate::error::AppError;

/// Read a profile from a JSON object such as `{"CreditScore": 600, "BankruptcyHistory": "No"}`.
pub fn read_profile_json(path: &Path) -> Result<ApplicantProfile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open profile JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid profile JSON '{}': {e}", path.display())))
}

/// Split a `Key=Value` argument.
pub fn parse_assignment(raw: &str) -> Result<(String, RawValue), AppError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(AppError::new(2, format!("Expected Key=Value, got '{raw}'.")));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::new(2, format!("Missing attribute name in '{raw}'.")));
    }
    Ok((key.to_string(), RawValue::parse(value)))
}

/// Build the request profile: file contents first, then `--set` overrides in order.
pub fn build_profile(path: Option<&Path>, assignments: &[String]) -> Result<ApplicantProfile, AppError> {
    let mut profile = match path {
        Some(path) => read_profile_json(path)?,
        None => ApplicantProfile::default(),
    };
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        profile = profile.with_value(key, value);
    }
    if profile.is_empty() {
        return Err(AppError::new(2, "No applicant attributes given (use --profile or --set)."));
    }
    Ok(profile)
}
