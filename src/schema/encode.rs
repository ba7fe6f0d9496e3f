//! Feature encoding: applicant profile → `EncodedVector`.
//!
//! Fields are visited in schema order. Categorical domains are explicit, so a
//! value outside the domain (including a case mismatch like `"yes"`) is an
//! error rather than a silent zero.

use crate::domain::{ApplicantProfile, EncodedVector, RawValue};
use crate::error::PipelineError;
use crate::schema::registry::{FeatureSchema, FieldDescriptor, FieldKind};

const BINARY_DOMAIN: [&str; 2] = ["Yes", "No"];

/// Encode `profile` into the column layout of `schema`.
///
/// Attributes not named by the schema are ignored.
pub fn encode(profile: &ApplicantProfile, schema: &FeatureSchema) -> Result<EncodedVector, PipelineError> {
    let mut values = Vec::with_capacity(schema.width());

    for field in schema.fields {
        let raw = profile
            .get(field.name)
            .ok_or_else(|| PipelineError::MissingField {
                field: field.name.to_string(),
            })?;

        match field.kind {
            FieldKind::Numeric { min, max, integer } => {
                values.push(encode_numeric(field, raw, min, max, integer)?);
            }
            FieldKind::Binary => {
                let text = expect_text(field, raw, &BINARY_DOMAIN)?;
                let bit = match text {
                    "Yes" => 1.0,
                    "No" => 0.0,
                    other => return Err(invalid_categorical(field, other, &BINARY_DOMAIN)),
                };
                values.push(bit);
            }
            FieldKind::Categorical { domain, .. } => {
                let text = expect_text(field, raw, domain)?;
                let hot = domain
                    .iter()
                    .position(|v| *v == text)
                    .ok_or_else(|| invalid_categorical(field, text, domain))?;
                values.extend((0..domain.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
            }
        }
    }

    debug_assert_eq!(values.len(), schema.width());

    Ok(EncodedVector {
        schema_version: schema.version,
        values,
    })
}

fn encode_numeric(
    field: &FieldDescriptor,
    raw: &RawValue,
    min: f64,
    max: f64,
    integer: bool,
) -> Result<f64, PipelineError> {
    let &RawValue::Number(value) = raw else {
        return Err(PipelineError::InvalidFieldType {
            field: field.name.to_string(),
            expected: if integer { "an integer" } else { "a number" },
        });
    };
    if !value.is_finite() {
        return Err(PipelineError::InvalidFieldType {
            field: field.name.to_string(),
            expected: "a finite number",
        });
    }
    if integer && value.fract() != 0.0 {
        return Err(PipelineError::InvalidFieldType {
            field: field.name.to_string(),
            expected: "an integer",
        });
    }
    if value < min || value > max {
        return Err(PipelineError::OutOfRange {
            field: field.name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn expect_text<'a>(
    field: &FieldDescriptor,
    raw: &'a RawValue,
    domain: &[&str],
) -> Result<&'a str, PipelineError> {
    match raw {
        RawValue::Text(s) => Ok(s.as_str()),
        RawValue::Number(v) => Err(invalid_categorical(field, &v.to_string(), domain)),
    }
}

fn invalid_categorical(field: &FieldDescriptor, value: &str, domain: &[&str]) -> PipelineError {
    PipelineError::InvalidCategoricalValue {
        field: field.name.to_string(),
        value: value.to_string(),
        allowed: domain.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskKind;
    use proptest::prelude::*;

    fn risk_profile() -> ApplicantProfile {
        ApplicantProfile::from_pairs([
            ("EmploymentStatus", RawValue::from("Self-Employed")),
            ("MonthlyIncome", RawValue::from(5_000.0)),
            ("NetWorth", RawValue::from(50_000.0)),
            ("DebtToIncomeRatio", RawValue::from(0.5)),
            ("CreditScore", RawValue::from(600.0)),
            ("CreditCardUtilizationRate", RawValue::from(0.3)),
            ("PreviousLoanDefaults", RawValue::from("No")),
            ("BankruptcyHistory", RawValue::from("Yes")),
            ("LengthOfCreditHistory", RawValue::from(10.0)),
            ("LoanAmount", RawValue::from(10_000.0)),
            ("LoanDurationYears", RawValue::from(5.0)),
            ("InterestRate", RawValue::from(0.4)),
        ])
    }

    fn risk_schema() -> &'static FeatureSchema {
        FeatureSchema::for_task(TaskKind::RiskScoring)
    }

    #[test]
    fn encodes_risk_profile_in_schema_order() {
        let v = encode(&risk_profile(), risk_schema()).unwrap();
        assert_eq!(v.schema_version, "risk-v1");
        assert_eq!(
            v.values,
            vec![0.0, 1.0, 0.0, 5_000.0, 50_000.0, 0.5, 600.0, 0.3, 0.0, 1.0, 10.0, 10_000.0, 5.0, 0.4]
        );
    }

    #[test]
    fn credit_score_lower_bound_is_inclusive() {
        let schema = risk_schema();
        let at_min = risk_profile().with_value("CreditScore", 300.0);
        assert!(encode(&at_min, schema).is_ok());

        let below = risk_profile().with_value("CreditScore", 299.0);
        assert_eq!(
            encode(&below, schema).unwrap_err(),
            PipelineError::OutOfRange {
                field: "CreditScore".to_string(),
                value: 299.0,
                min: 300.0,
                max: 750.0,
            }
        );
    }

    #[test]
    fn debt_to_income_bounds_are_inclusive() {
        let schema = risk_schema();
        for ok in [0.0, 1.0] {
            let p = risk_profile().with_value("DebtToIncomeRatio", ok);
            assert!(encode(&p, schema).is_ok(), "{ok} should be accepted");
        }
        let p = risk_profile().with_value("DebtToIncomeRatio", 1.01);
        assert!(matches!(encode(&p, schema), Err(PipelineError::OutOfRange { .. })));
    }

    #[test]
    fn unknown_employment_status_is_rejected() {
        let p = risk_profile().with_value("EmploymentStatus", "Retired");
        match encode(&p, risk_schema()).unwrap_err() {
            PipelineError::InvalidCategoricalValue { field, value, allowed } => {
                assert_eq!(field, "EmploymentStatus");
                assert_eq!(value, "Retired");
                assert_eq!(allowed, vec!["Unemployed", "Self-Employed", "Employed"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn binary_flags_are_case_sensitive() {
        let p = risk_profile().with_value("BankruptcyHistory", "yes");
        assert!(matches!(
            encode(&p, risk_schema()),
            Err(PipelineError::InvalidCategoricalValue { .. })
        ));
    }

    #[test]
    fn numeric_flag_for_binary_field_is_rejected() {
        let p = risk_profile().with_value("PreviousLoanDefaults", 1.0);
        assert!(matches!(
            encode(&p, risk_schema()),
            Err(PipelineError::InvalidCategoricalValue { .. })
        ));
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let full = risk_profile();
        let p = ApplicantProfile::from_pairs(
            full.iter()
                .filter(|(k, _)| *k != "NetWorth")
                .map(|(k, v)| (k.to_string(), v.clone())),
        );
        assert_eq!(
            encode(&p, risk_schema()).unwrap_err(),
            PipelineError::MissingField {
                field: "NetWorth".to_string()
            }
        );
    }

    #[test]
    fn text_for_numeric_field_is_a_type_error() {
        let p = risk_profile().with_value("LoanAmount", "ten thousand");
        assert!(matches!(
            encode(&p, risk_schema()),
            Err(PipelineError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn fractional_credit_score_is_a_type_error() {
        let p = risk_profile().with_value("CreditScore", 600.5);
        assert_eq!(
            encode(&p, risk_schema()).unwrap_err(),
            PipelineError::InvalidFieldType {
                field: "CreditScore".to_string(),
                expected: "an integer",
            }
        );
    }

    #[test]
    fn extra_attributes_are_ignored() {
        let p = risk_profile().with_value("FavoriteColor", "green");
        assert!(encode(&p, risk_schema()).is_ok());
    }

    fn employment() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["Unemployed", "Self-Employed", "Employed"])
    }

    fn yes_no() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["Yes", "No"])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_valid_profiles_encode_to_schema_width(
            status in employment(),
            income in 1_250.0f64..=500_000.0,
            net_worth in 1_000.0f64..=2_603_208.0,
            dti in 0.0f64..=1.0,
            credit_score in 300u32..=750,
            utilization in 0.01f64..=1.0,
            defaults in yes_no(),
            bankruptcy in yes_no(),
            history in 1u32..=30,
            amount in 1_000.0f64..=1_000_000.0,
            duration in 1u32..=10,
            rate in 0.0f64..=1.0,
        ) {
            let profile = ApplicantProfile::from_pairs([
                ("EmploymentStatus", RawValue::from(status)),
                ("MonthlyIncome", RawValue::from(income)),
                ("NetWorth", RawValue::from(net_worth)),
                ("DebtToIncomeRatio", RawValue::from(dti)),
                ("CreditScore", RawValue::from(f64::from(credit_score))),
                ("CreditCardUtilizationRate", RawValue::from(utilization)),
                ("PreviousLoanDefaults", RawValue::from(defaults)),
                ("BankruptcyHistory", RawValue::from(bankruptcy)),
                ("LengthOfCreditHistory", RawValue::from(f64::from(history))),
                ("LoanAmount", RawValue::from(amount)),
                ("LoanDurationYears", RawValue::from(f64::from(duration))),
                ("InterestRate", RawValue::from(rate)),
            ]);
            let schema = risk_schema();
            let v = encode(&profile, schema).unwrap();
            prop_assert_eq!(v.values.len(), schema.width());

            for (idx, field) in schema.fields.iter().enumerate() {
                if let FieldKind::Categorical { .. } = field.kind {
                    let block = &v.values[schema.field_columns(idx)];
                    prop_assert_eq!(block.iter().filter(|x| **x == 1.0).count(), 1);
                    prop_assert_eq!(block.iter().sum::<f64>(), 1.0);
                }
            }
        }
    }
}
