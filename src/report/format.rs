//! Formatted terminal output for results, schemas and loaded models.
//!
//! Formatting lives here so the pipeline code only produces values and the
//! printed layout can change in one place.

use crate::domain::{ApprovalResult, Assessment, Driver, RiskResult};
use crate::models::{ScoringModel, TaskModel};
use crate::schema::{FeatureSchema, FieldKind};

/// Risk score, band, narrative and drivers.
pub fn format_risk_result(result: &RiskResult) -> String {
    let mut out = String::new();

    out.push_str("=== Risk score ===\n");
    out.push_str(&format!("Score: {:.2} / 100 ({} risk)\n", result.score, result.band.display_name()));
    out.push_str(&format!(
        "Raw output: {:.4} | baseline {:.4}\n",
        result.attribution.raw_output, result.attribution.baseline
    ));
    out.push_str(&format!("{}\n", result.narrative));
    out.push('\n');
    out.push_str("Top drivers:\n");
    out.push_str(&format_drivers(&result.drivers));

    out
}

/// Decision, probability, narrative and drivers.
pub fn format_approval_result(result: &ApprovalResult) -> String {
    let mut out = String::new();

    out.push_str("=== Loan approval ===\n");
    out.push_str(&format!("Decision: {:?} (label={})\n", result.decision, result.label));
    out.push_str(&format!(
        "Approval probability: {:.2}% | threshold {:.2}%\n",
        result.probability * 100.0,
        result.threshold * 100.0
    ));
    out.push_str(&format!("{}\n", result.narrative));
    out.push('\n');
    out.push_str("Top drivers (toward approval):\n");
    out.push_str(&format_drivers(&result.drivers));

    out
}

pub fn format_assessment(assessment: &Assessment) -> String {
    let mut out = format_risk_result(&assessment.risk);
    out.push('\n');
    out.push_str(&format_approval_result(&assessment.approval));
    out
}

fn format_drivers(drivers: &[Driver]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>4} {:<28} {:>14}\n", "rank", "feature", "contribution").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<28} {:-<14}\n", "", "", "").trim_end());
    out.push('\n');

    for (i, d) in drivers.iter().enumerate() {
        out.push_str(
            format!("{:>4} {:<28} {:>+14.4}\n", i + 1, truncate(&d.feature, 28), d.contribution).trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Field table for one schema.
pub fn format_schema(schema: &FeatureSchema) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== {} schema ({}, {} columns) ===\n",
        schema.task.display_name(),
        schema.version,
        schema.width()
    ));
    out.push_str(format!("{:<26} {:<10} {:<40}\n", "field", "kind", "domain").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<26} {:-<10} {:-<40}\n", "", "", "").trim_end());
    out.push('\n');

    for field in schema.fields {
        let (kind, domain) = match field.kind {
            FieldKind::Numeric { min, max, integer } => {
                let kind = if integer { "integer" } else { "number" };
                (kind, format!("[{min}, {max}]"))
            }
            FieldKind::Binary => ("binary", "Yes | No".to_string()),
            FieldKind::Categorical { domain, .. } => ("category", domain.join(" | ")),
        };
        out.push_str(format!("{:<26} {:<10} {:<40}\n", field.name, kind, domain).trim_end());
        out.push('\n');
    }
    out
}

/// One block per loaded model.
pub fn format_models(models: &[&TaskModel], threshold: f64) -> String {
    let mut out = String::new();

    out.push_str("=== Loaded models ===\n");
    for model in models {
        out.push_str(&format!("{} ({})\n", model.task().display_name(), model.task()));
        out.push_str(&format!("- schema    : {}\n", model.schema.version));
        out.push_str(&format!("- model     : {}\n", describe_model(&model.model)));
        out.push_str(&format!("- explainer : {}\n", model.explainer.method()));
        if let Some(date) = model.fitted_on {
            out.push_str(&format!("- fitted on : {date}\n"));
        }
        if let Some(description) = &model.description {
            out.push_str(&format!("- notes     : {description}\n"));
        }
        if model.task() == crate::domain::TaskKind::LoanApproval {
            out.push_str(&format!("- threshold : {threshold:.3}\n"));
        }
    }
    out
}

fn describe_model(model: &ScoringModel) -> String {
    match model {
        ScoringModel::TreeEnsemble(m) => format!(
            "tree_ensemble, {} trees, max depth {}, base {:.4}",
            m.trees.len(),
            m.max_depth(),
            m.base_score
        ),
        ScoringModel::Linear(m) => format!("linear, {} weights, intercept {:.4}", m.weights.len(), m.intercept),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attribution, LoanDecision, RiskBand, TaskKind};
    use crate::models::model::tests::constant_linear;

    fn drivers() -> Vec<Driver> {
        vec![
            Driver {
                feature: "CreditScore".to_string(),
                label: "credit score".to_string(),
                contribution: -6.25,
            },
            Driver {
                feature: "DebtToIncomeRatio".to_string(),
                label: "debt-to-income ratio".to_string(),
                contribution: 3.5,
            },
        ]
    }

    fn attribution() -> Attribution {
        Attribution {
            schema_version: "risk-v1",
            baseline: 50.0,
            contributions: vec![-6.25, 3.5],
            raw_output: 47.25,
        }
    }

    #[test]
    fn risk_result_lists_score_and_drivers() {
        let text = format_risk_result(&RiskResult {
            score: 47.25,
            band: RiskBand::Medium,
            drivers: drivers(),
            narrative: "Medium risk: mainly influenced by credit score and debt-to-income ratio.".to_string(),
            attribution: attribution(),
        });
        assert!(text.contains("Score: 47.25 / 100 (Medium risk)"));
        assert!(text.contains("CreditScore"));
        assert!(text.contains("-6.2500"));
        assert!(text.contains("+3.5000"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn approval_result_shows_probability_and_threshold() {
        let text = format_approval_result(&ApprovalResult {
            decision: LoanDecision::Denied,
            label: 0,
            probability: 0.4751,
            threshold: 0.5,
            drivers: drivers(),
            narrative: "The application was denied.".to_string(),
            attribution: attribution(),
        });
        assert!(text.contains("Decision: Denied (label=0)"));
        assert!(text.contains("47.51%"));
        assert!(text.contains("threshold 50.00%"));
    }

    #[test]
    fn schema_table_shows_domains() {
        let text = format_schema(FeatureSchema::for_task(TaskKind::RiskScoring));
        assert!(text.contains("risk-v1, 14 columns"));
        assert!(text.contains("Unemployed | Self-Employed | Employed"));
        assert!(text.contains("[300, 750]"));
    }

    #[test]
    fn models_summary_names_explainer() {
        let risk = constant_linear(TaskKind::RiskScoring, 10.0);
        let approval = constant_linear(TaskKind::LoanApproval, 0.0);
        let text = format_models(&[&risk, &approval], 0.5);
        assert!(text.contains("linear, 14 weights"));
        assert!(text.contains("- explainer : linear"));
        assert_eq!(text.matches("- threshold : 0.500").count(), 1);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("CreditCardUtilizationRate", 10), "CreditCar.");
        assert_eq!(truncate("NetWorth", 10), "NetWorth");
    }
}
