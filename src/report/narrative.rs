//! Templated explanations built from ranked drivers.
//!
//! Template choice depends only on the risk band or the decision label, and
//! the text only on driver labels, so identical inputs give identical strings.

use crate::domain::{Driver, LoanDecision, RiskBand};

/// Narrative for a risk score in `band`.
pub fn narrate_risk(band: RiskBand, drivers: &[Driver]) -> String {
    let labels = labels(drivers);
    let Some((first, rest)) = labels.split_first() else {
        return format!("{} risk.", band.display_name());
    };

    match band {
        RiskBand::Low => {
            format!("Low risk: strong {first}{}.", clause(" and solid ", rest))
        }
        RiskBand::Medium => {
            format!("Medium risk: mainly influenced by {}.", join(&labels))
        }
        RiskBand::High => {
            format!("High risk: driven by high {first}{}.", clause(" and ", rest))
        }
    }
}

/// Narrative for an approval decision.
pub fn narrate_approval(decision: LoanDecision, drivers: &[Driver]) -> String {
    let labels = labels(drivers);
    let Some((first, rest)) = labels.split_first() else {
        return match decision {
            LoanDecision::Approved => "The application was approved.".to_string(),
            LoanDecision::Denied => "The application was denied.".to_string(),
        };
    };

    match decision {
        LoanDecision::Approved => format!(
            "The application was approved mainly because of strong {first}{}.",
            clause(", along with positive effects from ", rest)
        ),
        LoanDecision::Denied => format!(
            "The application was denied mainly due to a high {first}{}.",
            clause(", as well as negative impact from ", rest)
        ),
    }
}

fn labels(drivers: &[Driver]) -> Vec<&str> {
    drivers.iter().map(|d| d.label.as_str()).collect()
}

fn clause(prefix: &str, labels: &[&str]) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("{prefix}{}", join(labels))
    }
}

/// `a`, `a and b`, `a, b and c`.
fn join(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}
