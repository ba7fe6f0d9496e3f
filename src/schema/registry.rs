//! Fixed, versioned feature schemas for the two tasks.
//!
//! Schema order is the column order of every downstream vector: encoder output,
//! normalization parameters, model feature indices and attributions. Bounds are
//! inclusive.

use std::ops::Range;
use std::sync::LazyLock;

use serde::Serialize;

use crate::domain::TaskKind;
use crate::error::PipelineError;

pub const RISK_SCHEMA_VERSION: &str = "risk-v1";
pub const APPROVAL_SCHEMA_VERSION: &str = "approval-v1";

/// How a field is turned into numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    /// One column, copied after an inclusive range check.
    Numeric { min: f64, max: f64, integer: bool },
    /// One column: `"Yes"` → 1, `"No"` → 0.
    Binary,
    /// One-hot block, one column per domain value, in domain order.
    Categorical {
        domain: &'static [&'static str],
        labels: &'static [&'static str],
    },
}

/// One input attribute of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Number of encoded columns this field occupies.
    pub fn width(&self) -> usize {
        match self.kind {
            FieldKind::Numeric { .. } | FieldKind::Binary => 1,
            FieldKind::Categorical { domain, .. } => domain.len(),
        }
    }
}

/// One encoded column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub label: String,
    /// Index of the owning field in `FeatureSchema::fields`.
    pub field: usize,
}

/// Ordered field descriptors plus the derived column list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    pub task: TaskKind,
    pub version: &'static str,
    pub fields: &'static [FieldDescriptor],
    columns: Vec<Column>,
}

impl FeatureSchema {
    fn build(task: TaskKind, version: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        let mut columns = Vec::new();
        for (idx, field) in fields.iter().enumerate() {
            match field.kind {
                FieldKind::Numeric { .. } | FieldKind::Binary => columns.push(Column {
                    name: field.name.to_string(),
                    label: field.label.to_string(),
                    field: idx,
                }),
                FieldKind::Categorical { domain, labels } => {
                    for (value, label) in domain.iter().zip(labels.iter()) {
                        columns.push(Column {
                            name: format!("{}_{}", field.name, value),
                            label: label.to_string(),
                            field: idx,
                        });
                    }
                }
            }
        }
        Self {
            task,
            version,
            fields,
            columns,
        }
    }

    /// Schema for one of the two fixed tasks.
    pub fn for_task(task: TaskKind) -> &'static FeatureSchema {
        match task {
            TaskKind::RiskScoring => &RISK_SCHEMA,
            TaskKind::LoanApproval => &APPROVAL_SCHEMA,
        }
    }

    /// Number of encoded columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column span of the field at `field_index`.
    pub fn field_columns(&self, field_index: usize) -> Range<usize> {
        let start: usize = self.fields[..field_index].iter().map(|f| f.width()).sum();
        start..start + self.fields[field_index].width()
    }
}

/// Look up a schema by task identifier.
pub fn schema_for(task_id: &str) -> Result<&'static FeatureSchema, PipelineError> {
    let task: TaskKind = task_id.parse()?;
    Ok(FeatureSchema::for_task(task))
}

const EMPLOYMENT_STATUS: FieldDescriptor = FieldDescriptor {
    name: "EmploymentStatus",
    label: "employment status",
    kind: FieldKind::Categorical {
        domain: &["Unemployed", "Self-Employed", "Employed"],
        labels: &["unemployment", "self-employment", "employment"],
    },
};

const MONTHLY_INCOME: FieldDescriptor = FieldDescriptor {
    name: "MonthlyIncome",
    label: "monthly income",
    kind: FieldKind::Numeric {
        min: 1_250.0,
        max: 500_000.0,
        integer: false,
    },
};

const NET_WORTH: FieldDescriptor = FieldDescriptor {
    name: "NetWorth",
    label: "net worth",
    kind: FieldKind::Numeric {
        min: 1_000.0,
        max: 2_603_208.0,
        integer: false,
    },
};

const DEBT_TO_INCOME_RATIO: FieldDescriptor = FieldDescriptor {
    name: "DebtToIncomeRatio",
    label: "debt-to-income ratio",
    kind: FieldKind::Numeric {
        min: 0.0,
        max: 1.0,
        integer: false,
    },
};

const CREDIT_SCORE: FieldDescriptor = FieldDescriptor {
    name: "CreditScore",
    label: "credit score",
    kind: FieldKind::Numeric {
        min: 300.0,
        max: 750.0,
        integer: true,
    },
};

const CREDIT_CARD_UTILIZATION_RATE: FieldDescriptor = FieldDescriptor {
    name: "CreditCardUtilizationRate",
    label: "credit card utilization rate",
    kind: FieldKind::Numeric {
        min: 0.01,
        max: 1.0,
        integer: false,
    },
};

const PREVIOUS_LOAN_DEFAULTS: FieldDescriptor = FieldDescriptor {
    name: "PreviousLoanDefaults",
    label: "previous loan defaults",
    kind: FieldKind::Binary,
};

const BANKRUPTCY_HISTORY: FieldDescriptor = FieldDescriptor {
    name: "BankruptcyHistory",
    label: "bankruptcy history",
    kind: FieldKind::Binary,
};

const LENGTH_OF_CREDIT_HISTORY: FieldDescriptor = FieldDescriptor {
    name: "LengthOfCreditHistory",
    label: "length of credit history",
    kind: FieldKind::Numeric {
        min: 1.0,
        max: 30.0,
        integer: true,
    },
};

const LOAN_AMOUNT: FieldDescriptor = FieldDescriptor {
    name: "LoanAmount",
    label: "loan amount",
    kind: FieldKind::Numeric {
        min: 1_000.0,
        max: 1_000_000.0,
        integer: false,
    },
};

const LOAN_DURATION_YEARS: FieldDescriptor = FieldDescriptor {
    name: "LoanDurationYears",
    label: "loan duration",
    kind: FieldKind::Numeric {
        min: 1.0,
        max: 10.0,
        integer: true,
    },
};

const INTEREST_RATE: FieldDescriptor = FieldDescriptor {
    name: "InterestRate",
    label: "interest rate",
    kind: FieldKind::Numeric {
        min: 0.0,
        max: 1.0,
        integer: false,
    },
};

const RISK_SCORE: FieldDescriptor = FieldDescriptor {
    name: "RiskScore",
    label: "risk score",
    kind: FieldKind::Numeric {
        min: 0.0,
        max: 100.0,
        integer: false,
    },
};

const RISK_FIELDS: &[FieldDescriptor] = &[
    EMPLOYMENT_STATUS,
    MONTHLY_INCOME,
    NET_WORTH,
    DEBT_TO_INCOME_RATIO,
    CREDIT_SCORE,
    CREDIT_CARD_UTILIZATION_RATE,
    PREVIOUS_LOAN_DEFAULTS,
    BANKRUPTCY_HISTORY,
    LENGTH_OF_CREDIT_HISTORY,
    LOAN_AMOUNT,
    LOAN_DURATION_YEARS,
    INTEREST_RATE,
];

const APPROVAL_FIELDS: &[FieldDescriptor] = &[
    RISK_SCORE,
    DEBT_TO_INCOME_RATIO,
    BANKRUPTCY_HISTORY,
    CREDIT_SCORE,
    NET_WORTH,
    MONTHLY_INCOME,
    LOAN_AMOUNT,
    INTEREST_RATE,
    PREVIOUS_LOAN_DEFAULTS,
    CREDIT_CARD_UTILIZATION_RATE,
];

static RISK_SCHEMA: LazyLock<FeatureSchema> =
    LazyLock::new(|| FeatureSchema::build(TaskKind::RiskScoring, RISK_SCHEMA_VERSION, RISK_FIELDS));

static APPROVAL_SCHEMA: LazyLock<FeatureSchema> = LazyLock::new(|| {
    FeatureSchema::build(TaskKind::LoanApproval, APPROVAL_SCHEMA_VERSION, APPROVAL_FIELDS)
});
