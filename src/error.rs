use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FinancingError>;

/// Form field an [`FinancingError::InvalidInput`] refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    FinancingAmount,
    DownPayment,
    Principal,
    MonthlyRate,
    AnnualRate,
    Term,
    FirstPaymentDate,
    OperationDate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::FinancingAmount => "financing amount",
            Field::DownPayment => "down payment",
            Field::Principal => "principal",
            Field::MonthlyRate => "monthly rate",
            Field::AnnualRate => "annual rate",
            Field::Term => "term",
            Field::FirstPaymentDate => "first payment date",
            Field::OperationDate => "operation date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FinancingError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: Field, reason: String },

    #[error("numeric overflow while computing {context}")]
    NumericOverflow { context: String },

    #[error("{date} plus {months} months is outside the supported calendar")]
    DateOutOfRange { date: NaiveDate, months: u32 },
}

impl FinancingError {
    pub fn invalid(field: Field, reason: impl Into<String>) -> Self {
        FinancingError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn overflow(context: impl Into<String>) -> Self {
        FinancingError::NumericOverflow {
            context: context.into(),
        }
    }

    /// The input field to highlight, if the error is attributable to one.
    pub fn field(&self) -> Option<Field> {
        match self {
            FinancingError::InvalidInput { field, .. } => Some(*field),
            FinancingError::DateOutOfRange { .. } => Some(Field::FirstPaymentDate),
            FinancingError::NumericOverflow { .. } => None,
        }
    }
}
