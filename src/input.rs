use crate::error::{Field, FinancingError, Result};
use crate::rate::RateInput;
use chrono::NaiveDate;
use log::trace;

/// Validated parameters of one simulation run.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinancingInput {
    principal: f64,
    monthly_rate: f64,
    term: u32,
    first_payment_date: NaiveDate,
}

impl FinancingInput {
    /// `monthly_rate` is a fraction (0.01 for 1% a month), `term` a count of
    /// monthly installments.
    pub fn new(
        principal: f64,
        monthly_rate: f64,
        term: u32,
        first_payment_date: NaiveDate,
    ) -> Result<Self> {
        if !principal.is_finite() || principal <= 0. {
            return Err(FinancingError::invalid(
                Field::Principal,
                format!("must be a positive amount, got {}", principal),
            ));
        }
        if !monthly_rate.is_finite() || monthly_rate < 0. {
            return Err(FinancingError::invalid(
                Field::MonthlyRate,
                format!("must be zero or positive, got {}", monthly_rate),
            ));
        }
        if term == 0 {
            return Err(FinancingError::invalid(
                Field::Term,
                "must be at least 1 month",
            ));
        }

        Ok(Self {
            principal,
            monthly_rate,
            term,
            first_payment_date,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate
    }

    pub fn term(&self) -> u32 {
        self.term
    }

    pub fn first_payment_date(&self) -> NaiveDate {
        self.first_payment_date
    }
}

/// Raw values as collected by a simulation form. Everything is optional until
/// [`LoanRequest::validate`] is called.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanRequest {
    pub financing_amount: Option<f64>,
    /// Missing means no down payment.
    pub down_payment: Option<f64>,
    pub rate: Option<RateInput>,
    pub term: Option<u32>,
    pub first_payment_date: Option<NaiveDate>,
    pub operation_date: Option<NaiveDate>,
    pub bank: Option<String>,
}

impl LoanRequest {
    /// Requested amount minus down payment, if an amount was entered.
    pub fn financed_amount(&self) -> Option<f64> {
        self.financing_amount
            .map(|amount| amount - self.down_payment.unwrap_or(0.))
    }

    pub fn validate(&self) -> Result<FinancingInput> {
        let amount = self.financing_amount.ok_or_else(|| {
            FinancingError::invalid(Field::FinancingAmount, "is required")
        })?;
        if !amount.is_finite() || amount <= 0. {
            return Err(FinancingError::invalid(
                Field::FinancingAmount,
                format!("must be a positive amount, got {}", amount),
            ));
        }

        let down_payment = self.down_payment.unwrap_or(0.);
        if !down_payment.is_finite() || down_payment < 0. {
            return Err(FinancingError::invalid(
                Field::DownPayment,
                format!("must be zero or positive, got {}", down_payment),
            ));
        }

        let principal = amount - down_payment;
        if principal <= 0. {
            return Err(FinancingError::invalid(
                Field::Principal,
                format!(
                    "down payment {} leaves nothing to finance from {}",
                    down_payment, amount
                ),
            ));
        }

        let rate = self
            .rate
            .ok_or_else(|| FinancingError::invalid(Field::MonthlyRate, "is required"))?;
        let rate_field = match rate {
            RateInput::Monthly(_) => Field::MonthlyRate,
            RateInput::Annual(_) => Field::AnnualRate,
        };
        if !rate.entered().is_finite() || rate.entered() < 0. {
            return Err(FinancingError::invalid(
                rate_field,
                format!("must be zero or positive, got {}", rate.entered()),
            ));
        }

        let term = match self.term {
            None => return Err(FinancingError::invalid(Field::Term, "is required")),
            Some(0) => {
                return Err(FinancingError::invalid(
                    Field::Term,
                    "must be at least 1 month",
                ))
            }
            Some(term) => term,
        };

        let first_payment_date = self
            .first_payment_date
            .ok_or_else(|| FinancingError::invalid(Field::FirstPaymentDate, "is required"))?;
        if let Some(operation_date) = self.operation_date {
            if operation_date > first_payment_date {
                return Err(FinancingError::invalid(
                    Field::OperationDate,
                    format!(
                        "{} is after the first payment date {}",
                        operation_date, first_payment_date
                    ),
                ));
            }
        }

        trace!(
            "validated request: principal {}, monthly rate {}%, term {}, first payment {}",
            principal,
            rate.monthly_percent(),
            term,
            first_payment_date
        );

        FinancingInput::new(principal, rate.monthly_fraction(), term, first_payment_date)
    }
}
