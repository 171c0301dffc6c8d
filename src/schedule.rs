use crate::error::{FinancingError, Result};
use crate::input::FinancingInput;
use crate::totals::{aggregate_totals, Totals};
use chrono::{Months, NaiveDate};
use log::{debug, trace, warn};
use std::{fmt, str::FromStr};

// residual Price balances above one cent are worth a warning
const RESIDUAL_WARN_THRESHOLD: f64 = 0.01;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// French method: constant installment.
    Price,
    /// Constant amortization, declining installment.
    Sac,
}

impl Method {
    pub fn build(&self, input: &FinancingInput) -> Result<Schedule> {
        match self {
            Method::Price => PriceScheduleBuilder.build(input),
            Method::Sac => SacScheduleBuilder.build(input),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Price => f.write_str("price"),
            Method::Sac => f.write_str("sac"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" | "french" => Ok(Method::Price),
            "sac" | "constant" => Ok(Method::Sac),
            other => Err(format!("unknown amortization method '{}'", other)),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Installment {
    /// 1-based position in the schedule.
    pub number: u32,
    pub date: NaiveDate,
    pub payment: f64,
    pub amortization: f64,
    pub interest: f64,
    /// Outstanding principal after this installment.
    pub balance: f64,
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "installment {}, date {}, payment {:.2}, amortization {:.2}, interest {:.2}, balance {:.2}",
            self.number, self.date, self.payment, self.amortization, self.interest, self.balance
        )
    }
}

/// Ordered installments of one simulation run. Read-only once built.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    method: Method,
    installments: Vec<Installment>,
}

impl Schedule {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn installments(&self) -> &[Installment] {
        &self.installments
    }

    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Installment> {
        self.installments.iter()
    }

    pub fn first(&self) -> Option<&Installment> {
        self.installments.first()
    }

    pub fn last(&self) -> Option<&Installment> {
        self.installments.last()
    }

    /// Installment by its 1-based number.
    pub fn get(&self, number: u32) -> Option<&Installment> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.installments.get(index)
    }

    pub fn totals(&self) -> Totals {
        aggregate_totals(self)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Installment;
    type IntoIter = std::slice::Iter<'a, Installment>;

    fn into_iter(self) -> Self::IntoIter {
        self.installments.iter()
    }
}

/// Common calling convention of the two amortization engines.
pub trait ScheduleBuilder {
    fn build(&self, input: &FinancingInput) -> Result<Schedule>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PriceScheduleBuilder;

#[derive(Clone, Copy, Debug, Default)]
pub struct SacScheduleBuilder;

impl ScheduleBuilder for PriceScheduleBuilder {
    fn build(&self, input: &FinancingInput) -> Result<Schedule> {
        let principal = input.principal();
        let rate = input.monthly_rate();
        let term = input.term();
        debug!(
            "price schedule: principal {}, monthly rate {}, term {}, first payment {}",
            principal,
            rate,
            term,
            input.first_payment_date()
        );

        // last due date first, so an unreachable term fails before allocating
        payment_date(input.first_payment_date(), term)?;
        let pmt = level_payment(principal, rate, term)?;
        let mut installments = Vec::with_capacity(term as usize);
        let mut balance = principal;

        for number in 1..=term {
            let interest = balance * rate;
            let amortization = pmt - interest;
            balance -= amortization;
            trace!(
                "price # {}, interest {}, amortization {}, balance {}",
                number,
                interest,
                amortization,
                balance
            );

            installments.push(Installment {
                number,
                date: payment_date(input.first_payment_date(), number)?,
                payment: pmt,
                amortization,
                interest,
                balance: finite(balance, "price balance")?,
            });
        }

        if balance.abs() > RESIDUAL_WARN_THRESHOLD {
            warn!("price schedule ends with residual balance {}", balance);
        }

        Ok(Schedule {
            method: Method::Price,
            installments,
        })
    }
}

impl ScheduleBuilder for SacScheduleBuilder {
    fn build(&self, input: &FinancingInput) -> Result<Schedule> {
        let principal = input.principal();
        let rate = input.monthly_rate();
        let term = input.term();
        debug!(
            "sac schedule: principal {}, monthly rate {}, term {}, first payment {}",
            principal,
            rate,
            term,
            input.first_payment_date()
        );

        payment_date(input.first_payment_date(), term)?;
        let n = f64::from(term);
        let amortization = finite(principal / n, "sac amortization")?;
        let mut installments = Vec::with_capacity(term as usize);
        let mut begin_balance = principal;

        for number in 1..=term {
            let interest = begin_balance * rate;
            let payment = finite(amortization + interest, "sac payment")?;
            // scaled from the principal so the last balance is exactly zero
            let balance = principal * f64::from(term - number) / n;
            trace!(
                "sac # {}, interest {}, payment {}, balance {}",
                number,
                interest,
                payment,
                balance
            );

            installments.push(Installment {
                number,
                date: payment_date(input.first_payment_date(), number)?,
                payment,
                amortization,
                interest,
                balance,
            });
            begin_balance = balance;
        }

        Ok(Schedule {
            method: Method::Sac,
            installments,
        })
    }
}

pub fn build_price_schedule(input: &FinancingInput) -> Result<Schedule> {
    PriceScheduleBuilder.build(input)
}

pub fn build_sac_schedule(input: &FinancingInput) -> Result<Schedule> {
    SacScheduleBuilder.build(input)
}

/// Constant Price installment `P * r(1+r)^n / ((1+r)^n - 1)`.
///
/// The growth `(1+r)^n - 1` is evaluated as `exp_m1(n * ln_1p(r))` so tiny
/// rates keep their precision. A zero rate falls back to `P / n`. Fails with
/// [`FinancingError::NumericOverflow`] when `(1+r)^n` is not representable.
pub fn level_payment(principal: f64, monthly_rate: f64, term: u32) -> Result<f64> {
    let n = f64::from(term);
    if monthly_rate == 0. {
        return finite(principal / n, "price level payment");
    }

    let growth = finite(
        (n * monthly_rate.ln_1p()).exp_m1(),
        "(1 + r)^n for the price payment",
    )?;

    finite(
        principal * (monthly_rate * (1. + growth)) / growth,
        "price level payment",
    )
}

/// Due date of installment `number` (1-based): the first payment date plus
/// `number - 1` calendar months, always counted from the first date. Days that
/// do not exist in the target month clamp to its last day, so Jan 31 is
/// followed by Feb 29 (2024) and then Mar 31.
pub fn payment_date(first_payment_date: NaiveDate, number: u32) -> Result<NaiveDate> {
    let months = number.saturating_sub(1);
    first_payment_date
        .checked_add_months(Months::new(months))
        .ok_or(FinancingError::DateOutOfRange {
            date: first_payment_date,
            months,
        })
}

fn finite(value: f64, context: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FinancingError::overflow(context))
    }
}
