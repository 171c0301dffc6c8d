use crate::schedule::{Installment, Schedule};
use std::fmt;

/// Column sums of a schedule.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Totals {
    pub payment: f64,
    pub amortization: f64,
    pub interest: f64,
}

impl Totals {
    pub fn from_installments(installments: &[Installment]) -> Self {
        installments
            .iter()
            .fold(Totals::default(), |acc, installment| Totals {
                payment: acc.payment + installment.payment,
                amortization: acc.amortization + installment.amortization,
                interest: acc.interest + installment.interest,
            })
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total payment {:.2}, total amortization {:.2}, total interest {:.2}",
            self.payment, self.amortization, self.interest
        )
    }
}

pub fn aggregate_totals(schedule: &Schedule) -> Totals {
    Totals::from_installments(schedule.installments())
}

#[cfg(test)]
mod tests {
    use super::{aggregate_totals, Totals};
    use crate::input::FinancingInput;
    use crate::schedule::{build_price_schedule, build_sac_schedule, Installment};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use test_log::test;

    fn three_month_loan() -> FinancingInput {
        FinancingInput::new(10_000., 0.01, 3, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .unwrap()
    }

    #[test]
    fn test_empty_totals_are_zero() {
        let totals = Totals::from_installments(&[]);
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.payment, 0.);
        assert_eq!(totals.amortization, 0.);
        assert_eq!(totals.interest, 0.);
    }

    #[test]
    fn test_sums_each_column() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let installments = [
            Installment {
                number: 1,
                date,
                payment: 60.,
                amortization: 50.,
                interest: 10.,
                balance: 50.,
            },
            Installment {
                number: 2,
                date,
                payment: 55.,
                amortization: 50.,
                interest: 5.,
                balance: 0.,
            },
        ];
        let totals = Totals::from_installments(&installments);
        assert_eq!(totals.payment, 115.);
        assert_eq!(totals.amortization, 100.);
        assert_eq!(totals.interest, 15.);
    }

    #[test]
    fn test_sac_totals() {
        let totals = aggregate_totals(&build_sac_schedule(&three_month_loan()).unwrap());
        assert_abs_diff_eq!(totals.amortization, 10_000., epsilon = 1e-9);
        assert_abs_diff_eq!(totals.interest, 200., epsilon = 1e-9);
        assert_abs_diff_eq!(totals.payment, 10_200., epsilon = 1e-9);
        assert_eq!(
            totals.to_string(),
            "total payment 10200.00, total amortization 10000.00, total interest 200.00"
        );
    }

    #[test]
    fn test_price_totals() {
        let schedule = build_price_schedule(&three_month_loan()).unwrap();
        let totals = schedule.totals();
        assert_eq!(totals, aggregate_totals(&schedule));
        assert_abs_diff_eq!(totals.amortization, 10_000., epsilon = 1e-8);
        assert_abs_diff_eq!(totals.payment, 3. * schedule.first().unwrap().payment, epsilon = 1e-8);
        assert_abs_diff_eq!(totals.interest, totals.payment - 10_000., epsilon = 1e-8);
    }
}
