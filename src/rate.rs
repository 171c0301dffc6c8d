//! Conversions between equivalent effective monthly and annual rates.
//!
//! Both directions take and return percentages (1.0 means 1%), matching what a
//! user types into a rate field. Builders consume a monthly fraction instead,
//! see [`RateInput::monthly_fraction`].

const MONTHS_PER_YEAR: f64 = 12.;

/// Effective annual rate equivalent to a monthly rate, compounded monthly.
pub fn monthly_to_annual(monthly_percent: f64) -> f64 {
    ((1. + monthly_percent / 100.).powf(MONTHS_PER_YEAR) - 1.) * 100.
}

/// Effective monthly rate equivalent to an annual rate.
pub fn annual_to_monthly(annual_percent: f64) -> f64 {
    ((1. + annual_percent / 100.).powf(1. / MONTHS_PER_YEAR) - 1.) * 100.
}

/// The rate as last edited by the user. Only one side is authoritative; the
/// other is always derived from it.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateInput {
    Monthly(f64),
    Annual(f64),
}

impl RateInput {
    pub fn monthly_percent(&self) -> f64 {
        match *self {
            RateInput::Monthly(percent) => percent,
            RateInput::Annual(percent) => annual_to_monthly(percent),
        }
    }

    pub fn annual_percent(&self) -> f64 {
        match *self {
            RateInput::Monthly(percent) => monthly_to_annual(percent),
            RateInput::Annual(percent) => percent,
        }
    }

    /// Monthly rate as a fraction (1% -> 0.01).
    pub fn monthly_fraction(&self) -> f64 {
        self.monthly_percent() / 100.
    }

    /// The value the user actually entered.
    pub fn entered(&self) -> f64 {
        match *self {
            RateInput::Monthly(percent) | RateInput::Annual(percent) => percent,
        }
    }
}
