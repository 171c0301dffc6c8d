//! Loan amortization schedules under the Price (French, constant installment)
//! and SAC (constant amortization) methods.
//!
//! The library is stateless: validate a [`LoanRequest`] or build a
//! [`FinancingInput`] directly, run one of the schedule builders and reduce the
//! result with [`aggregate_totals`]. [`Simulation`] wraps that flow in the
//! `Idle -> Configured -> Computed` state machine a form layer needs.

pub mod error;
pub mod input;
pub mod rate;
pub mod schedule;
pub mod simulation;
pub mod totals;

pub use error::{Field, FinancingError, Result};
pub use input::{FinancingInput, LoanRequest};
pub use rate::{annual_to_monthly, monthly_to_annual, RateInput};
pub use schedule::{
    build_price_schedule, build_sac_schedule, level_payment, payment_date, Installment, Method,
    PriceScheduleBuilder, SacScheduleBuilder, Schedule, ScheduleBuilder,
};
pub use simulation::{Simulation, SimulationRecord, SimulationState};
pub use totals::{aggregate_totals, Totals};
