//! Form-side simulation state.
//!
//! A [`Simulation`] keeps the raw field values of one form and tracks whether
//! they are usable (`Configured`) and whether a result is on screen
//! (`Computed`). Editing any field after a calculation drops the stale result;
//! a new [`Simulation::calculate`] call is required to get it back.

use crate::error::Result;
use crate::input::{FinancingInput, LoanRequest};
use crate::rate::RateInput;
use crate::schedule::{Method, Schedule};
use crate::totals::{aggregate_totals, Totals};
use chrono::NaiveDate;
use log::{debug, info};

/// Completed run, handed as one value to presentation or history storage.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationRecord {
    pub input: FinancingInput,
    /// The rate as entered, monthly or annual.
    pub rate: RateInput,
    pub method: Method,
    pub schedule: Schedule,
    pub totals: Totals,
    pub operation_date: Option<NaiveDate>,
    pub bank: Option<String>,
}

impl SimulationRecord {
    /// Validate `request`, build its schedule with `method` and aggregate it.
    pub fn compute(method: Method, request: &LoanRequest) -> Result<Self> {
        let input = request.validate()?;
        Self::from_input(method, input, request)
    }

    fn from_input(method: Method, input: FinancingInput, request: &LoanRequest) -> Result<Self> {
        let schedule = method.build(&input)?;
        let totals = aggregate_totals(&schedule);
        let rate = request
            .rate
            .unwrap_or(RateInput::Monthly(input.monthly_rate() * 100.));
        Ok(Self {
            input,
            rate,
            method,
            schedule,
            totals,
            operation_date: request.operation_date,
            bank: request.bank.clone(),
        })
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SimulationState<'a> {
    Idle,
    Configured(&'a FinancingInput),
    Computed(&'a SimulationRecord),
}

#[derive(Clone, Debug)]
pub struct Simulation {
    method: Method,
    request: LoanRequest,
    input: Option<FinancingInput>,
    result: Option<SimulationRecord>,
}

impl Simulation {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            request: LoanRequest::default(),
            input: None,
            result: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn request(&self) -> &LoanRequest {
        &self.request
    }

    pub fn state(&self) -> SimulationState<'_> {
        match (&self.result, &self.input) {
            (Some(record), _) => SimulationState::Computed(record),
            (None, Some(input)) => SimulationState::Configured(input),
            (None, None) => SimulationState::Idle,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.input.is_some()
    }

    /// Result of the last calculation, unless an input changed since.
    pub fn result(&self) -> Option<&SimulationRecord> {
        self.result.as_ref()
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
        self.refresh();
    }

    pub fn set_financing_amount(&mut self, amount: Option<f64>) {
        self.request.financing_amount = amount;
        self.refresh();
    }

    pub fn set_down_payment(&mut self, down_payment: Option<f64>) {
        self.request.down_payment = down_payment;
        self.refresh();
    }

    /// Makes the monthly field authoritative; the annual one is derived.
    pub fn set_monthly_rate(&mut self, percent: Option<f64>) {
        self.request.rate = percent.map(RateInput::Monthly);
        self.refresh();
    }

    /// Makes the annual field authoritative; the monthly one is derived.
    pub fn set_annual_rate(&mut self, percent: Option<f64>) {
        self.request.rate = percent.map(RateInput::Annual);
        self.refresh();
    }

    pub fn set_term(&mut self, months: Option<u32>) {
        self.request.term = months;
        self.refresh();
    }

    pub fn set_first_payment_date(&mut self, date: Option<NaiveDate>) {
        self.request.first_payment_date = date;
        self.refresh();
    }

    pub fn set_operation_date(&mut self, date: Option<NaiveDate>) {
        self.request.operation_date = date;
        self.refresh();
    }

    pub fn set_bank(&mut self, bank: Option<String>) {
        self.request.bank = bank;
        self.refresh();
    }

    pub fn monthly_rate_percent(&self) -> Option<f64> {
        self.request.rate.map(|rate| rate.monthly_percent())
    }

    pub fn annual_rate_percent(&self) -> Option<f64> {
        self.request.rate.map(|rate| rate.annual_percent())
    }

    pub fn financed_amount(&self) -> Option<f64> {
        self.request.financed_amount()
    }

    /// Builds the schedule and totals for the current inputs.
    pub fn calculate(&mut self) -> Result<&SimulationRecord> {
        let input = self.request.validate()?;
        let record = SimulationRecord::from_input(self.method, input, &self.request)?;
        info!(
            "{} simulation computed: {} installments, {}",
            self.method,
            record.schedule.len(),
            record.totals
        );
        let record: &SimulationRecord = self.result.insert(record);
        Ok(record)
    }

    fn refresh(&mut self) {
        self.result = None;
        self.input = match self.request.validate() {
            Ok(input) => Some(input),
            Err(err) => {
                debug!("simulation not configured: {}", err);
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{Simulation, SimulationRecord, SimulationState};
    use crate::error::{Field, FinancingError};
    use crate::input::LoanRequest;
    use crate::rate::RateInput;
    use crate::schedule::Method;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn configured(method: Method) -> Simulation {
        let mut sim = Simulation::new(method);
        sim.set_financing_amount(Some(12_000.));
        sim.set_down_payment(Some(2_000.));
        sim.set_monthly_rate(Some(1.));
        sim.set_term(Some(3));
        sim.set_first_payment_date(Some(date(2024, 1, 15)));
        sim
    }

    #[test]
    fn test_idle_until_all_fields_valid() {
        let mut sim = Simulation::new(Method::Price);
        assert_eq!(sim.state(), SimulationState::Idle);
        assert!(!sim.is_configured());

        sim.set_financing_amount(Some(12_000.));
        sim.set_monthly_rate(Some(1.));
        sim.set_term(Some(3));
        assert_eq!(sim.state(), SimulationState::Idle);

        sim.set_first_payment_date(Some(date(2024, 1, 15)));
        assert!(sim.is_configured());
        match sim.state() {
            SimulationState::Configured(input) => assert_eq!(input.principal(), 12_000.),
            other => panic!("expected configured, got {:?}", other),
        }
    }

    #[test]
    fn test_calculate_while_idle_names_field() {
        let mut sim = Simulation::new(Method::Sac);
        sim.set_financing_amount(Some(1_000.));
        sim.set_down_payment(Some(1_000.));
        match sim.calculate() {
            Err(FinancingError::InvalidInput { field, .. }) => assert_eq!(field, Field::Principal),
            other => panic!("expected invalid principal, got {:?}", other),
        }
        assert_eq!(sim.state(), SimulationState::Idle);
    }

    #[test]
    fn test_calculate_then_edit_goes_stale() {
        let mut sim = configured(Method::Sac);
        assert_eq!(sim.financed_amount(), Some(10_000.));

        let record = sim.calculate().unwrap();
        assert_eq!(record.method, Method::Sac);
        assert_eq!(record.schedule.len(), 3);
        assert_relative_eq!(record.totals.interest, 200., epsilon = 1e-9);
        assert!(sim.result().is_some());

        sim.set_term(Some(6));
        assert!(sim.result().is_none());
        assert!(matches!(sim.state(), SimulationState::Configured(_)));

        let record = sim.calculate().unwrap();
        assert_eq!(record.schedule.len(), 6);
    }

    #[test]
    fn test_edit_to_invalid_after_compute_goes_idle() {
        let mut sim = configured(Method::Price);
        sim.calculate().unwrap();
        sim.set_first_payment_date(None);
        assert_eq!(sim.state(), SimulationState::Idle);
        assert!(sim.result().is_none());
    }

    #[test]
    fn test_method_change_drops_result() {
        let mut sim = configured(Method::Price);
        sim.calculate().unwrap();
        sim.set_method(Method::Sac);
        assert!(sim.result().is_none());
        assert_eq!(sim.calculate().unwrap().schedule.method(), Method::Sac);
    }

    #[test]
    fn test_rate_fields_stay_consistent() {
        let mut sim = configured(Method::Price);
        assert_eq!(sim.monthly_rate_percent(), Some(1.));
        assert_relative_eq!(
            sim.annual_rate_percent().unwrap(),
            12.682503013196978,
            epsilon = 1e-9
        );

        sim.set_annual_rate(Some(12.));
        assert_eq!(sim.annual_rate_percent(), Some(12.));
        assert_relative_eq!(
            sim.monthly_rate_percent().unwrap(),
            0.9488792934583046,
            epsilon = 1e-9
        );
        assert_eq!(sim.request().rate, Some(RateInput::Annual(12.)));
    }

    #[test]
    fn test_record_keeps_entered_rate() {
        let mut sim = configured(Method::Sac);
        sim.set_annual_rate(Some(12.));
        let record = sim.calculate().unwrap();
        assert_eq!(record.rate, RateInput::Annual(12.));
        assert_eq!(record.rate.annual_percent(), 12.);
        assert_relative_eq!(
            record.input.monthly_rate(),
            0.009488792934583046,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_calculate_stores_result_in_state() {
        let mut sim = configured(Method::Price);
        let computed = sim.calculate().unwrap().clone();
        match sim.state() {
            SimulationState::Computed(record) => assert_eq!(record, &computed),
            other => panic!("expected computed, got {:?}", other),
        }
        assert!(sim.is_configured());
    }

    #[test]
    fn test_record_carries_metadata() {
        let mut sim = configured(Method::Price);
        sim.set_operation_date(Some(date(2023, 12, 15)));
        sim.set_bank(Some("Banco do Brasil".to_string()));
        let record = sim.calculate().unwrap().clone();
        assert_eq!(record.operation_date, Some(date(2023, 12, 15)));
        assert_eq!(record.bank.as_deref(), Some("Banco do Brasil"));
        assert_eq!(record.input.principal(), 10_000.);

        let direct = SimulationRecord::compute(Method::Price, sim.request()).unwrap();
        assert_eq!(direct, record);
    }

    #[test]
    fn test_record_compute_rejects_invalid_request() {
        let request = LoanRequest {
            financing_amount: Some(500.),
            rate: Some(RateInput::Monthly(1.)),
            term: Some(0),
            first_payment_date: Some(date(2024, 1, 15)),
            ..LoanRequest::default()
        };
        assert!(matches!(
            SimulationRecord::compute(Method::Sac, &request),
            Err(FinancingError::InvalidInput {
                field: Field::Term,
                ..
            })
        ));
    }
}
