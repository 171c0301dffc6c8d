use chrono::NaiveDate;
use clap::Parser;
use financing::{FinancingError, LoanRequest, Method, RateInput, SimulationRecord};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::process;

/// Loan amortization schedule under the Price or SAC method
#[derive(Parser, Debug)]
#[command(name = "financing", version, about)]
struct Cli {
    /// Amortization method: price (constant installment) or sac (constant amortization)
    #[arg(long, default_value = "price")]
    method: Method,

    /// Requested financing amount
    #[arg(long)]
    amount: f64,

    /// Down payment subtracted from the amount
    #[arg(long, default_value_t = 0.)]
    down_payment: f64,

    /// Effective monthly rate in percent
    #[arg(long, conflicts_with = "annual_rate", required_unless_present = "annual_rate")]
    monthly_rate: Option<f64>,

    /// Effective annual rate in percent
    #[arg(long)]
    annual_rate: Option<f64>,

    /// Number of monthly installments
    #[arg(long)]
    months: u32,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    first_payment: NaiveDate,

    /// Date the loan was taken (YYYY-MM-DD)
    #[arg(long)]
    operation_date: Option<NaiveDate>,

    /// Lender name shown in the summary
    #[arg(long)]
    bank: Option<String>,

    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

impl Cli {
    fn request(&self) -> LoanRequest {
        let rate = match (self.monthly_rate, self.annual_rate) {
            (Some(monthly), _) => Some(RateInput::Monthly(monthly)),
            (None, Some(annual)) => Some(RateInput::Annual(annual)),
            (None, None) => None,
        };
        LoanRequest {
            financing_amount: Some(self.amount),
            down_payment: Some(self.down_payment),
            rate,
            term: Some(self.months),
            first_payment_date: Some(self.first_payment),
            operation_date: self.operation_date,
            bank: self.bank.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = SimpleLogger::new().with_level(cli.log_level).init() {
        eprintln!("could not initialise logging: {}", err);
    }

    match SimulationRecord::compute(cli.method, &cli.request()) {
        Ok(record) => show_amortization(&record),
        Err(err) => {
            error!("simulation failed: {}", err);
            eprintln!("error: {}", err);
            let code = match err {
                FinancingError::InvalidInput { .. } => 2,
                _ => 1,
            };
            process::exit(code);
        }
    }
}

fn show_amortization(record: &SimulationRecord) {
    let rate = record.rate;
    if let Some(bank) = &record.bank {
        println!("Bank: {}", bank);
    }
    if let Some(date) = record.operation_date {
        println!("Operation date: {}", date);
    }
    println!(
        "Method: {}, principal {:.2}, monthly rate {:.4}%, annual rate {:.4}%, {} months",
        record.method,
        record.input.principal(),
        rate.monthly_percent(),
        rate.annual_percent(),
        record.input.term()
    );
    println!(
        "{:>5} {:>12} {:>14} {:>14} {:>14} {:>16}",
        "#", "Date", "Payment", "Amortization", "Interest", "Balance"
    );
    for pmt in &record.schedule {
        println!(
            "{:>5} {:>12} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
            pmt.number, pmt.date, pmt.payment, pmt.amortization, pmt.interest, pmt.balance
        );
    }
    println!("{}", record.totals);
}
