use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::amortization::{self, AmortizationInput, AmortizationSystem};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SystemArg {
    /// Constant amortization
    Sac,
    /// French / Price (constant installment)
    Saf,
    /// American (interest only, bullet repayment)
    Saa,
}

impl From<SystemArg> for AmortizationSystem {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::Sac => AmortizationSystem::ConstantAmortization,
            SystemArg::Saf => AmortizationSystem::French,
            SystemArg::Saa => AmortizationSystem::American,
        }
    }
}

/// Arguments for a loan amortization schedule
#[derive(Args)]
pub struct AmortizationArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Periodic interest rate in percent (e.g. 1.5 for 1.5% per month)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of periods
    #[arg(long)]
    pub periods: Option<u32>,

    /// Amortization system
    #[arg(long, value_enum, default_value = "sac")]
    pub system: SystemArg,

    /// Print only the totals, not every period
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
        let periods = args
            .periods
            .ok_or("--periods is required (or provide --input)")?;

        AmortizationInput {
            principal,
            periodic_rate: rate,
            number_of_periods: periods,
            system: args.system.into(),
        }
    };

    let result = amortization::build_amortization(&schedule_input)?;
    if args.summary_only {
        return Ok(serde_json::json!({
            "result": result.result.summary,
            "methodology": result.methodology,
            "warnings": result.warnings,
        }));
    }
    Ok(serde_json::to_value(result)?)
}
