use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::appraisal::{self, AppraisalInput};
use fincalc_core::CashFlow;

use crate::input;

/// Arguments for an investment appraisal
#[derive(Args)]
pub struct AppraisalArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial investment (positive amount)
    #[arg(long)]
    pub investment: Option<Decimal>,

    /// Discount rate per period in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Cash flows for periods 1..N (comma-separated, e.g. "500,500,-100,700")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Residual (salvage) value
    #[arg(long)]
    pub residual_value: Option<Decimal>,

    /// Period at which the residual value is received
    #[arg(long)]
    pub residual_period: Option<u32>,
}

pub fn run_appraisal(args: AppraisalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let appraisal_input: AppraisalInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let investment = args
            .investment
            .ok_or("--investment is required (or provide --input)")?;
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
        let amounts = args
            .cash_flows
            .ok_or("--cash-flows is required (or provide --input)")?;

        AppraisalInput {
            initial_investment: investment,
            discount_rate: rate,
            cash_flows: amounts
                .into_iter()
                .enumerate()
                .map(|(i, amount)| CashFlow::new(i as u32 + 1, amount))
                .collect(),
            residual_value: args.residual_value.unwrap_or(Decimal::ZERO),
            residual_period: args.residual_period.unwrap_or(0),
        }
    };

    let result = appraisal::appraise_investment(&appraisal_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for generating a blank cash-flow series
#[derive(Args)]
pub struct CashFlowsArgs {
    /// Project horizon in periods
    #[arg(long)]
    pub horizon: u32,
}

pub fn run_cash_flows(args: CashFlowsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flows = appraisal::blank_cash_flows(args.horizon)?;
    Ok(serde_json::to_value(flows)?)
}
