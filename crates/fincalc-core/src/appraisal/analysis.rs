use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{fraction_to_percent, percent_to_fraction, round_money};
use crate::types::*;
use crate::FinCalcResult;

use super::irr::{solve_irr, IrrSolution, MAX_IRR_ITERATIONS};
use super::npv::{discount_rows, AppraisalRow};
use super::payback::discounted_payback;

/// Input for an investment appraisal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalInput {
    /// Up-front outlay, entered as a positive amount
    pub initial_investment: Money,
    /// Discount rate per period as a percentage (10 = 10%)
    pub discount_rate: Rate,
    pub cash_flows: Vec<CashFlow>,
    /// Salvage value received at `residual_period`; ignored when zero
    #[serde(default)]
    pub residual_value: Money,
    #[serde(default)]
    pub residual_period: u32,
}

impl AppraisalInput {
    pub fn rate_fraction(&self) -> Rate {
        percent_to_fraction(self.discount_rate)
    }

    /// The residual value as a cash flow, when one applies.
    pub fn residual_flow(&self) -> Option<CashFlow> {
        (self.residual_value > Decimal::ZERO && self.residual_period > 0)
            .then(|| CashFlow::new(self.residual_period, self.residual_value))
    }

    /// Regular flows in input order, followed by the residual flow if any.
    pub fn discounted_flows(&self) -> Vec<CashFlow> {
        let mut flows = self.cash_flows.clone();
        flows.extend(self.residual_flow());
        flows
    }

    /// Same appraisal with one cash flow amount replaced.
    pub fn with_cash_flow(&self, index: usize, amount: Money) -> FinCalcResult<Self> {
        Ok(Self {
            cash_flows: super::cash_flows::replace_cash_flow(&self.cash_flows, index, amount)?,
            ..self.clone()
        })
    }

    /// Same appraisal with one cash flow removed and periods renumbered.
    pub fn without_cash_flow(&self, index: usize) -> FinCalcResult<Self> {
        Ok(Self {
            cash_flows: super::cash_flows::remove_cash_flow(&self.cash_flows, index)?,
            ..self.clone()
        })
    }

    fn validate(&self) -> FinCalcResult<()> {
        if self.initial_investment <= Decimal::ZERO {
            return Err(FinCalcError::invalid(
                "initial_investment",
                "Initial investment must be positive",
            ));
        }
        if self.discount_rate <= Decimal::ZERO {
            return Err(FinCalcError::invalid(
                "discount_rate",
                "Discount rate must be positive",
            ));
        }
        if self.cash_flows.is_empty() {
            return Err(FinCalcError::invalid(
                "cash_flows",
                "At least one cash flow is required",
            ));
        }
        if let Some(pos) = self.cash_flows.iter().position(|cf| cf.period == 0) {
            return Err(FinCalcError::invalid(
                "cash_flows",
                format!("Cash flow #{} has period 0; periods start at 1", pos + 1),
            ));
        }
        if self.residual_value < Decimal::ZERO {
            return Err(FinCalcError::invalid(
                "residual_value",
                "Residual value cannot be negative",
            ));
        }
        if self.residual_value > Decimal::ZERO && self.residual_period == 0 {
            return Err(FinCalcError::invalid(
                "residual_period",
                "A residual value requires a residual period of at least 1",
            ));
        }
        Ok(())
    }
}

/// Headline appraisal figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppraisalResult {
    /// NPV at the discount rate, rounded to 2dp
    pub net_present_value: Money,
    /// IRR as a percentage rounded to 2dp; absent if the search did not converge
    pub internal_rate_of_return: Option<Rate>,
    /// Periods needed to recover the investment; absent if never recovered
    pub discounted_payback: Option<Periods>,
}

/// Full appraisal: discounted rows, headline figures and solver diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalOutput {
    pub rows: Vec<AppraisalRow>,
    #[serde(flatten)]
    pub result: AppraisalResult,
    pub irr_iterations: u32,
}

fn evaluate(
    input: &AppraisalInput,
) -> FinCalcResult<(Vec<AppraisalRow>, AppraisalResult, IrrSolution)> {
    input.validate()?;

    let (rows, cumulative) = discount_rows(input)?;
    let payback = discounted_payback(input.initial_investment, &rows);
    let irr = solve_irr(input);

    let result = AppraisalResult {
        net_present_value: round_money(cumulative),
        internal_rate_of_return: irr.rate.and_then(fraction_to_percent).map(round_money),
        discounted_payback: payback,
    };

    Ok((rows, result, irr))
}

/// Discount the cash flows and compute NPV, discounted payback and IRR.
pub fn compute_appraisal(
    input: &AppraisalInput,
) -> FinCalcResult<(Vec<AppraisalRow>, AppraisalResult)> {
    let (rows, result, _) = evaluate(input)?;
    Ok((rows, result))
}

/// Investment appraisal wrapped in the standard computation envelope, with
/// IRR diagnostics and warnings for absent results.
pub fn appraise_investment(
    input: &AppraisalInput,
) -> FinCalcResult<ComputationOutput<AppraisalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (rows, result, irr) = evaluate(input)?;

    if !irr.converged() {
        warnings.push(format!(
            "IRR did not converge (stopped after {} of {MAX_IRR_ITERATIONS} Newton-Raphson iterations)",
            irr.iterations
        ));
    }
    if result.discounted_payback.is_none() {
        warnings.push("Initial investment is not recovered within the cash-flow horizon".into());
    }
    if let Some(residual) = input.residual_flow() {
        let last_regular = input.cash_flows.iter().map(|cf| cf.period).max().unwrap_or(0);
        if residual.period < last_regular {
            warnings.push(format!(
                "Residual value at period {} is listed after cash flows up to period {last_regular}; payback walks rows in listed order",
                residual.period
            ));
        }
    }
    if input
        .cash_flows
        .windows(2)
        .any(|pair| pair[1].period <= pair[0].period)
    {
        warnings.push("Cash flow periods are not strictly ascending".into());
    }

    let output = AppraisalOutput {
        rows,
        result,
        irr_iterations: irr.iterations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discounted Cash Flow Appraisal (NPV, Newton-Raphson IRR, Discounted Payback)",
        &serde_json::json!({
            "initial_investment": input.initial_investment.to_string(),
            "discount_rate_pct": input.discount_rate.to_string(),
            "cash_flow_count": input.cash_flows.len(),
            "residual_value": input.residual_value.to_string(),
            "residual_period": input.residual_period,
        }),
        warnings,
        elapsed,
        output,
    ))
}
