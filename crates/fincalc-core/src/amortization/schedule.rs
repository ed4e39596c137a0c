use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{annuity_payment, in_range, percent_to_fraction, round_money};
use crate::types::*;
use crate::FinCalcResult;

use super::summary::{summarize, AmortizationSummary};

/// Repayment system used to split each installment into interest and principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmortizationSystem {
    /// SAC: equal principal repayment every period, declining installments
    #[serde(rename = "SAC", alias = "CONSTANT_AMORTIZATION", alias = "ConstantAmortization")]
    ConstantAmortization,
    /// SAF / Price: constant installment, growing principal share
    #[serde(rename = "SAF", alias = "FRENCH", alias = "French", alias = "PRICE")]
    French,
    /// SAA: interest-only installments, principal repaid at the last period
    #[serde(rename = "SAA", alias = "AMERICAN", alias = "American")]
    American,
}

impl AmortizationSystem {
    pub fn label(&self) -> &'static str {
        match self {
            AmortizationSystem::ConstantAmortization => "SAC (Constant Amortization)",
            AmortizationSystem::French => "SAF (French / Price)",
            AmortizationSystem::American => "SAA (American)",
        }
    }
}

/// Input for a loan amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    /// Amount financed
    pub principal: Money,
    /// Periodic interest rate as a percentage (1.5 = 1.5% per period)
    pub periodic_rate: Rate,
    pub number_of_periods: u32,
    pub system: AmortizationSystem,
}

/// A single period of the schedule. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    /// Balance outstanding at the start of the period
    pub outstanding_balance: Money,
    pub amortization: Money,
    pub interest: Money,
    pub installment: Money,
}

impl AmortizationRow {
    fn rounded(
        period: u32,
        balance: Money,
        amortization: Money,
        interest: Money,
        installment: Money,
    ) -> Self {
        Self {
            period,
            outstanding_balance: round_money(balance),
            amortization: round_money(amortization),
            interest: round_money(interest),
            installment: round_money(installment),
        }
    }
}

/// Full schedule with totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub system: AmortizationSystem,
    pub rows: Vec<AmortizationRow>,
    pub summary: AmortizationSummary,
}

fn validate(input: &AmortizationInput) -> FinCalcResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if input.periodic_rate <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "periodic_rate",
            "Periodic rate must be positive",
        ));
    }
    if input.number_of_periods == 0 {
        return Err(FinCalcError::invalid(
            "number_of_periods",
            "Number of periods must be at least 1",
        ));
    }
    Ok(())
}

/// Build the period-by-period schedule for a loan.
///
/// Reported amounts are rounded to cents independently; the balance carried
/// into the next period's interest is never rounded. Amounts that leave the
/// decimal range are `InvalidInput` on `principal`.
pub fn compute_schedule(input: &AmortizationInput) -> FinCalcResult<Vec<AmortizationRow>> {
    validate(input)?;

    let rate = percent_to_fraction(input.periodic_rate);
    let rows = match input.system {
        AmortizationSystem::ConstantAmortization => {
            constant_amortization(input.principal, rate, input.number_of_periods)?
        }
        AmortizationSystem::French => french(input.principal, rate, input.number_of_periods)?,
        AmortizationSystem::American => american(input.principal, rate, input.number_of_periods)?,
    };

    Ok(rows)
}

fn constant_amortization(
    principal: Money,
    rate: Rate,
    periods: u32,
) -> FinCalcResult<Vec<AmortizationRow>> {
    let amortization = principal / Decimal::from(periods);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(periods as usize);

    for period in 1..=periods {
        let interest = in_range(balance.checked_mul(rate), "principal")?;
        let installment = in_range(amortization.checked_add(interest), "principal")?;
        rows.push(AmortizationRow::rounded(
            period,
            balance,
            amortization,
            interest,
            installment,
        ));
        balance -= amortization;
    }

    Ok(rows)
}

fn french(principal: Money, rate: Rate, periods: u32) -> FinCalcResult<Vec<AmortizationRow>> {
    let installment = annuity_payment(principal, rate, periods)?;
    let mut balance = principal;
    let mut rows = Vec::with_capacity(periods as usize);

    for period in 1..=periods {
        let interest = in_range(balance.checked_mul(rate), "principal")?;
        let amortization = in_range(installment.checked_sub(interest), "principal")?;
        rows.push(AmortizationRow::rounded(
            period,
            balance,
            amortization,
            interest,
            installment,
        ));
        balance = in_range(balance.checked_sub(amortization), "principal")?;
    }

    Ok(rows)
}

fn american(principal: Money, rate: Rate, periods: u32) -> FinCalcResult<Vec<AmortizationRow>> {
    let interest = in_range(principal.checked_mul(rate), "principal")?;
    let final_installment = in_range(principal.checked_add(interest), "principal")?;

    Ok((1..=periods)
        .map(|period| {
            let (amortization, installment) = if period == periods {
                (principal, final_installment)
            } else {
                (Decimal::ZERO, interest)
            };
            AmortizationRow::rounded(period, principal, amortization, interest, installment)
        })
        .collect())
}

/// Build an amortization schedule with totals, wrapped in the standard
/// computation envelope.
pub fn build_amortization(
    input: &AmortizationInput,
) -> FinCalcResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rows = compute_schedule(input)?;
    let summary = summarize(&rows)?;

    let principal = round_money(input.principal);
    if summary.total_amortization != principal {
        warnings.push(format!(
            "Rounded amortization total {} differs from principal {} by {}",
            summary.total_amortization,
            principal,
            summary.total_amortization - principal
        ));
    }

    log::debug!(
        "{} schedule: {} periods, total paid {}",
        input.system.label(),
        rows.len(),
        summary.total_installments
    );

    let output = AmortizationOutput {
        system: input.system,
        rows,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        input.system.label(),
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "periodic_rate_pct": input.periodic_rate.to_string(),
            "number_of_periods": input.number_of_periods,
            "rounding": "each reported amount rounded to 2dp, running balance unrounded",
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sac_input() -> AmortizationInput {
        AmortizationInput {
            principal: dec!(100000),
            periodic_rate: dec!(1),
            number_of_periods: 3,
            system: AmortizationSystem::ConstantAmortization,
        }
    }

    #[test]
    fn test_sac_known_schedule() {
        let rows = compute_schedule(&sac_input()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].period, 1);
        assert_eq!(rows[0].outstanding_balance, dec!(100000));
        assert_eq!(rows[0].amortization, dec!(33333.33));
        assert_eq!(rows[0].interest, dec!(1000.00));
        assert_eq!(rows[0].installment, dec!(34333.33));

        assert_eq!(rows[1].outstanding_balance, dec!(66666.67));
        assert_eq!(rows[1].interest, dec!(666.67));
        assert_eq!(rows[1].installment, dec!(34000.00));

        assert_eq!(rows[2].outstanding_balance, dec!(33333.33));
        assert_eq!(rows[2].interest, dec!(333.33));
        assert_eq!(rows[2].installment, dec!(33666.67));
    }

    #[test]
    fn test_sac_installments_decline() {
        let rows = compute_schedule(&sac_input()).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1].installment < pair[0].installment);
            assert!(pair[1].outstanding_balance < pair[0].outstanding_balance);
        }
    }

    #[test]
    fn test_french_constant_installment() {
        let input = AmortizationInput {
            principal: dec!(1000),
            periodic_rate: dec!(10),
            number_of_periods: 2,
            system: AmortizationSystem::French,
        };
        let rows = compute_schedule(&input).unwrap();

        assert_eq!(rows[0].installment, dec!(576.19));
        assert_eq!(rows[1].installment, dec!(576.19));
        // Period 1: interest 100, amortization 476.19
        assert_eq!(rows[0].interest, dec!(100.00));
        assert_eq!(rows[0].amortization, dec!(476.19));
        // Period 2 opens at 523.81 and amortizes it entirely
        assert_eq!(rows[1].outstanding_balance, dec!(523.81));
        assert_eq!(rows[1].interest, dec!(52.38));
        assert_eq!(rows[1].amortization, dec!(523.81));
    }

    #[test]
    fn test_american_bullet() {
        let input = AmortizationInput {
            principal: dec!(5000),
            periodic_rate: dec!(2),
            number_of_periods: 4,
            system: AmortizationSystem::American,
        };
        let rows = compute_schedule(&input).unwrap();

        for row in &rows[..3] {
            assert_eq!(row.outstanding_balance, dec!(5000));
            assert_eq!(row.amortization, Decimal::ZERO);
            assert_eq!(row.interest, dec!(100));
            assert_eq!(row.installment, dec!(100));
        }
        assert_eq!(rows[3].outstanding_balance, dec!(5000));
        assert_eq!(rows[3].amortization, dec!(5000));
        assert_eq!(rows[3].installment, dec!(5100));
    }

    #[test]
    fn test_american_out_of_range_is_an_error() {
        let input = AmortizationInput {
            principal: dec!(50000000000000000000000000000),
            periodic_rate: dec!(100),
            number_of_periods: 2,
            system: AmortizationSystem::American,
        };
        assert!(matches!(
            compute_schedule(&input),
            Err(FinCalcError::InvalidInput { ref field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_sac_out_of_range_is_an_error() {
        let input = AmortizationInput {
            principal: dec!(50000000000000000000000000000),
            periodic_rate: dec!(150),
            number_of_periods: 1,
            system: AmortizationSystem::ConstantAmortization,
        };
        assert!(compute_schedule(&input).is_err());
    }

    #[test]
    fn test_zero_principal_error() {
        let mut input = sac_input();
        input.principal = Decimal::ZERO;
        assert!(compute_schedule(&input).is_err());
    }

    #[test]
    fn test_negative_rate_error() {
        let mut input = sac_input();
        input.periodic_rate = dec!(-1);
        assert!(compute_schedule(&input).is_err());
    }

    #[test]
    fn test_zero_periods_error() {
        let mut input = sac_input();
        input.number_of_periods = 0;
        assert!(matches!(
            compute_schedule(&input),
            Err(FinCalcError::InvalidInput { ref field, .. }) if field == "number_of_periods"
        ));
    }

    #[test]
    fn test_build_amortization_warns_on_rounding_drift() {
        let output = build_amortization(&sac_input()).unwrap();
        // 3 × 33333.33 = 99999.99
        assert_eq!(output.result.summary.total_amortization, dec!(99999.99));
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.methodology, "SAC (Constant Amortization)");
    }

    #[test]
    fn test_system_serde_names() {
        let sys: AmortizationSystem = serde_json::from_str("\"SAF\"").unwrap();
        assert_eq!(sys, AmortizationSystem::French);
        let sys: AmortizationSystem = serde_json::from_str("\"AMERICAN\"").unwrap();
        assert_eq!(sys, AmortizationSystem::American);
        assert_eq!(
            serde_json::to_string(&AmortizationSystem::ConstantAmortization).unwrap(),
            "\"SAC\""
        );
    }
}
