use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{
    discount_factor, in_range, present_value_factor, round_factor, round_money,
};
use crate::types::*;
use crate::FinCalcResult;

use super::analysis::AppraisalInput;

/// One discounted cash flow. The residual value, when present, is the last row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppraisalRow {
    pub period: u32,
    pub cash_flow: Money,
    /// (1 + r)^period, rounded to 6dp; `Decimal::MAX` past the decimal range
    pub discount_factor: Decimal,
    /// Rounded to 2dp
    pub present_value: Money,
    /// Running NPV including the initial outlay, rounded to 2dp
    pub cumulative_present_value: Money,
}

/// Discount every flow (residual last) at the input's discount rate.
///
/// Present values use (1 + r)^−p directly, so a far-off flow discounts to
/// zero rather than failing.
///
/// Returns the rows together with the unrounded final cumulative value. The
/// running total accumulates unrounded present values; only the reported
/// columns are rounded.
pub fn discount_rows(input: &AppraisalInput) -> FinCalcResult<(Vec<AppraisalRow>, Money)> {
    let rate = input.rate_fraction();
    let flows = input.discounted_flows();

    let mut cumulative = -input.initial_investment;
    let mut rows = Vec::with_capacity(flows.len());

    for flow in &flows {
        let factor = discount_factor(rate, flow.period)?;
        let present_value = in_range(
            flow.amount.checked_mul(present_value_factor(rate, flow.period)?),
            "cash_flows",
        )?;
        cumulative = in_range(cumulative.checked_add(present_value), "cash_flows")?;

        rows.push(AppraisalRow {
            period: flow.period,
            cash_flow: flow.amount,
            discount_factor: round_factor(factor),
            present_value: round_money(present_value),
            cumulative_present_value: round_money(cumulative),
        });
    }

    Ok((rows, cumulative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> AppraisalInput {
        AppraisalInput {
            initial_investment: dec!(1000),
            discount_rate: dec!(10),
            cash_flows: vec![
                CashFlow::new(1, dec!(500)),
                CashFlow::new(2, dec!(500)),
                CashFlow::new(3, dec!(500)),
            ],
            residual_value: Decimal::ZERO,
            residual_period: 0,
        }
    }

    #[test]
    fn test_rows_are_rounded_per_column() {
        let (rows, npv) = discount_rows(&input()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].discount_factor, dec!(1.1));
        assert_eq!(rows[0].present_value, dec!(454.55));
        assert_eq!(rows[0].cumulative_present_value, dec!(-545.45));

        assert_eq!(rows[1].discount_factor, dec!(1.21));
        assert_eq!(rows[1].present_value, dec!(413.22));
        assert_eq!(rows[1].cumulative_present_value, dec!(-132.23));

        assert_eq!(rows[2].discount_factor, dec!(1.331));
        assert_eq!(rows[2].present_value, dec!(375.66));
        assert_eq!(rows[2].cumulative_present_value, dec!(243.43));

        assert_eq!(round_money(npv), dec!(243.43));
    }

    #[test]
    fn test_residual_row_is_appended_last() {
        let mut inp = input();
        inp.residual_value = dec!(200);
        inp.residual_period = 1;

        let (rows, _) = discount_rows(&inp).unwrap();
        assert_eq!(rows.len(), 4);
        let residual = &rows[3];
        assert_eq!(residual.period, 1);
        assert_eq!(residual.cash_flow, dec!(200));
        assert_eq!(residual.present_value, dec!(181.82));
        // 243.4259... + 181.8181... = 425.2441...
        assert_eq!(residual.cumulative_present_value, dec!(425.24));
    }

    #[test]
    fn test_long_horizon_discounts_to_zero() {
        let inp = AppraisalInput {
            initial_investment: dec!(1000),
            discount_rate: dec!(100),
            cash_flows: (1..=100).map(|p| CashFlow::new(p, dec!(500))).collect(),
            residual_value: Decimal::ZERO,
            residual_period: 0,
        };
        let (rows, npv) = discount_rows(&inp).unwrap();
        assert_eq!(rows.len(), 100);
        assert_eq!(rows[0].discount_factor, dec!(2));
        assert_eq!(rows[0].present_value, dec!(250));
        // 2^100 saturates; its present value is nil
        assert_eq!(rows[99].discount_factor, round_factor(Decimal::MAX));
        assert_eq!(rows[99].present_value, Decimal::ZERO);
        // 500 · Σ 2^-p → 500 as p grows: NPV ≈ -500
        assert_eq!(round_money(npv), dec!(-500.00));
    }

    #[test]
    fn test_negative_flows_reduce_cumulative() {
        let mut inp = input();
        inp.cash_flows[1].amount = dec!(-500);
        let (rows, _) = discount_rows(&inp).unwrap();
        assert_eq!(rows[1].present_value, dec!(-413.22));
        assert!(rows[1].cumulative_present_value < rows[0].cumulative_present_value);
    }
}
