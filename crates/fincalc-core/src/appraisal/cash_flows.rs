//! Value-level editing of a cash-flow series.
//!
//! Every operation takes the current series by reference and returns a new
//! one; periods are always 1-based.

use rust_decimal::Decimal;

use crate::error::FinCalcError;
use crate::types::{CashFlow, Money};
use crate::FinCalcResult;

/// A zero-valued series covering periods `1..=horizon`.
pub fn blank_cash_flows(horizon: u32) -> FinCalcResult<Vec<CashFlow>> {
    if horizon == 0 {
        return Err(FinCalcError::invalid(
            "horizon",
            "Project horizon must be at least 1 period",
        ));
    }
    Ok((1..=horizon)
        .map(|period| CashFlow::new(period, Decimal::ZERO))
        .collect())
}

/// Append a flow at the period following the current length.
pub fn push_cash_flow(flows: &[CashFlow], amount: Money) -> Vec<CashFlow> {
    let mut next = flows.to_vec();
    next.push(CashFlow::new(flows.len() as u32 + 1, amount));
    next
}

/// Replace the amount at `index`, keeping order and periods.
pub fn replace_cash_flow(
    flows: &[CashFlow],
    index: usize,
    amount: Money,
) -> FinCalcResult<Vec<CashFlow>> {
    check_index(flows, index)?;
    Ok(flows
        .iter()
        .enumerate()
        .map(|(i, cf)| if i == index { CashFlow { amount, ..*cf } } else { *cf })
        .collect())
}

/// Drop the flow at `index` and renumber the rest contiguously from 1.
pub fn remove_cash_flow(flows: &[CashFlow], index: usize) -> FinCalcResult<Vec<CashFlow>> {
    check_index(flows, index)?;
    Ok(flows
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .enumerate()
        .map(|(n, (_, cf))| CashFlow::new(n as u32 + 1, cf.amount))
        .collect())
}

fn check_index(flows: &[CashFlow], index: usize) -> FinCalcResult<()> {
    if index >= flows.len() {
        return Err(FinCalcError::invalid(
            "index",
            format!("Cash flow index {index} out of range (len {})", flows.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_series() {
        let flows = blank_cash_flows(3).unwrap();
        assert_eq!(
            flows,
            vec![
                CashFlow::new(1, Decimal::ZERO),
                CashFlow::new(2, Decimal::ZERO),
                CashFlow::new(3, Decimal::ZERO),
            ]
        );
        assert!(blank_cash_flows(0).is_err());
    }

    #[test]
    fn test_push_numbers_next_period() {
        let flows = push_cash_flow(&[CashFlow::new(1, dec!(100))], dec!(250));
        assert_eq!(flows[1], CashFlow::new(2, dec!(250)));
    }

    #[test]
    fn test_replace_keeps_original_untouched() {
        let original = vec![CashFlow::new(1, dec!(100)), CashFlow::new(2, dec!(200))];
        let edited = replace_cash_flow(&original, 1, dec!(-50)).unwrap();
        assert_eq!(original[1].amount, dec!(200));
        assert_eq!(edited[1], CashFlow::new(2, dec!(-50)));
        assert!(replace_cash_flow(&original, 2, dec!(1)).is_err());
    }

    #[test]
    fn test_remove_renumbers() {
        let flows = vec![
            CashFlow::new(1, dec!(100)),
            CashFlow::new(2, dec!(200)),
            CashFlow::new(3, dec!(300)),
        ];
        let trimmed = remove_cash_flow(&flows, 0).unwrap();
        assert_eq!(
            trimmed,
            vec![CashFlow::new(1, dec!(200)), CashFlow::new(2, dec!(300))]
        );
        assert!(remove_cash_flow(&flows, 3).is_err());
    }
}
