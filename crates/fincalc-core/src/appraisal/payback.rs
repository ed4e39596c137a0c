use rust_decimal::Decimal;

use crate::time_value::round_money;
use crate::types::{Money, Periods};

use super::npv::AppraisalRow;

/// Discounted payback in (fractional) periods.
///
/// Re-accumulates the rounded present values of `rows` in listed order
/// starting from `-initial_investment`. Within the period where the running
/// total first crosses zero, recovery is interpolated linearly. `None` when
/// the investment is never recovered (or the running total leaves the
/// decimal range first).
pub fn discounted_payback(initial_investment: Money, rows: &[AppraisalRow]) -> Option<Periods> {
    let mut accumulated = -initial_investment;

    for row in rows {
        let pv = row.present_value;
        let next = accumulated.checked_add(pv)?;
        if accumulated < Decimal::ZERO && next >= Decimal::ZERO {
            // pv > 0 here: it lifts a negative total to at least zero
            let previous = Decimal::from(row.period) - Decimal::ONE;
            let fraction = accumulated.abs() / pv;
            return Some(round_money(previous + fraction));
        }
        accumulated = next;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(period: u32, present_value: Decimal) -> AppraisalRow {
        AppraisalRow {
            period,
            cash_flow: present_value,
            discount_factor: Decimal::ONE,
            present_value,
            cumulative_present_value: Decimal::ZERO,
        }
    }

    #[test]
    fn test_payback_interpolates_within_period() {
        let rows = vec![
            row(1, dec!(454.55)),
            row(2, dec!(413.22)),
            row(3, dec!(375.66)),
        ];
        // 2 + 132.23 / 375.66 = 2.352
        assert_eq!(discounted_payback(dec!(1000), &rows), Some(dec!(2.35)));
    }

    #[test]
    fn test_payback_exact_recovery_at_period_end() {
        let rows = vec![row(1, dec!(600)), row(2, dec!(400))];
        assert_eq!(discounted_payback(dec!(1000), &rows), Some(dec!(2)));
    }

    #[test]
    fn test_payback_never_recovered() {
        let rows = vec![row(1, dec!(100)), row(2, dec!(100))];
        assert_eq!(discounted_payback(dec!(1000), &rows), None);
    }

    #[test]
    fn test_payback_first_crossing_wins() {
        // Recovered in period 1, lost again in period 2, recovered again in 3
        let rows = vec![row(1, dec!(1200)), row(2, dec!(-500)), row(3, dec!(800))];
        assert_eq!(discounted_payback(dec!(1000), &rows), Some(dec!(0.83)));
    }

    #[test]
    fn test_payback_uses_listed_order() {
        // Residual row at period 1 listed last
        let rows = vec![row(1, dec!(300)), row(2, dec!(300)), row(1, dec!(500))];
        // acc after two rows = -400; residual row crosses: 0 + 400/500
        assert_eq!(discounted_payback(dec!(1000), &rows), Some(dec!(0.8)));
    }
}
