use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::newton_step;
use crate::types::{CashFlow, Money, Rate};

use super::analysis::AppraisalInput;

pub const IRR_INITIAL_GUESS: Rate = dec!(0.10);
pub const MAX_IRR_ITERATIONS: u32 = 100;
const RATE_FLOOR: Rate = dec!(-0.99);

/// Outcome of the Newton-Raphson IRR search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Converged rate as a fraction, unrounded. `None` if the search failed.
    pub rate: Option<Rate>,
    /// NPV evaluations performed
    pub iterations: u32,
}

impl IrrSolution {
    pub fn converged(&self) -> bool {
        self.rate.is_some()
    }
}

/// IRR of an appraisal: the rate at which its NPV (residual included) is zero.
pub fn solve_irr(input: &AppraisalInput) -> IrrSolution {
    newton_irr(input.initial_investment, &input.discounted_flows())
}

/// Single-root Newton-Raphson from 10%, capped at 100 iterations.
///
/// No bracketing: series with several sign changes may oscillate or settle on
/// a root that is not economically meaningful. The search gives up on a zero
/// derivative, on a rate of exactly -100%, or when the cash-flow amounts
/// themselves exceed the decimal range.
pub fn newton_irr(initial_investment: Money, flows: &[CashFlow]) -> IrrSolution {
    let mut rate = IRR_INITIAL_GUESS;

    for i in 0..MAX_IRR_ITERATIONS {
        let iterations = i + 1;
        let failed = IrrSolution {
            rate: None,
            iterations,
        };

        let Some(step) = newton_step(rate, initial_investment, flows) else {
            log::warn!("IRR: NPV at rate {rate} cannot be evaluated, giving up");
            return failed;
        };

        if step.converged {
            log::debug!("IRR converged to {rate} after {iterations} iterations");
            return IrrSolution {
                rate: Some(rate),
                iterations,
            };
        }

        let Some(delta) = step.delta else {
            log::warn!("IRR: zero derivative at rate {rate}, giving up");
            return failed;
        };

        let Some(next) = rate.checked_sub(delta) else {
            log::warn!("IRR: Newton step from rate {rate} left the decimal range");
            return failed;
        };
        rate = next;

        // Guard against divergence below -100%
        if rate < dec!(-1) {
            rate = RATE_FLOOR;
        }
    }

    log::warn!("IRR did not converge after {MAX_IRR_ITERATIONS} iterations");
    IrrSolution {
        rate: None,
        iterations: MAX_IRR_ITERATIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::npv_at;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn annual(amounts: &[Decimal]) -> Vec<CashFlow> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| CashFlow::new(i as u32 + 1, *a))
            .collect()
    }

    #[test]
    fn test_irr_three_equal_flows() {
        let flows = annual(&[dec!(500), dec!(500), dec!(500)]);
        let solution = newton_irr(dec!(1000), &flows);
        let rate = solution.rate.unwrap();
        assert!((rate - dec!(0.2338)).abs() < dec!(0.0001), "got {rate}");
        assert!(solution.iterations > 1 && solution.iterations < MAX_IRR_ITERATIONS);
    }

    #[test]
    fn test_irr_zeroes_npv() {
        let flows = annual(&[dec!(400), dec!(400), dec!(400)]);
        let rate = newton_irr(dec!(1000), &flows).rate.unwrap();
        let npv = npv_at(rate, dec!(1000), &flows).unwrap();
        assert!(npv.abs() < dec!(0.0001));
        // ~9.7%
        assert!((rate - dec!(0.097)).abs() < dec!(0.001));
    }

    #[test]
    fn test_irr_high_return_long_horizon() {
        // (1 + 9)^30 is outside the decimal range; the late flows vanish
        let mut amounts = vec![dec!(1000)];
        amounts.extend([Decimal::ONE; 29]);
        let solution = newton_irr(dec!(100), &annual(&amounts));
        let rate = solution.rate.unwrap();
        assert!((rate - dec!(9.0011)).abs() < dec!(0.0001), "got {rate}");
        assert!(solution.iterations < 20);
    }

    #[test]
    fn test_irr_recovers_from_rate_floor() {
        // First step overshoots below -100% and is clamped to -99%, where
        // (0.01)^-15 is outside the decimal range. Root: (1+ρ)^15 = 0.5^15.
        let flows = vec![CashFlow::new(15, dec!(3.0517578125))];
        let solution = newton_irr(dec!(100000), &flows);
        let rate = solution.rate.unwrap();
        assert!((rate - dec!(-0.5)).abs() < dec!(0.0001), "got {rate}");
        assert!(solution.iterations > 10);
    }

    #[test]
    fn test_irr_negative_rate() {
        // Recover less than invested: IRR below zero
        let flows = annual(&[dec!(300), dec!(300), dec!(300)]);
        let rate = newton_irr(dec!(1000), &flows).rate.unwrap();
        assert!(rate < Decimal::ZERO);
    }

    #[test]
    fn test_irr_zero_derivative_stops() {
        // All flows zero: f' = 0 on the first iteration
        let flows = annual(&[Decimal::ZERO, Decimal::ZERO]);
        let solution = newton_irr(dec!(1000), &flows);
        assert_eq!(solution.rate, None);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_irr_never_positive_npv_does_not_converge() {
        // Only outflows after the investment: NPV is below zero for every rate
        let flows = annual(&[dec!(-100), dec!(-100)]);
        let solution = newton_irr(dec!(1000), &flows);
        assert!(!solution.converged());
    }
}
