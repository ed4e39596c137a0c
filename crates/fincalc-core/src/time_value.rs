use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::types::{CashFlow, Money, Rate};
use crate::FinCalcResult;

const PERCENT: Decimal = dec!(100);

/// Newton-Raphson stops once |NPV| falls below this
pub const IRR_TOLERANCE: Decimal = dec!(0.0001);

/// Decimal places used for every reported money amount
pub const MONEY_DP: u32 = 2;

/// Decimal places used for reported discount factors
pub const FACTOR_DP: u32 = 6;

/// Convert a percentage rate (1.5 = 1.5%) into a fraction (0.015).
pub fn percent_to_fraction(rate: Rate) -> Rate {
    rate / PERCENT
}

/// Convert a fractional rate back into a percentage, `None` past the
/// decimal range.
pub fn fraction_to_percent(rate: Rate) -> Option<Rate> {
    rate.checked_mul(PERCENT)
}

/// Round a reported amount to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a reported discount factor to six places, halves away from zero.
pub fn round_factor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FACTOR_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Map an overflowed checked operation onto an input error for `field`.
pub(crate) fn in_range(value: Option<Decimal>, field: &str) -> FinCalcResult<Decimal> {
    value.ok_or_else(|| FinCalcError::invalid(field, "Amount exceeds the decimal range"))
}

fn check_rate(rate: Rate) -> FinCalcResult<()> {
    if rate <= dec!(-1) {
        return Err(FinCalcError::invalid(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }
    Ok(())
}

/// Compounding factor (1 + r)^period for a fractional rate.
///
/// Saturates at `Decimal::MAX` when the factor leaves the decimal range; the
/// matching present-value factor is then zero.
pub fn discount_factor(rate: Rate, period: u32) -> FinCalcResult<Decimal> {
    check_rate(rate)?;
    Ok((Decimal::ONE + rate)
        .checked_powi(i64::from(period))
        .unwrap_or(Decimal::MAX))
}

/// Present-value factor (1 + r)^−period for a fractional rate.
///
/// Computed as v^period with v = 1/(1 + r); for positive rates it shrinks
/// towards zero instead of overflowing.
pub fn present_value_factor(rate: Rate, period: u32) -> FinCalcResult<Decimal> {
    check_rate(rate)?;
    let v = in_range(Decimal::ONE.checked_div(Decimal::ONE + rate), "rate")?;
    in_range(v.checked_powi(i64::from(period)), "period")
}

/// Constant (Price) installment repaying `principal` over `periods` at a
/// fractional periodic rate.
///
/// Algebraically `P·r·(1+r)^N / ((1+r)^N − 1)`; evaluated as
/// `P·r / (1 − (1+r)^−N)` so that long terms shrink towards zero instead of
/// overflowing.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> FinCalcResult<Money> {
    if periods == 0 {
        return Err(FinCalcError::invalid(
            "number_of_periods",
            "Number of periods must be > 0",
        ));
    }
    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let v_n = present_value_factor(rate, periods)?;
    let denominator = Decimal::ONE - v_n;
    if denominator.is_zero() {
        return Err(FinCalcError::invalid(
            "periodic_rate",
            "Annuity factor is zero for this rate and term",
        ));
    }

    let interest = in_range(principal.checked_mul(rate), "principal")?;
    in_range(interest.checked_div(denominator), "principal")
}

/// One Newton-Raphson evaluation of NPV at a trial rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewtonStep {
    /// |NPV| is below `IRR_TOLERANCE`
    pub converged: bool,
    /// NPV / NPV'; `None` when the derivative is exactly zero
    pub delta: Option<Decimal>,
}

/// Evaluate NPV and its derivative at a fractional `rate` and return the
/// Newton step.
///
/// Every power is kept at or below one so long horizons underflow to zero
/// rather than overflow:
/// - rate ≥ 0 discounts with v^p, v = 1/(1+ρ);
/// - −1 < rate < 0 multiplies NPV through by (1+ρ)^P, P the last period, and
///   works with u^(P−p), u = 1+ρ. The step f/f' is unchanged by the scaling.
///
/// `None` when the rate is at or below −100% or when amounts themselves
/// leave the decimal range.
pub fn newton_step(
    rate: Rate,
    initial_investment: Money,
    flows: &[CashFlow],
) -> Option<NewtonStep> {
    let u = Decimal::ONE + rate;
    if u <= Decimal::ZERO {
        return None;
    }
    if u >= Decimal::ONE {
        discounted_step(u, initial_investment, flows)
    } else {
        scaled_step(u, initial_investment, flows)
    }
}

fn discounted_step(
    u: Decimal,
    initial_investment: Money,
    flows: &[CashFlow],
) -> Option<NewtonStep> {
    let v = Decimal::ONE.checked_div(u)?;
    let mut npv = -initial_investment;
    let mut dnpv = Decimal::ZERO;

    for flow in flows {
        let vp = v.checked_powi(i64::from(flow.period))?;
        let pv = flow.amount.checked_mul(vp)?;
        npv = npv.checked_add(pv)?;
        // d/dρ of a·v^p is −p·a·v^(p+1)
        let term = Decimal::from(flow.period).checked_mul(pv)?.checked_mul(v)?;
        dnpv = dnpv.checked_sub(term)?;
    }

    let delta = if dnpv.is_zero() {
        None
    } else {
        Some(npv.checked_div(dnpv)?)
    };

    Some(NewtonStep {
        converged: npv.abs() < IRR_TOLERANCE,
        delta,
    })
}

fn scaled_step(
    u: Decimal,
    initial_investment: Money,
    flows: &[CashFlow],
) -> Option<NewtonStep> {
    let horizon = flows.iter().map(|cf| cf.period).max().unwrap_or(0);
    let u_horizon = u.checked_powi(i64::from(horizon))?;

    // g = f·u^P, h = f'·u^(P+1)
    let mut g = -initial_investment.checked_mul(u_horizon)?;
    let mut h = Decimal::ZERO;

    for flow in flows {
        let up = u.checked_powi(i64::from(horizon - flow.period))?;
        let term = flow.amount.checked_mul(up)?;
        g = g.checked_add(term)?;
        h = h.checked_sub(Decimal::from(flow.period).checked_mul(term)?)?;
    }

    // |f| = |g| / u^P; a quotient past the decimal range is far from converged
    let converged = g.is_zero()
        || g
            .abs()
            .checked_div(u_horizon)
            .is_some_and(|f| f < IRR_TOLERANCE);

    let delta = if h.is_zero() {
        None
    } else {
        Some(g.checked_mul(u)?.checked_div(h)?)
    };

    Some(NewtonStep { converged, delta })
}

/// Unrounded NPV of `flows` at a fractional rate, net of `initial_investment`.
pub fn npv_at(rate: Rate, initial_investment: Money, flows: &[CashFlow]) -> Option<Money> {
    flows.iter().try_fold(-initial_investment, |npv, flow| {
        let vp = present_value_factor(rate, flow.period).ok()?;
        npv.checked_add(flow.amount.checked_mul(vp)?)
    })
}
