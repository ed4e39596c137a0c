use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::time_value::{in_range, round_money};
use crate::types::Money;
use crate::FinCalcResult;

use super::schedule::AmortizationRow;

/// Totals across a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub total_interest: Money,
    pub total_amortization: Money,
    pub total_installments: Money,
}

/// Sum the already-rounded row amounts, then round each total to cents.
///
/// Totals therefore carry the per-row rounding drift (e.g. three SAC rows of
/// 33333.33 sum to 99999.99, not the principal). A total beyond the decimal
/// range is reported against `principal`.
pub fn summarize(rows: &[AmortizationRow]) -> FinCalcResult<AmortizationSummary> {
    let (interest, amortization, installments) = rows.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(i, a, p), row| {
            Ok::<_, FinCalcError>((
                in_range(i.checked_add(row.interest), "principal")?,
                in_range(a.checked_add(row.amortization), "principal")?,
                in_range(p.checked_add(row.installment), "principal")?,
            ))
        },
    )?;

    Ok(AmortizationSummary {
        total_interest: round_money(interest),
        total_amortization: round_money(amortization),
        total_installments: round_money(installments),
    })
}
