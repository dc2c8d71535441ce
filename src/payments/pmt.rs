use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};

/// Fixed periodic payment that amortizes `pv` down to `fv` over `periods`.
///
/// Uses the cash-flow sign convention: a positive present value (funds
/// received) yields a negative payment (funds paid out), and a residual left
/// owing at the end is passed as a negative `fv`. Callers report the absolute
/// value, see [`installment`].
///
/// ```text
/// rate == 0:  pmt = -(pv + fv) / n
/// otherwise:  pmt = -r * (pv * (1 + r)^n + fv) / ((1 + r)^n - 1)
/// ```
///
/// The result is rounded to cents.
pub fn calculate_payment(periodic_rate: Rate, periods: u32, pv: Money, fv: Money) -> Result<Money> {
    if periods == 0 {
        return Err(ScheduleError::InvalidTerm { term: periods });
    }

    let r = periodic_rate.as_decimal();
    let pv = pv.as_decimal();
    let fv = fv.as_decimal();

    if r.is_zero() {
        let pmt = -(pv + fv) / Decimal::from(periods);
        return Ok(Money::from_decimal(pmt).round_currency());
    }

    let compound = compound_factor(r, periods)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(ScheduleError::CalculationError {
            message: format!("annuity factor is zero for rate {} over {} periods", r, periods),
        });
    }

    let numerator = pv
        .checked_mul(compound)
        .and_then(|v| v.checked_add(fv))
        .and_then(|v| v.checked_mul(r))
        .ok_or_else(|| ScheduleError::CalculationError {
            message: format!("payment overflow for present value {} over {} periods", pv, periods),
        })?;

    Ok(Money::from_decimal(-numerator / denominator).round_currency())
}

/// Installment owed on a loan of `principal` leaving `residual` outstanding
/// after the last period.
pub fn installment(periodic_rate: Rate, periods: u32, principal: Money, residual: Money) -> Result<Money> {
    calculate_payment(periodic_rate, periods, principal, -residual).map(|p| p.abs())
}

/// (1 + r)^n by repeated multiplication
fn compound_factor(r: Decimal, periods: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound = compound
            .checked_mul(base)
            .ok_or_else(|| ScheduleError::CalculationError {
                message: format!("compound factor overflow for rate {} over {} periods", r, periods),
            })?;
    }
    Ok(compound)
}
