//! The three interest conventions.
//!
//! Each function takes the financed principal, the tenure in months and the
//! convention's authoritative input, and returns unrounded figures. Rounding
//! is applied once, by the calculator, when a tier is assembled.
//!
//! A tenure of zero means the agent has not entered it yet: every output is
//! zero and the authoritative input is echoed back unchanged. Tenures above
//! [`MAX_TENURE_MONTHS`] and figures that overflow 96-bit decimal arithmetic
//! are rejected with `InvalidInput` instead of panicking.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InstallmentError;
use crate::types::{Money, Percent, MAX_TENURE_MONTHS};
use crate::InstallmentResult;

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Unrounded outcome of one convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateOutcome {
    pub monthly_installment: Money,
    pub markup: Money,
    pub installment_price: Money,
    pub interest_rate_percent: Percent,
}

impl RateOutcome {
    fn zero_with_rate(interest_rate_percent: Percent) -> Self {
        RateOutcome {
            monthly_installment: Decimal::ZERO,
            markup: Decimal::ZERO,
            installment_price: Decimal::ZERO,
            interest_rate_percent,
        }
    }
}

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

/// Flat rate: interest on the full principal for the full tenure.
///
/// markup = principal * rate/100 * months/12
pub fn flat_rate_monthly(
    principal: Money,
    rate_percent: Percent,
    months: u32,
) -> InstallmentResult<RateOutcome> {
    validate_rate(rate_percent)?;
    validate_tenure(months)?;
    if months == 0 || principal <= Decimal::ZERO {
        return Ok(RateOutcome::zero_with_rate(rate_percent));
    }

    let n = Decimal::from(months);
    let markup = principal
        .checked_mul(rate_percent / HUNDRED)
        .and_then(|m| m.checked_mul(n / MONTHS_PER_YEAR))
        .ok_or_else(|| out_of_range("interest_rate_percent"))?;
    let installment_price = principal
        .checked_add(markup)
        .ok_or_else(|| out_of_range("interest_rate_percent"))?;

    Ok(RateOutcome {
        monthly_installment: installment_price / n,
        markup,
        installment_price,
        interest_rate_percent: rate_percent,
    })
}

/// Reducing balance: standard level-payment amortization at rate/12 per month.
///
/// monthly = P * r / (1 - (1 + r)^-n)
pub fn amortized_monthly(
    principal: Money,
    rate_percent: Percent,
    months: u32,
) -> InstallmentResult<RateOutcome> {
    validate_rate(rate_percent)?;
    validate_tenure(months)?;
    if months == 0 || principal <= Decimal::ZERO {
        return Ok(RateOutcome::zero_with_rate(rate_percent));
    }

    let n = Decimal::from(months);
    let r = rate_percent / HUNDRED / MONTHS_PER_YEAR;

    let monthly_installment = if r.is_zero() {
        principal / n
    } else {
        let growth = compound_factor(r, months)?;
        // 1 - (1+r)^-n == 1 - 1/growth
        principal
            .checked_mul(r)
            .and_then(|x| x.checked_div(Decimal::ONE - Decimal::ONE / growth))
            .ok_or_else(|| out_of_range("interest_rate_percent"))?
    };

    let installment_price = monthly_installment
        .checked_mul(n)
        .ok_or_else(|| out_of_range("interest_rate_percent"))?;
    let markup = (installment_price - principal).max(Decimal::ZERO);

    Ok(RateOutcome {
        monthly_installment,
        markup,
        installment_price,
        interest_rate_percent: rate_percent,
    })
}

/// Islamic profit: the markup is agreed upfront and the rate is read off it.
///
/// The rate returned here is relative to `principal`. Tiers quote it against
/// the cash price instead, see [`islamic_rate_on_cash_price`](super::calculator::islamic_rate_on_cash_price).
pub fn islamic_profit(
    principal: Money,
    markup: Money,
    months: u32,
) -> InstallmentResult<RateOutcome> {
    validate_markup(markup)?;
    validate_tenure(months)?;
    if months == 0 || principal <= Decimal::ZERO {
        return Ok(RateOutcome {
            markup,
            ..RateOutcome::zero_with_rate(Decimal::ZERO)
        });
    }

    let installment_price = principal
        .checked_add(markup)
        .ok_or_else(|| out_of_range("markup"))?;

    Ok(RateOutcome {
        monthly_installment: installment_price / Decimal::from(months),
        markup,
        installment_price,
        interest_rate_percent: markup / principal * HUNDRED,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// (1 + r)^n, or `InvalidInput` once the factor leaves the decimal range.
pub(crate) fn compound_factor(r: Decimal, months: u32) -> InstallmentResult<Decimal> {
    (Decimal::ONE + r)
        .checked_powu(u64::from(months))
        .ok_or_else(|| out_of_range("interest_rate_percent"))
}

fn out_of_range(field: &str) -> InstallmentError {
    InstallmentError::invalid(field, "Value is too large to price over this tenure")
}

pub(crate) fn validate_tenure(months: u32) -> InstallmentResult<()> {
    if months > MAX_TENURE_MONTHS {
        return Err(InstallmentError::invalid(
            "tenure_months",
            format!("Tenure cannot exceed {MAX_TENURE_MONTHS} months"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_rate(rate_percent: Percent) -> InstallmentResult<()> {
    if rate_percent < Decimal::ZERO {
        return Err(InstallmentError::invalid(
            "interest_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    Ok(())
}

pub(crate) fn validate_markup(markup: Money) -> InstallmentResult<()> {
    if markup < Decimal::ZERO {
        return Err(InstallmentError::invalid(
            "markup",
            "Markup cannot be negative",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
