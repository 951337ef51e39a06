//! Month-by-month repayment schedule for a priced tier.
//!
//! Flat-rate and Islamic tiers spread principal and markup evenly across the
//! tenure. Reducing-balance tiers charge interest on the opening balance each
//! month (effective interest method). In both cases the final row absorbs the
//! rounding residue, so the rows sum to the tier's installment price and the
//! closing balance reaches zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InstallmentError;
use crate::pricing::rate_engine::validate_tenure;
use crate::pricing::tier::{Pricing, Tier};
use crate::types::{round_money, Money};
use crate::InstallmentResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleRow {
    /// Month number (1-indexed)
    pub month: u32,
    /// Principal outstanding at start of month
    pub opening_balance: Money,
    /// Amount due this month
    pub installment: Money,
    /// Part of the installment repaying principal
    pub principal_portion: Money,
    /// Part of the installment that is interest or profit
    pub profit_portion: Money,
    /// Principal outstanding at end of month
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepaymentSchedule {
    pub tier_name: String,
    pub rows: Vec<ScheduleRow>,
    pub total_paid: Money,
    pub total_profit: Money,
}

/// Build the repayment schedule of a computed tier.
///
/// The tier may come from outside the crate (a deserialized snapshot), so the
/// tenure is checked against the cap again before any rows are allocated.
pub fn build_schedule(tier: &Tier) -> InstallmentResult<RepaymentSchedule> {
    let months = tier.input.tenure_months;
    validate_tenure(months)?;
    if months == 0 {
        return Err(InstallmentError::invalid(
            "tenure_months",
            "Tenure must be entered before a schedule can be built",
        ));
    }

    let rows = match tier.input.pricing {
        Pricing::ReducingBalance {
            interest_rate_percent,
        } => reducing_rows(tier, interest_rate_percent / dec!(100) / dec!(12)),
        Pricing::FlatRate { .. } | Pricing::IslamicProfit { .. } => even_rows(tier),
    };

    let total_paid = rows.iter().map(|r| r.installment).sum();
    let total_profit = rows.iter().map(|r| r.profit_portion).sum();

    Ok(RepaymentSchedule {
        tier_name: tier.input.name.clone(),
        rows,
        total_paid,
        total_profit,
    })
}

fn even_rows(tier: &Tier) -> Vec<ScheduleRow> {
    let months = tier.input.tenure_months;
    let n = Decimal::from(months);
    let principal_step = round_money(tier.financed_amount / n);
    let profit_step = round_money(tier.markup / n);

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = tier.financed_amount;
    let mut profit_left = tier.markup;

    for month in 1..=months {
        let last = month == months;
        let principal_portion = if last { balance } else { principal_step.min(balance) };
        let profit_portion = if last { profit_left } else { profit_step.min(profit_left) };
        let closing_balance = balance - principal_portion;

        rows.push(ScheduleRow {
            month,
            opening_balance: balance,
            installment: principal_portion + profit_portion,
            principal_portion,
            profit_portion,
            closing_balance,
        });

        balance = closing_balance;
        profit_left -= profit_portion;
    }
    rows
}

fn reducing_rows(tier: &Tier, monthly_rate: Decimal) -> Vec<ScheduleRow> {
    let months = tier.input.tenure_months;
    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = tier.financed_amount;
    let mut profit_left = tier.markup;

    for month in 1..=months {
        let last = month == months;
        let (principal_portion, profit_portion) = if last {
            (balance, profit_left)
        } else {
            let interest = round_money(balance * monthly_rate).min(profit_left);
            let principal = (tier.monthly_installment - interest).min(balance);
            (principal, interest)
        };
        let closing_balance = balance - principal_portion;

        rows.push(ScheduleRow {
            month,
            opening_balance: balance,
            installment: principal_portion + profit_portion,
            principal_portion,
            profit_portion,
            closing_balance,
        });

        balance = closing_balance;
        profit_left -= profit_portion;
    }
    rows
}
