//! Tier value objects.
//!
//! A [`TierInput`] holds only what the agent types in. [`Tier`] is the fully
//! derived snapshot produced by [`recompute_tier`](super::calculator::recompute_tier);
//! it is never edited in place, every edit produces a new snapshot.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Interest convention of a tier, without its authoritative input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InterestType {
    FlatRate,
    ReducingBalance,
    IslamicProfit,
}

impl InterestType {
    /// Whether the rate is the authoritative input (markup is derived).
    pub fn is_rate_primary(self) -> bool {
        !matches!(self, InterestType::IslamicProfit)
    }

    pub fn label(self) -> &'static str {
        match self {
            InterestType::FlatRate => "Flat Rate",
            InterestType::ReducingBalance => "Reducing Balance",
            InterestType::IslamicProfit => "Islamic Profit",
        }
    }
}

impl fmt::Display for InterestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interest convention together with the one input it derives from.
///
/// Rate conventions carry only the rate and Islamic profit carries only the
/// markup, so the derived field can never be fed back in as an input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "interest_type")]
pub enum Pricing {
    FlatRate { interest_rate_percent: Percent },
    ReducingBalance { interest_rate_percent: Percent },
    IslamicProfit { markup: Money },
}

impl Pricing {
    pub fn interest_type(&self) -> InterestType {
        match self {
            Pricing::FlatRate { .. } => InterestType::FlatRate,
            Pricing::ReducingBalance { .. } => InterestType::ReducingBalance,
            Pricing::IslamicProfit { .. } => InterestType::IslamicProfit,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Pricing::FlatRate {
            interest_rate_percent: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Bank financing attached to a tier for display. Never used in pricing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinanceOffer {
    pub bank_name: String,
    pub finance_info: String,
}

/// Agent-entered parameters of one financing tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierInput {
    /// Display label, e.g. "12 months"
    pub name: String,
    /// Amount paid upfront
    pub down_payment: Money,
    /// Number of monthly installments (0 = not yet entered)
    pub tenure_months: u32,
    /// Interest convention and its authoritative input
    pub pricing: Pricing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_offer: Option<FinanceOffer>,
}

/// Starting values for a newly added tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TierDefaults {
    pub name: String,
    pub down_payment: Money,
    pub tenure_months: u32,
    pub pricing: Pricing,
}

impl Default for TierDefaults {
    fn default() -> Self {
        TierDefaults {
            name: String::new(),
            down_payment: Decimal::ZERO,
            tenure_months: 12,
            pricing: Pricing::default(),
        }
    }
}

impl From<TierDefaults> for TierInput {
    fn from(d: TierDefaults) -> Self {
        TierInput {
            name: d.name,
            down_payment: d.down_payment,
            tenure_months: d.tenure_months,
            pricing: d.pricing,
            finance_offer: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Fully derived tier snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tier {
    /// The inputs this snapshot was derived from
    pub input: TierInput,
    /// max(0, cash price - down payment)
    pub financed_amount: Money,
    /// Given for rate conventions; derived against the cash price for Islamic profit
    pub interest_rate_percent: Percent,
    /// Derived for rate conventions; given for Islamic profit
    pub markup: Money,
    /// Financed amount + markup
    pub installment_price: Money,
    /// Installment price / tenure, zero while tenure is not entered
    pub monthly_installment: Money,
    /// Cash price + markup
    pub total_cost_to_customer: Money,
}

impl Tier {
    pub fn name(&self) -> &str {
        &self.input.name
    }

    pub fn interest_type(&self) -> InterestType {
        self.input.pricing.interest_type()
    }
}

/// Persistence payload for one tier, in the remote API's field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierRecord {
    pub name: String,
    pub down_payment: Money,
    pub tenure_months: u32,
    pub interest_rate_percent: Percent,
    pub interest_type: InterestType,
    pub markup: Money,
    pub monthly_installment: Money,
    pub installment_price: Money,
    pub total_cost_to_customer: Money,
    pub financed_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_offer: Option<FinanceOffer>,
}

impl From<&Tier> for TierRecord {
    fn from(tier: &Tier) -> Self {
        TierRecord {
            name: tier.input.name.clone(),
            down_payment: tier.input.down_payment,
            tenure_months: tier.input.tenure_months,
            interest_rate_percent: tier.interest_rate_percent,
            interest_type: tier.interest_type(),
            markup: tier.markup,
            monthly_installment: tier.monthly_installment,
            installment_price: tier.installment_price,
            total_cost_to_customer: tier.total_cost_to_customer,
            financed_amount: tier.financed_amount,
            finance_offer: tier.input.finance_offer.clone(),
        }
    }
}

impl From<&TierRecord> for TierInput {
    /// Rebuild editable inputs from a stored record, keeping only the
    /// authoritative field of its convention.
    fn from(record: &TierRecord) -> Self {
        let pricing = match record.interest_type {
            InterestType::FlatRate => Pricing::FlatRate {
                interest_rate_percent: record.interest_rate_percent,
            },
            InterestType::ReducingBalance => Pricing::ReducingBalance {
                interest_rate_percent: record.interest_rate_percent,
            },
            InterestType::IslamicProfit => Pricing::IslamicProfit {
                markup: record.markup,
            },
        };
        TierInput {
            name: record.name.clone(),
            down_payment: record.down_payment,
            tenure_months: record.tenure_months,
            pricing,
            finance_offer: record.finance_offer.clone(),
        }
    }
}
