//! Field-level edits to a tier.
//!
//! [`apply_edit`] is the reducer: current snapshot + edit -> new snapshot.
//! [`TierEdit::parse`] turns raw form text into a typed edit.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InstallmentError;
use crate::pricing::calculator::recompute_tier;
use crate::pricing::tier::{InterestType, Pricing, Tier};
use crate::types::{Money, Percent};
use crate::InstallmentResult;

/// Editable tier fields, by their form names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TierField {
    Name,
    DownPayment,
    TenureMonths,
    InterestType,
    InterestRatePercent,
    Markup,
}

impl FromStr for TierField {
    type Err = InstallmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "name" => Ok(TierField::Name),
            "downpayment" => Ok(TierField::DownPayment),
            "tenure" | "tenuremonths" => Ok(TierField::TenureMonths),
            "interesttype" => Ok(TierField::InterestType),
            "interestrate" | "interestratepercent" | "rate" => Ok(TierField::InterestRatePercent),
            "markup" => Ok(TierField::Markup),
            _ => Err(InstallmentError::invalid(
                "field",
                format!("Unknown tier field '{s}'"),
            )),
        }
    }
}

impl FromStr for InterestType {
    type Err = InstallmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "flat" | "flatrate" => Ok(InterestType::FlatRate),
            "reducing" | "reducingbalance" => Ok(InterestType::ReducingBalance),
            "islamic" | "islamicprofit" => Ok(InterestType::IslamicProfit),
            _ => Err(InstallmentError::invalid(
                "interest_type",
                format!("Unknown interest type '{s}'"),
            )),
        }
    }
}

/// A single typed change to one tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value")]
pub enum TierEdit {
    Name(String),
    DownPayment(Money),
    TenureMonths(u32),
    InterestType(InterestType),
    InterestRatePercent(Percent),
    Markup(Money),
}

impl TierEdit {
    /// Build an edit from raw form text.
    ///
    /// Blank numeric text reads as zero. Tenure that is negative or
    /// fractional reads as 0, i.e. not entered yet.
    pub fn parse(field: TierField, raw: &str) -> InstallmentResult<Self> {
        let text = raw.trim();
        Ok(match field {
            TierField::Name => TierEdit::Name(text.to_string()),
            TierField::DownPayment => TierEdit::DownPayment(parse_decimal("down_payment", text)?),
            TierField::TenureMonths => TierEdit::TenureMonths(parse_tenure(text)?),
            TierField::InterestType => TierEdit::InterestType(text.parse()?),
            TierField::InterestRatePercent => {
                TierEdit::InterestRatePercent(parse_decimal("interest_rate_percent", text)?)
            }
            TierField::Markup => TierEdit::Markup(parse_decimal("markup", text)?),
        })
    }

    pub fn field(&self) -> TierField {
        match self {
            TierEdit::Name(_) => TierField::Name,
            TierEdit::DownPayment(_) => TierField::DownPayment,
            TierEdit::TenureMonths(_) => TierField::TenureMonths,
            TierEdit::InterestType(_) => TierField::InterestType,
            TierEdit::InterestRatePercent(_) => TierField::InterestRatePercent,
            TierEdit::Markup(_) => TierField::Markup,
        }
    }
}

/// Apply one edit and recompute, returning a new snapshot. `current` is left
/// untouched, so on error the caller still holds the last valid snapshot.
///
/// Switching convention seeds the new authoritative input from the current
/// figures: the derived markup when moving to Islamic profit, the displayed
/// rate when moving to a rate convention.
pub fn apply_edit(cash_price: Money, current: &Tier, edit: TierEdit) -> InstallmentResult<Tier> {
    let mut input = current.input.clone();

    match edit {
        TierEdit::Name(name) => input.name = name,
        TierEdit::DownPayment(amount) => input.down_payment = amount,
        TierEdit::TenureMonths(months) => input.tenure_months = months,
        TierEdit::InterestType(kind) => {
            if kind != current.interest_type() {
                input.pricing = seed_pricing(kind, current);
            }
        }
        TierEdit::InterestRatePercent(rate) => {
            if !current.interest_type().is_rate_primary() {
                return Err(InstallmentError::invalid(
                    "interest_rate_percent",
                    "Rate is derived from the markup for Islamic profit tiers",
                ));
            }
            input.pricing = match input.pricing {
                Pricing::ReducingBalance { .. } => Pricing::ReducingBalance {
                    interest_rate_percent: rate,
                },
                _ => Pricing::FlatRate {
                    interest_rate_percent: rate,
                },
            };
        }
        TierEdit::Markup(markup) => {
            if current.interest_type().is_rate_primary() {
                return Err(InstallmentError::invalid(
                    "markup",
                    "Markup is derived from the rate for flat and reducing balance tiers",
                ));
            }
            input.pricing = Pricing::IslamicProfit { markup };
        }
    }

    recompute_tier(cash_price, &input)
}

fn seed_pricing(kind: InterestType, current: &Tier) -> Pricing {
    match kind {
        InterestType::FlatRate => Pricing::FlatRate {
            interest_rate_percent: current.interest_rate_percent,
        },
        InterestType::ReducingBalance => Pricing::ReducingBalance {
            interest_rate_percent: current.interest_rate_percent,
        },
        InterestType::IslamicProfit => Pricing::IslamicProfit {
            markup: current.markup,
        },
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_decimal(field: &str, text: &str) -> InstallmentResult<Decimal> {
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).map_err(|_| {
        InstallmentError::invalid(field, format!("'{text}' is not a number"))
    })
}

fn parse_tenure(text: &str) -> InstallmentResult<u32> {
    let value = parse_decimal("tenure_months", text)?;
    if value <= Decimal::ZERO || !value.fract().is_zero() {
        return Ok(0);
    }
    value.to_u32().ok_or_else(|| {
        InstallmentError::invalid("tenure_months", format!("'{text}' months is out of range"))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::tier::{TierDefaults, TierInput};
    use rust_decimal_macros::dec;

    fn flat_tier() -> Tier {
        let input = TierInput {
            name: "A".into(),
            down_payment: dec!(20000),
            tenure_months: 12,
            pricing: Pricing::FlatRate {
                interest_rate_percent: dec!(12),
            },
            finance_offer: None,
        };
        recompute_tier(dec!(100000), &input).unwrap()
    }

    #[test]
    fn test_field_names_from_form() {
        assert_eq!("downPayment".parse::<TierField>().unwrap(), TierField::DownPayment);
        assert_eq!("down_payment".parse::<TierField>().unwrap(), TierField::DownPayment);
        assert_eq!("tenureMonths".parse::<TierField>().unwrap(), TierField::TenureMonths);
        assert_eq!("interestRate".parse::<TierField>().unwrap(), TierField::InterestRatePercent);
        assert!("colour".parse::<TierField>().is_err());
    }

    #[test]
    fn test_interest_type_names() {
        assert_eq!("Flat Rate".parse::<InterestType>().unwrap(), InterestType::FlatRate);
        assert_eq!("reducing_balance".parse::<InterestType>().unwrap(), InterestType::ReducingBalance);
        assert_eq!("Islamic".parse::<InterestType>().unwrap(), InterestType::IslamicProfit);
        assert!("balloon".parse::<InterestType>().is_err());
    }

    #[test]
    fn test_parse_numeric_text() {
        assert_eq!(
            TierEdit::parse(TierField::DownPayment, "20,000").unwrap(),
            TierEdit::DownPayment(dec!(20000))
        );
        assert_eq!(
            TierEdit::parse(TierField::Markup, "  ").unwrap(),
            TierEdit::Markup(Decimal::ZERO)
        );
        assert!(matches!(
            TierEdit::parse(TierField::InterestRatePercent, "twelve"),
            Err(InstallmentError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_incomplete_tenure_reads_as_zero() {
        assert_eq!(TierEdit::parse(TierField::TenureMonths, "12").unwrap(), TierEdit::TenureMonths(12));
        assert_eq!(TierEdit::parse(TierField::TenureMonths, "12.5").unwrap(), TierEdit::TenureMonths(0));
        assert_eq!(TierEdit::parse(TierField::TenureMonths, "-3").unwrap(), TierEdit::TenureMonths(0));
        assert_eq!(TierEdit::parse(TierField::TenureMonths, "").unwrap(), TierEdit::TenureMonths(0));
        assert!(TierEdit::parse(TierField::TenureMonths, "abc").is_err());
    }

    #[test]
    fn test_apply_edit_returns_new_snapshot() {
        let tier = flat_tier();
        let next = apply_edit(dec!(100000), &tier, TierEdit::TenureMonths(24)).unwrap();
        assert_eq!(tier.input.tenure_months, 12);
        assert_eq!(next.input.tenure_months, 24);
        assert_eq!(next.markup, dec!(19200));
    }

    #[test]
    fn test_rate_edit_on_islamic_tier_rejected() {
        let tier = apply_edit(
            dec!(100000),
            &flat_tier(),
            TierEdit::InterestType(InterestType::IslamicProfit),
        )
        .unwrap();
        let err = apply_edit(dec!(100000), &tier, TierEdit::InterestRatePercent(dec!(5)));
        assert!(matches!(err, Err(InstallmentError::InvalidInput { .. })));
    }

    #[test]
    fn test_markup_edit_on_rate_tier_rejected() {
        let err = apply_edit(dec!(100000), &flat_tier(), TierEdit::Markup(dec!(5)));
        assert!(matches!(err, Err(InstallmentError::InvalidInput { .. })));
    }

    #[test]
    fn test_each_edit_goes_to_its_authoritative_field() {
        let flat = flat_tier();
        let reducing = apply_edit(
            dec!(100000),
            &flat,
            TierEdit::InterestType(InterestType::ReducingBalance),
        )
        .unwrap();
        let reducing = apply_edit(dec!(100000), &reducing, TierEdit::InterestRatePercent(dec!(18))).unwrap();
        assert_eq!(
            reducing.input.pricing,
            Pricing::ReducingBalance {
                interest_rate_percent: dec!(18)
            }
        );
        assert!(matches!(
            apply_edit(dec!(100000), &reducing, TierEdit::Markup(dec!(1))),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "markup"
        ));

        let islamic = apply_edit(
            dec!(100000),
            &flat,
            TierEdit::InterestType(InterestType::IslamicProfit),
        )
        .unwrap();
        let islamic = apply_edit(dec!(100000), &islamic, TierEdit::Markup(dec!(5000))).unwrap();
        assert_eq!(islamic.input.pricing, Pricing::IslamicProfit { markup: dec!(5000) });
        assert_eq!(islamic.interest_rate_percent, dec!(5));
    }

    #[test]
    fn test_tenure_above_cap_keeps_last_snapshot() {
        let tier = flat_tier();
        let edit = TierEdit::parse(TierField::TenureMonths, "6000").unwrap();
        assert!(matches!(
            apply_edit(dec!(100000), &tier, edit),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "tenure_months"
        ));
        assert_eq!(tier.input.tenure_months, 12);
    }

    #[test]
    fn test_switch_to_islamic_keeps_payable() {
        let tier = flat_tier();
        let islamic = apply_edit(
            dec!(100000),
            &tier,
            TierEdit::InterestType(InterestType::IslamicProfit),
        )
        .unwrap();
        assert_eq!(islamic.input.pricing, Pricing::IslamicProfit { markup: dec!(9600) });
        assert_eq!(islamic.installment_price, tier.installment_price);
        assert_eq!(islamic.interest_rate_percent, dec!(9.6));
    }

    #[test]
    fn test_switch_back_to_rate_seeds_displayed_rate() {
        let islamic = apply_edit(
            dec!(100000),
            &flat_tier(),
            TierEdit::InterestType(InterestType::IslamicProfit),
        )
        .unwrap();
        let reducing = apply_edit(
            dec!(100000),
            &islamic,
            TierEdit::InterestType(InterestType::ReducingBalance),
        )
        .unwrap();
        assert_eq!(
            reducing.input.pricing,
            Pricing::ReducingBalance {
                interest_rate_percent: dec!(9.6)
            }
        );
    }

    #[test]
    fn test_same_type_edit_is_noop() {
        let tier = flat_tier();
        let same = apply_edit(dec!(100000), &tier, TierEdit::InterestType(InterestType::FlatRate)).unwrap();
        assert_eq!(same, tier);
    }

    #[test]
    fn test_default_tier_yields_zero_markup() {
        let input: TierInput = TierDefaults::default().into();
        let tier = recompute_tier(dec!(50000), &input).unwrap();
        assert_eq!(tier.markup, Decimal::ZERO);
        assert_eq!(tier.monthly_installment, dec!(4166.67));
    }
}
