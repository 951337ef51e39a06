//! Single-tier recomputation.
//!
//! Derives the financed amount, dispatches to the tier's interest convention,
//! rounds, and assembles a [`Tier`] snapshot. The output depends only on the
//! cash price and the tier's inputs, so recomputing a snapshot from its own
//! inputs returns it unchanged.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::InstallmentError;
use crate::pricing::rate_engine::{amortized_monthly, flat_rate_monthly, islamic_profit};
use crate::pricing::tier::{Pricing, Tier, TierInput};
use crate::types::{round_money, round_rate, Money, Percent};
use crate::InstallmentResult;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive every computed field of one tier at the given cash price.
pub fn recompute_tier(cash_price: Money, input: &TierInput) -> InstallmentResult<Tier> {
    validate_cash_price(cash_price)?;
    validate_down_payment(input.down_payment)?;

    let financed_amount = financed_amount(cash_price, input.down_payment);
    let months = input.tenure_months;

    let (markup, interest_rate_percent) = match input.pricing {
        Pricing::FlatRate {
            interest_rate_percent,
        } => {
            let outcome = flat_rate_monthly(financed_amount, interest_rate_percent, months)?;
            (round_money(outcome.markup), interest_rate_percent)
        }
        Pricing::ReducingBalance {
            interest_rate_percent,
        } => {
            let outcome = amortized_monthly(financed_amount, interest_rate_percent, months)?;
            (round_money(outcome.markup), interest_rate_percent)
        }
        Pricing::IslamicProfit { markup } => {
            // the entered markup stays in `input.pricing`; the tier shows it to the cent
            let outcome = islamic_profit(financed_amount, markup, months)?;
            let markup = round_money(outcome.markup);
            (markup, islamic_rate_on_cash_price(markup, cash_price))
        }
    };

    let installment_price = round_money(checked_sum(financed_amount, markup)?);
    let monthly_installment = if months > 0 {
        round_money(installment_price / Decimal::from(months))
    } else {
        Decimal::ZERO
    };

    Ok(Tier {
        input: input.clone(),
        financed_amount,
        interest_rate_percent,
        markup,
        installment_price,
        monthly_installment,
        total_cost_to_customer: round_money(checked_sum(cash_price, markup)?),
    })
}

fn checked_sum(amount: Money, markup: Money) -> InstallmentResult<Money> {
    amount
        .checked_add(markup)
        .ok_or_else(|| InstallmentError::invalid("markup", "Markup is too large to price"))
}

/// Recompute a batch of tiers against one cash price. Fails on the first
/// invalid tier without returning partial results.
pub fn recompute_all_tiers(cash_price: Money, inputs: &[TierInput]) -> InstallmentResult<Vec<Tier>> {
    inputs
        .iter()
        .map(|input| recompute_tier(cash_price, input))
        .collect()
}

/// max(0, cash price - down payment), rounded to 2 dp.
pub fn financed_amount(cash_price: Money, down_payment: Money) -> Money {
    round_money((cash_price - down_payment).max(Decimal::ZERO))
}

/// Rate shown for an Islamic-profit tier.
///
/// Islamic markup is quoted against the full sale price, so the rate is
/// markup / cash price rather than markup / financed amount. A tier with a
/// down payment therefore shows a lower rate than the same markup would imply
/// on the financed amount.
pub fn islamic_rate_on_cash_price(markup: Money, cash_price: Money) -> Percent {
    if cash_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_rate(markup / cash_price * dec!(100))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate_cash_price(cash_price: Money) -> InstallmentResult<()> {
    if cash_price < Decimal::ZERO {
        return Err(InstallmentError::invalid(
            "cash_price",
            "Cash price cannot be negative",
        ));
    }
    Ok(())
}

pub(crate) fn validate_down_payment(down_payment: Money) -> InstallmentResult<()> {
    if down_payment < Decimal::ZERO {
        return Err(InstallmentError::invalid(
            "down_payment",
            "Down payment cannot be negative",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::tier::InterestType;
    use rust_decimal_macros::dec;

    fn tier_input(pricing: Pricing) -> TierInput {
        TierInput {
            name: "12 months".into(),
            down_payment: dec!(20000),
            tenure_months: 12,
            pricing,
            finance_offer: None,
        }
    }

    fn flat(rate: Decimal) -> Pricing {
        Pricing::FlatRate {
            interest_rate_percent: rate,
        }
    }

    fn reducing(rate: Decimal) -> Pricing {
        Pricing::ReducingBalance {
            interest_rate_percent: rate,
        }
    }

    // -----------------------------------------------------------------------
    // Worked scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn test_flat_rate_scenario() {
        let tier = recompute_tier(dec!(100000), &tier_input(flat(dec!(12)))).unwrap();
        assert_eq!(tier.financed_amount, dec!(80000));
        assert_eq!(tier.markup, dec!(9600));
        assert_eq!(tier.installment_price, dec!(89600));
        assert_eq!(tier.monthly_installment, dec!(7466.67));
        assert_eq!(tier.total_cost_to_customer, dec!(109600));
        assert_eq!(tier.interest_rate_percent, dec!(12));
    }

    #[test]
    fn test_islamic_scenario_quotes_rate_on_cash_price() {
        let input = tier_input(Pricing::IslamicProfit { markup: dec!(9600) });
        let tier = recompute_tier(dec!(100000), &input).unwrap();
        assert_eq!(tier.interest_rate_percent, dec!(9.6));
        assert_eq!(tier.installment_price, dec!(89600));
        assert_eq!(tier.monthly_installment, dec!(7466.67));
        assert_eq!(tier.total_cost_to_customer, dec!(109600));
        assert_eq!(tier.markup, dec!(9600));
        assert_eq!(tier.interest_type(), InterestType::IslamicProfit);
    }

    #[test]
    fn test_islamic_and_flat_same_payable_different_quoted_rate() {
        let flat_tier = recompute_tier(dec!(100000), &tier_input(flat(dec!(12)))).unwrap();
        let islamic_tier = recompute_tier(
            dec!(100000),
            &tier_input(Pricing::IslamicProfit {
                markup: flat_tier.markup,
            }),
        )
        .unwrap();
        assert_eq!(flat_tier.installment_price, islamic_tier.installment_price);
        assert_eq!(flat_tier.monthly_installment, islamic_tier.monthly_installment);
        // 12% on the financed amount reads as 9.6% on the cash price
        assert!(islamic_tier.interest_rate_percent < flat_tier.interest_rate_percent);
    }

    #[test]
    fn test_reducing_balance_scenario_below_flat() {
        let tier = recompute_tier(dec!(100000), &tier_input(reducing(dec!(12)))).unwrap();
        assert_eq!(tier.financed_amount, dec!(80000));
        assert_eq!(tier.monthly_installment, dec!(7107.90));
        assert_eq!(tier.markup, dec!(5294.84));
        assert_eq!(tier.installment_price, dec!(85294.84));
        assert!(tier.monthly_installment < dec!(7466.67));
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    #[test]
    fn test_invariants_hold_for_every_convention() {
        let cash = dec!(254999);
        for pricing in [
            flat(dec!(17.5)),
            reducing(dec!(17.5)),
            Pricing::IslamicProfit {
                markup: dec!(31250.55),
            },
        ] {
            let mut input = tier_input(pricing);
            input.down_payment = dec!(50000);
            input.tenure_months = 18;
            let tier = recompute_tier(cash, &input).unwrap();
            assert_eq!(tier.financed_amount, dec!(204999));
            assert_eq!(tier.total_cost_to_customer, cash + tier.markup);
            assert_eq!(tier.installment_price, tier.financed_amount + tier.markup);
            assert_eq!(
                tier.monthly_installment,
                round_money(tier.installment_price / dec!(18))
            );
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        for pricing in [
            flat(dec!(9.99)),
            reducing(dec!(21)),
            Pricing::IslamicProfit { markup: dec!(7777) },
        ] {
            let once = recompute_tier(dec!(64999), &tier_input(pricing)).unwrap();
            let twice = recompute_tier(dec!(64999), &once.input).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_zero_rate_even_split_for_rate_conventions() {
        let a = recompute_tier(dec!(100000), &tier_input(flat(Decimal::ZERO))).unwrap();
        let b = recompute_tier(dec!(100000), &tier_input(reducing(Decimal::ZERO))).unwrap();
        assert_eq!(a.monthly_installment, b.monthly_installment);
        assert_eq!(a.monthly_installment, round_money(dec!(80000) / dec!(12)));
        assert_eq!(a.markup, Decimal::ZERO);
    }

    #[test]
    fn test_rate_monotonic_in_markup_and_installment() {
        for make in [flat as fn(Decimal) -> Pricing, reducing] {
            let mut prev: Option<Tier> = None;
            for rate in [dec!(0), dec!(2.5), dec!(5), dec!(12), dec!(24), dec!(36)] {
                let tier = recompute_tier(dec!(100000), &tier_input(make(rate))).unwrap();
                if let Some(p) = &prev {
                    assert!(tier.markup > p.markup);
                    assert!(tier.monthly_installment > p.monthly_installment);
                }
                prev = Some(tier);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Edge cases
    // -----------------------------------------------------------------------

    #[test]
    fn test_down_payment_above_price_clamps_financed_amount() {
        let mut input = tier_input(flat(dec!(12)));
        input.down_payment = dec!(150000);
        let tier = recompute_tier(dec!(100000), &input).unwrap();
        assert_eq!(tier.financed_amount, Decimal::ZERO);
        assert_eq!(tier.markup, Decimal::ZERO);
        assert_eq!(tier.monthly_installment, Decimal::ZERO);
        assert_eq!(tier.total_cost_to_customer, dec!(100000));
    }

    #[test]
    fn test_tenure_not_entered_zeroes_monthly() {
        let mut input = tier_input(flat(dec!(12)));
        input.tenure_months = 0;
        let tier = recompute_tier(dec!(100000), &input).unwrap();
        assert_eq!(tier.monthly_installment, Decimal::ZERO);
        assert_eq!(tier.markup, Decimal::ZERO);
        assert_eq!(tier.installment_price, tier.financed_amount);
    }

    #[test]
    fn test_islamic_markup_kept_when_tenure_not_entered() {
        let mut input = tier_input(Pricing::IslamicProfit { markup: dec!(9600) });
        input.tenure_months = 0;
        let tier = recompute_tier(dec!(100000), &input).unwrap();
        assert_eq!(tier.markup, dec!(9600));
        assert_eq!(tier.monthly_installment, Decimal::ZERO);
        assert_eq!(tier.interest_rate_percent, dec!(9.6));
        assert_eq!(tier.installment_price, dec!(89600));
    }

    #[test]
    fn test_islamic_zero_cash_price_has_zero_rate() {
        assert_eq!(islamic_rate_on_cash_price(dec!(500), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let mut input = tier_input(flat(dec!(12)));
        input.down_payment = dec!(-1);
        assert!(matches!(
            recompute_tier(dec!(100000), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "down_payment"
        ));

        let input = tier_input(flat(dec!(-3)));
        assert!(matches!(
            recompute_tier(dec!(100000), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "interest_rate_percent"
        ));

        let input = tier_input(Pricing::IslamicProfit { markup: dec!(-3) });
        assert!(matches!(
            recompute_tier(dec!(100000), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "markup"
        ));

        let input = tier_input(flat(dec!(3)));
        assert!(matches!(
            recompute_tier(dec!(-5), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "cash_price"
        ));
    }

    #[test]
    fn test_sub_cent_islamic_markup_keeps_invariants() {
        let input = tier_input(Pricing::IslamicProfit {
            markup: dec!(9600.005),
        });
        let tier = recompute_tier(dec!(100000), &input).unwrap();
        assert_eq!(tier.markup, dec!(9600.01));
        assert_eq!(tier.total_cost_to_customer, dec!(100000) + tier.markup);
        assert_eq!(tier.installment_price, tier.financed_amount + tier.markup);
        assert_eq!(tier.interest_rate_percent, dec!(9.6));
        // the entered figure is kept as typed
        assert_eq!(tier.input.pricing, Pricing::IslamicProfit { markup: dec!(9600.005) });
        assert_eq!(recompute_tier(dec!(100000), &tier.input).unwrap(), tier);
    }

    #[test]
    fn test_long_tenure_high_rate_rejected_not_panicking() {
        let mut input = tier_input(reducing(dec!(24)));
        input.tenure_months = 6000;
        assert!(matches!(
            recompute_tier(dec!(100000), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "tenure_months"
        ));

        let mut input = tier_input(reducing(dec!(1000)));
        input.tenure_months = 120;
        assert!(matches!(
            recompute_tier(dec!(100000), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "interest_rate_percent"
        ));

        let mut input = tier_input(flat(Decimal::ZERO));
        input.tenure_months = 4_000_000_000;
        assert!(matches!(
            recompute_tier(dec!(100000), &input),
            Err(InstallmentError::InvalidInput { ref field, .. }) if field == "tenure_months"
        ));
    }

    #[test]
    fn test_recompute_all_tiers_preserves_order() {
        let inputs = vec![
            tier_input(flat(dec!(12))),
            tier_input(reducing(dec!(12))),
            tier_input(Pricing::IslamicProfit { markup: dec!(9600) }),
        ];
        let tiers = recompute_all_tiers(dec!(100000), &inputs).unwrap();
        assert_eq!(tiers.len(), 3);
        for (tier, input) in tiers.iter().zip(&inputs) {
            assert_eq!(&tier.input, input);
        }
    }

    #[test]
    fn test_recompute_all_tiers_fails_whole_batch() {
        let inputs = vec![tier_input(flat(dec!(12))), tier_input(flat(dec!(-1)))];
        assert!(recompute_all_tiers(dec!(100000), &inputs).is_err());
    }
}
