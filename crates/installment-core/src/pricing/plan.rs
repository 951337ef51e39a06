use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::pricing::tier::{Tier, TierInput};
use crate::pricing::tiers::{PlanSnapshot, TierCollection};
use crate::{types::*, InstallmentResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInput {
    pub cash_price: Money,
    pub tiers: Vec<TierInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutput {
    pub cash_price: Money,
    pub tiers: Vec<Tier>,
    /// Persistence payload for the same tiers
    pub snapshot: PlanSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_monthly_installment: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price every tier of a plan and wrap the result in the standard envelope.
pub fn price_plan(input: &PlanInput) -> InstallmentResult<ComputationOutput<PlanOutput>> {
    let start = Instant::now();

    let collection = TierCollection::from_inputs(input.cash_price, &input.tiers)?;
    let tiers = collection.tiers().to_vec();
    let warnings = plan_warnings(input.cash_price, &tiers);

    let output = PlanOutput {
        cash_price: input.cash_price,
        snapshot: collection.snapshot(),
        lowest_monthly_installment: collection.lowest_monthly_installment(),
        tiers,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Installment pricing: flat rate, reducing balance (level-payment amortization), \
         Islamic profit (markup quoted on cash price); money rounded half-up to 2 dp",
        &serde_json::json!({
            "cash_price": input.cash_price.to_string(),
            "tier_count": input.tiers.len(),
            "rounding": "MidpointAwayFromZero",
            "money_decimal_places": MONEY_DECIMAL_PLACES,
            "rate_decimal_places": RATE_DECIMAL_PLACES,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn plan_warnings(cash_price: Money, tiers: &[Tier]) -> Vec<String> {
    let mut warnings = Vec::new();
    if cash_price.is_zero() {
        warnings.push("Cash price is zero; all tiers are unfinanced".to_string());
    }
    for (i, tier) in tiers.iter().enumerate() {
        let label = if tier.name().is_empty() {
            format!("Tier {}", i + 1)
        } else {
            format!("Tier {} ('{}')", i + 1, tier.name())
        };
        if tier.input.tenure_months == 0 {
            warnings.push(format!(
                "{label}: tenure not entered; monthly installment shown as zero"
            ));
        }
        if !cash_price.is_zero() && tier.input.down_payment >= cash_price {
            warnings.push(format!(
                "{label}: down payment covers the cash price; nothing is financed"
            ));
        }
    }
    warnings
}
