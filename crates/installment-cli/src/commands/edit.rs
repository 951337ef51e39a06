use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use installment_core::pricing::edit::TierField;
use installment_core::pricing::tier::{FinanceOffer, TierDefaults, TierInput};
use installment_core::pricing::tiers::TierCollection;
use installment_core::InstallmentResult;

use crate::input;

/// Arguments for replaying form edits
#[derive(Args)]
pub struct EditArgs {
    /// Path to JSON/YAML edit script
    #[arg(long)]
    pub input: Option<String>,

    /// Abort on the first rejected edit instead of recording it
    #[arg(long)]
    pub strict: bool,
}

/// Starting plan plus the edits an agent made to it, in order.
#[derive(Deserialize)]
struct EditScript {
    cash_price: Decimal,
    #[serde(default)]
    tiers: Vec<TierInput>,
    edits: Vec<EditStep>,
}

#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum EditStep {
    AddTier {
        #[serde(default)]
        defaults: Option<TierDefaults>,
    },
    RemoveTier {
        tier: usize,
    },
    SetField {
        tier: usize,
        field: String,
        value: String,
    },
    SetPrice {
        cash_price: Decimal,
    },
    ToggleFinanceOffer {
        tier: usize,
        enabled: bool,
    },
    SetFinanceOffer {
        tier: usize,
        offer: FinanceOffer,
    },
}

pub fn run_edit(args: EditArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let script: EditScript = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json|file.yaml> or stdin required for edit replay".into());
    };

    let mut plan = TierCollection::from_inputs(script.cash_price, &script.tiers)?;
    let mut rejected = Vec::new();

    for (step_no, step) in script.edits.into_iter().enumerate() {
        if let Err(e) = apply_step(&mut plan, step) {
            if args.strict {
                return Err(format!("edit {}: {}", step_no + 1, e).into());
            }
            rejected.push(format!("edit {}: {}", step_no + 1, e));
        }
    }

    Ok(json!({
        "result": plan.snapshot(),
        "warnings": rejected,
    }))
}

fn apply_step(plan: &mut TierCollection, step: EditStep) -> InstallmentResult<()> {
    match step {
        EditStep::AddTier { defaults } => {
            plan.add_tier(defaults.unwrap_or_default())?;
        }
        EditStep::RemoveTier { tier } => {
            plan.remove_tier(tier)?;
        }
        EditStep::SetField { tier, field, value } => {
            let field: TierField = field.parse()?;
            plan.update_tier_field_raw(tier, field, &value)?;
        }
        EditStep::SetPrice { cash_price } => {
            plan.update_plan_price(cash_price)?;
        }
        EditStep::ToggleFinanceOffer { tier, enabled } => {
            plan.toggle_finance_offer(tier, enabled)?;
        }
        EditStep::SetFinanceOffer { tier, offer } => {
            plan.set_finance_offer(tier, offer)?;
        }
    }
    Ok(())
}
