use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use installment_core::pricing::plan::{self, PlanInput};
use installment_core::pricing::schedule;
use installment_core::pricing::tier::{InterestType, Pricing, TierInput, TierRecord};
use installment_core::recompute_tier;

use crate::input;

/// A tier priced at a cash price, as read from an input file.
#[derive(Deserialize)]
struct PricedTierInput {
    cash_price: Decimal,
    tier: TierInput,
}

/// Tier flags shared by `tier` and `schedule`
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TierArgs {
    /// Path to JSON/YAML input file with `cash_price` and `tier` (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash price of the product
    #[arg(long)]
    pub cash_price: Option<Decimal>,

    /// Tier label
    #[arg(long, default_value = "")]
    pub name: String,

    /// Down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Tenure in months
    #[arg(long, alias = "months", default_value_t = 12)]
    pub tenure: u32,

    /// Interest convention: flat, reducing or islamic
    #[arg(long, default_value = "flat")]
    pub interest_type: InterestType,

    /// Annual rate in percent (flat and reducing)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Markup amount (islamic)
    #[arg(long)]
    pub markup: Option<Decimal>,
}

/// Arguments for a repayment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub tier: TierArgs,
}

/// Arguments for pricing a whole plan
#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_tier(args: TierArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (cash_price, tier_input) = resolve_tier(args)?;
    let tier = recompute_tier(cash_price, &tier_input)?;
    Ok(json!({
        "result": TierRecord::from(&tier),
        "methodology": format!("{} on cash price {}", tier.interest_type(), cash_price),
    }))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (cash_price, tier_input) = resolve_tier(args.tier)?;
    let tier = recompute_tier(cash_price, &tier_input)?;
    let sched = schedule::build_schedule(&tier)?;
    Ok(json!({
        "result": {
            "tier_name": sched.tier_name,
            "interest_type": tier.interest_type(),
            "monthly_installment": tier.monthly_installment,
            "total_paid": sched.total_paid,
            "total_profit": sched.total_profit,
        },
        "results": sched.rows,
    }))
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan_input: PlanInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json|file.yaml> or stdin required for plan pricing".into());
    };
    let result = plan::price_plan(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}

fn resolve_tier(args: TierArgs) -> Result<(Decimal, TierInput), Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        let priced: PricedTierInput = input::file::read_input(path)?;
        return Ok((priced.cash_price, priced.tier));
    }
    if let Some(priced) = input::stdin::read_stdin::<PricedTierInput>()? {
        return Ok((priced.cash_price, priced.tier));
    }

    let cash_price = args
        .cash_price
        .ok_or("--cash-price is required (or provide --input)")?;
    let pricing = match args.interest_type {
        InterestType::FlatRate => Pricing::FlatRate {
            interest_rate_percent: args.rate.ok_or("--rate is required for flat rate tiers")?,
        },
        InterestType::ReducingBalance => Pricing::ReducingBalance {
            interest_rate_percent: args
                .rate
                .ok_or("--rate is required for reducing balance tiers")?,
        },
        InterestType::IslamicProfit => Pricing::IslamicProfit {
            markup: args.markup.ok_or("--markup is required for islamic tiers")?,
        },
    };

    Ok((
        cash_price,
        TierInput {
            name: args.name,
            down_payment: args.down_payment,
            tenure_months: args.tenure,
            pricing,
            finance_offer: None,
        },
    ))
}
