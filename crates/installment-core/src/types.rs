use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as percentages (12 = 12% per annum), the way tiers are
/// quoted to customers.
pub type Percent = Decimal;

/// Decimal places kept on every monetary output.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Decimal places kept on derived (not user-entered) rates.
pub const RATE_DECIMAL_PLACES: u32 = 4;

/// Longest tenure a tier may carry (50 years of monthly payments).
pub const MAX_TENURE_MONTHS: u32 = 600;

/// Round-half-up, used for every rounded figure in the crate.
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Round a monetary amount to 2 dp, half-up.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, ROUNDING)
}

/// Round a derived rate to 4 dp, half-up.
pub fn round_rate(rate: Percent) -> Percent {
    rate.round_dp_with_strategy(RATE_DECIMAL_PLACES, ROUNDING)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
