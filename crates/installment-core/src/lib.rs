pub mod error;
pub mod pricing;
pub mod types;

pub use error::InstallmentError;
pub use pricing::calculator::{recompute_all_tiers, recompute_tier};
pub use types::*;

/// Standard result type for all installment-pricing operations
pub type InstallmentResult<T> = Result<T, InstallmentError>;
