pub mod edit;
pub mod pricing;
