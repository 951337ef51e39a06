use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use installment_core::pricing::edit::{apply_edit, TierEdit, TierField};
use installment_core::pricing::tier::{Tier, TierInput, TierRecord};
use installment_core::pricing::tiers::{PlanSnapshot, TierCollection};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct TierRequest {
    cash_price: Decimal,
    tier: TierInput,
}

#[derive(Deserialize)]
struct TiersRequest {
    cash_price: Decimal,
    tiers: Vec<TierInput>,
}

#[derive(Deserialize)]
struct EditRequest {
    cash_price: Decimal,
    tier: Tier,
    field: String,
    value: String,
}

#[derive(Deserialize)]
struct RepriceRequest {
    snapshot: PlanSnapshot,
    cash_price: Decimal,
}

// ---------------------------------------------------------------------------
// Recompute
// ---------------------------------------------------------------------------

#[napi]
pub fn recompute_tier(input_json: String) -> NapiResult<String> {
    let req: TierRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tier =
        installment_core::recompute_tier(req.cash_price, &req.tier).map_err(to_napi_error)?;
    serde_json::to_string(&tier).map_err(to_napi_error)
}

#[napi]
pub fn recompute_all_tiers(input_json: String) -> NapiResult<String> {
    let req: TiersRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tiers = installment_core::recompute_all_tiers(req.cash_price, &req.tiers)
        .map_err(to_napi_error)?;
    serde_json::to_string(&tiers).map_err(to_napi_error)
}

#[napi]
pub fn price_plan(input_json: String) -> NapiResult<String> {
    let input: installment_core::pricing::plan::PlanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = installment_core::pricing::plan::price_plan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form edits
// ---------------------------------------------------------------------------

/// Apply one raw form edit to a tier snapshot and return the new snapshot.
/// On error the caller keeps the snapshot it passed in.
#[napi]
pub fn apply_tier_edit(input_json: String) -> NapiResult<String> {
    let req: EditRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let field: TierField = req.field.parse().map_err(to_napi_error)?;
    let edit = TierEdit::parse(field, &req.value).map_err(to_napi_error)?;
    let next = apply_edit(req.cash_price, &req.tier, edit).map_err(to_napi_error)?;
    serde_json::to_string(&next).map_err(to_napi_error)
}

/// Reprice a saved plan at a new cash price, returning the new snapshot.
#[napi]
pub fn reprice_plan(input_json: String) -> NapiResult<String> {
    let req: RepriceRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let mut plan = TierCollection::from_snapshot(&req.snapshot).map_err(to_napi_error)?;
    plan.update_plan_price(req.cash_price).map_err(to_napi_error)?;
    serde_json::to_string(&plan.snapshot()).map_err(to_napi_error)
}

/// Persistence payload for a computed tier.
#[napi]
pub fn tier_record(tier_json: String) -> NapiResult<String> {
    let tier: Tier = serde_json::from_str(&tier_json).map_err(to_napi_error)?;
    serde_json::to_string(&TierRecord::from(&tier)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn repayment_schedule(input_json: String) -> NapiResult<String> {
    let req: TierRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tier =
        installment_core::recompute_tier(req.cash_price, &req.tier).map_err(to_napi_error)?;
    let schedule =
        installment_core::pricing::schedule::build_schedule(&tier).map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}
