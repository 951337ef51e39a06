//! The editable tier collection of one plan.
//!
//! Owns the plan's cash price and its ordered tiers. A field edit recomputes
//! only the edited tier; a price change recomputes every tier. Tiers are
//! replaced with fresh snapshots, never mutated field by field, and a rejected
//! edit leaves the stored snapshot as it was.

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InstallmentError;
use crate::pricing::calculator::{recompute_all_tiers, recompute_tier, validate_cash_price};
use crate::pricing::edit::{apply_edit, TierEdit, TierField};
use crate::pricing::tier::{FinanceOffer, Tier, TierDefaults, TierInput, TierRecord};
use crate::types::Money;
use crate::InstallmentResult;

/// Immutable plan snapshot handed to the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    pub cash_price: Money,
    pub tiers: Vec<TierRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCollection {
    cash_price: Money,
    tiers: Vec<Tier>,
}

impl TierCollection {
    pub fn new(cash_price: Money) -> InstallmentResult<Self> {
        validate_cash_price(cash_price)?;
        Ok(TierCollection {
            cash_price,
            tiers: Vec::new(),
        })
    }

    /// Load a plan from stored inputs, recomputing every tier.
    pub fn from_inputs(cash_price: Money, inputs: &[TierInput]) -> InstallmentResult<Self> {
        let tiers = recompute_all_tiers(cash_price, inputs)?;
        Ok(TierCollection { cash_price, tiers })
    }

    /// Load a plan from a persisted snapshot. Derived fields in the snapshot
    /// are discarded and recomputed.
    pub fn from_snapshot(snapshot: &PlanSnapshot) -> InstallmentResult<Self> {
        let inputs: Vec<TierInput> = snapshot.tiers.iter().map(TierInput::from).collect();
        Self::from_inputs(snapshot.cash_price, &inputs)
    }

    pub fn cash_price(&self) -> Money {
        self.cash_price
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn tier(&self, index: usize) -> InstallmentResult<&Tier> {
        self.tiers.get(index).ok_or(InstallmentError::TierNotFound {
            index,
            len: self.tiers.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Append a tier and compute it. Returns the new tier's index.
    pub fn add_tier(&mut self, defaults: TierDefaults) -> InstallmentResult<usize> {
        let tier = recompute_tier(self.cash_price, &defaults.into())?;
        self.tiers.push(tier);
        debug!("added tier {} at cash price {}", self.tiers.len() - 1, self.cash_price);
        Ok(self.tiers.len() - 1)
    }

    /// Remove a tier. Sibling tiers are not recomputed.
    pub fn remove_tier(&mut self, index: usize) -> InstallmentResult<Tier> {
        self.check_index(index)?;
        Ok(self.tiers.remove(index))
    }

    /// Apply one edit to one tier and recompute only that tier.
    pub fn update_tier_field(&mut self, index: usize, edit: TierEdit) -> InstallmentResult<&Tier> {
        self.check_index(index)?;
        let field = edit.field();
        match apply_edit(self.cash_price, &self.tiers[index], edit) {
            Ok(next) => {
                self.tiers[index] = next;
                debug!("tier {index}: {field:?} updated");
                Ok(&self.tiers[index])
            }
            Err(e) => {
                warn!("tier {index}: {field:?} edit rejected: {e}");
                Err(e)
            }
        }
    }

    /// Like [`update_tier_field`](Self::update_tier_field), from raw form text.
    pub fn update_tier_field_raw(
        &mut self,
        index: usize,
        field: TierField,
        raw: &str,
    ) -> InstallmentResult<&Tier> {
        self.check_index(index)?;
        let edit = TierEdit::parse(field, raw).inspect_err(|e| {
            warn!("tier {index}: {field:?} input rejected: {e}");
        })?;
        self.update_tier_field(index, edit)
    }

    /// Set a new cash price and recompute every tier. Either every tier is
    /// updated or, on error, none is.
    pub fn update_plan_price(&mut self, new_price: Money) -> InstallmentResult<&[Tier]> {
        validate_cash_price(new_price).inspect_err(|e| warn!("cash price rejected: {e}"))?;
        let inputs: Vec<TierInput> = self.tiers.iter().map(|t| t.input.clone()).collect();
        let recomputed = recompute_all_tiers(new_price, &inputs)?;
        debug!(
            "cash price {} -> {}, recomputed {} tiers",
            self.cash_price,
            new_price,
            recomputed.len()
        );
        self.cash_price = new_price;
        self.tiers = recomputed;
        Ok(&self.tiers)
    }

    /// Attach (empty, unless one is already there) or detach the finance offer.
    pub fn toggle_finance_offer(&mut self, index: usize, enabled: bool) -> InstallmentResult<&Tier> {
        self.check_index(index)?;
        let tier = &mut self.tiers[index];
        match (enabled, tier.input.finance_offer.is_some()) {
            (true, false) => tier.input.finance_offer = Some(FinanceOffer::default()),
            (false, true) => tier.input.finance_offer = None,
            _ => {}
        }
        Ok(&self.tiers[index])
    }

    /// Fill in the finance offer details, attaching one if needed.
    pub fn set_finance_offer(&mut self, index: usize, offer: FinanceOffer) -> InstallmentResult<&Tier> {
        self.check_index(index)?;
        self.tiers[index].input.finance_offer = Some(offer);
        Ok(&self.tiers[index])
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            cash_price: self.cash_price,
            tiers: self.tiers.iter().map(TierRecord::from).collect(),
        }
    }

    /// Lowest monthly installment across tiers that have a tenure entered.
    pub fn lowest_monthly_installment(&self) -> Option<Money> {
        self.tiers
            .iter()
            .filter(|t| t.input.tenure_months > 0)
            .map(|t| t.monthly_installment)
            .filter(|m| *m > Decimal::ZERO)
            .min()
    }

    fn check_index(&self, index: usize) -> InstallmentResult<()> {
        if index >= self.tiers.len() {
            return Err(InstallmentError::TierNotFound {
                index,
                len: self.tiers.len(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
