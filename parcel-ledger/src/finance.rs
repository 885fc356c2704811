//! Agrégats financiers de l'exploitation
//!
//! Les montants sont des [`Decimal`] : une somme recalculée donne toujours le
//! même résultat, sans dérive flottante. Les surfaces entrent dans le calcul
//! arrondies à 6 décimales d'hectare (1 cm²).
//!
//! Tout ratio à dénominateur nul vaut 0. Une parcelle dont le montant ferait
//! dépasser un total la capacité de [`Decimal`] est écartée des totaux et
//! listée dans `overflowed_parcels`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::model::{Parcel, ParcelStatus};

/// Décimales retenues pour les surfaces en hectares
const AREA_DP: u32 = 6;

/// Décimales des montants estimés
const CURRENCY_DP: u32 = 2;

/// Parcelle signalée (géométrie rejetée)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedParcel {
    pub id: String,
    pub error: String,
}

/// Synthèse financière, recalculée à la demande
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub owned_count: usize,
    pub negotiating_count: usize,
    pub shopping_list_count: usize,

    /// Parcelles acquises avec coût et surface positifs
    pub valid_for_calculation: Vec<String>,
    pub total_investment: Decimal,
    /// Surface acquise (ha)
    pub total_owned_area: Decimal,
    pub total_owned_area_sqm: Decimal,
    pub avg_cost_per_hectare: Decimal,
    pub avg_cost_per_sqm: Decimal,

    /// Surface en négociation (ha)
    pub negotiating_area: Decimal,
    pub confirmed_potential_investment: Decimal,
    pub estimated_potential_investment: Decimal,
    pub potential_investment: Decimal,
    pub has_estimated_costs: bool,
    /// Parcelles en négociation sans coût ni estimation possible
    pub unestimated_parcels: Vec<String>,

    /// Parcelles acquises sans coût exploitable
    pub parcels_without_cost: Vec<String>,
    /// Parcelles acquises sans surface exploitable
    pub parcels_without_area: Vec<String>,
    pub flagged_parcels: Vec<FlaggedParcel>,
    /// Parcelles écartées des totaux : montant hors de la capacité décimale
    pub overflowed_parcels: Vec<String>,
}

impl FinancialSummary {
    pub fn total_count(&self) -> usize {
        self.owned_count + self.negotiating_count + self.shopping_list_count
    }

    /// Vrai si des données manquent pour un calcul complet
    pub fn has_data_issues(&self) -> bool {
        !self.parcels_without_cost.is_empty()
            || !self.parcels_without_area.is_empty()
            || !self.flagged_parcels.is_empty()
            || !self.overflowed_parcels.is_empty()
    }
}

/// Surface d'une parcelle en hectares, si positive
fn positive_area(parcel: &Parcel) -> Option<Decimal> {
    parcel
        .area_hectares
        .and_then(Decimal::from_f64)
        .map(|ha| ha.round_dp(AREA_DP))
        .filter(|ha| *ha > Decimal::ZERO)
}

/// Coût d'une parcelle, si positif
fn positive_cost(parcel: &Parcel) -> Option<Decimal> {
    parcel.total_cost.filter(|cost| *cost > Decimal::ZERO)
}

/// Division protégée : 0 si le dénominateur est nul
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

fn sqm(hectares: Decimal) -> Option<Decimal> {
    hectares.checked_mul(Decimal::from(10_000))
}

/// Cumule une parcelle acquise ; `None` si un total dépasse la capacité décimale
fn add_owned(summary: &mut FinancialSummary, cost: Decimal, area: Decimal) -> Option<()> {
    let investment = summary.total_investment.checked_add(cost)?;
    let owned_area = summary.total_owned_area.checked_add(area)?;
    let owned_area_sqm = sqm(owned_area)?;

    summary.total_investment = investment;
    summary.total_owned_area = owned_area;
    summary.total_owned_area_sqm = owned_area_sqm;
    Some(())
}

/// Cumule une parcelle en négociation ; `None` si un total dépasse la capacité décimale
fn add_negotiating(summary: &mut FinancialSummary, parcel: &Parcel) -> Option<()> {
    let area = positive_area(parcel);
    let negotiating_area = match area {
        Some(area) => summary.negotiating_area.checked_add(area)?,
        None => summary.negotiating_area,
    };

    let mut confirmed = summary.confirmed_potential_investment;
    let mut estimated = summary.estimated_potential_investment;
    let mut has_estimate = false;
    match (parcel.total_cost, area) {
        (Some(cost), _) => confirmed = confirmed.checked_add(cost)?,
        (None, Some(area)) if summary.avg_cost_per_sqm > Decimal::ZERO => {
            let estimate = sqm(area)?
                .checked_mul(summary.avg_cost_per_sqm)?
                .round_dp(CURRENCY_DP);
            estimated = estimated.checked_add(estimate)?;
            has_estimate = true;
        }
        (None, _) => {}
    }
    let potential = confirmed.checked_add(estimated)?;

    summary.negotiating_area = negotiating_area;
    summary.confirmed_potential_investment = confirmed;
    summary.estimated_potential_investment = estimated;
    summary.potential_investment = potential;
    if has_estimate {
        summary.has_estimated_costs = true;
    } else if parcel.total_cost.is_none() {
        summary.unestimated_parcels.push(parcel.id.clone());
    }
    Some(())
}

fn record_overflow(summary: &mut FinancialSummary, parcel: &Parcel) {
    warn!(id = %parcel.id, status = %parcel.status, "Amount out of decimal range, parcel left out of totals");
    summary.overflowed_parcels.push(parcel.id.clone());
}

/// Calcule la synthèse financière d'un ensemble de parcelles
pub fn aggregate(parcels: &[Parcel]) -> FinancialSummary {
    let mut summary = FinancialSummary::default();

    for parcel in parcels {
        if let Some(error) = &parcel.geometry_error {
            summary.flagged_parcels.push(FlaggedParcel {
                id: parcel.id.clone(),
                error: error.clone(),
            });
        }

        match parcel.status {
            ParcelStatus::Owned => summary.owned_count += 1,
            ParcelStatus::Negotiating => summary.negotiating_count += 1,
            ParcelStatus::ShoppingList => summary.shopping_list_count += 1,
        }
    }

    // Parcelles acquises : base des coûts moyens
    for parcel in parcels.iter().filter(|p| p.status == ParcelStatus::Owned) {
        let cost = positive_cost(parcel);
        let area = positive_area(parcel);

        if cost.is_none() {
            summary.parcels_without_cost.push(parcel.id.clone());
        }
        if area.is_none() {
            summary.parcels_without_area.push(parcel.id.clone());
        }

        if let (Some(cost), Some(area)) = (cost, area) {
            match add_owned(&mut summary, cost, area) {
                Some(()) => summary.valid_for_calculation.push(parcel.id.clone()),
                None => record_overflow(&mut summary, parcel),
            }
        }
    }

    summary.avg_cost_per_hectare = ratio(summary.total_investment, summary.total_owned_area);
    summary.avg_cost_per_sqm = ratio(summary.total_investment, summary.total_owned_area_sqm);

    // Parcelles en négociation : coût connu, sinon estimation au coût moyen
    for parcel in parcels
        .iter()
        .filter(|p| p.status == ParcelStatus::Negotiating)
    {
        if add_negotiating(&mut summary, parcel).is_none() {
            record_overflow(&mut summary, parcel);
        }
    }

    summary
}
