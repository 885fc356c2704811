//! Modèle de données des parcelles
//!
//! Le contour (`boundary`), la référence cadastrale (`parcel_id`) et le numéro
//! de lot sont figés à la création. Seuls le libellé, le statut et le coût
//! passent par [`ParcelUpdate`].

use std::fmt;
use std::str::FromStr;

use parcel_geo::{Crs, LatLng};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::LedgerError;

/// Statut d'acquisition d'une parcelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParcelStatus {
    /// Parcelle acquise
    Owned,
    /// Achat en cours de négociation
    Negotiating,
    /// Parcelle repérée, pas encore négociée
    ShoppingList,
}

impl ParcelStatus {
    pub const ALL: [ParcelStatus; 3] = [
        ParcelStatus::Owned,
        ParcelStatus::Negotiating,
        ParcelStatus::ShoppingList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Owned => "OWNED",
            ParcelStatus::Negotiating => "NEGOTIATING",
            ParcelStatus::ShoppingList => "SHOPPING_LIST",
        }
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = String;

    /// Accepte `OWNED`, `owned`, `shopping-list`, `shopping_list`...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "OWNED" => Ok(ParcelStatus::Owned),
            "NEGOTIATING" => Ok(ParcelStatus::Negotiating),
            "SHOPPING_LIST" => Ok(ParcelStatus::ShoppingList),
            _ => Err(format!(
                "Unknown status: {}. Use: owned, negotiating, shopping-list",
                s
            )),
        }
    }
}

/// Parcelle cadastrale enregistrée
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    /// Identifiant interne stable
    pub id: String,
    /// Référence cadastrale externe
    pub parcel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Numéro de lot court, unique dans le registre
    pub lot_number: String,
    /// CRS déclaré du contour
    pub source_crs: Crs,
    /// Contour brut dans le CRS source
    #[serde(with = "raw_boundary")]
    pub boundary: Vec<(f64, f64)>,
    /// Contour reprojeté en WGS84 (absent si la géométrie est invalide)
    #[serde(default)]
    pub geometry: Option<Vec<LatLng>>,
    /// Surface calculée depuis le contour
    #[serde(default)]
    pub area_hectares: Option<f64>,
    pub status: ParcelStatus,
    #[serde(default)]
    pub total_cost: Option<Decimal>,
    /// Raison du signalement quand la géométrie n'a pas pu être mesurée
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_error: Option<String>,
}

impl Parcel {
    /// Vrai si la géométrie a été rejetée
    pub fn is_flagged(&self) -> bool {
        self.geometry_error.is_some()
    }

    /// Libellé d'affichage : nom saisi, sinon numéro de lot
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.lot_number)
    }

    /// Surface en m²
    pub fn area_sqm(&self) -> Option<f64> {
        self.area_hectares.map(parcel_geo::square_metres)
    }

    /// Applique une mise à jour des champs modifiables.
    ///
    /// Retourne `true` si un champ a changé.
    pub fn apply(&mut self, update: &ParcelUpdate) -> bool {
        let before = (self.display_name.clone(), self.status, self.total_cost);

        if let Some(name) = &update.display_name {
            self.display_name = name
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(cost) = update.total_cost {
            self.total_cost = cost;
        }

        before != (self.display_name.clone(), self.status, self.total_cost)
    }
}

/// Parcelle à ingérer (données issues d'un relevé)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParcel {
    /// Identifiant imposé ; calculé depuis la référence et le contour sinon
    #[serde(default)]
    pub id: Option<String>,
    pub parcel_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// CRS déclaré ; le CRS par défaut de la configuration sinon
    #[serde(default)]
    pub source_crs: Option<Crs>,
    #[serde(with = "raw_boundary")]
    pub boundary: Vec<(f64, f64)>,
    #[serde(default = "default_status")]
    pub status: ParcelStatus,
    #[serde(default)]
    pub total_cost: Option<Decimal>,
}

/// Contour brut tel que relevé.
///
/// JSON n'a pas de nombre pour NaN ni pour l'infini : ces valeurs s'écrivent
/// `"NaN"`, `"Infinity"` et `"-Infinity"`. Un `null` se relit comme NaN. Une
/// parcelle signalée pour coordonnée non finie se recharge donc à l'identique.
mod raw_boundary {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    fn encode(value: f64) -> Coordinate {
        if value.is_finite() {
            Coordinate::Number(value)
        } else if value.is_nan() {
            Coordinate::Text("NaN".to_string())
        } else if value > 0.0 {
            Coordinate::Text("Infinity".to_string())
        } else {
            Coordinate::Text("-Infinity".to_string())
        }
    }

    fn decode<E: serde::de::Error>(value: Option<Coordinate>) -> Result<f64, E> {
        match value {
            None => Ok(f64::NAN),
            Some(Coordinate::Number(n)) => Ok(n),
            Some(Coordinate::Text(text)) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid coordinate: {:?}", other))),
            },
        }
    }

    pub fn serialize<S: Serializer>(ring: &[(f64, f64)], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ring.iter().map(|&(x, y)| (encode(x), encode(y))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(f64, f64)>, D::Error> {
        Vec::<(Option<Coordinate>, Option<Coordinate>)>::deserialize(deserializer)?
            .into_iter()
            .map(|(x, y)| Ok((decode::<D::Error>(x)?, decode::<D::Error>(y)?)))
            .collect()
    }
}

fn default_status() -> ParcelStatus {
    ParcelStatus::ShoppingList
}

impl NewParcel {
    pub fn new(parcel_id: impl Into<String>, boundary: Vec<(f64, f64)>) -> Self {
        Self {
            id: None,
            parcel_id: parcel_id.into(),
            display_name: None,
            source_crs: None,
            boundary,
            status: default_status(),
            total_cost: None,
        }
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.source_crs = Some(crs);
        self
    }

    pub fn with_status(mut self, status: ParcelStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.total_cost = Some(cost);
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Mise à jour des champs modifiables d'une parcelle.
///
/// `None` laisse le champ inchangé, `Some(None)` l'efface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelUpdate {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ParcelStatus>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_cost: Option<Option<Decimal>>,
}

/// Distingue un champ absent (`None`) d'un `null` explicite (`Some(None)`)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ParcelUpdate {
    pub fn status(status: ParcelStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.total_cost = Some(Some(cost));
        self
    }

    pub fn clear_cost(mut self) -> Self {
        self.total_cost = Some(None);
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(Some(name.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.status.is_none() && self.total_cost.is_none()
    }

    /// Rejette les coûts négatifs
    pub fn validate(&self, parcel_id: &str) -> Result<(), LedgerError> {
        if let Some(Some(cost)) = self.total_cost {
            validate_cost(parcel_id, cost)?;
        }
        Ok(())
    }
}

/// Un coût d'acquisition ne peut pas être négatif
pub(crate) fn validate_cost(parcel_id: &str, cost: Decimal) -> Result<(), LedgerError> {
    if cost.is_sign_negative() && !cost.is_zero() {
        return Err(LedgerError::InvalidCost {
            parcel_id: parcel_id.to_string(),
            reason: format!("negative amount {}", cost),
        });
    }
    Ok(())
}
