//! Erreurs du registre de parcelles

use parcel_geo::GeoError;
use thiserror::Error;

/// Erreur de la couche de persistance
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("parcel '{0}' already exists")]
    Duplicate(String),

    #[error("parcel '{0}' not found")]
    NotFound(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Erreur du registre
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Contour invalide (rejeté à la mesure, la parcelle est signalée)
    #[error("invalid geometry for parcel '{parcel_id}': {source}")]
    Geometry {
        parcel_id: String,
        #[source]
        source: GeoError,
    },

    #[error("invalid cost for parcel '{parcel_id}': {reason}")]
    InvalidCost { parcel_id: String, reason: String },

    #[error("parcel '{0}' has no source CRS and no default CRS is configured")]
    MissingCrs(String),

    #[error("invalid lot pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Vrai si l'erreur concerne la géométrie d'une parcelle
    pub fn is_geometry(&self) -> bool {
        matches!(self, LedgerError::Geometry { .. })
    }
}
