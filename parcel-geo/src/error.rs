//! Types d'erreurs pour le crate parcel-geo

use thiserror::Error;

/// Erreurs de géométrie et de reprojection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Anneau avec moins de 3 sommets distincts
    #[error("Invalid geometry: ring has {count} distinct vertices, at least 3 required")]
    TooFewVertices { count: usize },

    /// Valeur NaN ou infinie dans l'anneau
    #[error("Invalid geometry: non-finite coordinate at vertex {index}")]
    NonFiniteCoordinate { index: usize },

    /// Deux arêtes de l'anneau se croisent ou se chevauchent
    #[error("Invalid geometry: edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },

    /// Sommet hors du domaine de validité du CRS
    #[error("Invalid geometry: vertex {index} ({x}, {y}) is out of range for {crs}")]
    OutOfRange {
        index: usize,
        x: f64,
        y: f64,
        crs: String,
    },

    /// Identifiant de CRS non reconnu
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    /// CRS reconnu mais sans implémentation disponible
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// Échec de la bibliothèque PROJ
    #[error("Projection failed: {0}")]
    Projection(String),
}

impl GeoError {
    /// Vrai si l'erreur invalide la géométrie elle-même (et non la configuration du CRS)
    pub fn is_invalid_geometry(&self) -> bool {
        matches!(
            self,
            Self::TooFewVertices { .. }
                | Self::NonFiniteCoordinate { .. }
                | Self::SelfIntersecting { .. }
                | Self::OutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_geometry_classification() {
        assert!(GeoError::TooFewVertices { count: 2 }.is_invalid_geometry());
        assert!(GeoError::SelfIntersecting { first: 0, second: 2 }.is_invalid_geometry());
        assert!(!GeoError::UnknownCrs("foo".to_string()).is_invalid_geometry());
    }

    #[test]
    fn test_display() {
        let err = GeoError::NonFiniteCoordinate { index: 3 };
        assert_eq!(
            err.to_string(),
            "Invalid geometry: non-finite coordinate at vertex 3"
        );
    }
}
