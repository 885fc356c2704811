//! Moteur de reprojection des contours vers WGS84
//!
//! Projections intégrées (pure Rust) en priorité, PROJ en repli pour les
//! autres codes EPSG lorsque la feature `proj` est activée.

mod detect;
#[cfg(feature = "proj")]
mod proj_backend;

pub use detect::Correction;
pub(crate) use detect::interpret;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::projection::{web_mercator_to_geographic, LambertConformal, TransverseMercator};
use crate::types::{Geographic, LatLng};
use crate::{validate_ring, Crs, GeoError};

/// Anneau reprojeté en WGS84
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reprojected {
    /// Sommets (lat, lng), même longueur et même ordre que l'entrée
    pub coords: Vec<LatLng>,
    /// Corrections appliquées à l'entrée
    pub corrections: Vec<Correction>,
}

/// Implémentation retenue pour un CRS source
enum Backend {
    /// Pas de reprojection (source déjà en WGS84)
    Identity,
    TransverseMercator(TransverseMercator),
    Lambert(LambertConformal),
    WebMercator,
    /// Reprojection via PROJ
    #[cfg(feature = "proj")]
    Proj(proj_backend::ProjBackend),
}

/// Reprojection d'un CRS source vers WGS84
pub struct Reprojector {
    crs: Crs,
    backend: Backend,
}

impl Reprojector {
    /// Crée un reprojector pour un CRS source
    ///
    /// # Errors
    ///
    /// [`GeoError::UnsupportedCrs`] pour un code EPSG sans projection intégrée
    /// quand la feature `proj` n'est pas activée.
    pub fn new(crs: Crs) -> Result<Self, GeoError> {
        let backend = match crs {
            Crs::Wgs84 => Backend::Identity,
            Crs::Utm { zone, south, datum } => Backend::TransverseMercator(
                TransverseMercator::utm(zone, south, datum.ellipsoid()),
            ),
            Crs::Lambert93 => Backend::Lambert(LambertConformal::lambert93()),
            Crs::WebMercator => Backend::WebMercator,
            #[cfg(feature = "proj")]
            Crs::Epsg(code) => Backend::Proj(proj_backend::ProjBackend::new(code)?),
            #[cfg(not(feature = "proj"))]
            Crs::Epsg(code) => {
                return Err(GeoError::UnsupportedCrs(format!(
                    "EPSG:{} requires the 'proj' feature. Built-in projections: \
                     4326, 2154, 3857, 326xx, 327xx, 258xx",
                    code
                )))
            }
        };

        Ok(Self { crs, backend })
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Retourne une description de l'implémentation utilisée
    pub fn description(&self) -> &'static str {
        match self.backend {
            Backend::Identity => "identity (already WGS84)",
            Backend::TransverseMercator(_) => "transverse mercator (pure Rust)",
            Backend::Lambert(_) => "lambert conformal conic (pure Rust)",
            Backend::WebMercator => "web mercator (pure Rust)",
            #[cfg(feature = "proj")]
            Backend::Proj(_) => "proj (PROJ library)",
        }
    }

    /// Convertit un point projeté, sans détection ni contrôle de domaine
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<LatLng, GeoError> {
        let geo = match &self.backend {
            Backend::Identity => Geographic::from_degrees(x, y),
            Backend::TransverseMercator(tm) => tm.inverse(x, y),
            Backend::Lambert(lcc) => lcc.inverse(x, y),
            Backend::WebMercator => web_mercator_to_geographic(x, y),
            #[cfg(feature = "proj")]
            Backend::Proj(p) => return p.to_lat_lng(x, y),
        };
        Ok(geo.to_lat_lng())
    }

    /// Reprojette un anneau de contour.
    ///
    /// L'anneau est validé, les inversions d'axes et les coordonnées déjà
    /// géographiques sont corrigées, puis chaque sommet est projeté.
    pub fn reproject_ring(&self, ring: &[(f64, f64)]) -> Result<Reprojected, GeoError> {
        validate_ring(ring)?;

        let interpretation = detect::interpret(ring, &self.crs);
        let corrections = interpretation.corrections(&self.crs);
        for correction in &corrections {
            warn!(crs = %self.crs, vertices = ring.len(), correction = ?correction, "Correcting mislabeled ring");
        }

        let oriented = ring.iter().map(|&(x, y)| {
            if interpretation.swap_axes {
                (y, x)
            } else {
                (x, y)
            }
        });

        let envelope = if interpretation.geographic {
            Crs::Wgs84.envelope()
        } else {
            self.crs.envelope()
        };

        let mut coords = Vec::with_capacity(ring.len());
        for (index, (x, y)) in oriented.enumerate() {
            if let Some(env) = envelope {
                if !env.contains(x, y) {
                    return Err(out_of_range(index, x, y, &self.crs));
                }
            }

            let point = if interpretation.geographic {
                LatLng::new(y, x)
            } else {
                self.to_geographic(x, y)?
            };

            if !point.is_valid() {
                return Err(out_of_range(index, x, y, &self.crs));
            }
            coords.push(point);
        }

        debug!(crs = %self.crs, vertices = coords.len(), backend = self.description(), "Ring reprojected");

        Ok(Reprojected {
            coords,
            corrections,
        })
    }
}

fn out_of_range(index: usize, x: f64, y: f64, crs: &Crs) -> GeoError {
    GeoError::OutOfRange {
        index,
        x,
        y,
        crs: crs.to_string(),
    }
}

/// Reprojette un anneau déclaré dans `crs` vers WGS84
pub fn reproject_ring(ring: &[(f64, f64)], crs: &Crs) -> Result<Reprojected, GeoError> {
    Reprojector::new(*crs)?.reproject_ring(ring)
}

/// Reprojette des anneaux indépendants en parallèle, résultat dans l'ordre d'entrée
pub fn reproject_many(rings: &[(Vec<(f64, f64)>, Crs)]) -> Vec<Result<Reprojected, GeoError>> {
    rings
        .par_iter()
        .map(|(ring, crs)| reproject_ring(ring, crs))
        .collect()
}
