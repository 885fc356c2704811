//! Mesure des surfaces de parcelles
//!
//! La surface n'est jamais calculée directement sur des degrés : l'anneau WGS84
//! est projeté dans une Lambert azimutale équivalente centrée sur la parcelle,
//! puis mesuré par la formule du lacet (shoelace).

use geo::{Area, Coord, LineString, Polygon};
use serde::Serialize;

use crate::projection::{
    web_mercator_scale, Ellipsoid, LambertAzimuthalEqualArea, LambertConformal,
    TransverseMercator,
};
use crate::reproject::{interpret, Correction, Reprojector};
use crate::types::{Geographic, LatLng};
use crate::{ring, Crs, GeoError};

/// Nombre de m² dans un hectare
pub const M2_PER_HECTARE: f64 = 10_000.0;

/// Convertit des m² en hectares
pub fn hectares(m2: f64) -> f64 {
    m2 / M2_PER_HECTARE
}

/// Convertit des hectares en m²
pub fn square_metres(ha: f64) -> f64 {
    ha * M2_PER_HECTARE
}

/// Surface plane (formule du lacet) de coordonnées déjà linéaires, en unités²
pub fn planar_area_m2(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    Polygon::new(LineString::from(ring.to_vec()), vec![]).unsigned_area()
}

/// Surface d'un anneau WGS84 en m², via une projection équivalente locale
pub fn geographic_area_m2(ring: &[LatLng]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let centre = centroid(ring);
    let laea = LambertAzimuthalEqualArea::centred_on(Ellipsoid::WGS84, centre);
    let projected: Vec<(f64, f64)> = ring
        .iter()
        .map(|p| laea.forward(p.to_geographic()))
        .collect();

    planar_area_m2(&projected)
}

/// Centre moyen des sommets, longitudes déroulées autour du premier sommet
fn centroid(ring: &[LatLng]) -> Geographic {
    let reference = ring[0].lng;
    let (sum_lat, sum_dlng) = ring.iter().fold((0.0, 0.0), |(lat, dlng), p| {
        let mut d = p.lng - reference;
        if d > 180.0 {
            d -= 360.0;
        } else if d < -180.0 {
            d += 360.0;
        }
        (lat + p.lat, dlng + d)
    });
    let n = ring.len() as f64;
    Geographic::from_degrees(reference + sum_dlng / n, sum_lat / n)
}

/// Surface calculée directement dans le CRS source.
///
/// Les mêmes corrections que pour la reprojection s'appliquent : axes inversés
/// remis dans l'ordre, valeurs déjà en degrés mesurées en WGS84. Pour les
/// projections conformes, la surface plane est corrigée par le facteur
/// d'échelle au centre de l'anneau (aire vraie = aire plane / k²).
pub fn source_area_m2(ring: &[(f64, f64)], crs: &Crs) -> Result<f64, GeoError> {
    ring::validate_ring(ring)?;

    let interpretation = interpret(ring, crs);
    if interpretation.geographic {
        return wgs84_area_m2(ring, crs);
    }

    let oriented: Vec<(f64, f64)> = if interpretation.swap_axes {
        ring.iter().map(|&(x, y)| (y, x)).collect()
    } else {
        ring.to_vec()
    };

    let (cx, cy) = planar_centroid(&ring::open_ring(&oriented));
    match conformal_scale(crs, cx, cy) {
        Some(k) => Ok(planar_area_m2(&oriented) / (k * k)),
        None => wgs84_area_m2(ring, crs),
    }
}

/// Reprojette puis mesure en WGS84
fn wgs84_area_m2(ring: &[(f64, f64)], crs: &Crs) -> Result<f64, GeoError> {
    let reprojected = Reprojector::new(*crs)?.reproject_ring(ring)?;
    Ok(geographic_area_m2(&reprojected.coords))
}

/// Facteur d'échelle ponctuel des projections intégrées
fn conformal_scale(crs: &Crs, x: f64, y: f64) -> Option<f64> {
    match *crs {
        Crs::Utm { zone, south, datum } => {
            Some(TransverseMercator::utm(zone, south, datum.ellipsoid()).scale_factor_at(x, y))
        }
        Crs::Lambert93 => {
            let lcc = LambertConformal::lambert93();
            Some(lcc.scale_factor(lcc.inverse(x, y).lat))
        }
        Crs::WebMercator => Some(web_mercator_scale(y)),
        Crs::Wgs84 | Crs::Epsg(_) => None,
    }
}

/// Centre moyen des sommets distincts (sommet de fermeture exclu)
fn planar_centroid(vertices: &[Coord]) -> (f64, f64) {
    let n = vertices.len() as f64;
    vertices
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x / n, sy + c.y / n))
}

/// Résultat de la chaîne validation → reprojection → surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Contour en WGS84
    pub coords: Vec<LatLng>,
    /// Corrections appliquées à l'entrée
    pub corrections: Vec<Correction>,
    /// Surface en m²
    pub area_m2: f64,
}

impl Measurement {
    pub fn hectares(&self) -> f64 {
        hectares(self.area_m2)
    }
}

/// Valide, reprojette et mesure un contour déclaré dans `crs`
pub fn measure(ring: &[(f64, f64)], crs: &Crs) -> Result<Measurement, GeoError> {
    let reprojected = Reprojector::new(*crs)?.reproject_ring(ring)?;
    let area_m2 = geographic_area_m2(&reprojected.coords);

    Ok(Measurement {
        coords: reprojected.coords,
        corrections: reprojected.corrections,
        area_m2,
    })
}
