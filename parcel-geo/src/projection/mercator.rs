//! Projection Web Mercator (EPSG:3857)
//!
//! Modèle sphérique de rayon égal au demi-grand axe WGS84.

use super::Ellipsoid;
use crate::types::Geographic;

/// Latitude maximale représentable
const MAX_LAT_DEG: f64 = 85.051_128_78;

/// Géographique → Web Mercator
pub fn geographic_to_web_mercator(geo: Geographic) -> (f64, f64) {
    let r = Ellipsoid::WGS84.a;
    let lat = geo
        .lat
        .clamp(-MAX_LAT_DEG.to_radians(), MAX_LAT_DEG.to_radians());

    let x = r * geo.lon;
    let y = r * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

/// Web Mercator → géographique
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let r = Ellipsoid::WGS84.a;
    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;
    Geographic::new(lon, lat)
}

/// Facteur d'échelle linéaire (sécante de la latitude) au point projeté
pub fn web_mercator_scale(y: f64) -> f64 {
    1.0 / web_mercator_to_geographic(0.0, y).lat.cos()
}
