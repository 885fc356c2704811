//! Projection Lambert conique conforme à deux parallèles standards
//!
//! Utilisée pour Lambert 93 (EPSG:2154).

use super::Ellipsoid;
use crate::types::Geographic;

/// Constantes d'une projection Lambert conique conforme
#[derive(Debug, Clone, Copy)]
pub struct LambertConformal {
    ellipsoid: Ellipsoid,
    /// Longitude origine
    lon0: f64,
    /// Exposant de la projection
    n: f64,
    /// Constante C
    c: f64,
    /// Rayon à l'origine
    r0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
}

impl LambertConformal {
    /// Construit la projection depuis ses paramètres (angles en degrés)
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        lat0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        x0: f64,
        y0: f64,
    ) -> Self {
        let lat0 = lat0_deg.to_radians();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();

        let n1 = ellipsoid.prime_vertical_radius(lat1);
        let n2 = ellipsoid.prime_vertical_radius(lat2);
        let iso1 = ellipsoid.isometric_latitude(lat1);
        let iso2 = ellipsoid.isometric_latitude(lat2);

        let n = ((n1 * lat1.cos()).ln() - (n2 * lat2.cos()).ln()) / (iso2 - iso1);
        let c = (n1 * lat1.cos() / n) * (n * iso1).exp();
        let r0 = c * (-n * ellipsoid.isometric_latitude(lat0)).exp();

        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            n,
            c,
            r0,
            x0,
            y0,
        }
    }

    /// Lambert 93 (RGF93, GRS80)
    pub fn lambert93() -> Self {
        Self::new(Ellipsoid::GRS80, 3.0, 46.5, 44.0, 49.0, 700_000.0, 6_600_000.0)
    }

    /// Projeté → géographique
    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let dx = x - self.x0;
        let dy = y - self.y0;

        let r = (dx.powi(2) + (self.r0 - dy).powi(2)).sqrt();
        let r = if self.n < 0.0 { -r } else { r };
        let gamma = (dx / (self.r0 - dy)).atan();

        let iso_lat = -(r / self.c).ln() / self.n;
        let lat = self.ellipsoid.latitude_from_isometric(iso_lat);
        let lon = self.lon0 + gamma / self.n;

        Geographic::new(lon, lat)
    }

    /// Géographique → projeté
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let r = self.c * (-self.n * self.ellipsoid.isometric_latitude(geo.lat)).exp();
        let theta = self.n * (geo.lon - self.lon0);
        (self.x0 + r * theta.sin(), self.y0 + self.r0 - r * theta.cos())
    }

    /// Facteur d'échelle linéaire à une latitude donnée (radians)
    pub fn scale_factor(&self, lat: f64) -> f64 {
        let r = self.c * (-self.n * self.ellipsoid.isometric_latitude(lat)).exp();
        r * self.n / (self.ellipsoid.prime_vertical_radius(lat) * lat.cos())
    }
}
