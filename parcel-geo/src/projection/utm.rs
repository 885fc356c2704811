//! Projection Transverse Mercator (UTM)
//!
//! Séries de Snyder (USGS Professional Paper 1395, §8), précision millimétrique
//! dans la zone de ±3° autour du méridien central.

use super::Ellipsoid;
use crate::types::Geographic;

/// Coordonnées projetées avec le facteur d'échelle ponctuel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Facteur d'échelle linéaire au point
    pub k: f64,
}

/// Paramètres d'une projection Transverse Mercator
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    /// Longitude du méridien central (radians)
    lon0: f64,
    /// Facteur d'échelle sur le méridien central
    k0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
}

impl TransverseMercator {
    /// Zone UTM (1 à 60), hémisphère nord ou sud
    pub fn utm(zone: u8, south: bool, ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            lon0: ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians(),
            k0: 0.9996,
            x0: 500_000.0,
            y0: if south { 10_000_000.0 } else { 0.0 },
        }
    }

    /// Longitude du méridien central en degrés
    pub fn central_meridian(&self) -> f64 {
        self.lon0.to_degrees()
    }

    /// Longueur de l'arc de méridien depuis l'équateur
    fn meridian_arc(&self, lat: f64) -> f64 {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }

    /// Géographique → projeté, avec facteur d'échelle
    pub fn forward(&self, geo: Geographic) -> Projected {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let ep2 = self.ellipsoid.ep2();
        let k0 = self.k0;

        let lat = geo.lat;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let tan_lat = lat.tan();

        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let t = tan_lat * tan_lat;
        let c = ep2 * cos_lat * cos_lat;
        let aa = (geo.lon - self.lon0) * cos_lat;
        let m = self.meridian_arc(lat);

        let x = k0
            * n
            * (aa
                + (1.0 - t + c) * aa.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * aa.powi(5) / 120.0);

        let y = k0
            * (m + n
                * tan_lat
                * (aa * aa / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * aa.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * aa.powi(6) / 720.0));

        let k = k0
            * (1.0
                + (1.0 + c) * aa * aa / 2.0
                + (5.0 - 4.0 * t + 42.0 * c + 13.0 * c * c - 28.0 * ep2) * aa.powi(4) / 24.0
                + (61.0 - 148.0 * t + 16.0 * t * t) * aa.powi(6) / 720.0);

        Projected {
            x: x + self.x0,
            y: y + self.y0,
            k,
        }
    }

    /// Projeté → géographique
    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let ep2 = self.ellipsoid.ep2();
        let k0 = self.k0;

        // Coordonnées réduites
        let x = x - self.x0;
        let y = y - self.y0;

        // Latitude du point pied (footpoint)
        let m = y / k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();

        let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
        let t1 = tan_phi1.powi(2);
        let c1 = ep2 * cos_phi1.powi(2);
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
        let d = x / (n1 * k0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                        - 252.0 * ep2
                        - 3.0 * c1.powi(2))
                        * d.powi(6)
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        Geographic::new(lon, lat)
    }

    /// Facteur d'échelle au point projeté (x, y)
    pub fn scale_factor_at(&self, x: f64, y: f64) -> f64 {
        self.forward(self.inverse(x, y)).k
    }
}
