//! Projection azimutale équivalente de Lambert (ellipsoïdale)
//!
//! Sert uniquement à la mesure des surfaces : centrée sur la parcelle, elle
//! conserve les aires exactement et déforme peu les formes à l'échelle locale.
//! Formules EPSG (méthode 9820).

use super::Ellipsoid;
use crate::types::Geographic;

/// Latitude maximale du centre, le cas polaire n'étant pas traité
const MAX_CENTRE_LAT: f64 = 89.9;

#[derive(Debug, Clone, Copy)]
pub struct LambertAzimuthalEqualArea {
    ellipsoid: Ellipsoid,
    lon0: f64,
    qp: f64,
    sin_beta0: f64,
    cos_beta0: f64,
    rq: f64,
    d: f64,
}

impl LambertAzimuthalEqualArea {
    /// Projection centrée sur un point
    pub fn centred_on(ellipsoid: Ellipsoid, centre: Geographic) -> Self {
        let lat0 = centre.lat.clamp(
            -MAX_CENTRE_LAT.to_radians(),
            MAX_CENTRE_LAT.to_radians(),
        );
        let a = ellipsoid.a;
        let e2 = ellipsoid.e2();

        let qp = ellipsoid.authalic_q(std::f64::consts::FRAC_PI_2);
        let q0 = ellipsoid.authalic_q(lat0);
        let beta0 = (q0 / qp).clamp(-1.0, 1.0).asin();
        let rq = a * (qp / 2.0).sqrt();
        let d = a * (lat0.cos() / (1.0 - e2 * lat0.sin().powi(2)).sqrt()) / (rq * beta0.cos());

        Self {
            ellipsoid,
            lon0: centre.lon,
            qp,
            sin_beta0: beta0.sin(),
            cos_beta0: beta0.cos(),
            rq,
            d,
        }
    }

    /// Géographique → plan équivalent (mètres)
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let q = self.ellipsoid.authalic_q(geo.lat);
        let beta = (q / self.qp).clamp(-1.0, 1.0).asin();
        let (sin_beta, cos_beta) = beta.sin_cos();
        let (sin_dlon, cos_dlon) = (geo.lon - self.lon0).sin_cos();

        let b = self.rq
            * (2.0
                / (1.0 + self.sin_beta0 * sin_beta + self.cos_beta0 * cos_beta * cos_dlon))
                .sqrt();

        let x = b * self.d * cos_beta * sin_dlon;
        let y = (b / self.d) * (self.cos_beta0 * sin_beta - self.sin_beta0 * cos_beta * cos_dlon);
        (x, y)
    }
}
