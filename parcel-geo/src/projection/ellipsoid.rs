//! Ellipsoïdes de référence

/// Ellipsoïde de révolution défini par son demi-grand axe et son aplatissement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Aplatissement
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257223563,
    };

    /// GRS80 (ETRS89, RGF93), différence avec WGS84 < 0.1 mm
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257222101,
    };

    /// Demi-petit axe
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Première excentricité
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Grande normale (rayon de courbure dans le premier vertical)
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.a / (1.0 - self.e2() * lat.sin().powi(2)).sqrt()
    }

    /// Latitude isométrique
    pub fn isometric_latitude(&self, lat: f64) -> f64 {
        let e = self.e();
        let sin_lat = lat.sin();
        let term = ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).powf(e / 2.0);
        ((std::f64::consts::FRAC_PI_4 + lat / 2.0).tan() * term).ln()
    }

    /// Latitude depuis la latitude isométrique (itératif)
    pub fn latitude_from_isometric(&self, iso_lat: f64) -> f64 {
        let e = self.e();
        let mut lat = 2.0 * iso_lat.exp().atan() - std::f64::consts::FRAC_PI_2;

        for _ in 0..12 {
            let sin_lat = lat.sin();
            let term = ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).powf(e / 2.0);
            let next = 2.0 * (iso_lat.exp() * term).atan() - std::f64::consts::FRAC_PI_2;

            if (next - lat).abs() < 1e-12 {
                return next;
            }
            lat = next;
        }
        lat
    }

    /// Terme q de la latitude authalique
    pub fn authalic_q(&self, lat: f64) -> f64 {
        let e = self.e();
        let e2 = self.e2();
        let sin_lat = lat.sin();
        (1.0 - e2)
            * (sin_lat / (1.0 - e2 * sin_lat * sin_lat)
                - (1.0 / (2.0 * e)) * ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).ln())
    }
}
