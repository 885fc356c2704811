//! Types de coordonnées

use serde::{Deserialize, Serialize};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }

    /// Convertit en degrés (lon, lat)
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Convertit en sommet WGS84, longitude ramenée dans [-180, 180)
    pub fn to_lat_lng(self) -> LatLng {
        let (lon, lat) = self.to_degrees();
        LatLng::new(lat, wrap_longitude(lon))
    }
}

/// Sommet WGS84 en degrés, tel que consommé par la couche de rendu
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_geographic(self) -> Geographic {
        Geographic::from_degrees(self.lng, self.lat)
    }

    /// Vrai si le point est fini et dans les bornes géographiques
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Ramène une longitude en degrés dans [-180, 180)
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(10.0), 10.0);
        assert!((wrap_longitude(181.0) - (-179.0)).abs() < 1e-12);
        assert!((wrap_longitude(-181.0) - 179.0).abs() < 1e-12);
        assert_eq!(wrap_longitude(180.0), -180.0);
    }

    #[test]
    fn test_validity() {
        assert!(LatLng::new(45.0, 5.0).is_valid());
        assert!(!LatLng::new(95.0, 5.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 5.0).is_valid());
    }
}
