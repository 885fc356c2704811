//! Repli sur la bibliothèque PROJ pour les codes EPSG sans projection intégrée

use proj::Proj;

use crate::types::LatLng;
use crate::GeoError;

pub(crate) struct ProjBackend {
    proj: Proj,
}

impl ProjBackend {
    pub fn new(source_epsg: u32) -> Result<Self, GeoError> {
        let source = format!("EPSG:{}", source_epsg);

        // new_known_crs normalise l'ordre des axes en (lon, lat)
        let proj = Proj::new_known_crs(&source, "EPSG:4326", None).map_err(|e| {
            GeoError::UnsupportedCrs(format!("{} → EPSG:4326: {}", source, e))
        })?;

        Ok(Self { proj })
    }

    pub fn to_lat_lng(&self, x: f64, y: f64) -> Result<LatLng, GeoError> {
        let (lng, lat) = self
            .proj
            .convert((x, y))
            .map_err(|e| GeoError::Projection(e.to_string()))?;
        Ok(LatLng::new(lat, lng))
    }
}
