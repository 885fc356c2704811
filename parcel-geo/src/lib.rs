//! # parcel-geo
//!
//! Géométrie des parcelles cadastrales : reprojection vers WGS84 et mesure de surface.
//!
//! ## Features
//!
//! - Reprojection pure Rust : UTM (WGS84 / ETRS89), Lambert 93, Web Mercator
//! - Détection des entrées mal étiquetées (axes inversés, coordonnées déjà en WGS84)
//! - Validation des anneaux (sommets, valeurs non finies, auto-intersections)
//! - Surface en projection équivalente locale (Lambert azimutale équivalente)
//! - Feature `proj` : délégation des autres EPSG à la bibliothèque PROJ
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parcel_geo::{measure, Crs};
//!
//! let crs: Crs = "EPSG:25830".parse()?;
//! let ring = [(440000.0, 4474000.0), (440100.0, 4474000.0), (440100.0, 4474100.0), (440000.0, 4474000.0)];
//! let m = measure(&ring, &crs)?;
//! println!("{} ha", m.hectares());
//! ```

pub mod area;
pub mod crs;
pub mod error;
pub mod projection;
pub mod reproject;
pub mod ring;
pub mod types;

pub use area::{
    geographic_area_m2, hectares, measure, planar_area_m2, source_area_m2, square_metres,
    Measurement, M2_PER_HECTARE,
};
pub use crs::{Crs, Datum};
pub use error::GeoError;
pub use reproject::{reproject_ring, Correction, Reprojected, Reprojector};
pub use ring::{validate_ring, RingInfo};
pub use types::{Geographic, LatLng};
