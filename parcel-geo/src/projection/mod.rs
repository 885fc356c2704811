//! Projections cartographiques en Rust pur
//!
//! - Transverse Mercator / UTM (inverse et directe, facteur d'échelle)
//! - Lambert conique conforme (Lambert 93)
//! - Web Mercator (sphérique)
//! - Lambert azimutale équivalente, pour la mesure des surfaces

mod ellipsoid;
mod laea;
mod lambert;
mod mercator;
mod utm;

pub use ellipsoid::Ellipsoid;
pub use laea::LambertAzimuthalEqualArea;
pub use lambert::LambertConformal;
pub use mercator::{geographic_to_web_mercator, web_mercator_scale, web_mercator_to_geographic};
pub use utm::{Projected, TransverseMercator};
