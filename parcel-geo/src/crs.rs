//! Systèmes de coordonnées de référence (CRS) des levés de parcelles
//!
//! Le CRS source est déclaré sous forme de chaîne par le fichier de levé
//! (`EPSG:25830`, `UTM30N`, `LAMB93`...). Il est normalisé en [`Crs`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::projection::Ellipsoid;
use crate::GeoError;

/// Datum géodésique d'une projection UTM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datum {
    /// WGS84 (EPSG:326xx / 327xx)
    Wgs84,
    /// ETRS89 (EPSG:258xx), écart avec WGS84 inférieur au mètre
    Etrs89,
}

impl Datum {
    pub fn ellipsoid(self) -> Ellipsoid {
        match self {
            Self::Wgs84 => Ellipsoid::WGS84,
            Self::Etrs89 => Ellipsoid::GRS80,
        }
    }
}

/// Système de coordonnées source d'un contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// Coordonnées géographiques WGS84 (x = longitude, y = latitude)
    Wgs84,
    /// Universal Transverse Mercator
    Utm { zone: u8, south: bool, datum: Datum },
    /// Lambert 93 (EPSG:2154)
    Lambert93,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// Autre code EPSG, uniquement avec la feature `proj`
    Epsg(u32),
}

/// Emprise plausible (easting, northing) d'un CRS projeté
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Noms usuels acceptés (comparés après suppression des espaces, tirets et underscores)
const NAMED: &[(&str, Crs)] = &[
    ("WGS84", Crs::Wgs84),
    ("CRS84", Crs::Wgs84),
    ("OGC:CRS84", Crs::Wgs84),
    ("ETRS89", Crs::Wgs84),
    ("LAMB93", Crs::Lambert93),
    ("LAMBERT93", Crs::Lambert93),
    ("RGF93LAMBERT93", Crs::Lambert93),
    ("WEBMERCATOR", Crs::WebMercator),
    ("PSEUDOMERCATOR", Crs::WebMercator),
];

impl Crs {
    /// Construit un CRS depuis un code EPSG
    pub fn from_epsg(code: u32) -> Self {
        match code {
            4326 | 4258 => Self::Wgs84,
            2154 => Self::Lambert93,
            3857 | 900913 => Self::WebMercator,
            32601..=32660 => Self::Utm {
                zone: (code - 32600) as u8,
                south: false,
                datum: Datum::Wgs84,
            },
            32701..=32760 => Self::Utm {
                zone: (code - 32700) as u8,
                south: true,
                datum: Datum::Wgs84,
            },
            25801..=25860 => Self::Utm {
                zone: (code - 25800) as u8,
                south: false,
                datum: Datum::Etrs89,
            },
            other => Self::Epsg(other),
        }
    }

    /// Code EPSG canonique, si le CRS en possède un
    pub fn epsg(&self) -> Option<u32> {
        match *self {
            Self::Wgs84 => Some(4326),
            Self::Lambert93 => Some(2154),
            Self::WebMercator => Some(3857),
            Self::Utm {
                zone,
                south,
                datum: Datum::Wgs84,
            } => Some(if south { 32700 } else { 32600 } + zone as u32),
            Self::Utm {
                zone,
                south: false,
                datum: Datum::Etrs89,
            } => Some(25800 + zone as u32),
            Self::Utm { .. } => None,
            Self::Epsg(code) => Some(code),
        }
    }

    /// Vrai pour un CRS géographique (degrés)
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::Wgs84)
    }

    /// Emprise plausible des coordonnées projetées, utilisée pour détecter les axes inversés
    pub fn envelope(&self) -> Option<Envelope> {
        match self {
            Self::Wgs84 => Some(Envelope {
                min_x: -180.0,
                max_x: 180.0,
                min_y: -90.0,
                max_y: 90.0,
            }),
            // Les eastings UTM restent sous le million, les northings sous dix millions
            Self::Utm { .. } => Some(Envelope {
                min_x: 0.0,
                max_x: 1_000_000.0,
                min_y: 0.0,
                max_y: 10_000_000.0,
            }),
            Self::Lambert93 => Some(Envelope {
                min_x: 0.0,
                max_x: 1_300_000.0,
                min_y: 6_000_000.0,
                max_y: 7_200_000.0,
            }),
            Self::WebMercator => Some(Envelope {
                min_x: -20_037_508.35,
                max_x: 20_037_508.35,
                min_y: -20_037_508.35,
                max_y: 20_037_508.35,
            }),
            Self::Epsg(_) => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.epsg()) {
            (_, Some(code)) => write!(f, "EPSG:{}", code),
            (Self::Utm { zone, south, .. }, None) => {
                write!(f, "UTM{}{}", zone, if *south { "S" } else { "N" })
            }
            (other, None) => write!(f, "{:?}", other),
        }
    }
}

impl FromStr for Crs {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();

        if compact.is_empty() {
            return Err(GeoError::UnknownCrs(s.to_string()));
        }

        if let Some(&(_, crs)) = NAMED.iter().find(|(name, _)| *name == compact) {
            return Ok(crs);
        }

        if let Some(rest) = compact.strip_prefix("UTM") {
            return parse_utm_name(rest).ok_or_else(|| GeoError::UnknownCrs(s.to_string()));
        }

        // EPSG:xxxx, urn:ogc:def:crs:EPSG::xxxx ou code nu
        let code = compact
            .rsplit(':')
            .next()
            .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()))
            .filter(|_| compact.contains("EPSG") || !compact.contains(':'))
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(|| GeoError::UnknownCrs(s.to_string()))?;

        Ok(Self::from_epsg(code))
    }
}

/// Parse la partie après `UTM` : `30`, `30N`, `30S`, `30NORTH`, `30SOUTH`
fn parse_utm_name(rest: &str) -> Option<Crs> {
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let zone: u8 = rest[..digits_end].parse().ok()?;
    if !(1..=60).contains(&zone) {
        return None;
    }

    let south = match &rest[digits_end..] {
        "" | "N" | "NORTH" => false,
        "S" | "SOUTH" => true,
        _ => return None,
    };

    Some(Crs::Utm {
        zone,
        south,
        datum: Datum::Wgs84,
    })
}

impl TryFrom<String> for Crs {
    type Error = GeoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("epsg:2154".parse::<Crs>().unwrap(), Crs::Lambert93);
        assert_eq!("3857".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert_eq!(
            "urn:ogc:def:crs:EPSG::32630".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 30,
                south: false,
                datum: Datum::Wgs84
            }
        );
        assert_eq!(
            "EPSG:25830".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 30,
                south: false,
                datum: Datum::Etrs89
            }
        );
        assert_eq!("EPSG:27700".parse::<Crs>().unwrap(), Crs::Epsg(27700));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("WGS 84".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("Lambert-93".parse::<Crs>().unwrap(), Crs::Lambert93);
        assert_eq!(
            "UTM 40 S".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 40,
                south: true,
                datum: Datum::Wgs84
            }
        );
        assert_eq!(
            "utm30".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 30,
                south: false,
                datum: Datum::Wgs84
            }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Crs>().is_err());
        assert!("UTM61N".parse::<Crs>().is_err());
        assert!("UTM30X".parse::<Crs>().is_err());
        assert!("national grid".parse::<Crs>().is_err());
        assert!("FOO:1234".parse::<Crs>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for crs in [
            Crs::Wgs84,
            Crs::Lambert93,
            Crs::WebMercator,
            Crs::from_epsg(32740),
            Crs::from_epsg(25831),
        ] {
            let parsed: Crs = crs.to_string().parse().unwrap();
            assert_eq!(parsed, crs, "crs={}", crs);
        }

        // Pas de code EPSG pour ETRS89 / UTM sud
        let etrs_south = Crs::Utm {
            zone: 31,
            south: true,
            datum: Datum::Etrs89,
        };
        assert_eq!(etrs_south.epsg(), None);
        assert_eq!(etrs_south.to_string(), "UTM31S");
    }

    #[test]
    fn test_envelope() {
        let utm = Crs::from_epsg(32630);
        let env = utm.envelope().unwrap();
        assert!(env.contains(440_000.0, 4_474_000.0));
        assert!(!env.contains(4_474_000.0, 440_000.0));
        assert!(Crs::Epsg(27700).envelope().is_none());
    }
}
