//! Détection des entrées mal étiquetées
//!
//! La décision est prise une fois pour tout l'anneau : un contour n'est jamais
//! corrigé sommet par sommet.

use std::fmt;

use serde::Serialize;

use crate::Crs;

/// Correction appliquée à un anneau avant projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Correction {
    /// Easting et northing inversés
    AxisSwapped,
    /// CRS projeté déclaré mais valeurs déjà en degrés WGS84
    AlreadyGeographic,
}

impl Correction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Correction::AxisSwapped => "AXIS_SWAPPED",
            Correction::AlreadyGeographic => "ALREADY_GEOGRAPHIC",
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interprétation retenue pour un anneau
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Interpretation {
    pub swap_axes: bool,
    pub geographic: bool,
}

impl Interpretation {
    pub fn corrections(&self, declared: &Crs) -> Vec<Correction> {
        let mut corrections = Vec::new();
        if self.geographic && !declared.is_geographic() {
            corrections.push(Correction::AlreadyGeographic);
        }
        if self.swap_axes {
            corrections.push(Correction::AxisSwapped);
        }
        corrections
    }
}

fn is_lng_lat(x: f64, y: f64) -> bool {
    x.abs() <= 180.0 && y.abs() <= 90.0
}

/// Décide comment lire un anneau déclaré dans `crs`
pub(crate) fn interpret(ring: &[(f64, f64)], crs: &Crs) -> Interpretation {
    let all = |pred: &dyn Fn(f64, f64) -> bool| ring.iter().all(|&(x, y)| pred(x, y));

    if all(&is_lng_lat) {
        return Interpretation {
            swap_axes: false,
            geographic: true,
        };
    }
    if all(&|x: f64, y: f64| is_lng_lat(y, x)) {
        return Interpretation {
            swap_axes: true,
            geographic: true,
        };
    }

    if crs.is_geographic() {
        // Valeurs projetées sous une étiquette WGS84 : rien à deviner, la validation échouera
        return Interpretation {
            swap_axes: false,
            geographic: true,
        };
    }

    if let Some(envelope) = crs.envelope() {
        let fits = all(&|x: f64, y: f64| envelope.contains(x, y));
        let fits_swapped = all(&|x: f64, y: f64| envelope.contains(y, x));
        if !fits && fits_swapped {
            return Interpretation {
                swap_axes: true,
                geographic: false,
            };
        }
    }

    Interpretation::default()
}
