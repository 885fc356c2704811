//! Numérotation des lots
//!
//! Un numéro de lot `<zone>-<séquence>` est dérivé de la référence cadastrale
//! externe. Les motifs de référence sont de la configuration : chaque
//! juridiction fournit sa table (voir les presets de [`crate::config`]).
//!
//! Résolution, dans l'ordre :
//! 1. premier motif configuré qui correspond (groupes zone et séquence) ;
//! 2. repli : première suite d'au moins 2 chiffres après le dernier séparateur
//!    de chemin, découpée en zone sur 2 chiffres et séquence ;
//! 3. sinon la sentinelle [`NOT_AVAILABLE`].
//!
//! La séquence perd ses zéros de tête (`"0"` si elle devient vide).

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LedgerError;

/// Numéro de lot quand aucune séquence numérique n'est trouvée
pub const NOT_AVAILABLE: &str = "N/A";

/// Largeur de la zone extraite par le repli
const FALLBACK_AREA_WIDTH: usize = 2;

/// Motif de référence cadastrale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotPattern {
    /// Nom du motif (journalisation, erreurs)
    pub name: String,

    /// Expression régulière appliquée à la référence brute
    pub regex: String,

    /// Groupe capturant la zone
    #[serde(default = "default_area_group")]
    pub area_group: usize,

    /// Groupe capturant la séquence
    #[serde(default = "default_sequence_group")]
    pub sequence_group: usize,

    /// Largeur fixe de la zone, complétée par des zéros à gauche
    #[serde(default)]
    pub area_width: Option<usize>,
}

fn default_area_group() -> usize {
    1
}

fn default_sequence_group() -> usize {
    2
}

struct CompiledPattern {
    name: String,
    regex: Regex,
    area_group: usize,
    sequence_group: usize,
    area_width: Option<usize>,
}

impl CompiledPattern {
    fn compile(pattern: &LotPattern) -> Result<Self, LedgerError> {
        let invalid = |reason: String| LedgerError::InvalidPattern {
            name: pattern.name.clone(),
            reason,
        };

        let regex = Regex::new(&pattern.regex).map_err(|e| invalid(e.to_string()))?;

        let groups = regex.captures_len() - 1;
        for group in [pattern.area_group, pattern.sequence_group] {
            if group == 0 || group > groups {
                return Err(invalid(format!(
                    "capture group {} does not exist ({} groups)",
                    group, groups
                )));
            }
        }

        Ok(Self {
            name: pattern.name.clone(),
            regex,
            area_group: pattern.area_group,
            sequence_group: pattern.sequence_group,
            area_width: pattern.area_width,
        })
    }

    fn resolve(&self, raw: &str) -> Option<String> {
        let caps = self.regex.captures(raw)?;
        let area = caps.get(self.area_group)?.as_str();
        let sequence = caps.get(self.sequence_group)?.as_str();
        if area.is_empty() {
            return None;
        }

        let area = match self.area_width {
            Some(width) => format!("{:0>width$}", area, width = width),
            None => area.to_string(),
        };
        Some(format_lot(&area, sequence))
    }
}

/// Résolveur de numéros de lot
pub struct LotNumberResolver {
    patterns: Vec<CompiledPattern>,
}

impl LotNumberResolver {
    /// Compile la table de motifs.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidPattern`] pour une expression invalide ou un
    /// groupe de capture inexistant.
    pub fn new(patterns: &[LotPattern]) -> Result<Self, LedgerError> {
        let patterns = patterns
            .iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Résolveur sans motif : repli numérique uniquement
    pub fn fallback_only() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Noms des motifs, dans l'ordre d'essai
    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Numéro de lot d'une référence brute (ne rejette jamais)
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();

        for pattern in &self.patterns {
            if let Some(lot) = pattern.resolve(raw) {
                debug!(parcel_id = raw, pattern = %pattern.name, lot = %lot, "Lot number resolved");
                return lot;
            }
        }

        match fallback(raw) {
            Some(lot) => {
                debug!(parcel_id = raw, lot = %lot, "Lot number from fallback digits");
                lot
            }
            None => {
                debug!(parcel_id = raw, "No digits in parcel id");
                NOT_AVAILABLE.to_string()
            }
        }
    }

    /// Résout puis rend le numéro unique parmi `taken`
    pub fn assign(&self, raw: &str, taken: &HashSet<String>) -> String {
        disambiguate(self.resolve(raw), taken)
    }
}

/// Ajoute `-2`, `-3`... jusqu'à obtenir un numéro libre
pub fn disambiguate(candidate: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut suffix = 2;
    loop {
        let next = format!("{}-{}", candidate, suffix);
        if !taken.contains(&next) {
            return next;
        }
        suffix += 1;
    }
}

/// Repli : première suite d'au moins 2 chiffres ASCII après le dernier séparateur
fn fallback(raw: &str) -> Option<String> {
    let tail = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(raw);

    let digits = tail
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() >= FALLBACK_AREA_WIDTH)?;

    let (area, sequence) = digits.split_at(FALLBACK_AREA_WIDTH);
    Some(format_lot(area, sequence))
}

fn format_lot(area: &str, sequence: &str) -> String {
    let sequence = sequence.trim_start_matches('0');
    let sequence = if sequence.is_empty() { "0" } else { sequence };
    format!("{}-{}", area, sequence)
}
