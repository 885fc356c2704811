//! Configuration du registre

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use parcel_geo::Crs;

use crate::lot::{LotNumberResolver, LotPattern};
use crate::LedgerError;

/// Variable d'environnement : preset ou chemin de configuration
pub const CONFIG_ENV: &str = "PARCEL_LEDGER_CONFIG";

/// Variable d'environnement : fichier de stockage JSON
pub const STORE_ENV: &str = "PARCEL_LEDGER_STORE";

/// Preset utilisé quand rien n'est précisé
pub const DEFAULT_PRESET: &str = "es-sdgc";

/// Configuration principale
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Motifs de référence cadastrale, essayés dans l'ordre
    #[serde(default)]
    pub lot_patterns: Vec<LotPattern>,

    /// CRS des relevés qui n'en déclarent pas
    #[serde(default)]
    pub default_crs: Option<Crs>,
}

impl LedgerConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "es-sdgc" => Self::load_embedded(include_str!("presets/es-sdgc.json")),
            "generic" => Self::load_embedded(include_str!("presets/generic.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: es-sdgc, generic", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(source: &str) -> Result<Self> {
        let path = Path::new(source);
        if path.extension().is_some_and(|ext| ext == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(source)
        }
    }

    /// Argument explicite, sinon `PARCEL_LEDGER_CONFIG`, sinon le preset par défaut
    pub fn from_env_or(source: Option<&str>) -> Result<Self> {
        match source {
            Some(source) => Self::resolve(source),
            None => match std::env::var(CONFIG_ENV) {
                Ok(source) if !source.trim().is_empty() => Self::resolve(source.trim()),
                _ => Self::from_preset(DEFAULT_PRESET),
            },
        }
    }

    /// Compile les motifs de numérotation
    pub fn resolver(&self) -> Result<LotNumberResolver, LedgerError> {
        LotNumberResolver::new(&self.lot_patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_parse() {
        let es = LedgerConfig::from_preset("es-sdgc").unwrap();
        assert_eq!(es.default_crs, Some(Crs::from_epsg(25830)));
        assert_eq!(es.lot_patterns.len(), 2);
        assert!(es.resolver().is_ok());

        let generic = LedgerConfig::from_preset("generic").unwrap();
        assert!(generic.lot_patterns.is_empty());
        assert_eq!(generic.default_crs, None);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(LedgerConfig::from_preset("atlantis").is_err());
    }

    #[test]
    fn test_spanish_preset_resolution() {
        let resolver = LedgerConfig::from_preset("es-sdgc")
            .unwrap()
            .resolver()
            .unwrap();

        assert_eq!(resolver.resolve("ES.SDGC.CP.28079A00100023"), "001-23");
        assert_eq!(resolver.resolve("28079A00200145"), "002-145");
        assert_eq!(resolver.resolve("surveys/28079A01500000.gml"), "015-0");
        // Référence urbaine : repli numérique
        assert_eq!(resolver.resolve("9872023VH5797S0001WX"), "98-72023");
        assert_eq!(resolver.resolve("xyz"), "N/A");
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("ledger_config_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"default_crs":"UTM 31N","lot_patterns":[{"name":"fr","regex":"([0-9]{3})([A-Z]{2}[0-9]{4})"}]}"#,
        )
        .unwrap();

        let config = LedgerConfig::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(config.default_crs, Some(Crs::from_epsg(32631)));
        assert_eq!(config.lot_patterns[0].area_group, 1);
        assert_eq!(config.lot_patterns[0].sequence_group, 2);

        let resolver = config.resolver().unwrap();
        assert_eq!(resolver.resolve("38185000AB0012"), "000-AB0012");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_pattern_in_config() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"lot_patterns":[{"name":"bad","regex":"(["}]}"#).unwrap();
        assert!(matches!(
            config.resolver(),
            Err(LedgerError::InvalidPattern { .. })
        ));
    }
}
