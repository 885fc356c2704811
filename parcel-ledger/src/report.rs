//! Rapport d'ingestion avec dégradation contrôlée
//!
//! Une géométrie invalide ne bloque pas le lot : la parcelle est enregistrée
//! signalée et l'erreur est listée ici. Seules les parcelles refusées par le
//! registre (coût invalide, doublon) sont écartées.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use parcel_geo::Correction;

/// Statut global de l'ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngestStatus {
    /// Toutes les parcelles enregistrées et mesurées
    Success,
    /// Parcelles enregistrées avec des signalements ou des refus
    PartialSuccess,
    /// Aucune parcelle enregistrée
    Failed,
}

/// Niveau de sévérité d'un problème
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueLevel {
    /// Parcelle refusée
    Error,
    /// Parcelle enregistrée signalée (géométrie rejetée)
    Flagged,
}

/// Problème rencontré sur une parcelle
#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub level: IssueLevel,
    /// Référence cadastrale de la parcelle
    pub parcel_id: String,
    pub message: String,
}

/// Rapport complet d'une ingestion
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub duration_secs: f64,
    pub status: IngestStatus,

    /// Nombre de parcelles reçues
    pub received: usize,
    /// Parcelles enregistrées (signalées comprises)
    pub ingested: usize,
    /// Parcelles enregistrées sans géométrie valide
    pub flagged: usize,
    /// Parcelles refusées
    pub rejected: usize,

    /// Corrections d'entrée appliquées, par type
    pub corrections: BTreeMap<String, usize>,

    /// Identifiants internes des parcelles enregistrées, dans l'ordre d'entrée
    pub ids: Vec<String>,

    pub errors: Vec<IngestIssue>,
}

impl Default for IngestReport {
    fn default() -> Self {
        Self {
            duration_secs: 0.0,
            status: IngestStatus::Success,
            received: 0,
            ingested: 0,
            flagged: 0,
            rejected: 0,
            corrections: BTreeMap::new(),
            ids: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl IngestReport {
    pub fn new(received: usize) -> Self {
        Self {
            received,
            ..Default::default()
        }
    }

    /// Enregistre une parcelle mesurée
    pub fn record_ingested(&mut self, id: &str, corrections: &[Correction]) {
        self.ingested += 1;
        self.ids.push(id.to_string());
        for correction in corrections {
            *self
                .corrections
                .entry(correction.to_string())
                .or_default() += 1;
        }
    }

    /// Enregistre une parcelle conservée malgré une géométrie invalide
    pub fn record_flagged(&mut self, id: &str, parcel_id: &str, message: &str) {
        self.ingested += 1;
        self.flagged += 1;
        self.ids.push(id.to_string());
        self.errors.push(IngestIssue {
            level: IssueLevel::Flagged,
            parcel_id: parcel_id.to_string(),
            message: message.to_string(),
        });
    }

    /// Enregistre une parcelle refusée
    pub fn record_rejected(&mut self, parcel_id: &str, message: &str) {
        self.rejected += 1;
        self.errors.push(IngestIssue {
            level: IssueLevel::Error,
            parcel_id: parcel_id.to_string(),
            message: message.to_string(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.ingested == 0 && self.received > 0 {
            IngestStatus::Failed
        } else if !self.errors.is_empty() {
            IngestStatus::PartialSuccess
        } else {
            IngestStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("INGEST REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Parcels: {} received, {} ingested, {} flagged, {} rejected",
            self.received, self.ingested, self.flagged, self.rejected
        );

        if !self.corrections.is_empty() {
            println!("\n--- CORRECTIONS ---");
            for (kind, count) in &self.corrections {
                println!("  {}: {}", kind, count);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ISSUES ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                println!("  {:?} [{}] {}", e.level, e.parcel_id, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} ingested, {} flagged, {} rejected",
            self.ingested, self.flagged, self.rejected
        )
    }
}
