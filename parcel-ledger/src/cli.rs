//! Définition et implémentation des commandes CLI
//!
//! - `ingest` : relevé JSON → registre
//! - `summary` : synthèse financière
//! - `list` : parcelles par statut
//! - `export` : registre → GeoJSON
//! - `lot` : aperçu des numéros de lot
//! - `set` / `delete` : modification du registre

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::{info, warn};

use parcel_geo::Crs;
use parcel_ledger::config::STORE_ENV;
use parcel_ledger::export::export_to_geojson;
use parcel_ledger::{
    aggregate, by_status, visible_set, FinancialSummary, IngestStatus, JsonFileStore,
    LedgerConfig, NewParcel, Parcel, ParcelLedger, ParcelStatus, ParcelStore, ParcelUpdate,
    StatusIndex, VisibilitySet,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest surveyed parcels (JSON array of parcels with boundary and CRS)
    Ingest {
        /// Path to the survey JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Store file (défaut : env PARCEL_LEDGER_STORE)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Config preset name (es-sdgc/generic) or path to a JSON config (défaut : env PARCEL_LEDGER_CONFIG / es-sdgc)
        #[arg(long)]
        config: Option<String>,

        /// Source CRS for parcels that do not declare one (e.g. EPSG:25830, UTM30N)
        #[arg(long)]
        crs: Option<String>,

        /// Write the ingest report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the financial summary of the farm
    Summary {
        /// Store file (défaut : env PARCEL_LEDGER_STORE)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List parcels, optionally filtered by status
    List {
        /// Store file (défaut : env PARCEL_LEDGER_STORE)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// owned, negotiating or shopping-list
        #[arg(long)]
        status: Option<ParcelStatus>,
    },

    /// Export parcels to GeoJSON (WGS84)
    Export {
        /// Store file (défaut : env PARCEL_LEDGER_STORE)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Only parcels with this status
        #[arg(long)]
        status: Option<ParcelStatus>,

        /// Only these parcel ids (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,
    },

    /// Preview lot numbers for cadastral references
    Lot {
        /// Cadastral references
        #[arg(required = true)]
        parcel_ids: Vec<String>,

        /// Config preset name or path to a JSON config
        #[arg(long)]
        config: Option<String>,
    },

    /// Update status, cost or display name of a parcel
    Set {
        /// Store file (défaut : env PARCEL_LEDGER_STORE)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Parcel id
        #[arg(long)]
        id: String,

        /// owned, negotiating or shopping-list
        #[arg(long)]
        status: Option<ParcelStatus>,

        /// Acquisition cost
        #[arg(long, conflicts_with = "clear_cost")]
        cost: Option<Decimal>,

        /// Remove the acquisition cost
        #[arg(long)]
        clear_cost: bool,

        /// Display name (empty to clear)
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a parcel
    Delete {
        /// Store file (défaut : env PARCEL_LEDGER_STORE)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Parcel id
        #[arg(long)]
        id: String,
    },
}

/// Chemin du stockage : argument, sinon variable d'environnement
fn store_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path);
    }
    match std::env::var(STORE_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path.trim())),
        _ => anyhow::bail!("No store file: use --store or set {}", STORE_ENV),
    }
}

fn open_store(arg: Option<PathBuf>) -> Result<JsonFileStore> {
    let path = store_path(arg)?;
    JsonFileStore::open(&path).context(format!("Failed to open store: {}", path.display()))
}

/// Registre sur le fichier de stockage, motifs de la configuration
fn open_ledger(
    store: Option<PathBuf>,
    config: &LedgerConfig,
) -> Result<ParcelLedger<JsonFileStore>> {
    let resolver = config.resolver()?;
    Ok(ParcelLedger::new(open_store(store)?, resolver).with_default_crs(config.default_crs))
}

/// Exécute la commande ingest
pub fn cmd_ingest(
    input: &Path,
    store: Option<PathBuf>,
    config_source: Option<&str>,
    crs: Option<&str>,
    report_path: Option<&Path>,
) -> Result<()> {
    let mut config = LedgerConfig::from_env_or(config_source)?;
    if let Some(crs) = crs {
        let crs: Crs = crs.parse()?;
        config.default_crs = Some(crs);
    }

    let content = std::fs::read_to_string(input)
        .context(format!("Failed to read survey file: {}", input.display()))?;
    let batch: Vec<NewParcel> =
        serde_json::from_str(&content).context("Failed to parse survey JSON")?;

    info!(
        input = %input.display(),
        parcels = batch.len(),
        default_crs = ?config.default_crs.map(|c| c.to_string()),
        "Ingesting survey"
    );

    let mut ledger = open_ledger(store, &config)?;
    let report = ledger.ingest_batch(batch)?;

    report.display();
    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    if report.status == IngestStatus::Failed {
        anyhow::bail!("Ingest failed: {}", report.summary());
    }
    Ok(())
}

/// Exécute la commande summary
pub fn cmd_summary(store: Option<PathBuf>, json: bool) -> Result<()> {
    let parcels = open_store(store)?.list()?;
    let summary = aggregate(&parcels);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&parcels, &summary);
    }
    Ok(())
}

fn print_summary(parcels: &[Parcel], summary: &FinancialSummary) {
    println!("\n{}", "=".repeat(60));
    println!("FARM SUMMARY");
    println!("{}", "=".repeat(60));

    println!("\n--- PARCELS ---");
    for (status, count) in StatusIndex::build(parcels).counts() {
        println!("  {}: {}", status, count);
    }

    println!("\n--- OWNED ---");
    println!("  Total investment: {}", summary.total_investment);
    println!(
        "  Total area: {} ha ({} m²)",
        summary.total_owned_area, summary.total_owned_area_sqm
    );
    println!("  Avg cost/ha: {:.2}", summary.avg_cost_per_hectare);
    println!("  Avg cost/m²: {:.4}", summary.avg_cost_per_sqm);

    println!("\n--- NEGOTIATING ---");
    println!("  Area: {} ha", summary.negotiating_area);
    println!("  Confirmed: {}", summary.confirmed_potential_investment);
    println!(
        "  Estimated: {}{}",
        summary.estimated_potential_investment,
        if summary.has_estimated_costs {
            " (from owned avg cost/m²)"
        } else {
            ""
        }
    );
    println!("  Potential investment: {}", summary.potential_investment);

    if summary.has_data_issues() || !summary.unestimated_parcels.is_empty() {
        println!("\n--- DATA QUALITY ---");
        print_ids("Owned without cost", &summary.parcels_without_cost);
        print_ids("Owned without area", &summary.parcels_without_area);
        print_ids("Negotiating without estimate", &summary.unestimated_parcels);
        print_ids("Left out (amount out of range)", &summary.overflowed_parcels);
        for flagged in &summary.flagged_parcels {
            println!("  Flagged {}: {}", flagged.id, flagged.error);
        }
    }

    println!("\n{}", "=".repeat(60));
}

fn print_ids(label: &str, ids: &[String]) {
    if !ids.is_empty() {
        println!("  {} ({}): {}", label, ids.len(), ids.join(", "));
    }
}

/// Exécute la commande list
pub fn cmd_list(store: Option<PathBuf>, status: Option<ParcelStatus>) -> Result<()> {
    let parcels = open_store(store)?.list()?;
    let selected: Vec<&Parcel> = match status {
        Some(status) => by_status(&parcels, status),
        None => parcels.iter().collect(),
    };

    for p in &selected {
        println!(
            "{:<12} {:<16} {:<13} {:>10} {:>14}  {}",
            p.lot_number,
            p.id,
            p.status,
            p.area_hectares
                .map(|ha| format!("{:.4} ha", ha))
                .unwrap_or_else(|| "-".to_string()),
            p.total_cost
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            p.label()
        );
    }
    info!(count = selected.len(), "Parcels listed");
    Ok(())
}

/// Exécute la commande export
pub fn cmd_export(
    store: Option<PathBuf>,
    output: &Path,
    status: Option<ParcelStatus>,
    ids: &[String],
) -> Result<()> {
    let parcels = open_store(store)?.list()?;

    let mut selected: Vec<&Parcel> = if ids.is_empty() {
        parcels.iter().collect()
    } else {
        let visibility: VisibilitySet = ids.iter().map(String::as_str).collect();
        visible_set(&parcels, &visibility)
    };
    if let Some(status) = status {
        selected.retain(|p| p.status == status);
    }

    let stats = export_to_geojson(selected.iter().copied(), output)?;
    if stats.skipped > 0 {
        warn!(skipped = stats.skipped, "Flagged parcels without geometry not exported");
    }
    info!(output = %output.display(), written = stats.written, "GeoJSON written");
    Ok(())
}

/// Exécute la commande lot
pub fn cmd_lot(parcel_ids: &[String], config_source: Option<&str>) -> Result<()> {
    let resolver = LedgerConfig::from_env_or(config_source)?.resolver()?;

    // Attribution dans l'ordre donné, comme à l'ingestion
    let mut taken = HashSet::new();
    for raw in parcel_ids {
        let lot = resolver.assign(raw, &taken);
        println!("{} -> {}", raw, lot);
        taken.insert(lot);
    }
    Ok(())
}

/// Exécute la commande set
pub fn cmd_set(
    store: Option<PathBuf>,
    id: &str,
    status: Option<ParcelStatus>,
    cost: Option<Decimal>,
    clear_cost: bool,
    name: Option<String>,
) -> Result<()> {
    let update = ParcelUpdate {
        display_name: name.map(Some),
        status,
        total_cost: if clear_cost { Some(None) } else { cost.map(Some) },
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to update: use --status, --cost, --clear-cost or --name");
    }

    let config = LedgerConfig::from_env_or(None)?;
    let mut ledger = open_ledger(store, &config)?;
    let parcel = ledger.update(id, &update)?;

    println!(
        "{} [{}] {} cost={}",
        parcel.id,
        parcel.lot_number,
        parcel.status,
        parcel
            .total_cost
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}

/// Exécute la commande delete
pub fn cmd_delete(store: Option<PathBuf>, id: &str) -> Result<()> {
    let config = LedgerConfig::from_env_or(None)?;
    let mut ledger = open_ledger(store, &config)?;
    let parcel = ledger.delete(id)?;
    println!("Deleted {} [{}]", parcel.id, parcel.lot_number);
    Ok(())
}
