//! # parcel-ledger
//!
//! Registre des parcelles cadastrales d'une exploitation : numérotation des
//! lots, statut d'acquisition et synthèse financière.
//!
//! ## Features
//!
//! - Ingestion de relevés (contour + CRS déclaré), reprojection et mesure via `parcel-geo`
//! - Numéros de lot dérivés de la référence cadastrale (motifs configurables)
//! - Agrégats financiers exacts (`rust_decimal`)
//! - Filtres par statut et visibilité
//! - Stockage mémoire ou fichier JSON, export GeoJSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Ingestion d'un relevé
//! parcel-ledger ingest --input ./survey.json --store ./farm.json
//!
//! # Synthèse financière
//! parcel-ledger summary --store ./farm.json
//!
//! # Export carte
//! parcel-ledger export --store ./farm.json --output ./farm.geojson --status owned
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod finance;
pub mod identity;
pub mod ledger;
pub mod lot;
pub mod model;
pub mod report;
pub mod store;
pub mod visibility;

pub use config::LedgerConfig;
pub use error::{LedgerError, StoreError};
pub use finance::{aggregate, FinancialSummary};
pub use ledger::ParcelLedger;
pub use lot::{LotNumberResolver, LotPattern, NOT_AVAILABLE};
pub use model::{NewParcel, Parcel, ParcelStatus, ParcelUpdate};
pub use report::{IngestReport, IngestStatus};
pub use store::{JsonFileStore, MemoryStore, ParcelStore};
pub use visibility::{by_status, visible_set, StatusIndex, VisibilitySet};
