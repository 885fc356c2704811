//! Registre des parcelles d'une exploitation
//!
//! Orchestration : validation du coût, reprojection et mesure du contour,
//! attribution du numéro de lot, persistance. Les géométries sont traitées en
//! parallèle, les numéros de lot attribués séquentiellement dans l'ordre
//! d'entrée pour rester déterministes.

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use parcel_geo::{measure, Correction, Crs, GeoError, Measurement};

use crate::error::{LedgerError, StoreError};
use crate::finance::{aggregate, FinancialSummary};
use crate::identity::parcel_fingerprint;
use crate::lot::LotNumberResolver;
use crate::model::{validate_cost, NewParcel, Parcel, ParcelUpdate};
use crate::report::IngestReport;
use crate::store::ParcelStore;

/// Parcelle validée et mesurée, en attente de numéro de lot
struct Prepared {
    new: NewParcel,
    crs: Crs,
    id: String,
    measurement: Result<Measurement, GeoError>,
}

/// Étape sans état partagé : exécutable en parallèle
fn prepare(new: NewParcel, default_crs: Option<Crs>) -> Result<Prepared, LedgerError> {
    if let Some(cost) = new.total_cost {
        validate_cost(&new.parcel_id, cost)?;
    }

    let crs = new
        .source_crs
        .or(default_crs)
        .ok_or_else(|| LedgerError::MissingCrs(new.parcel_id.clone()))?;

    let id = new
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| parcel_fingerprint(&new.parcel_id, &new.boundary));

    let measurement = measure(&new.boundary, &crs);

    Ok(Prepared {
        new,
        crs,
        id,
        measurement,
    })
}

/// Identifiants et numéros de lot déjà attribués, lot en cours compris
#[derive(Default)]
struct Taken {
    ids: HashSet<String>,
    lots: HashSet<String>,
}

/// Registre de parcelles sur un stockage injecté
pub struct ParcelLedger<S: ParcelStore> {
    store: S,
    resolver: LotNumberResolver,
    default_crs: Option<Crs>,
}

impl<S: ParcelStore> ParcelLedger<S> {
    pub fn new(store: S, resolver: LotNumberResolver) -> Self {
        Self {
            store,
            resolver,
            default_crs: None,
        }
    }

    /// CRS appliqué aux parcelles ingérées sans CRS déclaré
    pub fn with_default_crs(mut self, crs: Option<Crs>) -> Self {
        self.default_crs = crs;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn resolver(&self) -> &LotNumberResolver {
        &self.resolver
    }

    /// Identifiants et numéros de lot déjà attribués
    fn taken(&self) -> Result<Taken, LedgerError> {
        let mut taken = Taken::default();
        for parcel in self.store.list()? {
            taken.ids.insert(parcel.id);
            taken.lots.insert(parcel.lot_number);
        }
        Ok(taken)
    }

    /// Attribue le numéro de lot et construit la parcelle à enregistrer
    fn assign(
        &self,
        prepared: Prepared,
        taken: &mut Taken,
    ) -> Result<(Parcel, Vec<Correction>), LedgerError> {
        let Prepared {
            new,
            crs,
            id,
            measurement,
        } = prepared;

        if taken.ids.contains(&id) {
            return Err(StoreError::Duplicate(id).into());
        }

        let lot_number = self.resolver.assign(&new.parcel_id, &taken.lots);

        let (geometry, area_hectares, geometry_error, corrections) = match measurement {
            Ok(m) => {
                let hectares = m.hectares();
                (Some(m.coords), Some(hectares), None, m.corrections)
            }
            Err(e) => {
                warn!(parcel_id = %new.parcel_id, crs = %crs, error = %e, "Invalid boundary, parcel flagged");
                (None, None, Some(e.to_string()), Vec::new())
            }
        };

        let parcel = Parcel {
            id,
            parcel_id: new.parcel_id,
            display_name: new
                .display_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            lot_number,
            source_crs: crs,
            boundary: new.boundary,
            geometry,
            area_hectares,
            status: new.status,
            total_cost: new.total_cost,
            geometry_error,
        };

        taken.ids.insert(parcel.id.clone());
        taken.lots.insert(parcel.lot_number.clone());

        debug!(
            id = %parcel.id,
            parcel_id = %parcel.parcel_id,
            lot = %parcel.lot_number,
            area_ha = ?parcel.area_hectares,
            "Lot assigned"
        );

        Ok((parcel, corrections))
    }

    /// Ingère une parcelle.
    ///
    /// Une géométrie invalide n'est pas une erreur : la parcelle est
    /// enregistrée sans surface, avec `geometry_error` renseigné.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidCost`] pour un coût négatif
    /// - [`LedgerError::MissingCrs`] sans CRS déclaré ni CRS par défaut
    /// - [`LedgerError::Store`] si l'identifiant existe déjà ou si le stockage échoue
    pub fn ingest(&mut self, new: NewParcel) -> Result<Parcel, LedgerError> {
        let prepared = prepare(new, self.default_crs)?;
        let mut taken = self.taken()?;
        let (parcel, _) = self.assign(prepared, &mut taken)?;
        self.store.insert(parcel.clone())?;
        Ok(parcel)
    }

    /// Ingère un lot de parcelles.
    ///
    /// Chaque parcelle est traitée indépendamment : les refus et les
    /// signalements sont listés dans le rapport sans interrompre le lot.
    /// Les parcelles retenues sont écrites en une seule fois.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] si les parcelles existantes ne peuvent pas être
    /// lues ou si l'écriture du lot échoue (rien n'est alors enregistré).
    pub fn ingest_batch(&mut self, batch: Vec<NewParcel>) -> Result<IngestReport, LedgerError> {
        let start = Instant::now();
        let mut report = IngestReport::new(batch.len());
        let mut taken = self.taken()?;

        let default_crs = self.default_crs;
        let prepared: Vec<(String, Result<Prepared, LedgerError>)> = batch
            .into_par_iter()
            .map(|new| (new.parcel_id.clone(), prepare(new, default_crs)))
            .collect();

        let mut accepted = Vec::with_capacity(prepared.len());
        for (parcel_id, prepared) in prepared {
            match prepared.and_then(|p| self.assign(p, &mut taken)) {
                Ok((parcel, corrections)) => {
                    match &parcel.geometry_error {
                        Some(error) => report.record_flagged(&parcel.id, &parcel.parcel_id, error),
                        None => report.record_ingested(&parcel.id, &corrections),
                    }
                    accepted.push(parcel);
                }
                Err(e) => {
                    warn!(parcel_id = %parcel_id, error = %e, "Parcel rejected");
                    report.record_rejected(&parcel_id, &e.to_string());
                }
            }
        }

        self.store.insert_many(accepted)?;

        report.set_duration(start.elapsed());
        report.finalize();

        info!(
            received = report.received,
            ingested = report.ingested,
            flagged = report.flagged,
            rejected = report.rejected,
            "Batch ingested"
        );

        Ok(report)
    }

    /// Met à jour le libellé, le statut ou le coût d'une parcelle
    pub fn update(&mut self, id: &str, update: &ParcelUpdate) -> Result<Parcel, LedgerError> {
        update.validate(id)?;
        let parcel = self.store.update(id, update)?;
        info!(id = %id, status = %parcel.status, "Parcel updated");
        Ok(parcel)
    }

    /// Supprime explicitement une parcelle
    pub fn delete(&mut self, id: &str) -> Result<Parcel, LedgerError> {
        let parcel = self.store.delete(id)?;
        info!(id = %id, lot = %parcel.lot_number, "Parcel deleted");
        Ok(parcel)
    }

    pub fn get(&self, id: &str) -> Result<Option<Parcel>, LedgerError> {
        Ok(self.store.get(id)?)
    }

    /// Instantané des parcelles
    pub fn parcels(&self) -> Result<Vec<Parcel>, LedgerError> {
        Ok(self.store.list()?)
    }

    /// Synthèse financière calculée sur un instantané
    pub fn summary(&self) -> Result<FinancialSummary, LedgerError> {
        Ok(aggregate(&self.parcels()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParcelStatus;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn ledger() -> ParcelLedger<MemoryStore> {
        ParcelLedger::new(MemoryStore::new(), LotNumberResolver::fallback_only())
            .with_default_crs(Some(Crs::from_epsg(25830)))
    }

    fn square(x0: f64, y0: f64, side: f64) -> Vec<(f64, f64)> {
        vec![
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
            (x0, y0),
        ]
    }

    #[test]
    fn test_ingest_measures_area() {
        let mut ledger = ledger();
        let parcel = ledger
            .ingest(NewParcel::new("lot 1201", square(440_000.0, 4_474_000.0, 100.0)))
            .unwrap();

        assert_eq!(parcel.lot_number, "12-1");
        assert!(!parcel.is_flagged());
        let ha = parcel.area_hectares.unwrap();
        assert!((ha - 1.0).abs() < 0.002, "ha={}", ha);
        assert_eq!(parcel.geometry.as_ref().map(Vec::len), Some(5));
    }

    #[test]
    fn test_invalid_geometry_flagged_not_dropped() {
        let mut ledger = ledger();
        let bowtie = vec![
            (440_000.0, 4_474_000.0),
            (440_100.0, 4_474_100.0),
            (440_100.0, 4_474_000.0),
            (440_000.0, 4_474_100.0),
            (440_000.0, 4_474_000.0),
        ];
        let parcel = ledger.ingest(NewParcel::new("lot 1202", bowtie)).unwrap();

        assert!(parcel.is_flagged());
        assert_eq!(parcel.area_hectares, None);
        assert_eq!(parcel.geometry, None);
        assert_eq!(ledger.parcels().unwrap().len(), 1);
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut ledger = ledger();
        let new = NewParcel::new("lot 1203", square(440_000.0, 4_474_000.0, 50.0))
            .with_cost(Decimal::new(-100, 0));
        assert!(matches!(
            ledger.ingest(new),
            Err(LedgerError::InvalidCost { .. })
        ));
        assert!(ledger.parcels().unwrap().is_empty());
    }

    #[test]
    fn test_missing_crs() {
        let mut ledger = ParcelLedger::new(MemoryStore::new(), LotNumberResolver::fallback_only());
        assert!(matches!(
            ledger.ingest(NewParcel::new("lot 1204", square(0.0, 0.0, 1.0))),
            Err(LedgerError::MissingCrs(_))
        ));
    }

    #[test]
    fn test_lot_collisions_suffixed() {
        let mut ledger = ledger();
        let a = ledger
            .ingest(NewParcel::new("lot 1201", square(440_000.0, 4_474_000.0, 100.0)))
            .unwrap();
        let b = ledger
            .ingest(NewParcel::new("other 1201", square(440_200.0, 4_474_000.0, 100.0)))
            .unwrap();
        assert_eq!(a.lot_number, "12-1");
        assert_eq!(b.lot_number, "12-1-2");
    }

    #[test]
    fn test_same_survey_twice_is_duplicate() {
        let mut ledger = ledger();
        let new = NewParcel::new("lot 1201", square(440_000.0, 4_474_000.0, 100.0));
        ledger.ingest(new.clone()).unwrap();
        assert!(matches!(
            ledger.ingest(new),
            Err(LedgerError::Store(StoreError::Duplicate(_)))
        ));
    }

    #[test]
    fn test_batch_order_and_partial_failure() {
        let mut ledger = ledger();
        let batch = vec![
            NewParcel::new("a 1001", square(440_000.0, 4_474_000.0, 100.0)),
            NewParcel::new("b 1001", vec![(440_000.0, 4_474_000.0)]),
            NewParcel::new("c 1001", square(441_000.0, 4_474_000.0, 100.0))
                .with_cost(Decimal::new(-1, 0)),
            NewParcel::new("d 1001", square(442_000.0, 4_474_000.0, 100.0)),
        ];
        let report = ledger.ingest_batch(batch).unwrap();

        assert_eq!(report.received, 4);
        assert_eq!(report.ingested, 3);
        assert_eq!(report.flagged, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.status, crate::report::IngestStatus::PartialSuccess);

        let lots: Vec<String> = ledger
            .parcels()
            .unwrap()
            .into_iter()
            .map(|p| p.lot_number)
            .collect();
        assert_eq!(lots, vec!["10-1", "10-1-2", "10-1-3"]);
    }

    #[test]
    fn test_update_and_summary() {
        let mut ledger = ledger();
        let parcel = ledger
            .ingest(
                NewParcel::new("lot 1201", square(440_000.0, 4_474_000.0, 100.0))
                    .with_status(ParcelStatus::Negotiating),
            )
            .unwrap();

        let updated = ledger
            .update(
                &parcel.id,
                &ParcelUpdate::status(ParcelStatus::Owned).with_cost(Decimal::from(25_000)),
            )
            .unwrap();
        assert_eq!(updated.status, ParcelStatus::Owned);
        assert_eq!(updated.boundary, parcel.boundary);

        let summary = ledger.summary().unwrap();
        assert_eq!(summary.owned_count, 1);
        assert_eq!(summary.total_investment, Decimal::from(25_000));
        assert!(summary.avg_cost_per_hectare > Decimal::from(24_900));

        assert!(matches!(
            ledger.update(&parcel.id, &ParcelUpdate::default().with_cost(Decimal::from(-5))),
            Err(LedgerError::InvalidCost { .. })
        ));
    }

    #[test]
    fn test_delete_frees_lot_number() {
        let mut ledger = ledger();
        let a = ledger
            .ingest(NewParcel::new("lot 1201", square(440_000.0, 4_474_000.0, 100.0)))
            .unwrap();
        ledger.delete(&a.id).unwrap();

        let b = ledger
            .ingest(NewParcel::new("lot 1201", square(440_500.0, 4_474_000.0, 100.0)))
            .unwrap();
        assert_eq!(b.lot_number, "12-1");
        assert!(matches!(
            ledger.delete(&a.id),
            Err(LedgerError::Store(StoreError::NotFound(_)))
        ));
    }

    /// Stockage mémoire qui compte les écritures
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: usize,
    }

    impl ParcelStore for CountingStore {
        fn list(&self) -> Result<Vec<Parcel>, StoreError> {
            self.inner.list()
        }

        fn get(&self, id: &str) -> Result<Option<Parcel>, StoreError> {
            self.inner.get(id)
        }

        fn insert(&mut self, parcel: Parcel) -> Result<(), StoreError> {
            self.writes += 1;
            self.inner.insert(parcel)
        }

        fn insert_many(&mut self, parcels: Vec<Parcel>) -> Result<(), StoreError> {
            self.writes += 1;
            self.inner.insert_many(parcels)
        }

        fn update(&mut self, id: &str, update: &ParcelUpdate) -> Result<Parcel, StoreError> {
            self.writes += 1;
            self.inner.update(id, update)
        }

        fn delete(&mut self, id: &str) -> Result<Parcel, StoreError> {
            self.writes += 1;
            self.inner.delete(id)
        }
    }

    #[test]
    fn test_batch_written_once() {
        let mut ledger = ParcelLedger::new(CountingStore::default(), LotNumberResolver::fallback_only())
            .with_default_crs(Some(Crs::from_epsg(25830)));

        let mut batch: Vec<NewParcel> = (0..50)
            .map(|i| {
                NewParcel::new(
                    format!("lot {}", 1000 + i),
                    square(440_000.0 + i as f64 * 200.0, 4_474_000.0, 100.0),
                )
            })
            .collect();
        // Même id explicite deux fois dans le lot : la seconde est refusée
        let mut first = NewParcel::new("lot 2001", square(450_000.0, 4_474_000.0, 100.0));
        first.id = Some("fixed".to_string());
        let mut second = NewParcel::new("lot 2002", square(451_000.0, 4_474_000.0, 100.0));
        second.id = Some("fixed".to_string());
        batch.push(first);
        batch.push(second);

        let report = ledger.ingest_batch(batch).unwrap();

        assert_eq!(report.ingested, 51);
        assert_eq!(report.rejected, 1);
        assert_eq!(ledger.store().writes, 1);
        assert_eq!(ledger.parcels().unwrap().len(), 51);
    }
}
