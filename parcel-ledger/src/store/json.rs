//! Stockage fichier JSON
//!
//! Le fichier contient le tableau complet des parcelles. Chaque modification
//! réécrit le fichier via un fichier temporaire renommé, pour ne jamais
//! laisser un instantané tronqué.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::model::{Parcel, ParcelUpdate};

use super::{MemoryStore, ParcelStore};

/// Parcelles persistées dans un fichier JSON
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Ouvre un fichier existant, ou un stock vide si le fichier n'existe pas
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let inner = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let parcels: Vec<Parcel> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            };
            debug!(path = %path.display(), parcels = parcels.len(), "Store loaded");
            MemoryStore::from_parcels(parcels)?
        } else {
            debug!(path = %path.display(), "Store file not found, starting empty");
            MemoryStore::new()
        };

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Écrit l'instantané puis remplace l'état courant
    fn commit(&mut self, next: MemoryStore) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");

        {
            let file = fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, next.as_slice())?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), parcels = next.len(), "Store saved");
        self.inner = next;
        Ok(())
    }
}

impl ParcelStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Parcel>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Result<Option<Parcel>, StoreError> {
        self.inner.get(id)
    }

    fn insert(&mut self, parcel: Parcel) -> Result<(), StoreError> {
        self.insert_many(vec![parcel])
    }

    fn insert_many(&mut self, parcels: Vec<Parcel>) -> Result<(), StoreError> {
        if parcels.is_empty() {
            return Ok(());
        }
        let mut next = self.inner.clone();
        next.insert_many(parcels)?;
        self.commit(next)
    }

    fn update(&mut self, id: &str, update: &ParcelUpdate) -> Result<Parcel, StoreError> {
        let mut next = self.inner.clone();
        let parcel = next.update(id, update)?;
        self.commit(next)?;
        Ok(parcel)
    }

    fn delete(&mut self, id: &str) -> Result<Parcel, StoreError> {
        let mut next = self.inner.clone();
        let parcel = next.delete(id)?;
        self.commit(next)?;
        Ok(parcel)
    }
}
