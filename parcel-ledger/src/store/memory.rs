//! Stockage en mémoire

use std::collections::HashMap;

use crate::error::StoreError;
use crate::model::{Parcel, ParcelUpdate};

use super::ParcelStore;

/// Parcelles en mémoire, ordre d'insertion conservé, index par id
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    parcels: Vec<Parcel>,
    index: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruit un stock depuis des parcelles existantes (ids en double rejetés)
    pub fn from_parcels(parcels: Vec<Parcel>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for parcel in parcels {
            store.insert(parcel)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[Parcel] {
        &self.parcels
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, parcel) in self.parcels.iter().enumerate().skip(start) {
            self.index.insert(parcel.id.clone(), i);
        }
    }
}

impl ParcelStore for MemoryStore {
    fn list(&self) -> Result<Vec<Parcel>, StoreError> {
        Ok(self.parcels.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Parcel>, StoreError> {
        Ok(self.position(id).map(|i| self.parcels[i].clone()))
    }

    fn insert(&mut self, parcel: Parcel) -> Result<(), StoreError> {
        if self.position(&parcel.id).is_some() {
            return Err(StoreError::Duplicate(parcel.id));
        }
        self.index.insert(parcel.id.clone(), self.parcels.len());
        self.parcels.push(parcel);
        Ok(())
    }

    fn update(&mut self, id: &str, update: &ParcelUpdate) -> Result<Parcel, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let parcel = &mut self.parcels[index];
        parcel.apply(update);
        Ok(parcel.clone())
    }

    fn delete(&mut self, id: &str) -> Result<Parcel, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let parcel = self.parcels.remove(index);
        self.index.remove(id);
        self.reindex_from(index);
        Ok(parcel)
    }
}
