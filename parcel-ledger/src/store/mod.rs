//! Persistance des parcelles
//!
//! Le registre ne connaît que le trait [`ParcelStore`]. Les mises à jour
//! passent par [`ParcelUpdate`] : contour, référence et numéro de lot ne
//! peuvent pas être modifiés par ce chemin.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::model::{Parcel, ParcelUpdate};

/// Source de parcelles injectée dans le registre
pub trait ParcelStore {
    /// Toutes les parcelles, dans l'ordre d'insertion
    fn list(&self) -> Result<Vec<Parcel>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Parcel>, StoreError>;

    /// Ajoute une parcelle ([`StoreError::Duplicate`] si l'id existe)
    fn insert(&mut self, parcel: Parcel) -> Result<(), StoreError>;

    /// Ajoute plusieurs parcelles en une écriture.
    ///
    /// Par défaut, une insertion par parcelle ; les stockages persistants
    /// écrivent le lot en une fois, sans rien modifier si une parcelle est refusée.
    fn insert_many(&mut self, parcels: Vec<Parcel>) -> Result<(), StoreError> {
        for parcel in parcels {
            self.insert(parcel)?;
        }
        Ok(())
    }

    /// Applique une mise à jour et retourne la parcelle modifiée
    fn update(&mut self, id: &str, update: &ParcelUpdate) -> Result<Parcel, StoreError>;

    /// Supprime une parcelle et la retourne
    fn delete(&mut self, id: &str) -> Result<Parcel, StoreError>;
}
