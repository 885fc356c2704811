//! Filtres d'affichage par statut et visibilité
//!
//! L'état de visibilité appartient à l'appelant ([`VisibilitySet`]) : aucun
//! état global, chaque vue carte ou tableau garde le sien.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Parcel, ParcelStatus};

/// Parcelles d'un statut, dans l'ordre d'entrée
pub fn by_status(parcels: &[Parcel], status: ParcelStatus) -> Vec<&Parcel> {
    parcels.iter().filter(|p| p.status == status).collect()
}

/// Ensemble des identifiants affichés
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilitySet {
    visible: HashSet<String>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inverse la visibilité d'une parcelle, retourne le nouvel état
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.visible.remove(id) {
            false
        } else {
            self.visible.insert(id.to_string());
            true
        }
    }

    pub fn show(&mut self, id: &str) {
        self.visible.insert(id.to_string());
    }

    pub fn hide(&mut self, id: &str) {
        self.visible.remove(id);
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// Affiche toutes les parcelles données
    pub fn show_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.visible.extend(ids.into_iter().map(str::to_string));
    }

    pub fn clear(&mut self) {
        self.visible.clear();
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for VisibilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            visible: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parcelles visibles, dans l'ordre d'entrée
pub fn visible_set<'a>(parcels: &'a [Parcel], visibility: &VisibilitySet) -> Vec<&'a Parcel> {
    parcels
        .iter()
        .filter(|p| visibility.is_visible(&p.id))
        .collect()
}

/// Identifiants regroupés par statut
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusIndex {
    groups: BTreeMap<ParcelStatus, Vec<String>>,
}

impl StatusIndex {
    pub fn build(parcels: &[Parcel]) -> Self {
        let mut groups: BTreeMap<ParcelStatus, Vec<String>> = BTreeMap::new();
        for parcel in parcels {
            groups.entry(parcel.status).or_default().push(parcel.id.clone());
        }
        Self { groups }
    }

    /// Identifiants d'un statut, dans l'ordre d'entrée
    pub fn ids(&self, status: ParcelStatus) -> &[String] {
        self.groups.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, status: ParcelStatus) -> usize {
        self.ids(status).len()
    }

    /// Nombre de parcelles par statut, tous statuts présents (0 si aucune)
    pub fn counts(&self) -> Vec<(ParcelStatus, usize)> {
        ParcelStatus::ALL
            .iter()
            .map(|&status| (status, self.count(status)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_geo::Crs;

    fn parcel(id: &str, status: ParcelStatus) -> Parcel {
        Parcel {
            id: id.to_string(),
            parcel_id: id.to_string(),
            display_name: None,
            lot_number: id.to_string(),
            source_crs: Crs::Wgs84,
            boundary: vec![],
            geometry: None,
            area_hectares: None,
            status,
            total_cost: None,
            geometry_error: None,
        }
    }

    fn farm() -> Vec<Parcel> {
        vec![
            parcel("c", ParcelStatus::Owned),
            parcel("a", ParcelStatus::Negotiating),
            parcel("b", ParcelStatus::Owned),
            parcel("d", ParcelStatus::ShoppingList),
        ]
    }

    fn ids<'a>(parcels: &[&'a Parcel]) -> Vec<&'a str> {
        parcels.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_by_status_stable() {
        let parcels = farm();
        assert_eq!(ids(&by_status(&parcels, ParcelStatus::Owned)), vec!["c", "b"]);
        assert_eq!(ids(&by_status(&parcels, ParcelStatus::Negotiating)), vec!["a"]);
        assert!(by_status(&[], ParcelStatus::Owned).is_empty());
    }

    #[test]
    fn test_toggle_idempotent() {
        let mut visibility = VisibilitySet::new();
        let before = visibility.is_visible("a");

        assert!(visibility.toggle("a"));
        assert!(!visibility.toggle("a"));
        assert_eq!(visibility.is_visible("a"), before);

        visibility.show("b");
        assert!(!visibility.toggle("b"));
        assert!(visibility.toggle("b"));
        assert!(visibility.is_visible("b"));
    }

    #[test]
    fn test_visible_set_keeps_order() {
        let parcels = farm();
        let visibility: VisibilitySet = ["b", "c", "unknown"].into_iter().collect();
        assert_eq!(ids(&visible_set(&parcels, &visibility)), vec!["c", "b"]);
    }

    #[test]
    fn test_show_all_and_clear() {
        let parcels = farm();
        let mut visibility = VisibilitySet::new();
        visibility.show_all(parcels.iter().map(|p| p.id.as_str()));
        assert_eq!(visible_set(&parcels, &visibility).len(), 4);

        visibility.hide("a");
        assert_eq!(visibility.len(), 3);

        visibility.clear();
        assert!(visibility.is_empty());
        assert!(visible_set(&parcels, &visibility).is_empty());
    }

    #[test]
    fn test_status_index() {
        let index = StatusIndex::build(&farm());
        assert_eq!(index.ids(ParcelStatus::Owned), ["c", "b"]);
        assert_eq!(index.count(ParcelStatus::ShoppingList), 1);
        assert_eq!(
            index.counts(),
            vec![
                (ParcelStatus::Owned, 2),
                (ParcelStatus::Negotiating, 1),
                (ParcelStatus::ShoppingList, 1),
            ]
        );

        let empty = StatusIndex::build(&[]);
        assert_eq!(empty.count(ParcelStatus::Owned), 0);
    }
}
