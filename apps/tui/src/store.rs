use std::collections::HashMap;

use crate::domain::{Outlet, OutletId};
use crate::geo::GeoPoint;

/// Outlets fetched at start-up. Read-only once loaded.
#[derive(Debug, Default)]
pub struct OutletStore {
    outlets: Vec<Outlet>,
    index: HashMap<OutletId, usize>,
    loaded: bool,
}

impl OutletStore {
    /// An empty store that has not finished loading yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loaded store. Later records with an id already seen are dropped.
    pub fn from_outlets(outlets: Vec<Outlet>) -> Self {
        let mut kept = Vec::with_capacity(outlets.len());
        let mut index = HashMap::with_capacity(outlets.len());

        for outlet in outlets {
            if index.contains_key(&outlet.id) {
                tracing::warn!(id = outlet.id, "duplicate outlet id in listing, keeping first");
                continue;
            }
            index.insert(outlet.id, kept.len());
            kept.push(outlet);
        }

        Self {
            outlets: kept,
            index,
            loaded: true,
        }
    }

    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.outlets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outlets.is_empty()
    }

    pub fn get(&self, id: OutletId) -> Option<&Outlet> {
        self.index.get(&id).map(|&position| &self.outlets[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outlet> {
        self.outlets.iter()
    }

    /// Outlets that can be drawn, with their position.
    pub fn placeable(&self) -> impl Iterator<Item = (&Outlet, GeoPoint)> {
        self.outlets
            .iter()
            .filter_map(|outlet| outlet.position().map(|position| (outlet, position)))
    }

    pub fn placeable_count(&self) -> usize {
        self.placeable().count()
    }

    /// Records for `ids`, in listing order. Unknown ids are ignored.
    pub fn resolve(&self, ids: &[OutletId]) -> Vec<&Outlet> {
        self.outlets
            .iter()
            .filter(|outlet| ids.contains(&outlet.id))
            .collect()
    }
}
