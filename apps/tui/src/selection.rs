//! Selection and popup state shared by the chat panel and the map markers.
//!
//! `SelectedIds` and `OpenPopupIds` are the single source of truth for marker
//! styling. Nothing derived from them is cached: [`SelectionController::marker_style`]
//! is evaluated for every outlet on every frame.

use crate::domain::{Outlet, OutletId};
use crate::geo::is_within_radius;
use crate::store::OutletStore;

/// Duplicate-free list of outlet ids. Order is kept but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(Vec<OutletId>);

impl IdSet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, id: OutletId) -> bool {
        self.0.contains(&id)
    }

    /// Appends `id` unless present. Returns whether it was added.
    pub fn insert(&mut self, id: OutletId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn remove(&mut self, id: OutletId) -> bool {
        let before = self.0.len();
        self.0.retain(|&existing| existing != id);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OutletId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[OutletId] {
        &self.0
    }

    /// Different length, or some id here that `previous` does not have.
    pub fn differs_from(&self, previous: &Self) -> bool {
        self.len() != previous.len() || self.iter().any(|id| !previous.contains(id))
    }
}

impl FromIterator<OutletId> for IdSet {
    fn from_iter<T: IntoIterator<Item = OutletId>>(iter: T) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Default,
    Highlighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub icon: MarkerIcon,
    pub circle: bool,
}

/// What a marker click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerClick {
    Opened,
    Closed,
}

#[derive(Debug, Default)]
pub struct SelectionController {
    selected: IdSet,
    open_popups: IdSet,
    show_radius: bool,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn selected(&self) -> &IdSet {
        &self.selected
    }

    pub const fn open_popups(&self) -> &IdSet {
        &self.open_popups
    }

    pub const fn show_radius(&self) -> bool {
        self.show_radius
    }

    pub fn toggle_radius(&mut self) -> bool {
        self.show_radius = !self.show_radius;
        self.show_radius
    }

    /// Replaces the selection with a chat answer's ids. Empty clears it.
    pub fn apply_chat_result(&mut self, related_ids: &[OutletId]) {
        self.selected = related_ids.iter().copied().collect();
        tracing::debug!(selected = ?self.selected.as_slice(), "selection replaced by chat result");
    }

    /// Removes `id` if selected, appends it otherwise. Popups are untouched.
    pub fn toggle_manual(&mut self, id: OutletId) {
        if !self.selected.remove(id) {
            self.selected.insert(id);
        }
    }

    /// Empties the selection. Open popups close on the next viewport sync.
    pub fn clear_all(&mut self) {
        self.selected = IdSet::new();
    }

    pub fn open_popup(&mut self, id: OutletId) -> bool {
        self.open_popups.insert(id)
    }

    /// Popup-close event. A closed popup cannot stay selected.
    pub fn close_popup(&mut self, id: OutletId) -> bool {
        let closed = self.open_popups.remove(id);
        let deselected = self.selected.remove(id);
        closed || deselected
    }

    pub(crate) fn take_open_popups(&mut self) -> IdSet {
        std::mem::take(&mut self.open_popups)
    }

    /// Marker click: closes an open popup (which also deselects), otherwise
    /// opens the popup and selects the outlet through the manual toggle.
    pub fn click_marker(&mut self, id: OutletId) -> MarkerClick {
        if self.open_popups.contains(id) {
            self.close_popup(id);
            return MarkerClick::Closed;
        }

        self.open_popup(id);
        if !self.selected.contains(id) {
            self.toggle_manual(id);
        }
        MarkerClick::Opened
    }

    fn references(&self) -> impl Iterator<Item = OutletId> + '_ {
        self.selected.iter().chain(self.open_popups.iter())
    }

    fn is_referenced(&self, id: OutletId) -> bool {
        self.selected.contains(id) || self.open_popups.contains(id)
    }

    pub fn is_highlighted(&self, outlet: &Outlet, store: &OutletStore) -> bool {
        if self.is_referenced(outlet.id) {
            return true;
        }

        self.show_radius
            && self
                .references()
                .any(|reference| is_within_radius(store, outlet, reference))
    }

    pub fn shows_radius_circle(&self, outlet: &Outlet) -> bool {
        self.show_radius && self.is_referenced(outlet.id)
    }

    pub fn marker_style(&self, outlet: &Outlet, store: &OutletStore) -> MarkerStyle {
        let icon = if self.is_highlighted(outlet, store) {
            MarkerIcon::Highlighted
        } else {
            MarkerIcon::Default
        };

        MarkerStyle {
            icon,
            circle: self.shows_radius_circle(outlet),
        }
    }
}
