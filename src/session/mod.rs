// SPDX-License-Identifier: MPL-2.0
//! Picker session orchestration.
//!
//! [`PickerSession`] is the explicit, session-scoped context that ties the
//! selection ledger and the thumbnail coordinator together: it owns both,
//! resolves grid indices to assets, and forwards the resulting notifications
//! to a [`PickerDelegate`]. Its lifetime bounds the shared thumbnail cache;
//! dropping or dismissing the session tears the pipeline down.
//!
//! All delegate methods have default no-op bodies, so a consumer implements
//! only the notifications it cares about.

use crate::catalog::AssetCatalogProvider;
use crate::domain::{AssetId, AlbumFolder, PhotoEntry, SlotId, ThumbnailImage};
use crate::error::Result;
use crate::selection::{SelectionLedger, ToggleOutcome};
use crate::settings::PickerSettings;
use crate::thumbs::{ThumbnailRequestCoordinator, ThumbnailSource};
use std::sync::Arc;

/// Receiver of picker notifications.
///
/// Every method is required but defaulted to a no-op; there is no "optional
/// message" probing.
pub trait PickerDelegate {
    /// The album list was replaced (initial load or refresh).
    fn album_list_reloaded(&mut self) {}

    /// The photo grid must be fully reloaded (album switch or refresh).
    fn photo_grid_reloaded(&mut self) {}

    /// The displayed album title changed.
    fn album_title_changed(&mut self, _title: &str) {}

    /// One cell's selection badge changed.
    fn cell_style_changed(&mut self, _index: usize, _is_selected: bool, _select_title: Option<&str>) {
    }

    /// The given grid indices renumbered and must re-render their badges.
    fn items_need_reload(&mut self, _indices: Vec<usize>) {}

    /// The number of selected photos changed.
    fn selection_count_changed(&mut self, _count: usize) {}

    /// A photo was selected.
    fn photo_did_select(&mut self, _asset: &AssetId) {}

    /// A photo was deselected.
    fn photo_did_deselect(&mut self, _asset: &AssetId) {}

    /// A selection attempt hit the capacity limit; nothing changed.
    fn selection_limit_reached(&mut self) {}

    /// The user confirmed the selection; assets are in ordinal order.
    fn picker_confirmed(&mut self, _assets: Vec<AssetId>) {}

    /// The session was dismissed.
    fn picker_dismissed(&mut self) {}
}

/// One photo-picking session.
pub struct PickerSession {
    settings: PickerSettings,
    provider: Arc<dyn AssetCatalogProvider>,
    coordinator: ThumbnailRequestCoordinator,
    selection: SelectionLedger,
    albums: Vec<AlbumFolder>,
    active_album: usize,
    delegate: Option<Box<dyn PickerDelegate>>,
}

impl PickerSession {
    /// Creates a session over the given provider and thumbnail source.
    ///
    /// Settings are normalized; a preselection in the settings seeds the
    /// ledger (deduplicated, truncated at the limit).
    #[must_use]
    pub fn new(
        settings: PickerSettings,
        provider: Arc<dyn AssetCatalogProvider>,
        source: Arc<dyn ThumbnailSource>,
    ) -> Self {
        let settings = settings.normalized();
        let coordinator = ThumbnailRequestCoordinator::new(
            source,
            settings.thumbnail_edge,
            settings.display_scale,
        );
        let mut selection = SelectionLedger::new(settings.selection_limit, settings.select_style);
        selection.seed(settings.preselected.iter().cloned());

        Self {
            settings,
            provider,
            coordinator,
            selection,
            albums: Vec::new(),
            active_album: 0,
            delegate: None,
        }
    }

    /// Installs the notification receiver.
    pub fn set_delegate(&mut self, delegate: Box<dyn PickerDelegate>) {
        self.delegate = Some(delegate);
    }

    /// The session settings (read-only).
    #[must_use]
    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    /// The selection ledger (read-only).
    #[must_use]
    pub fn selection(&self) -> &SelectionLedger {
        &self.selection
    }

    /// Loads (or reloads) the album list from the provider.
    ///
    /// An empty catalog is a valid quiescent state: the session keeps
    /// reporting zero counts and no notifications fire.
    pub fn load_albums(&mut self) -> Result<()> {
        let mut albums = self.provider.fetch_albums(None)?;
        if self.active_album >= albums.len() {
            self.active_album = 0;
        }
        if let Some(folder) = albums.get_mut(self.active_album) {
            folder.is_active = true;
        }

        log::info!("loaded {} album(s)", albums.len());
        self.albums = albums;

        if self.albums.is_empty() {
            return Ok(());
        }

        let title = self.albums[self.active_album].title.clone();
        let count = self.selection.count();
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.album_title_changed(&title);
            delegate.photo_grid_reloaded();
            delegate.album_list_reloaded();
            delegate.selection_count_changed(count);
        }
        Ok(())
    }

    /// Number of loaded albums.
    #[must_use]
    pub fn album_count(&self) -> usize {
        self.albums.len()
    }

    /// The album at `index`, if loaded.
    #[must_use]
    pub fn album_at(&self, index: usize) -> Option<&AlbumFolder> {
        self.albums.get(index)
    }

    /// Switches the active album. Out-of-range indices are ignored.
    pub fn select_album(&mut self, index: usize) {
        if index >= self.albums.len() {
            return;
        }

        self.active_album = index;
        for (i, folder) in self.albums.iter_mut().enumerate() {
            folder.is_active = i == index;
        }

        let title = self.albums[index].title.clone();
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.album_title_changed(&title);
            delegate.photo_grid_reloaded();
        }
    }

    /// Number of photos in the active album; zero when nothing is loaded.
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.albums
            .get(self.active_album)
            .map_or(0, AlbumFolder::count)
    }

    /// The asset shown at grid `index` in the active album.
    #[must_use]
    pub fn asset_at(&self, index: usize) -> Option<&AssetId> {
        self.albums.get(self.active_album)?.assets.get(index)
    }

    /// View data for the cell at grid `index`.
    #[must_use]
    pub fn photo_at(&self, index: usize) -> Option<PhotoEntry> {
        let asset = self.asset_at(index)?;
        Some(PhotoEntry {
            asset: asset.clone(),
            is_selected: self.selection.is_selected(asset),
            select_title: self
                .selection
                .ordinal_of(asset)
                .map(|ordinal| ordinal.to_string()),
        })
    }

    /// Toggles selection of the photo at grid `index`.
    ///
    /// Drives the full notification sequence: badge update for the tapped
    /// cell, select/deselect event, renumber reloads for shifted ordinals,
    /// and the selection count, mirroring the order a grid UI needs to stay
    /// consistent. Returns the outcome, or `None` for an out-of-range index.
    pub fn toggle_at(&mut self, index: usize) -> Option<ToggleOutcome> {
        let asset = self.asset_at(index)?.clone();
        let outcome = self.selection.toggle(&asset);

        match outcome {
            ToggleOutcome::Deselected { removed_index } => {
                let reload = self.shifted_indices(removed_index);
                let count = self.selection.count();
                if let Some(delegate) = self.delegate.as_deref_mut() {
                    delegate.cell_style_changed(index, false, None);
                    delegate.photo_did_deselect(&asset);
                    if !reload.is_empty() {
                        delegate.items_need_reload(reload);
                    }
                    delegate.selection_count_changed(count);
                }
            }
            ToggleOutcome::Selected { ordinal } => {
                let count = self.selection.count();
                if let Some(delegate) = self.delegate.as_deref_mut() {
                    let title = ordinal.to_string();
                    delegate.cell_style_changed(index, true, Some(title.as_str()));
                    delegate.photo_did_select(&asset);
                    delegate.selection_count_changed(count);
                }
            }
            ToggleOutcome::LimitReached => {
                if let Some(delegate) = self.delegate.as_deref_mut() {
                    delegate.selection_limit_reached();
                }
            }
        }

        Some(outcome)
    }

    /// Requests a thumbnail for the photo at grid `index` into `slot`.
    pub fn request_thumbnail<F>(&mut self, index: usize, slot: SlotId, on_ready: F)
    where
        F: FnOnce(Option<ThumbnailImage>) + 'static,
    {
        let Some(asset) = self.asset_at(index).cloned() else {
            return;
        };
        self.coordinator.request(&asset, slot, on_ready);
    }

    /// Cancels the fetch owned by `slot`, if any.
    pub fn cancel_thumbnail(&mut self, slot: SlotId) {
        self.coordinator.cancel_slot(slot);
    }

    /// Delivers queued thumbnail completions; returns how many were delivered.
    pub fn drain_thumbnails(&mut self) -> usize {
        self.coordinator.drain_completions()
    }

    /// Warms thumbnails for the given grid indices (look-ahead scrolling).
    pub fn prefetch_at(&mut self, indices: &[usize]) {
        let assets = self.assets_for(indices);
        self.coordinator.prefetch(&assets);
    }

    /// Cancels warming for the given grid indices.
    pub fn cancel_prefetch_at(&mut self, indices: &[usize]) {
        let assets = self.assets_for(indices);
        self.coordinator.cancel_prefetch(&assets);
    }

    /// Pushes a presentation-derived thumbnail edge (width ÷ row count) into
    /// the coordinator. In-flight requests keep their old size.
    pub fn set_thumbnail_edge(&mut self, edge_points: f32) {
        self.coordinator.set_target_size(edge_points);
    }

    /// Confirms the selection. A no-op while nothing is selected.
    pub fn confirm(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let assets = self.selection.selected_in_order().to_vec();
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.picker_confirmed(assets);
        }
    }

    /// Dismisses the session and tears the thumbnail pipeline down.
    pub fn dismiss(&mut self) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.picker_dismissed();
        }
        self.coordinator.shutdown();
    }

    /// Grid indices (in the active album) of selection entries at or after
    /// `removed_index`, i.e. the badges that renumbered.
    fn shifted_indices(&self, removed_index: usize) -> Vec<usize> {
        let Some(folder) = self.albums.get(self.active_album) else {
            return Vec::new();
        };

        let slots = self
            .selection
            .affected_slots_after_removal(removed_index, |asset| {
                folder
                    .assets
                    .iter()
                    .position(|candidate| candidate == asset)
                    .map(|position| SlotId(position as u64))
            });
        slots.into_iter().map(|slot| slot.0 as usize).collect()
    }

    fn assets_for(&self, indices: &[usize]) -> Vec<AssetId> {
        let Some(folder) = self.albums.get(self.active_album) else {
            return Vec::new();
        };
        indices
            .iter()
            .filter_map(|&index| folder.assets.get(index).cloned())
            .collect()
    }
}

impl std::fmt::Debug for PickerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerSession")
            .field("albums", &self.albums.len())
            .field("active_album", &self.active_album)
            .field("selected", &self.selection.count())
            .finish_non_exhaustive()
    }
}
