// SPDX-License-Identifier: MPL-2.0
//! Slot-keyed single-flight coordinator over a [`ThumbnailSource`].
//!
//! Visual slots are recycled as a grid scrolls, so a slot's previous fetch
//! must be cancelled before a new one starts, or a late-arriving old image
//! would overwrite a slot now showing a different asset. Cancellation is
//! best-effort; the authoritative mechanism is the stale-handle guard in
//! [`drain_completions`](ThumbnailRequestCoordinator::drain_completions):
//! a completion is delivered only while its handle is still the one the slot
//! owns.
//!
//! # Threading
//!
//! The coordinator is single-writer: it is owned and driven by the
//! presentation thread. Sources reply on arbitrary worker threads through an
//! internal channel, and those replies are only observed inside
//! `drain_completions` on the owning thread. Slot callbacks carry no `Send`
//! bound, which keeps the whole struct pinned to that thread by construction.

use crate::domain::{AssetId, SlotId, ThumbnailImage};
use crate::thumbs::cache::{CacheConfig, CacheStats, ThumbnailCache};
use crate::thumbs::source::{
    CompletionSender, ContentMode, FetchHandle, FetchOutcome, TargetSize, ThumbnailSource,
};
use crossbeam_channel::{Receiver, TryRecvError};
use std::collections::HashMap;
use std::sync::Arc;

type OnReady = Box<dyn FnOnce(Option<ThumbnailImage>)>;

struct PendingFetch {
    handle: FetchHandle,
    // Edge the fetch was issued at; the target may change while in flight.
    edge_px: u32,
    on_ready: OnReady,
}

/// Cache-backed async thumbnail pipeline with at most one in-flight fetch
/// per slot.
pub struct ThumbnailRequestCoordinator {
    source: Arc<dyn ThumbnailSource>,
    cache: ThumbnailCache,
    target: TargetSize,
    display_scale: f32,
    slots: HashMap<SlotId, PendingFetch>,
    slot_by_handle: HashMap<u64, SlotId>,
    completion_tx: CompletionSender,
    completion_rx: Receiver<FetchOutcome>,
}

impl ThumbnailRequestCoordinator {
    /// Creates a coordinator fetching square thumbnails of `edge_points`
    /// (clamped) at `display_scale`, with a default-sized cache.
    #[must_use]
    pub fn new(source: Arc<dyn ThumbnailSource>, edge_points: f32, display_scale: f32) -> Self {
        Self::with_cache_config(source, edge_points, display_scale, CacheConfig::default())
    }

    /// Creates a coordinator with an explicit cache configuration.
    #[must_use]
    pub fn with_cache_config(
        source: Arc<dyn ThumbnailSource>,
        edge_points: f32,
        display_scale: f32,
        cache_config: CacheConfig,
    ) -> Self {
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();
        Self {
            source,
            cache: ThumbnailCache::new(cache_config),
            target: TargetSize::from_edge(edge_points, display_scale),
            display_scale,
            slots: HashMap::new(),
            slot_by_handle: HashMap::new(),
            completion_tx,
            completion_rx,
        }
    }

    /// Requests a thumbnail of `asset` for `slot`.
    ///
    /// Any fetch the slot already owns is cancelled first and its callback
    /// dropped. On a cache hit `on_ready` is invoked synchronously and no
    /// fetch is issued; otherwise delivery happens during a later
    /// [`drain_completions`](Self::drain_completions). A failed or cancelled
    /// fetch delivers `None`; the caller leaves the slot's previous visual
    /// state and a scroll-back re-issues a fresh request.
    pub fn request<F>(&mut self, asset: &AssetId, slot: SlotId, on_ready: F)
    where
        F: FnOnce(Option<ThumbnailImage>) + 'static,
    {
        self.evict_slot(slot);

        if let Some(image) = self.cache.get(asset, self.target.edge_px()) {
            on_ready(Some(image));
            return;
        }

        let handle = self.source.start_fetch(
            asset,
            self.target,
            ContentMode::AspectFill,
            self.completion_tx.clone(),
        );
        self.slot_by_handle.insert(handle.id(), slot);
        self.slots.insert(
            slot,
            PendingFetch {
                handle,
                edge_px: self.target.edge_px(),
                on_ready: Box::new(on_ready),
            },
        );
    }

    /// Cancels and clears any fetch owned by `slot`.
    ///
    /// Used when a slot is detached or recycled without a replacement
    /// request. The suppressed callback never fires.
    pub fn cancel_slot(&mut self, slot: SlotId) {
        self.evict_slot(slot);
    }

    /// Delivers all queued completions to the slots that still own them.
    ///
    /// A completion whose handle no longer matches the owning slot's current
    /// handle is dropped silently; this guards against fetches that were past
    /// the point of cancellation when their slot was recycled. Returns the
    /// number of callbacks invoked.
    pub fn drain_completions(&mut self) -> usize {
        let mut delivered = 0;

        loop {
            let outcome = match self.completion_rx.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };

            let Some(slot) = self.slot_by_handle.remove(&outcome.handle.id()) else {
                log::debug!(
                    "dropping stale thumbnail completion for {} (handle {})",
                    outcome.asset,
                    outcome.handle.id()
                );
                continue;
            };

            let owns_handle = self
                .slots
                .get(&slot)
                .is_some_and(|pending| pending.handle.id() == outcome.handle.id());
            if !owns_handle {
                log::debug!(
                    "dropping superseded thumbnail completion for {} at {}",
                    outcome.asset,
                    slot
                );
                continue;
            }

            if let Some(pending) = self.slots.remove(&slot) {
                if let Some(image) = &outcome.image {
                    self.cache
                        .insert(outcome.asset.clone(), pending.edge_px, image.clone());
                }
                (pending.on_ready)(outcome.image);
                delivered += 1;
            }
        }

        delivered
    }

    /// Issues bulk look-ahead fetches for the given assets.
    ///
    /// Prefetch traffic bypasses the slot map entirely; it only warms the
    /// source's cache.
    pub fn prefetch(&self, assets: &[AssetId]) {
        if assets.is_empty() {
            return;
        }
        self.source.start_caching(assets, self.target);
    }

    /// Cancels previously issued prefetches for exactly the given assets.
    pub fn cancel_prefetch(&self, assets: &[AssetId]) {
        if assets.is_empty() {
            return;
        }
        self.source.stop_caching(assets, self.target);
    }

    /// Updates the size used for subsequent requests.
    ///
    /// The edge is clamped to the configured maximum. In-flight requests are
    /// unaffected; their completions still deliver at the old size and are
    /// cached under it.
    pub fn set_target_size(&mut self, edge_points: f32) {
        self.target = TargetSize::from_edge(edge_points, self.display_scale);
    }

    /// The size currently used for new requests.
    #[must_use]
    pub fn target_size(&self) -> TargetSize {
        self.target
    }

    /// Number of slots with an in-flight fetch.
    #[must_use]
    pub fn pending_slots(&self) -> usize {
        self.slots.len()
    }

    /// Current cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Tears the pipeline down at session end: cancels every pending fetch,
    /// drops all callbacks, clears the cache and stops all source-side
    /// warm-up work.
    pub fn shutdown(&mut self) {
        for (slot, pending) in self.slots.drain() {
            log::debug!("abandoning thumbnail fetch for {slot} on shutdown");
            self.source.cancel(&pending.handle);
        }
        self.slot_by_handle.clear();
        self.cache.clear();
        self.source.stop_caching_all();
    }

    fn evict_slot(&mut self, slot: SlotId) {
        if let Some(previous) = self.slots.remove(&slot) {
            self.slot_by_handle.remove(&previous.handle.id());
            self.source.cancel(&previous.handle);
        }
    }
}

impl std::fmt::Debug for ThumbnailRequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailRequestCoordinator")
            .field("target", &self.target)
            .field("pending_slots", &self.slots.len())
            .field("cache", &self.cache)
            .finish()
    }
}
