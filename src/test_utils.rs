// SPDX-License-Identifier: MPL-2.0
//! Test utilities: a controllable [`ThumbnailSource`] double and common
//! helpers.
//!
//! This module re-exports the `approx` crate's assertion macros for float
//! comparison, which properly handle floating-point precision issues that
//! `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::{assert_abs_diff_eq, assert_abs_diff_ne, assert_relative_eq, assert_relative_ne};

use crate::domain::{AssetId, ThumbnailImage};
use crate::thumbs::source::{
    CompletionSender, ContentMode, FetchHandle, FetchOutcome, TargetSize, ThumbnailSource,
};
use std::sync::{Arc, Mutex};

/// Builds a solid-color square test thumbnail.
#[must_use]
pub fn test_image(edge: u32) -> ThumbnailImage {
    ThumbnailImage::from_rgba(edge, edge, vec![127u8; (edge * edge * 4) as usize])
}

struct PendingMockFetch {
    handle: FetchHandle,
    asset: AssetId,
    reply: CompletionSender,
}

#[derive(Default)]
struct MockState {
    pending: Vec<PendingMockFetch>,
    started: u64,
    cancelled: Vec<u64>,
    warming: Vec<(AssetId, u32)>,
}

/// A [`ThumbnailSource`] whose completions are delivered manually, so tests
/// can interleave requests, cancellations and completions deterministically.
///
/// Cancelled fetches stay pending on purpose: tests use them to exercise the
/// coordinator's stale-handle guard by completing a fetch "past the point of
/// cancellation".
#[derive(Default)]
pub struct MockThumbnailSource {
    state: Mutex<MockState>,
}

impl MockThumbnailSource {
    /// Creates a shareable mock source.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total number of `start_fetch` calls observed.
    #[must_use]
    pub fn started_count(&self) -> u64 {
        self.lock().started
    }

    /// Handle id of the pending fetch for `asset`, if any.
    #[must_use]
    pub fn handle_for(&self, asset: &AssetId) -> Option<u64> {
        self.lock()
            .pending
            .iter()
            .find(|fetch| &fetch.asset == asset)
            .map(|fetch| fetch.handle.id())
    }

    /// Handle ids passed to `cancel`, in call order.
    #[must_use]
    pub fn cancelled_ids(&self) -> Vec<u64> {
        self.lock().cancelled.clone()
    }

    /// Completes the pending fetch for `asset` with `image`.
    ///
    /// Returns `false` if no fetch for that asset is pending.
    pub fn complete_asset(&self, asset: &AssetId, image: Option<ThumbnailImage>) -> bool {
        let fetch = {
            let mut state = self.lock();
            let Some(index) = state.pending.iter().position(|fetch| &fetch.asset == asset) else {
                return false;
            };
            state.pending.remove(index)
        };
        let _ = fetch.reply.send(FetchOutcome {
            handle: fetch.handle,
            asset: fetch.asset,
            image,
        });
        true
    }

    /// Completes the pending fetch with the given handle id.
    pub fn complete(&self, handle_id: u64, image: Option<ThumbnailImage>) -> bool {
        let fetch = {
            let mut state = self.lock();
            let Some(index) = state
                .pending
                .iter()
                .position(|fetch| fetch.handle.id() == handle_id)
            else {
                return false;
            };
            state.pending.remove(index)
        };
        let asset = fetch.asset.clone();
        let _ = fetch.reply.send(FetchOutcome {
            handle: fetch.handle,
            asset,
            image,
        });
        true
    }

    /// Number of assets currently being warmed.
    #[must_use]
    pub fn warming_count(&self) -> usize {
        self.lock().warming.len()
    }

    /// Whether `asset` is being warmed at `edge_px`.
    #[must_use]
    pub fn is_warming(&self, asset: &AssetId, edge_px: u32) -> bool {
        self.lock()
            .warming
            .iter()
            .any(|(warm_asset, warm_edge)| warm_asset == asset && *warm_edge == edge_px)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ThumbnailSource for MockThumbnailSource {
    fn start_fetch(
        &self,
        asset: &AssetId,
        _size: TargetSize,
        _mode: ContentMode,
        reply: CompletionSender,
    ) -> FetchHandle {
        let handle = FetchHandle::next();
        let mut state = self.lock();
        state.started += 1;
        state.pending.push(PendingMockFetch {
            handle: handle.clone(),
            asset: asset.clone(),
            reply,
        });
        handle
    }

    fn cancel(&self, handle: &FetchHandle) {
        handle.cancel();
        self.lock().cancelled.push(handle.id());
    }

    fn start_caching(&self, assets: &[AssetId], size: TargetSize) {
        let mut state = self.lock();
        for asset in assets {
            let key = (asset.clone(), size.edge_px());
            if !state.warming.contains(&key) {
                state.warming.push(key);
            }
        }
    }

    fn stop_caching(&self, assets: &[AssetId], size: TargetSize) {
        let mut state = self.lock();
        state
            .warming
            .retain(|(asset, edge)| !(assets.contains(asset) && *edge == size.edge_px()));
    }

    fn stop_caching_all(&self) {
        self.lock().warming.clear();
    }
}
