// SPDX-License-Identifier: MPL-2.0
//! Filesystem-backed [`ThumbnailSource`].
//!
//! Resolves an [`AssetId`] as a path relative to a root directory, decodes
//! the file on a blocking task and scales it to the requested square. Decode
//! failures are logged and reported as an absent image, never as an error;
//! the picker session keeps running.
//!
//! A small internal warm cache backs the bulk `start_caching` /
//! `stop_caching` API so look-ahead prefetches can answer later fetches
//! without a second decode.

use crate::domain::{AssetId, ThumbnailImage};
use crate::thumbs::source::{
    CancellationToken, CompletionSender, ContentMode, FetchHandle, FetchOutcome, TargetSize,
    ThumbnailSource,
};
use image_rs::imageops::FilterType;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

/// Number of warm thumbnails kept for prefetched assets.
const WARM_CACHE_ENTRIES: usize = 256;

type WarmKey = (AssetId, u32);

struct WarmState {
    cache: LruCache<WarmKey, ThumbnailImage>,
    pending: HashMap<WarmKey, CancellationToken>,
}

impl WarmState {
    fn lock(shared: &Arc<Mutex<WarmState>>) -> std::sync::MutexGuard<'_, WarmState> {
        shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Decodes thumbnails from image files under a root directory.
pub struct FsThumbnailSource {
    root: PathBuf,
    runtime: tokio::runtime::Handle,
    warm: Arc<Mutex<WarmState>>,
}

impl FsThumbnailSource {
    /// Creates a source resolving assets relative to `root`, running decode
    /// work on the given runtime.
    ///
    /// # Panics
    ///
    /// Panics if `WARM_CACHE_ENTRIES` is zero, which would indicate a build
    /// configuration error.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, runtime: tokio::runtime::Handle) -> Self {
        let capacity =
            NonZeroUsize::new(WARM_CACHE_ENTRIES).expect("WARM_CACHE_ENTRIES must be non-zero");
        Self {
            root: root.into(),
            runtime,
            warm: Arc::new(Mutex::new(WarmState {
                cache: LruCache::new(capacity),
                pending: HashMap::new(),
            })),
        }
    }

    fn asset_path(&self, asset: &AssetId) -> PathBuf {
        self.root.join(asset.as_str())
    }

    fn warm_hit(&self, asset: &AssetId, edge_px: u32) -> Option<ThumbnailImage> {
        let mut state = WarmState::lock(&self.warm);
        state.cache.get(&(asset.clone(), edge_px)).cloned()
    }
}

impl ThumbnailSource for FsThumbnailSource {
    fn start_fetch(
        &self,
        asset: &AssetId,
        size: TargetSize,
        mode: ContentMode,
        reply: CompletionSender,
    ) -> FetchHandle {
        let handle = FetchHandle::next();

        if let Some(image) = self.warm_hit(asset, size.edge_px()) {
            let _ = reply.send(FetchOutcome {
                handle: handle.clone(),
                asset: asset.clone(),
                image: Some(image),
            });
            return handle;
        }

        let token = handle.token();
        let path = self.asset_path(asset);
        let task_handle = handle.clone();
        let task_asset = asset.clone();

        self.runtime.spawn_blocking(move || {
            let image = if token.load(Ordering::SeqCst) {
                None
            } else {
                decode_thumbnail(&path, size, mode, &token)
            };
            // The receiver may already be gone after session teardown.
            let _ = reply.send(FetchOutcome {
                handle: task_handle,
                asset: task_asset,
                image,
            });
        });

        handle
    }

    fn start_caching(&self, assets: &[AssetId], size: TargetSize) {
        let edge_px = size.edge_px();

        for asset in assets {
            let key = (asset.clone(), edge_px);
            let token: CancellationToken = {
                let mut state = WarmState::lock(&self.warm);
                if state.cache.contains(&key) || state.pending.contains_key(&key) {
                    continue;
                }
                let token = CancellationToken::default();
                state.pending.insert(key.clone(), token.clone());
                token
            };

            let path = self.asset_path(asset);
            let warm = Arc::clone(&self.warm);
            self.runtime.spawn_blocking(move || {
                if token.load(Ordering::SeqCst) {
                    return;
                }
                let image = decode_thumbnail(&path, size, ContentMode::AspectFill, &token);

                let mut state = WarmState::lock(&warm);
                // A stop_caching call may have raced the decode.
                if state.pending.remove(&key).is_none() || token.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(image) = image {
                    state.cache.put(key, image);
                }
            });
        }
    }

    fn stop_caching(&self, assets: &[AssetId], size: TargetSize) {
        let edge_px = size.edge_px();
        let mut state = WarmState::lock(&self.warm);

        for asset in assets {
            if let Some(token) = state.pending.remove(&(asset.clone(), edge_px)) {
                token.store(true, Ordering::SeqCst);
            }
        }
    }

    fn stop_caching_all(&self) {
        let mut state = WarmState::lock(&self.warm);
        for (_, token) in state.pending.drain() {
            token.store(true, Ordering::SeqCst);
        }
        state.cache.clear();
    }
}

impl std::fmt::Debug for FsThumbnailSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsThumbnailSource")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Decodes an image file and scales it into the target square.
///
/// Returns `None` on any decode failure or when `token` trips mid-decode.
fn decode_thumbnail(
    path: &Path,
    size: TargetSize,
    mode: ContentMode,
    token: &CancellationToken,
) -> Option<ThumbnailImage> {
    let decoded = match image_rs::open(path) {
        Ok(image) => image,
        Err(err) => {
            log::warn!("thumbnail decode failed for {}: {err}", path.display());
            return None;
        }
    };

    if token.load(Ordering::SeqCst) {
        return None;
    }

    let edge = size.edge_px();
    let scaled = match mode {
        ContentMode::AspectFill => decoded.resize_to_fill(edge, edge, FilterType::Triangle),
        ContentMode::AspectFit => decoded.resize(edge, edge, FilterType::Triangle),
    };

    if token.load(Ordering::SeqCst) {
        return None;
    }

    let rgba = scaled.to_rgba8();
    let (width, height) = rgba.dimensions();
    Some(ThumbnailImage::from_rgba(width, height, rgba.into_raw()))
}
