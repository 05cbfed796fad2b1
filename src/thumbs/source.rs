// SPDX-License-Identifier: MPL-2.0
//! Thumbnail source port definition.
//!
//! [`ThumbnailSource`] is the seam between the coordinator and whatever
//! actually produces bitmaps (an OS media store, a filesystem decoder, a
//! test double). Sources reply asynchronously on arbitrary threads through a
//! [`CompletionSender`]; the coordinator marshals those replies back onto its
//! own thread before touching any slot state.

use crate::domain::{AssetId, ThumbnailImage};
use crate::settings::clamp_edge;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Cancellation token shared between a [`FetchHandle`] and the worker
/// executing its fetch.
pub type CancellationToken = Arc<AtomicBool>;

/// Square pixel size for thumbnail fetches.
///
/// Built from a point edge length and a display scale; the edge is clamped
/// to the configured maximum before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    edge_px: u32,
}

impl TargetSize {
    /// Creates a square target size from a point edge and display scale.
    #[must_use]
    pub fn from_edge(edge_points: f32, display_scale: f32) -> Self {
        let scale = if display_scale.is_finite() && display_scale > 0.0 {
            display_scale
        } else {
            1.0
        };
        let px = (clamp_edge(edge_points) * scale).round();
        Self {
            // clamp_edge keeps the edge positive and bounded, so the cast is lossless
            edge_px: (px as u32).max(1),
        }
    }

    /// Edge length in pixels.
    #[must_use]
    pub fn edge_px(&self) -> u32 {
        self.edge_px
    }
}

/// How the source fits a bitmap into the target square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Fill the square, cropping overflow. Used for grid thumbnails.
    AspectFill,
    /// Fit inside the square, preserving the full frame.
    AspectFit,
}

/// Token for one in-flight fetch; used only for identity and cancellation.
///
/// Clones share the same id and cancellation token.
#[derive(Debug, Clone)]
pub struct FetchHandle {
    id: u64,
    token: CancellationToken,
}

impl FetchHandle {
    /// Creates a handle with a process-unique id and a fresh token.
    #[must_use]
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            token: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Process-unique request id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Requests cancellation. Fire-and-forget: the fetch may still complete,
    /// in which case the coordinator's stale-handle guard drops the result.
    pub fn cancel(&self) {
        self.token.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.load(Ordering::SeqCst)
    }

    /// The shared cancellation token, for workers that outlive the handle.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        Arc::clone(&self.token)
    }
}

impl PartialEq for FetchHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FetchHandle {}

/// One completed (or failed, or cancelled) fetch.
///
/// Failure and cancellation both surface as `image: None`; the session
/// policy is to leave the slot's previous visual state rather than retry.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The handle returned by the `start_fetch` call this outcome answers.
    pub handle: FetchHandle,
    /// The asset the fetch was for.
    pub asset: AssetId,
    /// The decoded bitmap, or `None` on failure/cancellation.
    pub image: Option<ThumbnailImage>,
}

/// Channel endpoint a source replies on.
pub type CompletionSender = crossbeam_channel::Sender<FetchOutcome>;

/// Asynchronous producer of thumbnail bitmaps.
///
/// # Contract
///
/// - `start_fetch` must not block; the reply arrives later on `reply`
///   (a dropped receiver must be tolerated — send errors are ignored).
/// - Every `start_fetch` sends exactly one [`FetchOutcome`] carrying the
///   returned handle, unless cancellation won the race, in which case the
///   outcome may be skipped entirely.
/// - `start_caching`/`stop_caching` are best-effort bulk warm-up hints;
///   `stop_caching` must affect exactly the given assets and no others.
pub trait ThumbnailSource: Send + Sync {
    /// Begins an async fetch of `asset` at `size`; returns its handle.
    fn start_fetch(
        &self,
        asset: &AssetId,
        size: TargetSize,
        mode: ContentMode,
        reply: CompletionSender,
    ) -> FetchHandle;

    /// Requests cancellation of an in-flight fetch. Best-effort.
    fn cancel(&self, handle: &FetchHandle) {
        handle.cancel();
    }

    /// Begins warming the given assets at `size` for look-ahead scrolling.
    fn start_caching(&self, assets: &[AssetId], size: TargetSize);

    /// Stops warming exactly the given assets at `size`.
    fn stop_caching(&self, assets: &[AssetId], size: TargetSize);

    /// Abandons all warm-up work. Called on session teardown.
    fn stop_caching_all(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_size_scales_and_clamps() {
        assert_eq!(TargetSize::from_edge(100.0, 2.0).edge_px(), 200);
        assert_eq!(TargetSize::from_edge(64.0, 1.0).edge_px(), 64);
        // Edge above the cap is clamped before scaling
        assert_eq!(TargetSize::from_edge(500.0, 1.0).edge_px(), 100);
        // Degenerate scale falls back to 1.0
        assert_eq!(TargetSize::from_edge(50.0, f32::NAN).edge_px(), 50);
        assert_eq!(TargetSize::from_edge(50.0, -3.0).edge_px(), 50);
    }

    #[test]
    fn fetch_handles_are_unique() {
        let a = FetchHandle::next();
        let b = FetchHandle::next();
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn cancel_trips_shared_token() {
        let handle = FetchHandle::next();
        let token = handle.token();
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(token.load(std::sync::atomic::Ordering::SeqCst));
    }
}
