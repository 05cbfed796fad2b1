// SPDX-License-Identifier: MPL-2.0
//! Thumbnail fetching: the request coordinator, its cache, the source port
//! and a filesystem-backed source implementation.

pub mod cache;
pub mod coordinator;
pub mod fs_source;
pub mod source;

pub use cache::{CacheConfig, CacheStats, ThumbnailCache};
pub use coordinator::ThumbnailRequestCoordinator;
pub use fs_source::FsThumbnailSource;
pub use source::{
    CancellationToken, CompletionSender, ContentMode, FetchHandle, FetchOutcome, TargetSize,
    ThumbnailSource,
};
