// SPDX-License-Identifier: MPL-2.0
//! `photopicker` is the session-scoped core of a bounded photo picker.
//!
//! It provides the two subsystems that must stay correct under concurrency
//! and cell-reuse pressure: an ordered, capacity-limited selection ledger
//! with stable ordinal badges, and a slot-keyed thumbnail request
//! coordinator that guarantees at most one in-flight fetch per visual slot.
//! Rendering, permission prompts and media-store enumeration are external
//! collaborators behind the [`thumbs::ThumbnailSource`] and
//! [`catalog::AssetCatalogProvider`] ports.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod selection;
pub mod session;
pub mod settings;
pub mod test_utils;
pub mod thumbs;

pub use domain::{AlbumFolder, AssetId, PhotoEntry, SelectStyle, SlotId, ThumbnailImage};
pub use error::{Error, Result};
pub use selection::{SelectionLedger, ToggleOutcome};
pub use session::{PickerDelegate, PickerSession};
pub use settings::PickerSettings;
pub use thumbs::ThumbnailRequestCoordinator;
