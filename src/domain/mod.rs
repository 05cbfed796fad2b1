// SPDX-License-Identifier: MPL-2.0
//! Core picker types.
//!
//! These types represent pure data without any presentation dependencies.
//! Presentation layers convert [`ThumbnailImage`] into framework-specific
//! handles and map [`SlotId`] onto whatever cell-reuse scheme they employ.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque, stable identifier for a single media item.
///
/// Equality is identity-based: two `AssetId`s are the same asset exactly
/// when their identifiers are equal, regardless of pixel content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Creates an asset identifier from any string-like token.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Transient identifier for a visible display position.
///
/// Slots are recycled by the presentation layer as a scrollable view reuses
/// its cells; nothing in this crate assumes a slot stays bound to one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Decoded thumbnail bitmap without presentation dependencies.
///
/// Pixel data is RGBA, 4 bytes per pixel, shared behind an `Arc` so clones
/// are cheap while a completion fans out to cache and caller.
#[derive(Debug, Clone)]
pub struct ThumbnailImage {
    width: u32,
    height: u32,
    rgba_bytes: Arc<Vec<u8>>,
}

impl ThumbnailImage {
    /// Creates a new `ThumbnailImage` from dimensions and shared RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data length doesn't match `width * height * 4`.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba_bytes: Arc<Vec<u8>>) -> Self {
        let expected_len = (width as usize) * (height as usize) * 4;
        assert_eq!(
            rgba_bytes.len(),
            expected_len,
            "RGBA data length mismatch: expected {expected_len}, got {}",
            rgba_bytes.len()
        );

        Self {
            width,
            height,
            rgba_bytes,
        }
    }

    /// Creates a new `ThumbnailImage` from dimensions and owned RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data length doesn't match `width * height * 4`.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, rgba_bytes: Vec<u8>) -> Self {
        Self::new(width, height, Arc::new(rgba_bytes))
    }

    /// Returns the image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a reference to the RGBA pixel data.
    #[must_use]
    pub fn rgba_bytes(&self) -> &[u8] {
        &self.rgba_bytes
    }

    /// Returns the size of the pixel data in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.rgba_bytes.len()
    }
}

impl PartialEq for ThumbnailImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rgba_bytes == other.rgba_bytes
    }
}

impl Eq for ThumbnailImage {}

/// One album as handed over by the catalog provider.
///
/// Immutable once fetched; a reload replaces the whole list rather than
/// mutating folders in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumFolder {
    /// Album display title.
    pub title: String,
    /// Assets in display order (newest first for OS-backed providers).
    pub assets: Vec<AssetId>,
    /// Whether this folder is the one currently shown.
    pub is_active: bool,
}

impl AlbumFolder {
    /// Creates a folder with `is_active = false`.
    #[must_use]
    pub fn new(title: impl Into<String>, assets: Vec<AssetId>) -> Self {
        Self {
            title: title.into(),
            assets,
            is_active: false,
        }
    }

    /// Number of assets in the folder.
    #[must_use]
    pub fn count(&self) -> usize {
        self.assets.len()
    }
}

/// Per-cell view data for one photo in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    /// The asset shown by this cell.
    pub asset: AssetId,
    /// Whether the asset is currently selected.
    pub is_selected: bool,
    /// Ordinal label text when selected (`"1"`, `"2"`, ...), `None` otherwise.
    /// Presentation substitutes a checkmark glyph under [`SelectStyle::Checkmark`].
    pub select_title: Option<String>,
}

/// Visual style of the selection badge on a chosen photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectStyle {
    /// 1-based position number in selection order.
    #[default]
    Ordinal,
    /// On/off checkmark; the badge never changes shape as others are removed.
    Checkmark,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_identity_equality() {
        let a = AssetId::new("IMG_0001");
        let b = AssetId::from("IMG_0001");
        let c = AssetId::new("IMG_0002");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "IMG_0001");
        assert_eq!(format!("{a}"), "IMG_0001");
    }

    #[test]
    fn slot_id_display() {
        assert_eq!(format!("{}", SlotId(7)), "slot#7");
    }

    #[test]
    fn thumbnail_image_creation() {
        let pixels = vec![0u8; 10 * 10 * 4];
        let image = ThumbnailImage::from_rgba(10, 10, pixels);

        assert_eq!(image.width(), 10);
        assert_eq!(image.height(), 10);
        assert_eq!(image.byte_len(), 400);
    }

    #[test]
    #[should_panic(expected = "RGBA data length mismatch")]
    fn thumbnail_image_invalid_size() {
        let pixels = vec![0u8; 100];
        let _ = ThumbnailImage::from_rgba(10, 10, pixels);
    }

    #[test]
    fn thumbnail_image_equality() {
        let a = ThumbnailImage::from_rgba(4, 4, vec![0u8; 64]);
        let b = ThumbnailImage::from_rgba(4, 4, vec![0u8; 64]);
        let c = ThumbnailImage::from_rgba(4, 4, vec![1u8; 64]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn album_folder_count() {
        let folder = AlbumFolder::new("Camera Roll", vec![AssetId::new("a"), AssetId::new("b")]);
        assert_eq!(folder.count(), 2);
        assert!(!folder.is_active);
        assert_eq!(folder.title, "Camera Roll");
    }

    #[test]
    fn select_style_default_is_ordinal() {
        assert_eq!(SelectStyle::default(), SelectStyle::Ordinal);
    }
}
