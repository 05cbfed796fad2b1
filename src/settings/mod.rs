// SPDX-License-Identifier: MPL-2.0
//! Picker session configuration, including loading and saving settings to a
//! `picker.toml` file.
//!
//! Settings are supplied once at session start and are read-only for the
//! core components; `normalized()` clamps out-of-range values instead of
//! rejecting them.

use crate::domain::{AssetId, SelectStyle};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default maximum number of selectable photos.
pub const DEFAULT_SELECTION_LIMIT: usize = 10;

/// Default number of photos per grid row.
pub const DEFAULT_ROW_COUNT: usize = 4;

/// Default thumbnail edge length in points.
pub const DEFAULT_THUMBNAIL_EDGE: f32 = 100.0;

/// Upper bound for the thumbnail edge length in points.
pub const MAX_THUMBNAIL_EDGE: f32 = 100.0;

/// Read-only configuration for one picking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerSettings {
    /// Maximum number of assets that may be selected at once.
    #[serde(default = "default_selection_limit")]
    pub selection_limit: usize,

    /// Badge style shown on selected photos.
    #[serde(default)]
    pub select_style: SelectStyle,

    /// Number of photos per grid row. The presentation layer derives the
    /// effective thumbnail edge from available width and this count.
    #[serde(default = "default_row_count")]
    pub row_count: usize,

    /// Thumbnail edge length in points (square thumbnails).
    #[serde(default = "default_thumbnail_edge")]
    pub thumbnail_edge: f32,

    /// Display scale factor (points to pixels).
    #[serde(default = "default_display_scale")]
    pub display_scale: f32,

    /// Assets already selected when the session opens.
    #[serde(default)]
    pub preselected: Vec<AssetId>,
}

fn default_selection_limit() -> usize {
    DEFAULT_SELECTION_LIMIT
}

fn default_row_count() -> usize {
    DEFAULT_ROW_COUNT
}

fn default_thumbnail_edge() -> f32 {
    DEFAULT_THUMBNAIL_EDGE
}

fn default_display_scale() -> f32 {
    1.0
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            selection_limit: DEFAULT_SELECTION_LIMIT,
            select_style: SelectStyle::default(),
            row_count: DEFAULT_ROW_COUNT,
            thumbnail_edge: DEFAULT_THUMBNAIL_EDGE,
            display_scale: 1.0,
            preselected: Vec::new(),
        }
    }
}

impl PickerSettings {
    /// Returns a copy with every field clamped into its valid range.
    ///
    /// Limits and row counts are forced to at least 1; the thumbnail edge is
    /// forced positive, finite and capped at [`MAX_THUMBNAIL_EDGE`]; a
    /// non-finite or non-positive display scale falls back to 1.0.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.selection_limit = self.selection_limit.max(1);
        self.row_count = self.row_count.max(1);
        self.thumbnail_edge = clamp_edge(self.thumbnail_edge);
        if !self.display_scale.is_finite() || self.display_scale <= 0.0 {
            self.display_scale = 1.0;
        }
        self
    }
}

/// Clamps a thumbnail edge length to `(0, MAX_THUMBNAIL_EDGE]`.
#[must_use]
pub fn clamp_edge(edge: f32) -> f32 {
    if !edge.is_finite() || edge == 0.0 {
        return DEFAULT_THUMBNAIL_EDGE;
    }
    edge.abs().min(MAX_THUMBNAIL_EDGE)
}

pub fn load_from_path(path: &Path) -> Result<PickerSettings> {
    let content = fs::read_to_string(path)?;
    let settings: PickerSettings = toml::from_str(&content)?;
    Ok(settings.normalized())
}

pub fn save_to_path(settings: &PickerSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(settings)
        .map_err(|e| crate::error::Error::Config(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_picker_conventions() {
        let settings = PickerSettings::default();
        assert_eq!(settings.selection_limit, 10);
        assert_eq!(settings.row_count, 4);
        assert_eq!(settings.select_style, SelectStyle::Ordinal);
        assert_abs_diff_eq!(settings.thumbnail_edge, 100.0);
        assert!(settings.preselected.is_empty());
    }

    #[test]
    fn normalized_clamps_degenerate_values() {
        let settings = PickerSettings {
            selection_limit: 0,
            row_count: 0,
            thumbnail_edge: -250.0,
            display_scale: f32::NAN,
            ..Default::default()
        }
        .normalized();

        assert_eq!(settings.selection_limit, 1);
        assert_eq!(settings.row_count, 1);
        assert_abs_diff_eq!(settings.thumbnail_edge, MAX_THUMBNAIL_EDGE);
        assert_abs_diff_eq!(settings.display_scale, 1.0);
    }

    #[test]
    fn clamp_edge_behavior() {
        assert_abs_diff_eq!(clamp_edge(64.0), 64.0);
        assert_abs_diff_eq!(clamp_edge(-64.0), 64.0);
        assert_abs_diff_eq!(clamp_edge(400.0), MAX_THUMBNAIL_EDGE);
        assert_abs_diff_eq!(clamp_edge(0.0), DEFAULT_THUMBNAIL_EDGE);
        assert_abs_diff_eq!(clamp_edge(f32::INFINITY), DEFAULT_THUMBNAIL_EDGE);
    }

    #[test]
    fn settings_toml_round_trip() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("picker.toml");

        let settings = PickerSettings {
            selection_limit: 21,
            select_style: SelectStyle::Checkmark,
            row_count: 3,
            thumbnail_edge: 80.0,
            display_scale: 2.0,
            preselected: vec![AssetId::new("IMG_0042")],
        };
        save_to_path(&settings, &path).expect("Failed to save settings");

        let loaded = load_from_path(&path).expect("Failed to load settings");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_applies_normalization() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("picker.toml");
        fs::write(&path, "selection_limit = 0\nthumbnail_edge = 900.0\n")
            .expect("Failed to write raw settings");

        let loaded = load_from_path(&path).expect("Failed to load settings");
        assert_eq!(loaded.selection_limit, 1);
        assert_abs_diff_eq!(loaded.thumbnail_edge, MAX_THUMBNAIL_EDGE);
        // Missing fields fall back to defaults
        assert_eq!(loaded.row_count, DEFAULT_ROW_COUNT);
    }
}
