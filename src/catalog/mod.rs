// SPDX-License-Identifier: MPL-2.0
//! Album catalog port and an in-memory provider.
//!
//! The catalog is read-only and OS-owned in a real deployment; the core only
//! consumes the contract: albums arrive sorted by descending asset count
//! with empty albums skipped, each album's assets newest-first. Zero albums
//! is a valid, quiescent state, not a fault.

use crate::domain::{AlbumFolder, AssetId};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Supplies album records on demand.
///
/// Invoked once per load/refresh event, never per frame.
pub trait AssetCatalogProvider: Send + Sync {
    /// Fetches all non-empty albums, sorted by descending asset count.
    ///
    /// `fetch_limit` caps the number of assets per album; `None` or zero
    /// means unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Catalog`] when the underlying store
    /// cannot be enumerated at all. An empty store is `Ok(vec![])`.
    fn fetch_albums(&self, fetch_limit: Option<usize>) -> Result<Vec<AlbumFolder>>;
}

/// One asset with its capture timestamp, as stored by [`StaticCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Stable asset identifier.
    pub id: AssetId,
    /// Capture time; albums list newest assets first.
    pub created_at: DateTime<Utc>,
}

impl AssetRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(id: impl Into<AssetId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}

/// In-memory catalog provider for tests and demo hosts.
///
/// Albums keep their given titles; `fetch_albums` applies the provider
/// contract (newest-first assets, empties skipped, biggest album first).
#[derive(Debug, Default)]
pub struct StaticCatalog {
    albums: Vec<(String, Vec<AssetRecord>)>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an album with the given records.
    pub fn add_album(&mut self, title: impl Into<String>, records: Vec<AssetRecord>) {
        self.albums.push((title.into(), records));
    }
}

impl AssetCatalogProvider for StaticCatalog {
    fn fetch_albums(&self, fetch_limit: Option<usize>) -> Result<Vec<AlbumFolder>> {
        let cap = match fetch_limit {
            Some(0) | None => usize::MAX,
            Some(limit) => limit,
        };

        let mut folders: Vec<AlbumFolder> = self
            .albums
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(title, records)| {
                let mut sorted: Vec<&AssetRecord> = records.iter().collect();
                sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                let assets: Vec<AssetId> = sorted
                    .into_iter()
                    .take(cap)
                    .map(|record| record.id.clone())
                    .collect();
                AlbumFolder::new(title.clone(), assets)
            })
            .collect();

        folders.sort_by(|a, b| b.count().cmp(&a.count()));
        Ok(folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, secs: i64) -> AssetRecord {
        AssetRecord::new(
            id,
            Utc.timestamp_opt(secs, 0).single().expect("valid timestamp"),
        )
    }

    fn catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        catalog.add_album(
            "Screenshots",
            vec![record("s1", 100), record("s2", 300), record("s3", 200)],
        );
        catalog.add_album("Empty", vec![]);
        catalog.add_album("Camera Roll", vec![record("c1", 50)]);
        catalog
    }

    #[test]
    fn albums_sorted_by_descending_count_and_empties_skipped() {
        let folders = catalog().fetch_albums(None).expect("fetch succeeds");

        let titles: Vec<&str> = folders.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Screenshots", "Camera Roll"]);
    }

    #[test]
    fn assets_are_newest_first() {
        let folders = catalog().fetch_albums(None).expect("fetch succeeds");

        let ids: Vec<&str> = folders[0].assets.iter().map(AssetId::as_str).collect();
        assert_eq!(ids, vec!["s2", "s3", "s1"]);
    }

    #[test]
    fn fetch_limit_caps_assets_per_album() {
        let folders = catalog().fetch_albums(Some(2)).expect("fetch succeeds");

        assert_eq!(folders[0].count(), 2);
        let ids: Vec<&str> = folders[0].assets.iter().map(AssetId::as_str).collect();
        assert_eq!(ids, vec!["s2", "s3"]);
    }

    #[test]
    fn zero_fetch_limit_means_unbounded() {
        let folders = catalog().fetch_albums(Some(0)).expect("fetch succeeds");
        assert_eq!(folders[0].count(), 3);
    }

    #[test]
    fn empty_catalog_is_a_valid_state() {
        let folders = StaticCatalog::new()
            .fetch_albums(None)
            .expect("fetch succeeds");
        assert!(folders.is_empty());
    }
}
