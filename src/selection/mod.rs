// SPDX-License-Identifier: MPL-2.0
//! Ordered, bounded selection state.
//!
//! # Design
//!
//! - **Single mutation entry point**: [`SelectionLedger::toggle`] is the only
//!   method that changes membership; everything else is a read.
//! - **Insertion order is ordinal order**: the badge number of an asset is
//!   `1 + its zero-based position`; removing an entry shifts every later
//!   ordinal down by exactly one.
//! - **Always append**: re-selecting a previously deselected asset joins at
//!   the end of the sequence, it does not reclaim its old ordinal.
//! - **Deterministic overflow**: toggling a new asset at capacity returns
//!   [`ToggleOutcome::LimitReached`] and changes nothing.

use crate::domain::{AssetId, SelectStyle, SlotId};

/// Result of a [`SelectionLedger::toggle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The asset was appended; `ordinal` is its new 1-based badge number.
    Selected {
        /// 1-based position of the new entry (always equals the new count).
        ordinal: usize,
    },
    /// The asset was removed; `removed_index` is its former 0-based position.
    Deselected {
        /// 0-based position the entry occupied before removal.
        removed_index: usize,
    },
    /// The selection is full; nothing changed.
    LimitReached,
}

/// Insertion-ordered set of chosen assets with a hard capacity.
///
/// Owns the ordering exclusively; holds no references to slots, cells or any
/// other presentation object. Slot resolution is injected per call where
/// needed (see [`affected_slots_after_removal`](Self::affected_slots_after_removal)).
#[derive(Debug, Clone)]
pub struct SelectionLedger {
    order: Vec<AssetId>,
    limit: usize,
    style: SelectStyle,
}

impl SelectionLedger {
    /// Creates an empty ledger.
    ///
    /// A `limit` of zero is treated as one; the capacity must admit at least
    /// a single selection.
    #[must_use]
    pub fn new(limit: usize, style: SelectStyle) -> Self {
        Self {
            order: Vec::new(),
            limit: limit.max(1),
            style,
        }
    }

    /// Preloads a prior selection, skipping duplicates and stopping at the
    /// capacity limit. Intended for session start only.
    pub fn seed(&mut self, assets: impl IntoIterator<Item = AssetId>) {
        for asset in assets {
            if self.order.len() >= self.limit {
                break;
            }
            if !self.order.contains(&asset) {
                self.order.push(asset);
            }
        }
    }

    /// Selects `asset` if absent (and capacity allows), deselects it if
    /// present. The single entry point for all selection mutation.
    pub fn toggle(&mut self, asset: &AssetId) -> ToggleOutcome {
        if let Some(index) = self.position_of(asset) {
            self.order.remove(index);
            return ToggleOutcome::Deselected {
                removed_index: index,
            };
        }

        if self.order.len() >= self.limit {
            return ToggleOutcome::LimitReached;
        }

        self.order.push(asset.clone());
        ToggleOutcome::Selected {
            ordinal: self.order.len(),
        }
    }

    /// Removes every entry. The next selection starts at ordinal 1.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Whether `asset` is currently selected.
    #[must_use]
    pub fn is_selected(&self, asset: &AssetId) -> bool {
        self.position_of(asset).is_some()
    }

    /// 1-based badge number of `asset`, or `None` if not selected.
    #[must_use]
    pub fn ordinal_of(&self, asset: &AssetId) -> Option<usize> {
        self.position_of(asset).map(|index| index + 1)
    }

    /// Number of selected assets. Never exceeds the limit.
    #[must_use]
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The capacity limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The configured badge style.
    #[must_use]
    pub fn style(&self) -> SelectStyle {
        self.style
    }

    /// Selected assets in insertion (= ordinal) order.
    #[must_use]
    pub fn selected_in_order(&self) -> &[AssetId] {
        &self.order
    }

    /// Slots whose badge text changed because the entry at `removed_index`
    /// was deselected.
    ///
    /// Under [`SelectStyle::Ordinal`], every entry at or after the removal
    /// point renumbered, so its slot (if currently visible) must re-render.
    /// `resolver` maps an asset to the slot currently showing it; assets with
    /// no visible slot are skipped without error. Under
    /// [`SelectStyle::Checkmark`] badges never change shape, so the result is
    /// empty.
    #[must_use]
    pub fn affected_slots_after_removal<F>(&self, removed_index: usize, resolver: F) -> Vec<SlotId>
    where
        F: Fn(&AssetId) -> Option<SlotId>,
    {
        if self.style != SelectStyle::Ordinal {
            return Vec::new();
        }

        self.order
            .iter()
            .skip(removed_index)
            .filter_map(|asset| resolver(asset))
            .collect()
    }

    fn position_of(&self, asset: &AssetId) -> Option<usize> {
        // Linear scan: the sequence is capped by the selection limit, which
        // is tens of entries at most.
        self.order.iter().position(|candidate| candidate == asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str) -> AssetId {
        AssetId::new(id)
    }

    fn ledger(limit: usize) -> SelectionLedger {
        SelectionLedger::new(limit, SelectStyle::Ordinal)
    }

    #[test]
    fn toggle_selects_and_numbers_in_order() {
        let mut ledger = ledger(5);

        assert_eq!(
            ledger.toggle(&asset("x")),
            ToggleOutcome::Selected { ordinal: 1 }
        );
        assert_eq!(
            ledger.toggle(&asset("y")),
            ToggleOutcome::Selected { ordinal: 2 }
        );

        assert!(ledger.is_selected(&asset("x")));
        assert_eq!(ledger.ordinal_of(&asset("y")), Some(2));
        assert_eq!(ledger.count(), 2);
    }

    #[test]
    fn toggle_deselects_and_reports_removed_index() {
        let mut ledger = ledger(5);
        ledger.toggle(&asset("x"));
        ledger.toggle(&asset("y"));
        ledger.toggle(&asset("z"));

        assert_eq!(
            ledger.toggle(&asset("y")),
            ToggleOutcome::Deselected { removed_index: 1 }
        );
        assert_eq!(ledger.ordinal_of(&asset("x")), Some(1));
        assert_eq!(ledger.ordinal_of(&asset("z")), Some(2));
        assert_eq!(ledger.ordinal_of(&asset("y")), None);
    }

    #[test]
    fn limit_reached_leaves_state_unchanged() {
        let mut ledger = ledger(2);
        ledger.toggle(&asset("x"));
        ledger.toggle(&asset("y"));

        let before: Vec<AssetId> = ledger.selected_in_order().to_vec();
        assert_eq!(ledger.toggle(&asset("w")), ToggleOutcome::LimitReached);
        assert_eq!(ledger.selected_in_order(), before.as_slice());
        assert_eq!(ledger.count(), 2);
        assert!(!ledger.is_selected(&asset("w")));
    }

    #[test]
    fn count_never_exceeds_limit_under_toggle_storm() {
        let mut ledger = ledger(3);
        for round in 0..50 {
            let id = format!("asset-{}", round % 7);
            let _ = ledger.toggle(&asset(&id));
            assert!(ledger.count() <= 3);
        }
    }

    #[test]
    fn ordinals_are_contiguous() {
        let mut ledger = ledger(10);
        for id in ["a", "b", "c", "d", "e"] {
            ledger.toggle(&asset(id));
        }
        ledger.toggle(&asset("c"));
        ledger.toggle(&asset("a"));

        let ordinals: Vec<usize> = ledger
            .selected_in_order()
            .iter()
            .map(|a| ledger.ordinal_of(a).expect("selected asset has ordinal"))
            .collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn reselect_appends_at_end() {
        let mut ledger = ledger(5);
        ledger.toggle(&asset("x"));
        ledger.toggle(&asset("y"));
        ledger.toggle(&asset("z"));

        ledger.toggle(&asset("x"));
        assert_eq!(
            ledger.toggle(&asset("x")),
            ToggleOutcome::Selected { ordinal: 3 }
        );
        assert_eq!(
            ledger.selected_in_order(),
            &[asset("y"), asset("z"), asset("x")]
        );
    }

    #[test]
    fn double_toggle_restores_observable_state() {
        let mut ledger = ledger(5);
        ledger.toggle(&asset("x"));
        ledger.toggle(&asset("y"));

        let before: Vec<AssetId> = ledger.selected_in_order().to_vec();
        ledger.toggle(&asset("w"));
        ledger.toggle(&asset("w"));
        assert_eq!(ledger.selected_in_order(), before.as_slice());
    }

    #[test]
    fn seed_dedupes_and_truncates() {
        let mut ledger = ledger(3);
        ledger.seed(vec![
            asset("a"),
            asset("b"),
            asset("a"),
            asset("c"),
            asset("d"),
        ]);

        assert_eq!(
            ledger.selected_in_order(),
            &[asset("a"), asset("b"), asset("c")]
        );
    }

    #[test]
    fn affected_slots_under_ordinal_style() {
        let mut ledger = ledger(10);
        for id in ["a", "b", "c", "d"] {
            ledger.toggle(&asset(id));
        }

        // Remove "b" (index 1): "c" and "d" renumber.
        assert_eq!(
            ledger.toggle(&asset("b")),
            ToggleOutcome::Deselected { removed_index: 1 }
        );

        let slots = ledger.affected_slots_after_removal(1, |a| match a.as_str() {
            "c" => Some(SlotId(12)),
            "d" => Some(SlotId(13)),
            _ => None,
        });
        assert_eq!(slots, vec![SlotId(12), SlotId(13)]);
    }

    #[test]
    fn affected_slots_skips_unresolved_assets() {
        let mut ledger = ledger(10);
        for id in ["a", "b", "c"] {
            ledger.toggle(&asset(id));
        }
        ledger.toggle(&asset("a"));

        // Only "c" is visible; "b" scrolled offscreen.
        let slots = ledger.affected_slots_after_removal(0, |a| {
            (a.as_str() == "c").then_some(SlotId(2))
        });
        assert_eq!(slots, vec![SlotId(2)]);
    }

    #[test]
    fn affected_slots_empty_under_checkmark_style() {
        let mut ledger = SelectionLedger::new(10, SelectStyle::Checkmark);
        for id in ["a", "b", "c"] {
            ledger.toggle(&asset(id));
        }
        ledger.toggle(&asset("a"));

        let slots = ledger.affected_slots_after_removal(0, |_| Some(SlotId(0)));
        assert!(slots.is_empty());
    }

    #[test]
    fn zero_limit_is_promoted_to_one() {
        let mut ledger = SelectionLedger::new(0, SelectStyle::Ordinal);
        assert_eq!(ledger.limit(), 1);
        assert_eq!(
            ledger.toggle(&asset("x")),
            ToggleOutcome::Selected { ordinal: 1 }
        );
        assert_eq!(ledger.toggle(&asset("y")), ToggleOutcome::LimitReached);
    }

    #[test]
    fn clear_resets_ordinals() {
        let mut ledger = ledger(5);
        ledger.toggle(&asset("x"));
        ledger.toggle(&asset("y"));
        ledger.clear();

        assert!(ledger.is_empty());
        assert_eq!(
            ledger.toggle(&asset("z")),
            ToggleOutcome::Selected { ordinal: 1 }
        );
    }
}
