//! Per-session registry of pinned (ship, loadout) configurations.
//!
//! An entry is keyed by the ship's lookup name plus the exact equipment
//! selection, so several loadouts of one ship can be pinned side by side.
//! Entries keep their insertion sequence; the ranked view orders by score
//! and falls back to that sequence for equal scores.
//!
//! After a catalog reload an entry whose items can no longer be resolved is
//! detached: it keeps its item names and last score but holds no selection,
//! so it never answers for a live catalog index.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::catalog::Catalog;
use crate::data::equipment::{EquipmentSelection, Loadout, LoadoutNames};
use crate::data::loader::normalize_lookup;
use crate::data::ship::Ship;
use crate::ehp::{ScoreError, Scorer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinKey {
    ship: String,
    selection: EquipmentSelection,
}

impl PinKey {
    pub fn new(ship_name: &str, selection: EquipmentSelection) -> Self {
        Self {
            ship: normalize_lookup(ship_name),
            selection,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PinnedEntry {
    pub ship: String,
    /// `None` once the entry is detached from the current catalog.
    pub selection: Option<EquipmentSelection>,
    pub equipment: LoadoutNames,
    pub score: f64,
    pub sequence: u64,
    pub pinned_at: DateTime<Utc>,
}

impl PinnedEntry {
    /// Lookup key; detached entries have none.
    pub fn key(&self) -> Option<PinKey> {
        self.selection
            .map(|selection| PinKey::new(&self.ship, selection))
    }

    pub fn is_detached(&self) -> bool {
        self.selection.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PinOutcome {
    Pinned { score: f64 },
    AlreadyPinned { score: f64 },
}

impl PinOutcome {
    pub fn score(&self) -> f64 {
        match self {
            Self::Pinned { score } | Self::AlreadyPinned { score } => *score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinState {
    Pinned,
    Unpinned,
}

/// Result of re-scoring a registry against a freshly loaded catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RescoreReport {
    pub refreshed: usize,
    /// Entries left at their previous score, with the reason.
    pub stale: Vec<StaleEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaleEntry {
    pub ship: String,
    pub equipment: LoadoutNames,
    pub reason: String,
}

type Resolved = Result<(EquipmentSelection, LoadoutNames, f64), String>;

#[derive(Debug, Clone)]
pub struct PinRegistry {
    scorer: Scorer,
    entries: Vec<PinnedEntry>,
    next_sequence: u64,
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new(Scorer::default())
    }
}

impl PinRegistry {
    pub fn new(scorer: Scorer) -> Self {
        Self {
            scorer,
            entries: Vec::new(),
            next_sequence: 0,
        }
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &PinKey) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.key().as_ref() == Some(key))
    }

    pub fn is_pinned(&self, ship_name: &str, selection: EquipmentSelection) -> bool {
        self.position(&PinKey::new(ship_name, selection)).is_some()
    }

    pub fn get(&self, ship_name: &str, selection: EquipmentSelection) -> Option<&PinnedEntry> {
        self.position(&PinKey::new(ship_name, selection))
            .map(|index| &self.entries[index])
    }

    /// Score and insert the configuration. Pinning an existing pair leaves the
    /// registry untouched; a failed score inserts nothing.
    pub fn pin(&mut self, ship: &Ship, loadout: &Loadout<'_>) -> Result<PinOutcome, ScoreError> {
        if let Some(existing) = self.get(&ship.name, loadout.selection) {
            return Ok(PinOutcome::AlreadyPinned {
                score: existing.score,
            });
        }

        let score = self.scorer.score(ship, loadout)?;
        self.entries.push(PinnedEntry {
            ship: ship.name.clone(),
            selection: Some(loadout.selection),
            equipment: loadout.item_names(),
            score,
            sequence: self.next_sequence,
            pinned_at: Utc::now(),
        });
        self.next_sequence += 1;
        tracing::debug!(ship = %ship.name, score, "configuration pinned");
        Ok(PinOutcome::Pinned { score })
    }

    /// Remove the matching entry. Returns whether anything was removed.
    pub fn unpin(&mut self, ship_name: &str, selection: EquipmentSelection) -> bool {
        match self.position(&PinKey::new(ship_name, selection)) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, ship: &Ship, loadout: &Loadout<'_>) -> Result<PinState, ScoreError> {
        if self.unpin(&ship.name, loadout.selection) {
            return Ok(PinState::Unpinned);
        }
        self.pin(ship, loadout)?;
        Ok(PinState::Pinned)
    }

    /// Overwrite the stored score of an exact pinned pair. Returns false when
    /// the pair is not pinned.
    pub fn refresh(&mut self, ship_name: &str, selection: EquipmentSelection, new_score: f64) -> bool {
        match self.position(&PinKey::new(ship_name, selection)) {
            Some(index) => {
                self.entries[index].score = new_score;
                true
            }
            None => false,
        }
    }

    /// Recompute every entry against `catalog`. Items are matched by name, so
    /// an entry follows its equipment when catalog indices shift, and a
    /// detached entry reattaches once its items are back.
    ///
    /// Entries whose ship or items are gone, or whose new selection is already
    /// claimed, are detached and keep their last score. Live entries claim
    /// their new key before detached ones, then in pin order.
    pub fn rescore(&mut self, catalog: &Catalog) -> RescoreReport {
        let scorer = self.scorer;
        let resolved: Vec<Resolved> = self
            .entries
            .iter()
            .map(|entry| -> Resolved {
                let ship = catalog.require_ship(&entry.ship).map_err(|err| err.to_string())?;
                let rescored = catalog
                    .selection_by_names(
                        Some(entry.equipment.aux_a.as_str()),
                        Some(entry.equipment.aux_b.as_str()),
                        Some(entry.equipment.augment.as_str()),
                    )
                    .and_then(|selection| catalog.loadout(selection))
                    .map_err(ScoreError::from)
                    .and_then(|loadout| {
                        let score = scorer.score(ship, &loadout)?;
                        Ok((loadout.selection, loadout.item_names(), score))
                    });
                rescored.map_err(|err| err.to_string())
            })
            .collect();

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&index| (self.entries[index].is_detached(), index));

        let mut claimed = HashSet::new();
        let mut refreshed = Vec::new();
        let mut report = RescoreReport::default();
        for index in order {
            let entry = &mut self.entries[index];
            let outcome = match &resolved[index] {
                Ok((selection, names, score)) => {
                    if claimed.insert(PinKey::new(&entry.ship, *selection)) {
                        Ok((*selection, names.clone(), *score))
                    } else {
                        Err("selection collides with another pinned entry".to_string())
                    }
                }
                Err(reason) => Err(reason.clone()),
            };

            match outcome {
                Ok((selection, names, score)) => {
                    entry.selection = Some(selection);
                    entry.equipment = names;
                    refreshed.push((entry.ship.clone(), selection, score));
                }
                Err(reason) => {
                    tracing::warn!(ship = %entry.ship, %reason, "pinned entry detached with its previous score");
                    entry.selection = None;
                    report.stale.push(StaleEntry {
                        ship: entry.ship.clone(),
                        equipment: entry.equipment.clone(),
                        reason,
                    });
                }
            }
        }

        for (ship, selection, score) in refreshed {
            if self.refresh(&ship, selection, score) {
                report.refreshed += 1;
            }
        }
        report
    }

    /// Drop every detached entry. Returns how many were removed.
    pub fn prune_detached(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is_detached());
        before - self.entries.len()
    }

    /// Entries by descending score; equal scores keep pin order. Each call
    /// builds a fresh ordering of the current entries.
    pub fn ranked_view(&self) -> impl Iterator<Item = &PinnedEntry> + '_ {
        let mut ranked: Vec<&PinnedEntry> = self.entries.iter().collect();
        ranked.sort_by(|left, right| {
            right
                .score
                .total_cmp(&left.score)
                .then_with(|| left.sequence.cmp(&right.sequence))
        });
        ranked.into_iter()
    }

    /// Entries in pin order.
    pub fn entries(&self) -> &[PinnedEntry] {
        &self.entries
    }
}
