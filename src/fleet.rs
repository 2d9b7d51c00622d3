//! Fleet builder: three vanguard and three main slots, totalled by default eHP.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::catalog::Catalog;
use crate::ehp::{ConfigurationError, ScoreError, Scorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetSlot {
    Vanguard1,
    Vanguard2,
    Vanguard3,
    Main1,
    Main2,
    Main3,
}

impl FleetSlot {
    pub const ALL: [FleetSlot; 6] = [
        Self::Vanguard1,
        Self::Vanguard2,
        Self::Vanguard3,
        Self::Main1,
        Self::Main2,
        Self::Main3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vanguard1 => "vanguard1",
            Self::Vanguard2 => "vanguard2",
            Self::Vanguard3 => "vanguard3",
            Self::Main1 => "main1",
            Self::Main2 => "main2",
            Self::Main3 => "main3",
        }
    }

    fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FleetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FleetSlot {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == wanted)
            .ok_or_else(|| format!("unknown fleet slot '{value}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    slots: [Option<String>; 6],
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotScore {
    pub slot: FleetSlot,
    pub ship: String,
    pub ehp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetScore {
    pub slots: Vec<SlotScore>,
    pub total: f64,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `ship` in `slot`, returning the ship it replaced.
    pub fn assign(&mut self, slot: FleetSlot, ship: impl Into<String>) -> Option<String> {
        self.slots[slot.position()].replace(ship.into())
    }

    pub fn remove(&mut self, slot: FleetSlot) -> Option<String> {
        self.slots[slot.position()].take()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    pub fn get(&self, slot: FleetSlot) -> Option<&str> {
        self.slots[slot.position()].as_deref()
    }

    pub fn occupied(&self) -> impl Iterator<Item = (FleetSlot, &str)> + '_ {
        FleetSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|ship| (slot, ship)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Default-loadout eHP of every occupied slot plus their sum.
    pub fn score(&self, catalog: &Catalog, scorer: &Scorer) -> Result<FleetScore, ScoreError> {
        let mut slots = Vec::new();
        for (slot, name) in self.occupied() {
            let ship = catalog
                .ship(name)
                .ok_or_else(|| ConfigurationError::UnknownShip {
                    name: name.to_string(),
                })?;
            slots.push(SlotScore {
                slot,
                ship: ship.name.clone(),
                ehp: catalog.default_score(ship, scorer)?,
            });
        }
        let total = slots.iter().map(|s| s.ehp).sum();
        Ok(FleetScore { slots, total })
    }
}
