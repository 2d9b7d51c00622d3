//! Equipment data: auxiliaries (two slots, may heal) and augments (one slot).
//!
//! Both catalogs reserve index [`NONE_INDEX`] for the synthetic "None" item so
//! an empty slot is an ordinary selection.

use serde::{Deserialize, Serialize};

pub const NONE_INDEX: usize = 0;
pub const NONE_NAME: &str = "None";

pub const DEFAULT_AUXILIARY_FILE: &str = "auxiliary.json";
pub const DEFAULT_AUGMENTS_FILE: &str = "augments.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auxiliary {
    pub name: String,
    #[serde(default)]
    pub hp: f64,
    #[serde(default)]
    pub eva: f64,
    #[serde(default)]
    pub lck: f64,
    /// Fractional healing-rate bonus (0.05 = 5%).
    #[serde(default)]
    pub heal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Auxiliary {
    pub fn none() -> Self {
        Self::new(NONE_NAME, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn new(name: impl Into<String>, hp: f64, eva: f64, lck: f64, heal: f64) -> Self {
        Self {
            name: name.into(),
            hp,
            eva,
            lck,
            heal,
            rarity: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Augment {
    pub name: String,
    #[serde(default)]
    pub hp: f64,
    #[serde(default)]
    pub eva: f64,
    #[serde(default)]
    pub lck: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
}

impl Augment {
    pub fn none() -> Self {
        Self::new(NONE_NAME, 0.0, 0.0, 0.0)
    }

    pub fn new(name: impl Into<String>, hp: f64, eva: f64, lck: f64) -> Self {
        Self {
            name: name.into(),
            hp,
            eva,
            lck,
            rarity: None,
        }
    }
}

/// Identity of a configuration: one index per slot into the equipment catalogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentSelection {
    pub aux_a: usize,
    pub aux_b: usize,
    pub augment: usize,
}

impl EquipmentSelection {
    pub const NONE: Self = Self {
        aux_a: NONE_INDEX,
        aux_b: NONE_INDEX,
        augment: NONE_INDEX,
    };

    pub fn new(aux_a: usize, aux_b: usize, augment: usize) -> Self {
        Self {
            aux_a,
            aux_b,
            augment,
        }
    }
}

/// A selection resolved against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Loadout<'a> {
    pub selection: EquipmentSelection,
    pub aux_a: &'a Auxiliary,
    pub aux_b: &'a Auxiliary,
    pub augment: &'a Augment,
}

impl Loadout<'_> {
    pub fn item_names(&self) -> LoadoutNames {
        LoadoutNames {
            aux_a: self.aux_a.name.clone(),
            aux_b: self.aux_b.name.clone(),
            augment: self.augment.name.clone(),
        }
    }
}

/// Display names of a loadout's three slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutNames {
    pub aux_a: String,
    pub aux_b: String,
    pub augment: String,
}
