//! Ship data: canonical ship records after normalization.
//! Used to build formula inputs together with an equipment loadout.

use serde::{Deserialize, Serialize};

/// Level assumed when a record carries none.
pub const DEFAULT_LEVEL: f64 = 125.0;

/// Highest level a ship can reach in game.
pub const MAX_LEVEL: f64 = 125.0;

pub const DEFAULT_SHIPS_FILE: &str = "ships.json";

fn default_level() -> f64 {
    DEFAULT_LEVEL
}

/// Normalized ship record. Written by the importers, loaded at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub name: String,
    pub hp: f64,
    pub eva: f64,
    pub lck: f64,
    #[serde(default = "default_level")]
    pub lvl: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<String>,
    #[serde(default)]
    pub is_retrofit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_eq1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_eq2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_aug: Option<String>,
    /// Evasion boost per skill rank (averaged).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eva_boost: Vec<f64>,
    /// Evasion rate per skill rank (averaged).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eva_rate: Vec<f64>,
    /// Damage reduction per skill rank (averaged).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dmg_red: Vec<f64>,
}

impl Ship {
    /// Bare ship with base stats only; remaining fields default.
    pub fn new(name: impl Into<String>, hp: f64, eva: f64, lck: f64, lvl: f64) -> Self {
        Self {
            name: name.into(),
            hp,
            eva,
            lck,
            lvl,
            rarity: None,
            ship_type: None,
            faction: None,
            armor: None,
            is_retrofit: false,
            default_eq1: None,
            default_eq2: None,
            default_aug: None,
            eva_boost: Vec::new(),
            eva_rate: Vec::new(),
            dmg_red: Vec::new(),
        }
    }

    pub fn with_defaults(
        mut self,
        eq1: Option<&str>,
        eq2: Option<&str>,
        aug: Option<&str>,
    ) -> Self {
        self.default_eq1 = eq1.map(str::to_string);
        self.default_eq2 = eq2.map(str::to_string);
        self.default_aug = aug.map(str::to_string);
        self
    }

    pub fn with_classification(
        mut self,
        ship_type: &str,
        faction: &str,
        rarity: &str,
    ) -> Self {
        self.ship_type = Some(ship_type.to_string());
        self.faction = Some(faction.to_string());
        self.rarity = Some(rarity.to_string());
        self
    }
}
