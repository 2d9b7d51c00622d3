//! Turns a ship plus a loadout into formula inputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::equipment::{Augment, Auxiliary, Loadout};
use crate::data::ship::Ship;
use crate::ehp::formula::{EhpInputs, FormulaVariant, InvalidInputError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown ship '{name}'")]
    UnknownShip { name: String },

    #[error("auxiliary index {index} is out of range (catalog holds {len})")]
    AuxiliaryOutOfRange { index: usize, len: usize },

    #[error("augment index {index} is out of range (catalog holds {len})")]
    AugmentOutOfRange { index: usize, len: usize },

    #[error("unknown auxiliary '{name}'")]
    UnknownAuxiliary { name: String },

    #[error("unknown augment '{name}'")]
    UnknownAugment { name: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

/// How heal bonuses from the two auxiliary slots combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealStacking {
    /// Both slots add up.
    #[default]
    Additive,
    /// Only the strongest heal source counts.
    SingleSource,
}

impl HealStacking {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::SingleSource => "single_source",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "additive" => Some(Self::Additive),
            "single_source" | "single" => Some(Self::SingleSource),
            _ => None,
        }
    }
}

/// Combine the heal of both auxiliary slots under `policy`.
pub fn stack_heal(policy: HealStacking, a: f64, b: f64) -> f64 {
    match policy {
        HealStacking::Additive => a + b,
        HealStacking::SingleSource => a.max(b),
    }
}

/// Mean of per-rank modifier values; 0 when there are none.
pub fn mean_modifier(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Ship stats with a loadout applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregatedStats {
    pub hp: f64,
    pub heal: f64,
    pub eva: f64,
    pub lck: f64,
    pub level: f64,
    pub eva_boost: f64,
    pub eva_rate: f64,
    pub dmg_red: f64,
}

impl AggregatedStats {
    pub fn to_inputs(&self) -> EhpInputs {
        EhpInputs {
            hp: self.hp,
            heal: self.heal,
            eva: self.eva,
            lck: self.lck,
            level: self.level,
            eva_boost: self.eva_boost,
            dmg_red: self.dmg_red,
            eva_rate: self.eva_rate,
        }
    }
}

pub fn resolve_config(
    ship: &Ship,
    aux_a: &Auxiliary,
    aux_b: &Auxiliary,
    augment: &Augment,
    heal_stacking: HealStacking,
) -> AggregatedStats {
    AggregatedStats {
        hp: ship.hp + aux_a.hp + aux_b.hp + augment.hp,
        heal: stack_heal(heal_stacking, aux_a.heal, aux_b.heal),
        eva: ship.eva + aux_a.eva + aux_b.eva + augment.eva,
        lck: ship.lck + aux_a.lck + aux_b.lck + augment.lck,
        level: ship.lvl,
        eva_boost: mean_modifier(&ship.eva_boost),
        eva_rate: mean_modifier(&ship.eva_rate),
        dmg_red: mean_modifier(&ship.dmg_red),
    }
}

pub fn resolve_loadout(ship: &Ship, loadout: &Loadout<'_>, heal_stacking: HealStacking) -> AggregatedStats {
    resolve_config(ship, loadout.aux_a, loadout.aux_b, loadout.augment, heal_stacking)
}

/// Formula variant plus heal policy: everything needed to score a loadout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorer {
    #[serde(default)]
    pub variant: FormulaVariant,
    #[serde(default)]
    pub heal_stacking: HealStacking,
}

impl Scorer {
    pub fn new(variant: FormulaVariant, heal_stacking: HealStacking) -> Self {
        Self {
            variant,
            heal_stacking,
        }
    }

    pub fn stats(&self, ship: &Ship, loadout: &Loadout<'_>) -> AggregatedStats {
        resolve_loadout(ship, loadout, self.heal_stacking)
    }

    pub fn score_stats(&self, stats: &AggregatedStats) -> Result<f64, InvalidInputError> {
        self.variant.evaluate(&stats.to_inputs())
    }

    pub fn score(&self, ship: &Ship, loadout: &Loadout<'_>) -> Result<f64, ScoreError> {
        let stats = self.stats(ship, loadout);
        Ok(self.score_stats(&stats)?)
    }
}
