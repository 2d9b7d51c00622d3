//! Effective HP formula.
//!
//! Two variants exist. [`compute_ehp`] is the canonical one (level, damage
//! reduction and evasion-rate terms). [`compute_ehp_legacy`] reproduces the
//! earlier score that historical numbers were published with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Level used as the zero point of the level and luck terms.
pub const LEVEL_PIVOT: f64 = 126.0;
/// Per-level weight of the level factor.
pub const LEVEL_FACTOR_STEP: f64 = 0.02;
/// Constant floor of the denominator.
pub const BASE_DENOMINATOR: f64 = 0.1;
/// Evasion numerator shared by both variants.
pub const EVASION_SCALE: f64 = 125.0;
/// Evasion offset in the canonical variant.
pub const EVASION_OFFSET: f64 = 215.0;
/// Evasion offset in the legacy variant.
pub const LEGACY_EVASION_OFFSET: f64 = 125.0;
/// Luck baseline of the hit-chance term.
pub const LUCK_BASELINE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("damage reduction {value} is outside [0, 1)")]
    DamageReductionOutOfRange { value: f64 },

    #[error("level {level} is beyond the range the level factor supports")]
    LevelOutOfRange { level: f64 },

    #[error("formula denominator is non-positive ({denominator})")]
    NonPositiveDenominator { denominator: f64 },

    #[error("formula produced a non-finite score")]
    NonFiniteScore,
}

/// Which formula produces a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaVariant {
    #[default]
    Canonical,
    /// Pre-modifier formula; kept for comparison with historical scores.
    Legacy,
}

impl FormulaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Legacy => "legacy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "canonical" => Some(Self::Canonical),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }

    pub fn evaluate(&self, inputs: &EhpInputs) -> Result<f64, InvalidInputError> {
        match self {
            Self::Canonical => compute_ehp(
                inputs.hp,
                inputs.heal,
                inputs.eva,
                inputs.lck,
                inputs.level,
                inputs.eva_boost,
                inputs.dmg_red,
                inputs.eva_rate,
            ),
            Self::Legacy => {
                compute_ehp_legacy(inputs.hp, inputs.heal, inputs.eva, inputs.lck, inputs.level)
            }
        }
    }
}

/// Aggregated formula inputs. Modifiers default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EhpInputs {
    pub hp: f64,
    pub heal: f64,
    pub eva: f64,
    pub lck: f64,
    pub level: f64,
    #[serde(default)]
    pub eva_boost: f64,
    #[serde(default)]
    pub dmg_red: f64,
    #[serde(default)]
    pub eva_rate: f64,
}

impl EhpInputs {
    pub fn new(hp: f64, heal: f64, eva: f64, lck: f64, level: f64) -> Self {
        Self {
            hp,
            heal,
            eva,
            lck,
            level,
            ..Self::default()
        }
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<f64, InvalidInputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInputError::NonFinite { field, value })
    }
}

fn checked_score(score: f64) -> Result<f64, InvalidInputError> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(InvalidInputError::NonFiniteScore)
    }
}

/// Canonical eHP.
///
/// `dmg_red` must lie in `[0, 1)`, and the denominator must stay positive;
/// both are reported as [`InvalidInputError`] instead of yielding infinite or
/// negative scores.
#[allow(clippy::too_many_arguments)]
pub fn compute_ehp(
    hp: f64,
    heal: f64,
    eva: f64,
    lck: f64,
    level: f64,
    eva_boost: f64,
    dmg_red: f64,
    eva_rate: f64,
) -> Result<f64, InvalidInputError> {
    let hp = ensure_finite("hp", hp)?;
    let heal = ensure_finite("heal", heal)?;
    let eva = ensure_finite("eva", eva)?;
    let lck = ensure_finite("lck", lck)?;
    let level = ensure_finite("level", level)?;
    let eva_boost = ensure_finite("eva_boost", eva_boost)?;
    let dmg_red = ensure_finite("dmg_red", dmg_red)?;
    let eva_rate = ensure_finite("eva_rate", eva_rate)?;

    if !(0.0..1.0).contains(&dmg_red) {
        return Err(InvalidInputError::DamageReductionOutOfRange { value: dmg_red });
    }

    let level_base = 1.0 + LEVEL_FACTOR_STEP * (LEVEL_PIVOT - level);
    if level_base <= 0.0 {
        return Err(InvalidInputError::LevelOutOfRange { level });
    }
    let level_factor = 1.0 / level_base;
    let dmg_red_factor = 1.0 / (1.0 - dmg_red);

    let effective_eva = eva * (1.0 + eva_boost);
    let numerator = hp * (1.0 + heal);
    let denominator = BASE_DENOMINATOR
        + EVASION_SCALE / (EVASION_OFFSET + effective_eva + 2.0)
        + (LUCK_BASELINE - lck + LEVEL_PIVOT - level) / 1000.0
        - eva_rate;
    if denominator.is_nan() || denominator <= 0.0 {
        return Err(InvalidInputError::NonPositiveDenominator { denominator });
    }

    checked_score(level_factor * dmg_red_factor * (numerator / denominator))
}

/// Legacy eHP: no level factor, damage reduction or evasion rate.
pub fn compute_ehp_legacy(
    hp: f64,
    heal: f64,
    eva: f64,
    lck: f64,
    level: f64,
) -> Result<f64, InvalidInputError> {
    let hp = ensure_finite("hp", hp)?;
    let heal = ensure_finite("heal", heal)?;
    let eva = ensure_finite("eva", eva)?;
    let lck = ensure_finite("lck", lck)?;
    let level = ensure_finite("level", level)?;

    let numerator = hp * (1.0 + heal);
    let denominator = BASE_DENOMINATOR
        + EVASION_SCALE / (LEGACY_EVASION_OFFSET + eva + 2.0)
        + (LUCK_BASELINE - lck + LEVEL_PIVOT - level) / 1000.0;
    if denominator.is_nan() || denominator <= 0.0 {
        return Err(InvalidInputError::NonPositiveDenominator { denominator });
    }

    checked_score(numerator / denominator)
}
