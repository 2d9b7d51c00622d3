//! Display classification of a score: percent of the reference eHP, bar fill
//! and tier band.

use serde::Serialize;

/// Score shown as 100%.
pub const REFERENCE_EHP: f64 = 12_000.0;
/// Score at which the bar is full.
pub const BAR_CAP_EHP: f64 = 16_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Fragile,
    Weak,
    Average,
    Solid,
    Strong,
    Outstanding,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score > 12_000.0 {
            Self::Outstanding
        } else if score > 10_000.0 {
            Self::Strong
        } else if score > 8_000.0 {
            Self::Solid
        } else if score > 6_000.0 {
            Self::Average
        } else if score > 4_000.0 {
            Self::Weak
        } else {
            Self::Fragile
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fragile => "fragile",
            Self::Weak => "weak",
            Self::Average => "average",
            Self::Solid => "solid",
            Self::Strong => "strong",
            Self::Outstanding => "outstanding",
        }
    }
}

/// Percent of [`REFERENCE_EHP`]; exceeds 100 for strong ships.
pub fn percent_of_reference(score: f64) -> f64 {
    score / REFERENCE_EHP * 100.0
}

/// Bar width in percent, capped at 100.
pub fn bar_fill(score: f64) -> f64 {
    (score / BAR_CAP_EHP * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreDisplay {
    pub percent: f64,
    pub bar_fill: f64,
    pub tier: ScoreTier,
}

impl ScoreDisplay {
    pub fn for_score(score: f64) -> Self {
        Self {
            percent: percent_of_reference(score),
            bar_fill: bar_fill(score),
            tier: ScoreTier::from_score(score),
        }
    }
}
