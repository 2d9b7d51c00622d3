pub mod formula;
pub mod resolver;
pub mod tier;

pub use formula::{
    compute_ehp, compute_ehp_legacy, EhpInputs, FormulaVariant, InvalidInputError,
};
pub use resolver::{
    mean_modifier, resolve_config, resolve_loadout, stack_heal, AggregatedStats,
    ConfigurationError, HealStacking, ScoreError, Scorer,
};
pub use tier::{bar_fill, percent_of_reference, ScoreDisplay, ScoreTier, BAR_CAP_EHP, REFERENCE_EHP};
