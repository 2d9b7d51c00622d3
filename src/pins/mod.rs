pub mod registry;

pub use registry::{
    PinKey, PinOutcome, PinRegistry, PinState, PinnedEntry, RescoreReport, StaleEntry,
};
