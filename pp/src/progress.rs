//! Progress derivation helpers
//!
//! Pure functions shared by the store and the merge adapter.

use crate::model::{Step, StepStates};

/// Default share of the total kept when a step-less entity is reset
pub const DEFAULT_RESET_BASELINE_RATIO: f64 = 0.3;

/// Count the known steps that are effectively completed, clamped to `total_steps`
///
/// Step ids in `states` that are not in `steps` are ignored; steps without a
/// persisted entry count by their authored default.
pub fn count_completed(steps: &[Step], states: &StepStates, total_steps: u32) -> u32 {
    let count = steps
        .iter()
        .filter(|step| states.get(&step.id).copied().unwrap_or(step.completed))
        .count() as u32;
    count.min(total_steps)
}

/// An entity is complete when every step is done or the explicit flag is set
pub fn is_fully_completed(progress: u32, total_steps: u32, flagged: bool) -> bool {
    flagged || (total_steps > 0 && progress >= total_steps)
}

/// Progress a step-less entity falls back to on reset: `floor(total * ratio)`
pub fn baseline_progress(total_steps: u32, ratio: f64) -> u32 {
    let ratio = ratio.clamp(0.0, 1.0);
    ((total_steps as f64) * ratio).floor() as u32
}
