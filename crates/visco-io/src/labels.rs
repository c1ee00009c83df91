//! Snapshot label construction.
//!
//! Downstream tooling globs on these prefixes, so the exact text
//! (including the trailing `.`) is part of the contract. The writer
//! appends its own extension after the dot.

use visco_types::StepIndex;

/// Prefix of a per-sub-step snapshot.
pub const SOLUTION_PREFIX: &str = "solution_";

/// Prefix of a bootstrap probe snapshot.
pub const INIT_REFINEMENT_PREFIX: &str = "init_refinement_";

/// Prefix prepended to the last sub-step label after a macro step.
pub const AFTER_PREFIX: &str = "after_";

/// `solution_<step_index>.`
pub fn solution_label(step_index: StepIndex) -> String {
    format!("{SOLUTION_PREFIX}{}.", step_index.get())
}

/// `init_refinement_<i>.`
pub fn init_refinement_label(iteration: u32) -> String {
    format!("{INIT_REFINEMENT_PREFIX}{iteration}.")
}

/// `after_<filename>`
pub fn after_label(filename: &str) -> String {
    format!("{AFTER_PREFIX}{filename}")
}
