//! # visco-debug
//!
//! Caller-defined per-macro-step hooks and controller state snapshots.
//! Snapshots serialize the controller's clock and phase to binary so a
//! finished or crashed run can be inspected afterwards.

pub mod hooks;
pub mod snapshot;

pub use hooks::{MacroStepReport, NoopHook, TimestepHook};
pub use snapshot::ControllerSnapshot;
