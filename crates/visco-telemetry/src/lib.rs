//! # visco-telemetry
//!
//! Event bus for controller telemetry. Emits structured events
//! (sub-steps, refinements, scheme switch, output, mesh persistence)
//! that can be consumed by pluggable sinks (in-memory, `tracing`).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
