//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (collect in memory, forward to `tracing`, ...).

use std::sync::{Arc, Mutex};

use crate::events::SimulationEvent;

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the run ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in a shared buffer for testing and inspection.
///
/// The buffer handle stays readable after the sink is boxed and moved
/// into a bus.
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle to the collected events.
    pub fn buffer(&self) -> Arc<Mutex<Vec<SimulationEvent>>> {
        Arc::clone(&self.events)
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        // `tracing` macros need a constant level per call site.
        match self.level {
            tracing::Level::TRACE => {
                tracing::trace!(timestep = event.timestep, event = ?event.kind, "controller_event")
            }
            tracing::Level::DEBUG => {
                tracing::debug!(timestep = event.timestep, event = ?event.kind, "controller_event")
            }
            tracing::Level::INFO => {
                tracing::info!(timestep = event.timestep, event = ?event.kind, "controller_event")
            }
            tracing::Level::WARN => {
                tracing::warn!(timestep = event.timestep, event = ?event.kind, "controller_event")
            }
            tracing::Level::ERROR => {
                tracing::error!(timestep = event.timestep, event = ?event.kind, "controller_event")
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
