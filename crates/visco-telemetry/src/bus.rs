//! Event bus for controller telemetry.
//!
//! The controller queues events while a macro step runs and hands them
//! to the registered sinks in one batch when the step ends. Queueing
//! goes through an `mpsc` channel so `emit` only needs `&self`.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::events::SimulationEvent;
use crate::sinks::EventSink;

/// Queues controller events and delivers them to sinks on flush.
pub struct EventBus {
    tx: Sender<SimulationEvent>,
    rx: Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    enabled: bool,
    delivered: u64,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            sinks: Vec::new(),
            enabled: true,
            delivered: 0,
        }
    }

    /// Registers a sink. Sinks see events in registration order.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// A disabled bus drops every event it is given.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event until the next [`flush`](Self::flush).
    pub fn emit(&self, event: SimulationEvent) {
        if self.enabled {
            // `rx` is owned by the bus, so the channel cannot be closed here.
            let _ = self.tx.send(event);
        }
    }

    /// Delivers every queued event to every sink and returns how many
    /// events were delivered.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.rx.try_recv() {
            for sink in self.sinks.iter_mut() {
                sink.handle(&event);
            }
            count += 1;
        }
        self.delivered += count as u64;
        count
    }

    /// Final flush at the end of a run, followed by each sink's `finalize`.
    pub fn finalize(&mut self) {
        self.flush();
        self.sinks.iter_mut().for_each(|sink| sink.finalize());
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Events delivered over the bus's lifetime.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
