//! Integration tests for visco-telemetry.

use visco_telemetry::bus::EventBus;
use visco_telemetry::events::{EventKind, SimulationEvent};
use visco_telemetry::sinks::{EventSink, TracingSink, VecSink};

// ─── Bus Tests ─────────────────────────────────────────────────

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let buffer = sink.buffer();
    bus.add_sink(Box::new(sink));

    bus.emit(SimulationEvent::new(1, EventKind::SubstepBegin { sim_time: 5.0, time_step: 5.0 }));
    bus.emit(SimulationEvent::new(1, EventKind::Refinement { generation: 1 }));

    // Nothing is delivered before flush.
    assert!(buffer.lock().unwrap().is_empty());

    assert_eq!(bus.flush(), 2);
    assert_eq!(bus.flush(), 0);
    assert_eq!(bus.delivered(), 2);
    let events = buffer.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].kind, EventKind::Refinement { generation: 1 });
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let buffer = sink.buffer();
    bus.add_sink(Box::new(sink));

    bus.set_enabled(false);
    assert!(!bus.is_enabled());
    bus.emit(SimulationEvent::new(0, EventKind::BootstrapComplete { refinements: 3 }));
    assert_eq!(bus.flush(), 0);
    assert!(buffer.lock().unwrap().is_empty());
}

#[test]
fn multiple_sinks_each_receive() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    let (buf_a, buf_b) = (a.buffer(), b.buffer());
    bus.add_sink(Box::new(a));
    bus.add_sink(Box::new(b));
    assert_eq!(bus.sink_count(), 2);

    bus.emit(SimulationEvent::new(2, EventKind::OutputWritten { label: "solution_2.".into() }));
    bus.finalize();
    assert_eq!(buf_a.lock().unwrap().len(), 1);
    assert_eq!(buf_b.lock().unwrap().len(), 1);
}

// ─── Sink Tests ────────────────────────────────────────────────

#[test]
fn tracing_sink_accepts_events_without_subscriber() {
    let mut sink = TracingSink::new(tracing::Level::DEBUG);
    sink.handle(&SimulationEvent::new(
        1,
        EventKind::SchemeSwitched { family: "multistep".into() },
    ));
    assert_eq!(sink.name(), "tracing_sink");
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::MacroStepEnd {
            sim_time: 50.0,
            sub_steps: 1,
            wall_time: 0.01,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}
