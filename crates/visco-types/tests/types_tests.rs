//! Integration tests for visco-types.

use visco_types::{MeshGeneration, StepIndex, ViscoError};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn generation_advances() {
    let g = MeshGeneration::default();
    assert_eq!(g, MeshGeneration(0));
    assert_eq!(g.next().next(), MeshGeneration(2));
}

#[test]
fn step_index_starts_at_one() {
    assert_eq!(StepIndex::default().get(), 1);
    assert_eq!(StepIndex::FIRST.next(), StepIndex(2));
}

#[test]
fn ids_display() {
    assert_eq!(MeshGeneration(3).to_string(), "gen3");
    assert_eq!(StepIndex(12).to_string(), "12");
}

#[test]
fn ids_are_serializable() {
    let g = MeshGeneration(7);
    let json = serde_json::to_string(&g).unwrap();
    let recovered: MeshGeneration = serde_json::from_str(&json).unwrap();
    assert_eq!(g, recovered);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = ViscoError::InvalidConfig("missing key `t_max`".into());
    assert!(err.to_string().contains("t_max"));
}

#[test]
fn solver_divergence_display() {
    let err = ViscoError::SolverDivergence {
        iterations: 100,
        residual: 1.5e-2,
    };
    let msg = err.to_string();
    assert!(msg.contains("100"));
    assert!(msg.contains("1.50e-2") || msg.contains("1.5e-2"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "saved_mesh.msh");
    let err: ViscoError = io.into();
    assert!(matches!(err, ViscoError::Io(_)));
}
