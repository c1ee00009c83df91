//! Fixed artifact names and unit constants.

/// Persisted mesh file name. Overwritten on every persistence call.
pub const SAVED_MESH_FILE: &str = "saved_mesh.msh";

/// Controller snapshot file name written by the CLI at the end of a run.
pub const CONTROLLER_SNAPSHOT_FILE: &str = "controller.snapshot";

/// Seconds in a (Julian) year, the usual `secs_in_a_year` value.
pub const SECS_PER_JULIAN_YEAR: f64 = 365.25 * 24.0 * 3600.0;
