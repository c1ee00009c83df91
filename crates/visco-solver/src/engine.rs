//! Collaborator contracts: what the controller requires from an engine.
//!
//! Every mesh-dependent component is constructed against a
//! [`ProblemData`] and reinitialized in place after each refinement.
//! The controller owns the problem data and hands out shared references;
//! only the refinement sequence mutates it.
//!
//! Failures inside any method are opaque to the controller: they are
//! propagated unchanged and end the run.

use std::path::Path;

use visco_io::SimulationParameters;
use visco_types::{MeshGeneration, ViscoResult};

use crate::scheme::Scheme;

/// A caller-supplied function of time (boundary data, reference fields).
///
/// The controller only ever advances it; it never owns it.
pub trait TimeFunction {
    /// Moves the function to simulated time `time`.
    fn advance_to(&mut self, time: f64);
}

/// The set of types a finite-element engine provides.
///
/// ```text
/// Controller ─┬─ Problem      (mesh + coefficients, refinement transaction)
///             ├─ Solution     (time-leveled velocity/stress fields)
///             ├─ Scheme<E>    (SingleStep | Multistep)
///             ├─ Velocity     (elliptic velocity solve)
///             └─ Stress       (tentative + correction stress updates)
/// ```
pub trait Engine: Sized {
    /// Material coefficient field used to build the problem data.
    type Coefficients;
    /// Velocity field representation, used as the refinement indicator.
    type VelocityField: ?Sized;
    /// Initial stress condition.
    type InitialStress: ?Sized;
    /// Initial velocity condition.
    type InitialVelocity: ?Sized;
    /// Time-parameterized Dirichlet data for velocity.
    type Boundary: TimeFunction;
    /// Reference (exact) velocity written alongside output.
    type Reference: TimeFunction;

    type Problem: ProblemData<Self>;
    type Solution: SolutionFields<Self>;
    type SingleStep: IntegrationScheme<Self>;
    type Multistep: IntegrationScheme<Self>;
    type Velocity: VelocitySolver<Self>;
    type Stress: StressSolver<Self>;
}

/// Mesh topology plus per-cell material coefficients.
pub trait ProblemData<E: Engine>: Sized {
    /// Builds the problem from run parameters and a coefficient field.
    fn new(params: &SimulationParameters, coefficients: E::Coefficients) -> ViscoResult<Self>;

    /// Current mesh generation.
    fn generation(&self) -> MeshGeneration;

    /// Marks cells from the velocity indicator and opens the refinement
    /// transaction. Must precede [`execute_refine`](Self::execute_refine).
    fn begin_refine(&mut self, velocity: &E::VelocityField) -> ViscoResult<()>;

    /// Executes the marked topology change and bumps the generation.
    fn execute_refine(&mut self) -> ViscoResult<()>;

    /// Writes the mesh to `path`, overwriting any previous file.
    fn persist_mesh(&self, path: &Path) -> ViscoResult<()>;
}

/// Time-leveled field state.
pub trait SolutionFields<E: Engine>: Sized {
    /// Allocates fields on the problem's current mesh.
    fn new(problem: &E::Problem) -> ViscoResult<Self>;

    /// The current velocity field.
    fn current_velocity(&self) -> &E::VelocityField;

    /// Rotates time-level buffers. Does not change current field values.
    fn begin_timestep(&mut self);

    /// Overwrites the current fields with the initial condition.
    fn apply_initial_condition(
        &mut self,
        problem: &E::Problem,
        stress: &E::InitialStress,
        velocity: &E::InitialVelocity,
    ) -> ViscoResult<()>;

    /// Seeds the history a multistep scheme needs with the initial condition.
    fn init_multistep(
        &mut self,
        problem: &E::Problem,
        stress: &E::InitialStress,
        velocity: &E::InitialVelocity,
    ) -> ViscoResult<()>;

    /// Captures the pre-refinement state that [`transfer_fields`](Self::transfer_fields)
    /// reads from. Called after the problem has marked cells.
    fn begin_refine(&mut self, problem: &E::Problem) -> ViscoResult<()>;

    /// Resizes internal buffers to the refined mesh.
    fn reinitialize_after_refine(&mut self, problem: &E::Problem) -> ViscoResult<()>;

    /// Carries the captured pre-refinement fields onto the new mesh.
    fn transfer_fields(&mut self, problem: &E::Problem) -> ViscoResult<()>;

    /// Writes a labeled snapshot under `dir`.
    fn write_output(
        &self,
        problem: &E::Problem,
        dir: &Path,
        label: &str,
        reference: &E::Reference,
    ) -> ViscoResult<()>;
}

/// Integration coefficients tied to one mesh generation.
pub trait IntegrationScheme<E: Engine>: Sized {
    fn new(problem: &E::Problem) -> ViscoResult<Self>;

    fn reinitialize(&mut self, problem: &E::Problem) -> ViscoResult<()>;
}

/// Solves for velocity given the current stress and boundary data.
pub trait VelocitySolver<E: Engine>: Sized {
    fn new(
        problem: &E::Problem,
        solution: &E::Solution,
        boundary: &E::Boundary,
        scheme: &Scheme<E>,
    ) -> ViscoResult<Self>;

    /// Overwrites the current velocity.
    fn solve(
        &mut self,
        solution: &mut E::Solution,
        scheme: &Scheme<E>,
        time_step: f64,
    ) -> ViscoResult<()>;

    /// Re-reads boundary data after the boundary was advanced in time.
    fn refresh_boundary(&mut self, boundary: &E::Boundary, scheme: &Scheme<E>) -> ViscoResult<()>;

    fn reinitialize(
        &mut self,
        problem: &E::Problem,
        solution: &E::Solution,
        boundary: &E::Boundary,
        scheme: &Scheme<E>,
    ) -> ViscoResult<()>;
}

/// Advances stress in two halves around the velocity solve.
pub trait StressSolver<E: Engine>: Sized {
    fn new(problem: &E::Problem) -> ViscoResult<Self>;

    /// Tentative update using the previous step's velocity.
    fn predict(
        &mut self,
        solution: &mut E::Solution,
        scheme: &Scheme<E>,
        time_step: f64,
    ) -> ViscoResult<()>;

    /// Correction using the freshly solved velocity.
    fn correct(
        &mut self,
        solution: &mut E::Solution,
        scheme: &Scheme<E>,
        time_step: f64,
    ) -> ViscoResult<()>;

    fn reinitialize(&mut self, problem: &E::Problem) -> ViscoResult<()>;
}
