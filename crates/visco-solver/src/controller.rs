//! The time-integration controller.
//!
//! Owns one instance of every collaborator and sequences them across a
//! run. The controller is single-threaded and synchronous: it issues one
//! delegated operation at a time and propagates any failure unchanged.
//!
//! # Run layout
//!
//! ```text
//! run
//! ├─ Phase A (skipped when load_mesh):
//! │    initial_adaptive × initial_adaptive_refines   probe step + refine
//! │    persist saved_mesh.msh
//! ├─ apply initial condition                          probe state discarded
//! └─ Phase B: while t < t_max
//!      for each sub-step: advance t, BC, step, output?, refine?
//!      first macro step only: switch to multistep, sub_timesteps = 1
//!      after_timestep hook, after_ output?, step_index += 1
//! ```

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};
use visco_debug::hooks::{MacroStepReport, NoopHook, TimestepHook};
use visco_debug::snapshot::ControllerSnapshot;
use visco_io::labels::{after_label, init_refinement_label, solution_label};
use visco_io::SimulationParameters;
use visco_telemetry::events::{EventKind, SimulationEvent};
use visco_telemetry::EventBus;
use visco_types::constants::SAVED_MESH_FILE;
use visco_types::{MeshGeneration, StepIndex, ViscoError, ViscoResult};

use crate::engine::{
    Engine, ProblemData, SolutionFields, StressSolver, TimeFunction, VelocitySolver,
};
use crate::phase::{SchemePhase, SchemeSwitch};
use crate::schedule::is_due;
use crate::scheme::{Scheme, SchemeFamily};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Macro steps completed.
    pub macro_steps: u64,
    /// Coupled sub-steps taken in Phase B (probe steps excluded).
    pub sub_steps: u64,
    /// Refinement cycles during Phase B.
    pub refinements: u32,
    /// Refinement cycles during the initial adaptive bootstrap.
    pub bootstrap_refinements: u32,
    /// Labels of every snapshot written, in order.
    pub outputs: Vec<String>,
    /// Simulated time at the end of the run.
    pub final_time: f64,
    /// Mesh generation at the end of the run.
    pub generation: MeshGeneration,
    /// Wall-clock time for the whole run (seconds).
    pub wall_time: f64,
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    t: f64,
    step_index: StepIndex,
}

impl Clock {
    fn start() -> Self {
        Self {
            t: 0.0,
            step_index: StepIndex::FIRST,
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    /// Every refine cycle, bootstrap included.
    refinements: u32,
    bootstrap_refinements: u32,
    sub_steps: u64,
    outputs: Vec<String>,
}

/// Sequences an engine's collaborators across a simulation run.
///
/// The boundary condition is borrowed from the caller for the lifetime
/// of the controller and is only ever advanced in time.
pub struct Controller<'a, E: Engine> {
    params: SimulationParameters,
    problem: E::Problem,
    solution: E::Solution,
    scheme: Scheme<E>,
    velocity_solver: E::Velocity,
    stress_solver: E::Stress,
    boundary: &'a mut E::Boundary,
    phase: SchemePhase,
    clock: Clock,
    /// Set once Phase B starts; events before that carry timestep 0.
    stepping: bool,
    /// Set on entry to `run`; a controller runs at most once.
    ran: bool,
    hook: Box<dyn TimestepHook + 'a>,
    telemetry: EventBus,
    stats: RunStats,
}

impl<'a, E: Engine> Controller<'a, E> {
    /// Builds the problem data, solution, single-step scheme and both
    /// solvers, in that order.
    pub fn new(
        params: SimulationParameters,
        coefficients: E::Coefficients,
        boundary: &'a mut E::Boundary,
    ) -> ViscoResult<Self> {
        let problem = <E::Problem as ProblemData<E>>::new(&params, coefficients)?;
        let solution = <E::Solution as SolutionFields<E>>::new(&problem)?;
        let scheme = Scheme::build(SchemeFamily::SingleStep, &problem)?;
        let velocity_solver =
            <E::Velocity as VelocitySolver<E>>::new(&problem, &solution, &*boundary, &scheme)?;
        let stress_solver = <E::Stress as StressSolver<E>>::new(&problem)?;
        let phase = SchemePhase::new(params.first_substeps);

        debug!(
            generation = %problem.generation(),
            first_substeps = params.first_substeps,
            "controller constructed"
        );

        Ok(Self {
            params,
            problem,
            solution,
            scheme,
            velocity_solver,
            stress_solver,
            boundary,
            phase,
            clock: Clock::start(),
            stepping: false,
            ran: false,
            hook: Box::new(NoopHook),
            telemetry: EventBus::new(),
            stats: RunStats::default(),
        })
    }

    /// Replaces the per-macro-step hook (default: [`NoopHook`]).
    pub fn with_hook(mut self, hook: Box<dyn TimestepHook + 'a>) -> Self {
        self.hook = hook;
        self
    }

    /// Advances the solution by one predictor-corrector sub-step.
    ///
    /// Fixed order: rotate time levels, tentative stress from the old
    /// velocity, velocity solve against the tentative stress, stress
    /// correction from the new velocity.
    pub fn step(&mut self, time_step: f64) -> ViscoResult<()> {
        self.solution.begin_timestep();
        self.stress_solver
            .predict(&mut self.solution, &self.scheme, time_step)?;
        self.velocity_solver
            .solve(&mut self.solution, &self.scheme, time_step)?;
        self.stress_solver
            .correct(&mut self.solution, &self.scheme, time_step)?;
        Ok(())
    }

    /// Runs one mesh adaptation cycle driven by the current velocity and
    /// brings every mesh-dependent component onto the new mesh.
    ///
    /// The indicator is captured (problem marks, solution captures its
    /// fields) before the topology changes. Afterwards the solution, the
    /// scheme, the velocity solver and the stress solver are rebuilt in
    /// that order; each may read what the previous one set up.
    pub fn refine(&mut self) -> ViscoResult<()> {
        self.problem.begin_refine(self.solution.current_velocity())?;
        self.solution.begin_refine(&self.problem)?;

        self.problem.execute_refine()?;

        self.solution.reinitialize_after_refine(&self.problem)?;
        self.solution.transfer_fields(&self.problem)?;
        self.scheme.reinitialize(&self.problem)?;
        self.velocity_solver.reinitialize(
            &self.problem,
            &self.solution,
            &*self.boundary,
            &self.scheme,
        )?;
        self.stress_solver.reinitialize(&self.problem)?;

        self.stats.refinements += 1;
        let generation = self.problem.generation();
        debug!(%generation, "mesh refined");
        self.emit(EventKind::Refinement {
            generation: generation.0,
        });
        Ok(())
    }

    /// Resolves the mesh before the real run by probing and refining
    /// `initial_adaptive_refines` times.
    ///
    /// Each iteration reapplies the initial condition, so probe steps
    /// never carry over into each other or into Phase B. The probe
    /// duration is `time_step / first_substeps` for every iteration.
    pub fn initial_adaptive(
        &mut self,
        stress: &E::InitialStress,
        velocity: &E::InitialVelocity,
        reference: &mut E::Reference,
    ) -> ViscoResult<()> {
        let time_step = self.params.sub_step_size(self.params.first_substeps);
        self.boundary.advance_to(time_step);
        reference.advance_to(time_step);
        self.velocity_solver
            .refresh_boundary(&*self.boundary, &self.scheme)?;

        for i in 0..self.params.initial_adaptive_refines {
            self.solution
                .apply_initial_condition(&self.problem, stress, velocity)?;
            self.step(time_step)?;
            self.emit(EventKind::ProbeStep {
                iteration: i,
                time_step,
            });

            if self.params.output {
                self.write_output(&init_refinement_label(i), reference)?;
            }

            self.refine()?;
            self.stats.bootstrap_refinements += 1;
        }
        Ok(())
    }

    /// Runs the whole time horizon.
    ///
    /// Stepping continues while `t < t_max`. There is no iteration bound:
    /// a non-positive `time_step` never terminates (see
    /// `visco_io::validate_parameters`).
    pub fn run(
        &mut self,
        stress: &E::InitialStress,
        velocity: &E::InitialVelocity,
        reference: &mut E::Reference,
    ) -> ViscoResult<RunSummary> {
        if self.ran {
            return Err(ViscoError::InvariantViolation(
                "run() called twice; a controller runs once".into(),
            ));
        }
        self.ran = true;
        let started = Instant::now();

        if !self.params.load_mesh {
            self.initial_adaptive(stress, velocity, reference)?;
            info!("Done with first time step spatial adaptation.");
            self.emit(EventKind::BootstrapComplete {
                refinements: self.stats.bootstrap_refinements,
            });
            self.persist_mesh()?;
        }

        self.solution
            .apply_initial_condition(&self.problem, stress, velocity)?;
        self.clock = Clock::start();
        self.stepping = true;
        let mut macro_steps = 0u64;

        while self.clock.t < self.params.t_max {
            self.macro_step(stress, velocity, reference)?;
            macro_steps += 1;
        }

        self.hook.on_simulation_end();
        self.telemetry.finalize();

        Ok(RunSummary {
            macro_steps,
            sub_steps: self.stats.sub_steps,
            refinements: self.stats.refinements - self.stats.bootstrap_refinements,
            bootstrap_refinements: self.stats.bootstrap_refinements,
            outputs: self.stats.outputs.clone(),
            final_time: self.clock.t,
            generation: self.problem.generation(),
            wall_time: started.elapsed().as_secs_f64(),
        })
    }

    fn macro_step(
        &mut self,
        stress: &E::InitialStress,
        velocity: &E::InitialVelocity,
        reference: &mut E::Reference,
    ) -> ViscoResult<()> {
        let started = Instant::now();
        let step_index = self.clock.step_index;
        let sub_timesteps = self.phase.sub_timesteps();
        let time_step = self.params.sub_step_size(sub_timesteps);
        // Every sub-step of a macro step shares this label.
        let filename = solution_label(step_index);

        for _ in 0..sub_timesteps {
            self.sub_step(time_step, &filename, reference)?;
        }

        let switched_scheme = match self.phase.complete_first_step() {
            Some(switch) => {
                self.switch_scheme(switch, stress, velocity)?;
                true
            }
            None => false,
        };

        let wall_time = started.elapsed().as_secs_f64();
        self.hook.after_timestep(&MacroStepReport {
            step_index,
            sim_time: self.clock.t,
            sub_steps: sub_timesteps,
            sub_step_size: time_step,
            generation: self.problem.generation(),
            switched_scheme,
            wall_time,
        });
        self.emit(EventKind::MacroStepEnd {
            sim_time: self.clock.t,
            sub_steps: sub_timesteps,
            wall_time,
        });

        if self.params.output && is_due(step_index, self.params.output_interval, "output_interval")? {
            self.write_output(&after_label(&filename), reference)?;
        }

        self.clock.step_index = step_index.next();
        self.telemetry.flush();
        Ok(())
    }

    fn sub_step(
        &mut self,
        time_step: f64,
        filename: &str,
        reference: &mut E::Reference,
    ) -> ViscoResult<()> {
        let step_index = self.clock.step_index;
        self.clock.t += time_step;
        let t = self.clock.t;

        info!(
            step = step_index.get(),
            "Solving for time = {}",
            self.params.in_years(t)
        );
        self.emit(EventKind::SubstepBegin {
            sim_time: t,
            time_step,
        });

        self.boundary.advance_to(t);
        self.velocity_solver
            .refresh_boundary(&*self.boundary, &self.scheme)?;
        self.step(time_step)?;
        reference.advance_to(t);
        self.stats.sub_steps += 1;

        if self.params.output && is_due(step_index, self.params.output_interval, "output_interval")? {
            self.write_output(filename, reference)?;
        }
        if is_due(step_index, self.params.refine_interval, "refine_interval")? {
            self.refine()?;
            self.persist_mesh()?;
        }
        Ok(())
    }

    /// Applies the one-time switch to the multistep family: seeds the
    /// solution history with the initial condition and replaces the scheme.
    fn switch_scheme(
        &mut self,
        _switch: SchemeSwitch,
        stress: &E::InitialStress,
        velocity: &E::InitialVelocity,
    ) -> ViscoResult<()> {
        self.solution
            .init_multistep(&self.problem, stress, velocity)?;
        self.scheme = Scheme::build(SchemeFamily::Multistep, &self.problem)?;

        info!(family = %self.scheme.family(), "switched integration scheme");
        self.emit(EventKind::SchemeSwitched {
            family: self.scheme.family().name().to_string(),
        });
        Ok(())
    }

    fn write_output(&mut self, label: &str, reference: &E::Reference) -> ViscoResult<()> {
        self.solution
            .write_output(&self.problem, &self.params.data_dir, label, reference)?;
        self.stats.outputs.push(label.to_string());
        self.emit(EventKind::OutputWritten {
            label: label.to_string(),
        });
        Ok(())
    }

    fn persist_mesh(&mut self) -> ViscoResult<()> {
        self.problem.persist_mesh(Path::new(SAVED_MESH_FILE))?;
        self.emit(EventKind::MeshPersisted {
            path: SAVED_MESH_FILE.to_string(),
        });
        Ok(())
    }

    fn emit(&self, kind: EventKind) {
        self.telemetry
            .emit(SimulationEvent::new(self.event_timestep(), kind));
    }

    /// 0 before Phase B has started, otherwise the active macro step.
    fn event_timestep(&self) -> u64 {
        if self.stepping {
            self.clock.step_index.get()
        } else {
            0
        }
    }

    // ─── Accessors ────────────────────────────────────────────

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn problem(&self) -> &E::Problem {
        &self.problem
    }

    pub fn solution(&self) -> &E::Solution {
        &self.solution
    }

    pub fn scheme(&self) -> &Scheme<E> {
        &self.scheme
    }

    pub fn velocity_solver(&self) -> &E::Velocity {
        &self.velocity_solver
    }

    pub fn stress_solver(&self) -> &E::Stress {
        &self.stress_solver
    }

    pub fn phase(&self) -> SchemePhase {
        self.phase
    }

    /// Simulated time.
    pub fn sim_time(&self) -> f64 {
        self.clock.t
    }

    /// Index of the next macro step to run.
    pub fn step_index(&self) -> StepIndex {
        self.clock.step_index
    }

    /// The telemetry bus, for registering sinks.
    pub fn telemetry_mut(&mut self) -> &mut EventBus {
        &mut self.telemetry
    }

    /// Captures the controller's clock, phase and mesh generation.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            step_index: self.clock.step_index.get(),
            sim_time: self.clock.t,
            sub_timesteps: self.phase.sub_timesteps(),
            scheme_family: self.scheme.family().name().to_string(),
            generation: self.problem.generation().0,
            refinements: self.stats.refinements,
        }
    }
}
