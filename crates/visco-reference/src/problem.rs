//! Mesh and per-cell coefficients of the shear layer.
//!
//! Refinement is a two-call transaction: `begin_refine` marks cells from
//! the velocity jump across each cell, `execute_refine` adapts the mesh,
//! re-evaluates the coefficients and keeps the previous mesh and the
//! cell map so the solution can transfer its fields.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use visco_io::SimulationParameters;
use visco_mesh::marking::mark_fixed_fraction;
use visco_mesh::{adapt, generators, msh, CellFlag, CellMap, IntervalMesh};
use visco_solver::ProblemData;
use visco_types::constants::SAVED_MESH_FILE;
use visco_types::{MeshGeneration, ViscoError, ViscoResult};

use crate::model::ModelConfig;
use crate::ShearEngine;

/// The most recent topology change.
#[derive(Debug, Clone)]
pub struct Transition {
    pub previous: IntervalMesh,
    pub map: CellMap,
}

pub struct ShearProblem {
    model: ModelConfig,
    data_dir: PathBuf,
    mesh: IntervalMesh,
    inv_visc: Vec<f64>,
    generation: MeshGeneration,
    marked: Option<Vec<CellFlag>>,
    transition: Option<Transition>,
}

impl ShearProblem {
    pub fn mesh(&self) -> &IntervalMesh {
        &self.mesh
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn shear_modulus(&self) -> f64 {
        self.model.shear_modulus
    }

    /// η⁻¹ per cell.
    pub fn inverse_viscosity(&self) -> &[f64] {
        &self.inv_visc
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The last topology change, if any refinement has been executed.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    fn evaluate_coefficients(model: &ModelConfig, mesh: &IntervalMesh) -> Vec<f64> {
        mesh.midpoints()
            .into_iter()
            .map(|y| model.viscosity.inverse_at(y - mesh.origin, model.length))
            .collect()
    }
}

impl ProblemData<ShearEngine> for ShearProblem {
    fn new(params: &SimulationParameters, model: ModelConfig) -> ViscoResult<Self> {
        model.validate()?;

        let mesh = if params.load_mesh {
            let path = params.data_dir.join(SAVED_MESH_FILE);
            let mesh = msh::load(&path)?;
            if (mesh.length() - model.length).abs() > 1e-9 * model.length {
                return Err(ViscoError::InvalidMesh(format!(
                    "persisted mesh '{}' has length {}, model expects {}",
                    path.display(),
                    mesh.length(),
                    model.length
                )));
            }
            info!(path = %path.display(), cells = mesh.cell_count(), "loaded persisted mesh");
            mesh
        } else {
            generators::uniform(0.0, model.length, model.base_cells)?
        };

        let inv_visc = Self::evaluate_coefficients(&model, &mesh);
        Ok(Self {
            model,
            data_dir: params.data_dir.clone(),
            mesh,
            inv_visc,
            generation: MeshGeneration::default(),
            marked: None,
            transition: None,
        })
    }

    fn generation(&self) -> MeshGeneration {
        self.generation
    }

    fn begin_refine(&mut self, velocity: &[f64]) -> ViscoResult<()> {
        if velocity.len() != self.mesh.node_count() {
            return Err(ViscoError::Refinement(format!(
                "velocity length ({}) != node count ({})",
                velocity.len(),
                self.mesh.node_count()
            )));
        }
        let indicator: Vec<f64> = velocity.windows(2).map(|v| (v[1] - v[0]).abs()).collect();
        let r = &self.model.refinement;
        self.marked = Some(mark_fixed_fraction(
            &indicator,
            r.refine_fraction,
            r.coarsen_fraction,
        )?);
        Ok(())
    }

    fn execute_refine(&mut self) -> ViscoResult<()> {
        let flags = self.marked.take().ok_or_else(|| {
            ViscoError::Refinement("execute_refine called before cells were marked".into())
        })?;
        let outcome = adapt(&self.mesh, &flags, self.model.refinement.max_level)?;

        let previous = std::mem::replace(&mut self.mesh, outcome.mesh);
        self.inv_visc = Self::evaluate_coefficients(&self.model, &self.mesh);
        self.generation = self.generation.next();
        debug!(
            generation = %self.generation,
            cells = self.mesh.cell_count(),
            refined = outcome.refined,
            coarsened = outcome.coarsened,
            "problem data refined"
        );

        self.transition = Some(Transition {
            previous,
            map: outcome.map,
        });
        Ok(())
    }

    /// Relative paths resolve against the data directory.
    fn persist_mesh(&self, path: &Path) -> ViscoResult<()> {
        let path = if path.is_relative() {
            self.data_dir.join(path)
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        msh::save(&self.mesh, &path)
    }
}
