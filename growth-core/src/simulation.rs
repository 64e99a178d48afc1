//! Top-level driver tying the mesh, the spatial index and the phases
//! together.

use crate::{
    config::GrowthConfig,
    divider,
    error::Result,
    executor::Executor,
    export,
    mesh::CellMesh,
    phases,
    sampler::UniformSampler,
    spatial_index::SpatialIndex,
    types::{CellId, Triangle, average_edge_length},
};
use std::time::Instant;

/// What a single [`Simulation::step`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub cells_before: usize,
    pub cells_after: usize,
    /// Cells created by splits during this step, in creation order.
    pub new_cells: Vec<CellId>,
}

/// A growing cell surface.
///
/// Owns the [`CellMesh`], the [`SpatialIndex`] over its positions and the
/// frozen [`GrowthConfig`]. The executor and the sampler are lent to each
/// step so callers decide threading and randomness.
#[derive(Clone, Debug)]
pub struct Simulation {
    mesh: CellMesh,
    index: SpatialIndex,
    cfg: GrowthConfig,
    steps: u64,
}

impl Simulation {
    /// Builds a simulation from a closed triangle mesh.
    ///
    /// The configuration is validated, one cell is made per distinct
    /// vertex, and every cell is entered in the spatial index.
    pub fn new(triangles: &[Triangle], cfg: GrowthConfig) -> Result<Self> {
        cfg.validate()?;
        let mesh = CellMesh::from_triangles(triangles)?;
        let mut index = SpatialIndex::new(cfg.index_cell_size());
        for (i, &p) in mesh.positions().iter().enumerate() {
            index.add(p, i)?;
        }
        tracing::info!(
            cells = mesh.len(),
            link_rest_length = cfg.link_rest_length,
            radius_of_influence = cfg.radius_of_influence,
            bucket = index.cell_size(),
            "initialized simulation"
        );
        Ok(Self {
            mesh,
            index,
            cfg,
            steps: 0,
        })
    }

    /// Like [`Simulation::new`], with parameters scaled to the mesh's
    /// average edge length.
    pub fn from_triangles_scaled(triangles: &[Triangle]) -> Result<Self> {
        let avg = average_edge_length(triangles);
        tracing::info!(average_edge_length = avg, "scaling parameters to mesh");
        Self::new(triangles, GrowthConfig::for_edge_length(avg))
    }

    pub fn mesh(&self) -> &CellMesh {
        &self.mesh
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.cfg
    }

    pub fn cell_count(&self) -> usize {
        self.mesh.len()
    }

    /// Steps completed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advances the simulation by one step.
    ///
    /// The step consists of:
    /// 1. [`phases::force_phase`] — parallel evaluation of every cell.
    /// 2. [`phases::commit_phase`] — index update and buffer swap.
    /// 3. [`phases::feed_phase`] — food increments and splits.
    ///
    /// An error leaves the simulation unusable; the graph may be halfway
    /// through a split.
    pub fn step(
        &mut self,
        exec: &impl Executor,
        sampler: &mut impl UniformSampler,
    ) -> Result<StepReport> {
        let cells_before = self.mesh.len();

        let started = Instant::now();
        let next = phases::force_phase(&self.mesh, &self.index, &self.cfg, exec);
        tracing::debug!(
            workers = exec.workers(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "ran workers"
        );

        let started = Instant::now();
        phases::commit_phase(&mut self.mesh, &mut self.index, next)?;
        tracing::debug!(elapsed_us = started.elapsed().as_micros() as u64, "committed");

        let started = Instant::now();
        let new_cells = phases::feed_phase(&mut self.mesh, &mut self.index, &self.cfg, sampler)?;
        tracing::debug!(
            splits = new_cells.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "fed and split"
        );

        self.steps += 1;
        Ok(StepReport {
            cells_before,
            cells_after: self.mesh.len(),
            new_cells,
        })
    }

    /// Runs `steps` steps and returns the final cell count.
    pub fn run(
        &mut self,
        steps: usize,
        exec: &impl Executor,
        sampler: &mut impl UniformSampler,
    ) -> Result<usize> {
        for _ in 0..steps {
            self.step(exec, sampler)?;
        }
        Ok(self.mesh.len())
    }

    /// Splits `cell` right away, regardless of its food.
    pub fn split(&mut self, cell: CellId, sampler: &mut impl UniformSampler) -> Result<CellId> {
        divider::split(&mut self.mesh, &mut self.index, cell, sampler)
    }

    /// See [`export::triangle_indexes`].
    pub fn triangle_indexes(&self) -> Vec<[CellId; 3]> {
        export::triangle_indexes(&self.mesh)
    }

    /// See [`export::triangulate`].
    pub fn triangulate(&self) -> Vec<Triangle> {
        export::triangulate(&self.mesh)
    }

    /// See [`export::vertex_attributes`].
    pub fn vertex_attributes(&self) -> Vec<f32> {
        export::vertex_attributes(&self.mesh, self.cfg.split_threshold)
    }
}
