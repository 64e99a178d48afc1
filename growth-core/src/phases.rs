//! High-level simulation phases for the growing cell surface.
//!
//! One simulation step runs, in order:
//! 1. [`force_phase`] — every cell's next position and normal is computed
//!    from the current snapshot, in parallel, into a fresh [`NextState`].
//! 2. [`commit_phase`] — the spatial index is moved to the new positions
//!    and the new buffers replace the old ones.
//! 3. [`feed_phase`] — every cell gains food, and cells above the split
//!    threshold divide one after another.
//!
//! Only the first phase runs concurrently. The cell count is fixed from
//! the start of [`force_phase`] until [`feed_phase`] begins.

use crate::{
    config::GrowthConfig,
    divider,
    error::{GrowthError, Result},
    executor::Executor,
    forces::ForceField,
    mesh::CellMesh,
    sampler::UniformSampler,
    spatial_index::SpatialIndex,
    types::CellId,
};
use glam::Vec3;

/// Candidate positions and normals for every cell, indexed by [`CellId`].
#[derive(Clone, Debug, PartialEq)]
pub struct NextState {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl NextState {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Evaluates the force field for every cell.
///
/// Cells are dealt out to the executor's workers with stride
/// `exec.workers()`: worker `w` evaluates `w, w + W, w + 2W, ...`. Each
/// worker returns its own updates and the results are gathered back into
/// cell order, so the output does not depend on the worker count.
///
/// ### Parameters
/// - `mesh` - Current snapshot; read only.
/// - `index` - Spatial index matching the snapshot's positions.
/// - `cfg` - Simulation parameters.
/// - `exec` - Fork-join executor running the partitions.
///
/// ### Returns
/// A [`NextState`] with one entry per cell.
pub fn force_phase(
    mesh: &CellMesh,
    index: &SpatialIndex,
    cfg: &GrowthConfig,
    exec: &impl Executor,
) -> NextState {
    let field = ForceField::new(mesh, index, cfg);
    let workers = exec.workers().max(1);
    let parts = exec.scatter(|w| field.evaluate_partition(w, workers));

    let mut next = NextState {
        positions: vec![Vec3::ZERO; mesh.len()],
        normals: vec![Vec3::ZERO; mesh.len()],
    };
    for (w, part) in parts.into_iter().enumerate() {
        for (k, update) in part.into_iter().enumerate() {
            let i = w + k * workers;
            next.positions[i] = update.position;
            next.normals[i] = update.normal;
        }
    }
    next
}

/// Applies a [`NextState`] to the mesh and keeps the index in sync.
///
/// Every candidate is checked before anything changes: a buffer that does
/// not hold exactly one entry per cell, or a non-finite position, aborts
/// the commit and leaves mesh and index untouched. Otherwise every cell's
/// index entry is moved (a no-op when it stays in its bucket) and the new
/// buffers replace the old ones.
pub fn commit_phase(mesh: &mut CellMesh, index: &mut SpatialIndex, next: NextState) -> Result<()> {
    for found in [next.positions.len(), next.normals.len()] {
        if found != mesh.len() {
            return Err(GrowthError::CellCountMismatch {
                expected: mesh.len(),
                found,
            });
        }
    }

    if let Some(cell) = next.positions.iter().position(|p| !p.is_finite()) {
        return Err(GrowthError::NonFinitePosition { cell });
    }

    for (i, (&old, &new)) in mesh.positions.iter().zip(&next.positions).enumerate() {
        index.update(old, new, i)?;
    }

    mesh.positions = next.positions;
    mesh.normals = next.normals;
    Ok(())
}

/// Feeds every cell and divides those that have had enough.
///
/// Each cell present when the phase starts gains `sampler.uniform(0, 1)`
/// food (negative draws count as zero). A cell whose food then exceeds
/// `cfg.split_threshold` is split immediately, in index order. Children
/// created here are not visited until the next step.
///
/// ### Returns
/// Ids of the cells created by this phase, in creation order.
pub fn feed_phase(
    mesh: &mut CellMesh,
    index: &mut SpatialIndex,
    cfg: &GrowthConfig,
    sampler: &mut impl UniformSampler,
) -> Result<Vec<CellId>> {
    let count = mesh.len();
    let mut new_ids = Vec::new();
    for i in 0..count {
        mesh.food[i] += sampler.uniform(0.0, 1.0).max(0.0);
        if mesh.food[i] > cfg.split_threshold {
            new_ids.push(divider::split(mesh, index, i, sampler)?);
        }
    }
    Ok(new_ids)
}
