//! Per-cell update rule.
//!
//! [`ForceField`] borrows a frozen snapshot of the mesh and the spatial
//! index and computes, for any cell, where that cell wants to be next and
//! which way its surface faces. Evaluation never mutates anything, so
//! disjoint cell subsets can be evaluated concurrently.

use crate::{config::GrowthConfig, mesh::CellMesh, spatial_index::SpatialIndex, types::CellId};
use glam::Vec3;

/// Candidate next state of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellUpdate {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Read-only view used to evaluate cell updates.
#[derive(Clone, Copy)]
pub struct ForceField<'a> {
    mesh: &'a CellMesh,
    index: &'a SpatialIndex,
    cfg: &'a GrowthConfig,
}

impl<'a> ForceField<'a> {
    pub fn new(mesh: &'a CellMesh, index: &'a SpatialIndex, cfg: &'a GrowthConfig) -> Self {
        Self { mesh, index, cfg }
    }

    /// Computes the next position and normal of cell `i`.
    ///
    /// The new position is the current one moved by four weighted terms:
    ///
    /// - spring: toward the average of points one rest length short of
    ///   each neighbor along the connecting direction;
    /// - planar: toward the neighbor centroid;
    /// - bulge: along the normal, by the mean distance that would put
    ///   each closer-than-rest neighbor exactly at the rest length;
    /// - repulsion: away from every non-neighbor inside the radius of
    ///   influence, with weight falling from 1 at contact to 0 at the
    ///   radius.
    ///
    /// The displacement is clamped to `max_step_distance` when set.
    pub fn evaluate(&self, i: CellId) -> CellUpdate {
        let cfg = self.cfg;
        let positions = self.mesh.positions();
        let links = self.mesh.links(i);
        let p = positions[i];
        let n = self.mesh.cell_normal(i, self.mesh.normal(i));

        let rest = cfg.link_rest_length;
        let rest2 = rest * rest;
        let roi2 = cfg.radius_of_influence * cfg.radius_of_influence;

        let mut spring_target = Vec3::ZERO;
        let mut planar_target = Vec3::ZERO;
        let mut bulge_distance = 0.0;
        for &j in links {
            let l = positions[j];
            let d = l - p;
            spring_target += l - d.normalize_or_zero() * rest;
            planar_target += l;
            let length2 = d.length_squared();
            if length2 < rest2 {
                let dot = d.dot(n);
                bulge_distance += (rest2 - length2 + dot * dot).sqrt() + dot;
            }
        }
        if links.is_empty() {
            spring_target = p;
            planar_target = p;
        } else {
            let m = 1.0 / links.len() as f32;
            spring_target *= m;
            planar_target *= m;
            bulge_distance *= m;
        }

        // Linked cells are held apart by the spring term, so only strangers repel.
        let mut repulsion = Vec3::ZERO;
        self.index
            .search_callback(p, cfg.radius_of_influence, |j| {
                if j == i || links.contains(&j) {
                    return;
                }
                let d = p - positions[j];
                let d2 = d.length_squared();
                if d2 < roi2 {
                    repulsion += d.normalize_or_zero() * ((roi2 - d2) / roi2);
                }
            });

        let mut step = cfg.spring_factor * (spring_target - p)
            + cfg.planar_factor * (planar_target - p)
            + (cfg.bulge_factor * bulge_distance) * n
            + cfg.repulsion_factor * repulsion;
        if let Some(max) = cfg.max_step_distance {
            step = step.clamp_length_max(max);
        }

        CellUpdate {
            position: p + step,
            normal: n,
        }
    }

    /// Evaluates the cells `worker, worker + workers, worker + 2*workers, ...`.
    pub fn evaluate_partition(&self, worker: usize, workers: usize) -> Vec<CellUpdate> {
        (worker..self.mesh.len())
            .step_by(workers.max(1))
            .map(|i| self.evaluate(i))
            .collect()
    }
}
